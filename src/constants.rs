/// System-wide constants to avoid magic numbers

/// VGA text mode constants
pub mod vga {
    /// VGA text buffer physical address
    pub const BUFFER_ADDR: usize = 0xb8000;

    /// VGA text mode dimensions
    pub const BUFFER_HEIGHT: usize = 25;
    pub const BUFFER_WIDTH: usize = 80;

    /// Row 0 is reserved for the clock; the console scrolls below it
    pub const STATUS_ROW: usize = 0;
    pub const FIRST_TEXT_ROW: usize = 1;
}

/// 8259 PIC ports and command words
pub mod pic {
    pub const PRIMARY_COMMAND: u16 = 0x20;
    pub const PRIMARY_DATA: u16 = 0x21;
    pub const SECONDARY_COMMAND: u16 = 0xA0;
    pub const SECONDARY_DATA: u16 = 0xA1;

    /// Unused diagnostic port, written to as a short delay between ICWs
    pub const WAIT_PORT: u16 = 0x80;

    /// ICW1: start initialization, ICW4 follows
    pub const ICW1_INIT: u8 = 0x10;
    pub const ICW1_ICW4: u8 = 0x01;

    /// ICW3: secondary chip hangs off primary line 2
    pub const ICW3_PRIMARY_CASCADE: u8 = 0x04;
    pub const ICW3_SECONDARY_IDENTITY: u8 = 0x02;

    /// ICW4: 8086/88 mode
    pub const ICW4_8086: u8 = 0x01;

    /// Non-specific End Of Interrupt
    pub const CMD_END_OF_INTERRUPT: u8 = 0x20;

    /// Mask register value with every line disabled
    pub const ALL_MASKED: u8 = 0xFF;

    /// Lines per chip
    pub const LINES_PER_CHIP: u8 = 8;
}

/// Interrupt constants
pub mod interrupts {
    /// PIC (Programmable Interrupt Controller) offset
    /// We remap PIC interrupts to start at 32 to avoid conflicts with CPU exceptions
    pub const PIC_1_OFFSET: u8 = 32;
    pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;

    /// Legacy IRQ lines across both chips
    pub const LINE_COUNT: usize = 16;

    pub const TIMER_LINE: u8 = 0;
    pub const KEYBOARD_LINE: u8 = 1;
}

/// PS/2 Keyboard controller constants
pub mod keyboard {
    /// PS/2 keyboard data port
    pub const DATA_PORT: u16 = 0x60;

    /// Decoded character ring size (one slot is kept free)
    pub const BUFFER_SIZE: usize = 128;

    /// Scancode set 1 markers
    pub const EXTENDED_PREFIX: u8 = 0xE0;
    pub const RELEASE_BIT: u8 = 0x80;

    pub const LEFT_SHIFT: u8 = 0x2A;
    pub const RIGHT_SHIFT: u8 = 0x36;
    pub const CAPS_LOCK: u8 = 0x3A;
}

/// CMOS / RTC register space
pub mod cmos {
    pub const ADDRESS_PORT: u16 = 0x70;
    pub const DATA_PORT: u16 = 0x71;

    pub const REG_SECONDS: u8 = 0x00;
    pub const REG_MINUTES: u8 = 0x02;
    pub const REG_HOURS: u8 = 0x04;
    pub const REG_DAY: u8 = 0x07;
    pub const REG_MONTH: u8 = 0x08;
    pub const REG_YEAR: u8 = 0x09;
    pub const REG_STATUS_A: u8 = 0x0A;
    pub const REG_STATUS_B: u8 = 0x0B;

    /// Status A: update cycle in progress
    pub const STATUS_A_UPDATING: u8 = 0x80;

    /// Status B: fields are binary rather than BCD
    pub const STATUS_B_BINARY: u8 = 0x04;
    /// Status B: hours run 0-23 rather than 1-12
    pub const STATUS_B_24_HOUR: u8 = 0x02;

    /// Hour register PM flag in 12-hour mode
    pub const HOUR_PM: u8 = 0x80;

    /// Two-digit years are windowed to 2000-2099
    pub const CENTURY_BASE: u16 = 2000;
}

/// Time service constants
pub mod time {
    /// Legacy PIT rate (~18.2 Hz) rounded down
    pub const DEFAULT_TICKS_PER_SECOND: u32 = 18;

    /// Length of "HH:MM:SS DD/MM/YYYY"
    pub const TIME_STRING_LEN: usize = 19;
}
