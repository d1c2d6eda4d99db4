//! 8259 Programmable Interrupt Controller pair.
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │  Primary    │◀────│  Secondary  │
//! │  IRQ 0-7    │ IR2 │  IRQ 8-15   │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! Lines are remapped to vectors 32-47 and all of them start masked.
//! Drivers unmask the line they service once their handler is installed.

use spin::Mutex;

use crate::constants::interrupts::{LINE_COUNT, PIC_1_OFFSET, PIC_2_OFFSET};
use crate::constants::pic::*;
use crate::port::{HardwarePorts, PortBus};

/// Programmable Interrupt Controller (PIC) setup
pub static PICS: Mutex<ChainedPic<HardwarePorts>> = Mutex::new(ChainedPic::new(
    unsafe { HardwarePorts::new() },
    PIC_1_OFFSET,
    PIC_2_OFFSET,
));

pub struct ChainedPic<B: PortBus> {
    bus: B,
    primary_offset: u8,
    secondary_offset: u8,
}

impl<B: PortBus> ChainedPic<B> {
    pub const fn new(bus: B, primary_offset: u8, secondary_offset: u8) -> Self {
        ChainedPic {
            bus,
            primary_offset,
            secondary_offset,
        }
    }

    /// Remap both chips, wire the cascade, select 8086 mode, then mask every line.
    pub fn initialize(&mut self) {
        let (saved_primary, saved_secondary) = self.read_masks();

        self.bus.write(PRIMARY_COMMAND, ICW1_INIT | ICW1_ICW4);
        self.bus.io_wait();
        self.bus.write(SECONDARY_COMMAND, ICW1_INIT | ICW1_ICW4);
        self.bus.io_wait();

        self.bus.write(PRIMARY_DATA, self.primary_offset);
        self.bus.io_wait();
        self.bus.write(SECONDARY_DATA, self.secondary_offset);
        self.bus.io_wait();

        self.bus.write(PRIMARY_DATA, ICW3_PRIMARY_CASCADE);
        self.bus.io_wait();
        self.bus.write(SECONDARY_DATA, ICW3_SECONDARY_IDENTITY);
        self.bus.io_wait();

        self.bus.write(PRIMARY_DATA, ICW4_8086);
        self.bus.io_wait();
        self.bus.write(SECONDARY_DATA, ICW4_8086);
        self.bus.io_wait();

        // Restore, then fall back to everything masked.
        self.write_masks(saved_primary, saved_secondary);
        self.write_masks(ALL_MASKED, ALL_MASKED);
    }

    pub fn read_masks(&mut self) -> (u8, u8) {
        (self.bus.read(PRIMARY_DATA), self.bus.read(SECONDARY_DATA))
    }

    pub fn write_masks(&mut self, primary: u8, secondary: u8) {
        self.bus.write(PRIMARY_DATA, primary);
        self.bus.write(SECONDARY_DATA, secondary);
    }

    /// Acknowledge `line`. Secondary lines need an EOI on both chips.
    pub fn end_of_interrupt(&mut self, line: u8) {
        if line >= LINES_PER_CHIP {
            self.bus.write(SECONDARY_COMMAND, CMD_END_OF_INTERRUPT);
        }
        self.bus.write(PRIMARY_COMMAND, CMD_END_OF_INTERRUPT);
    }

    pub fn mask_line(&mut self, line: u8) {
        if let Some((port, bit)) = mask_bit(line) {
            let mask = self.bus.read(port) | bit;
            self.bus.write(port, mask);
        }
    }

    pub fn unmask_line(&mut self, line: u8) {
        if let Some((port, bit)) = mask_bit(line) {
            let mask = self.bus.read(port) & !bit;
            self.bus.write(port, mask);
        }
    }

    pub fn offsets(&self) -> (u8, u8) {
        (self.primary_offset, self.secondary_offset)
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

/// IMR port and bit for a line, `None` past line 15.
fn mask_bit(line: u8) -> Option<(u16, u8)> {
    match line {
        0..=7 => Some((PRIMARY_DATA, 1 << line)),
        8..=15 => Some((SECONDARY_DATA, 1 << (line - LINES_PER_CHIP))),
        _ => None,
    }
}

/// Remap and mask the global PIC pair.
pub fn init() {
    crate::without_interrupts(|| {
        let mut pics = PICS.lock();
        pics.initialize();
        let (primary, secondary) = pics.offsets();
        log::debug!(
            "PIC remapped to {:#04x}/{:#04x}, {} lines masked",
            primary,
            secondary,
            LINE_COUNT
        );
    });
}

pub fn mask(line: u8) {
    crate::without_interrupts(|| PICS.lock().mask_line(line));
}

pub fn unmask(line: u8) {
    crate::without_interrupts(|| PICS.lock().unmask_line(line));
}
