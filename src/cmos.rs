//! CMOS real-time clock.
//!
//! Read once at boot; the timer keeps the value moving afterwards.

use core::fmt;

use crate::constants::cmos::*;
use crate::port::PortBus;

/// Wall-clock time. Hours run 0-23, the year has four digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallClock {
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02} {:02}/{:02}/{:04}",
            self.hour, self.minute, self.second, self.day, self.month, self.year
        )
    }
}

/// Raw RTC registers as read, before any format conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RtcRegisters {
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    pub day: u8,
    pub month: u8,
    pub year: u8,
    pub status_b: u8,
}

impl RtcRegisters {
    pub fn is_bcd(&self) -> bool {
        self.status_b & STATUS_B_BINARY == 0
    }

    pub fn is_24_hour(&self) -> bool {
        self.status_b & STATUS_B_24_HOUR != 0
    }

    /// Convert to binary 24-hour time. Years are windowed to 2000-2099.
    pub fn decode(&self) -> WallClock {
        let bcd = self.is_bcd();
        let field = |raw: u8| if bcd { bcd_to_binary(raw) } else { raw };

        WallClock {
            second: field(self.second),
            minute: field(self.minute),
            hour: decode_hour(self.hour, bcd, self.is_24_hour()),
            day: field(self.day),
            month: field(self.month),
            year: CENTURY_BASE + u16::from(field(self.year)),
        }
    }
}

pub fn bcd_to_binary(bcd: u8) -> u8 {
    (bcd & 0x0F) + (bcd >> 4) * 10
}

/// The PM flag sits on top of the hour byte in 12-hour mode and must come
/// off before BCD decoding. 12 AM is midnight, 12 PM stays noon.
fn decode_hour(raw: u8, bcd: bool, twenty_four_hour: bool) -> u8 {
    if twenty_four_hour {
        return if bcd { bcd_to_binary(raw) } else { raw };
    }

    let pm = raw & HOUR_PM != 0;
    let digits = raw & !HOUR_PM;
    let hour = if bcd { bcd_to_binary(digits) } else { digits };

    match (pm, hour) {
        (true, h) if h < 12 => h + 12,
        (false, 12) => 0,
        (_, h) => h,
    }
}

pub struct Cmos<B: PortBus> {
    bus: B,
}

impl<B: PortBus> Cmos<B> {
    pub fn new(bus: B) -> Self {
        Cmos { bus }
    }

    /// NMI stays enabled (bit 7 of the index clear).
    pub fn read_register(&mut self, register: u8) -> u8 {
        self.bus.write(ADDRESS_PORT, register);
        self.bus.read(DATA_PORT)
    }

    pub fn update_in_progress(&mut self) -> bool {
        self.read_register(REG_STATUS_A) & STATUS_A_UPDATING != 0
    }

    /// Spin until the RTC finishes its update cycle, then snapshot every field.
    pub fn read_registers(&mut self) -> RtcRegisters {
        while self.update_in_progress() {
            core::hint::spin_loop();
        }

        RtcRegisters {
            second: self.read_register(REG_SECONDS),
            minute: self.read_register(REG_MINUTES),
            hour: self.read_register(REG_HOURS),
            day: self.read_register(REG_DAY),
            month: self.read_register(REG_MONTH),
            year: self.read_register(REG_YEAR),
            status_b: self.read_register(REG_STATUS_B),
        }
    }

    pub fn read_clock(&mut self) -> WallClock {
        self.read_registers().decode()
    }
}
