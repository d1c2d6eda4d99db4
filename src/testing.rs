//! Recording port bus for unit tests.

use std::collections::VecDeque;

use crate::constants::{cmos, keyboard, pic};
use crate::port::PortBus;

/// Remaining ICW2..ICW4 data writes after an ICW1 with ICW4 requested.
const ICW_DATA_WORDS: u8 = 3;

pub struct FakeBus {
    /// Every write in order, `io_wait` included.
    pub writes: Vec<(u16, u8)>,
    masks: [u8; 2],
    icw_pending: [u8; 2],
    cmos_index: u8,
    cmos: [u8; 128],
    busy_polls: usize,
    scancodes: VecDeque<u8>,
}

impl FakeBus {
    pub fn new() -> Self {
        FakeBus {
            writes: Vec::new(),
            masks: [0; 2],
            icw_pending: [0; 2],
            cmos_index: 0,
            cmos: [0; 128],
            busy_polls: 0,
            scancodes: VecDeque::new(),
        }
    }

    pub fn set_masks(&mut self, primary: u8, secondary: u8) {
        self.masks = [primary, secondary];
    }

    pub fn set_cmos(&mut self, register: u8, value: u8) {
        self.cmos[register as usize] = value;
    }

    /// Status A reports an update in progress for the next `polls` reads.
    pub fn set_busy_polls(&mut self, polls: usize) {
        self.busy_polls = polls;
    }

    pub fn queue_scancodes(&mut self, codes: &[u8]) {
        self.scancodes.extend(codes.iter().copied());
    }

    /// CMOS registers selected through the address port, in order.
    pub fn cmos_selects(&self) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(port, _)| *port == cmos::ADDRESS_PORT)
            .map(|(_, value)| *value)
            .collect()
    }

    fn write_data(&mut self, chip: usize, value: u8) {
        if self.icw_pending[chip] > 0 {
            self.icw_pending[chip] -= 1;
        } else {
            self.masks[chip] = value;
        }
    }
}

impl PortBus for FakeBus {
    fn read(&mut self, port: u16) -> u8 {
        match port {
            pic::PRIMARY_DATA => self.masks[0],
            pic::SECONDARY_DATA => self.masks[1],
            cmos::DATA_PORT => {
                let value = self.cmos[self.cmos_index as usize];
                if self.cmos_index == cmos::REG_STATUS_A && self.busy_polls > 0 {
                    self.busy_polls -= 1;
                    value | cmos::STATUS_A_UPDATING
                } else {
                    value
                }
            }
            keyboard::DATA_PORT => self.scancodes.pop_front().unwrap_or(0),
            _ => 0,
        }
    }

    fn write(&mut self, port: u16, value: u8) {
        self.writes.push((port, value));
        match port {
            pic::PRIMARY_COMMAND if value & pic::ICW1_INIT != 0 => {
                self.icw_pending[0] = ICW_DATA_WORDS;
            }
            pic::SECONDARY_COMMAND if value & pic::ICW1_INIT != 0 => {
                self.icw_pending[1] = ICW_DATA_WORDS;
            }
            pic::PRIMARY_DATA => self.write_data(0, value),
            pic::SECONDARY_DATA => self.write_data(1, value),
            cmos::ADDRESS_PORT => self.cmos_index = value & 0x7F,
            _ => {}
        }
    }
}
