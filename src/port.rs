//! Byte-wide port I/O.
//!
//! Drivers talk to hardware through [`PortBus`] so the same register
//! sequencing runs against real ports in the kernel and a recording bus in
//! unit tests.

use x86_64::instructions::port::Port;

use crate::constants::pic::WAIT_PORT;

pub trait PortBus {
    fn read(&mut self, port: u16) -> u8;

    fn write(&mut self, port: u16, value: u8);

    /// Burn one I/O cycle. The PIC needs this between initialization words.
    fn io_wait(&mut self) {
        self.write(WAIT_PORT, 0);
    }
}

/// Real x86 `in`/`out` instructions.
#[derive(Debug, Clone, Copy)]
pub struct HardwarePorts(());

impl HardwarePorts {
    /// # Safety
    ///
    /// The caller must run in ring 0 (or hold I/O privilege), and must not let
    /// the bus touch ports that other code relies on being left alone.
    pub const unsafe fn new() -> Self {
        HardwarePorts(())
    }
}

impl PortBus for HardwarePorts {
    fn read(&mut self, port: u16) -> u8 {
        let mut port = Port::<u8>::new(port);
        unsafe { port.read() }
    }

    fn write(&mut self, port: u16, value: u8) {
        let mut port = Port::<u8>::new(port);
        unsafe { port.write(value) }
    }
}
