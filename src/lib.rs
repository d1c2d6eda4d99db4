//! Interrupt-driven I/O core of the Cinser kernel.
//!
//! - [`pic`]: 8259 remap, masking and End Of Interrupt
//! - [`irq`]: 16-line handler registry and the common dispatcher
//! - [`keyboard`]: PS/2 scancode decoding into a lock-free ring
//! - [`time`]: RTC snapshot advanced by the timer interrupt
//!
//! The kernel binary owns the IDT and the console; it calls [`init`] and then
//! enables interrupts.

#![cfg_attr(not(test), no_std)]

pub mod cmos;
pub mod constants;
pub mod irq;
pub mod keyboard;
pub mod layout;
pub mod pic;
pub mod port;
pub mod time;

#[cfg(test)]
mod testing;

use constants::time::DEFAULT_TICKS_PER_SECOND;

/// Boot-time knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Timer interrupts per wall-clock second. 0 means the default.
    pub ticks_per_second: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
        }
    }
}

/// Bring up the PIC, the IRQ registry and both drivers.
///
/// Interrupts stay disabled; the caller enables them once the IDT is loaded.
pub fn init(config: &Config) {
    pic::init();
    irq::init();
    keyboard::init();
    time::init(config.ticks_per_second);
    log::info!("IRQ core ready");
}

/// Run `f` with maskable interrupts off, restoring the previous state after.
#[cfg(not(test))]
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    x86_64::instructions::interrupts::without_interrupts(f)
}

#[cfg(test)]
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}

pub fn hlt_loop() -> ! {
    loop {
        x86_64::instructions::hlt();
    }
}
