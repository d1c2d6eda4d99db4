//! IRQ dispatch layer.
//!
//! Every hardware trampoline funnels into [`dispatch`]. The registry maps
//! each of the 16 legacy lines to at most one handler; an empty slot still
//! gets its End Of Interrupt so the line keeps firing.

use spin::Mutex;

use crate::constants::interrupts::{LINE_COUNT, PIC_1_OFFSET};
use crate::pic::{ChainedPic, PICS};
use crate::port::PortBus;

/// What a trampoline knows about the interrupt it caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptContext {
    pub vector: u8,
}

impl InterruptContext {
    pub const fn new(vector: u8) -> Self {
        InterruptContext { vector }
    }

    /// Legacy line for a vector in the remapped range.
    pub fn line(&self) -> Option<u8> {
        self.vector
            .checked_sub(PIC_1_OFFSET)
            .filter(|line| (*line as usize) < LINE_COUNT)
    }
}

/// Non-capturing closures coerce to this too.
pub type IrqHandler = fn(&InterruptContext);

pub struct IrqRegistry {
    handlers: Mutex<[Option<IrqHandler>; LINE_COUNT]>,
}

impl IrqRegistry {
    pub const fn new() -> Self {
        IrqRegistry {
            handlers: Mutex::new([None; LINE_COUNT]),
        }
    }

    pub fn clear(&self) {
        *self.handlers.lock() = [None; LINE_COUNT];
    }

    /// Lines past 15 are ignored.
    pub fn install(&self, line: u8, handler: IrqHandler) {
        if let Some(slot) = self.handlers.lock().get_mut(line as usize) {
            *slot = Some(handler);
        }
    }

    pub fn uninstall(&self, line: u8) {
        if let Some(slot) = self.handlers.lock().get_mut(line as usize) {
            *slot = None;
        }
    }

    pub fn handler(&self, line: u8) -> Option<IrqHandler> {
        self.handlers.lock().get(line as usize).copied().flatten()
    }

    /// Run the handler for `context` and acknowledge the line on `pic`.
    ///
    /// Vectors outside the remapped range are dropped without an EOI.
    pub fn dispatch<B: PortBus>(&self, context: &InterruptContext, pic: &Mutex<ChainedPic<B>>) {
        let Some(line) = context.line() else {
            return;
        };

        // Copy the handler out so it runs without the registry lock held.
        if let Some(handler) = self.handler(line) {
            handler(context);
        }

        pic.lock().end_of_interrupt(line);
    }
}

impl Default for IrqRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: IrqRegistry = IrqRegistry::new();

pub fn init() {
    crate::without_interrupts(|| REGISTRY.clear());
    log::debug!("IRQ registry cleared ({} lines)", LINE_COUNT);
}

pub fn install(line: u8, handler: IrqHandler) {
    crate::without_interrupts(|| REGISTRY.install(line, handler));
}

pub fn uninstall(line: u8) {
    crate::without_interrupts(|| REGISTRY.uninstall(line));
}

/// Entry point for the IRQ trampolines.
pub fn dispatch(context: &InterruptContext) {
    REGISTRY.dispatch(context, &PICS);
}
