//! PS/2 keyboard driver (scancode set 1, ABNT2).
//!
//! The IRQ 1 handler reads one scancode per interrupt, decodes it against
//! the layout with the current Shift/Caps Lock state and pushes the byte
//! into a lock-free ring. The kernel loop drains the ring with [`get_char`].
//!
//! ```text
//!  port 0x60 ──IRQ1──▶ Keyboard::handle_scancode ──▶ KeyBuffer ──▶ get_char()
//! ```

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

use crate::constants::interrupts::KEYBOARD_LINE;
use crate::constants::keyboard::*;
use crate::irq::{self, InterruptContext};
use crate::layout;
use crate::port::{HardwarePorts, PortBus};

/// Single-producer single-consumer byte ring.
///
/// The interrupt handler is the only writer of `head`, the reader the only
/// writer of `tail`. One slot stays free so `head == tail` always means empty.
pub struct KeyBuffer<const N: usize> {
    slots: [AtomicU8; N],
    head: AtomicUsize,
    tail: AtomicUsize,
}

impl<const N: usize> KeyBuffer<N> {
    pub const fn new() -> Self {
        KeyBuffer {
            slots: [const { AtomicU8::new(0) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Producer side. A full ring hands the byte back instead of overwriting.
    pub fn push(&self, byte: u8) -> Result<(), u8> {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) % N;
        if next == self.tail.load(Ordering::Acquire) {
            return Err(byte);
        }
        self.slots[head].store(byte, Ordering::Relaxed);
        self.head.store(next, Ordering::Release);
        Ok(())
    }

    /// Consumer side.
    pub fn pop(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        let byte = self.slots[tail].load(Ordering::Relaxed);
        self.tail.store((tail + 1) % N, Ordering::Release);
        Some(byte)
    }

    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head + N - tail) % N
    }

    /// Bytes the ring can hold at once.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Drop everything queued. Call with the producer quiet.
    pub fn clear(&self) {
        self.tail.store(0, Ordering::Release);
        self.head.store(0, Ordering::Release);
    }
}

impl<const N: usize> Default for KeyBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the modifier keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub caps_lock: bool,
}

enum Scancode {
    ExtendedPrefix,
    Release(u8),
    Press(u8),
}

impl Scancode {
    fn classify(byte: u8) -> Self {
        if byte == EXTENDED_PREFIX {
            Scancode::ExtendedPrefix
        } else if byte & RELEASE_BIT != 0 {
            Scancode::Release(byte & !RELEASE_BIT)
        } else {
            Scancode::Press(byte)
        }
    }
}

fn is_shift(code: u8) -> bool {
    code == LEFT_SHIFT || code == RIGHT_SHIFT
}

pub struct Keyboard {
    buffer: KeyBuffer<BUFFER_SIZE>,
    shift: AtomicBool,
    caps_lock: AtomicBool,
    extended: AtomicBool,
}

impl Keyboard {
    pub const fn new() -> Self {
        Keyboard {
            buffer: KeyBuffer::new(),
            shift: AtomicBool::new(false),
            caps_lock: AtomicBool::new(false),
            extended: AtomicBool::new(false),
        }
    }

    /// Empty the ring and release every modifier.
    pub fn reset(&self) {
        self.buffer.clear();
        self.shift.store(false, Ordering::Relaxed);
        self.caps_lock.store(false, Ordering::Relaxed);
        self.extended.store(false, Ordering::Relaxed);
    }

    /// Read one scancode from the data port and handle it.
    pub fn service<B: PortBus>(&self, bus: &mut B) {
        let scancode = bus.read(DATA_PORT);
        self.handle_scancode(scancode);
    }

    /// Decode one byte and queue the result. Overflow drops the byte.
    pub fn handle_scancode(&self, scancode: u8) {
        if let Some(byte) = self.decode(scancode) {
            let _ = self.buffer.push(byte);
        }
    }

    /// Advance the modifier state machine by one byte.
    pub fn decode(&self, scancode: u8) -> Option<u8> {
        match Scancode::classify(scancode) {
            Scancode::ExtendedPrefix => {
                self.extended.store(true, Ordering::Relaxed);
                None
            }
            Scancode::Release(code) => {
                if !self.extended.load(Ordering::Relaxed) && is_shift(code) {
                    self.shift.store(false, Ordering::Relaxed);
                }
                self.extended.store(false, Ordering::Relaxed);
                None
            }
            Scancode::Press(code) => {
                let extended = self.extended.load(Ordering::Relaxed);
                if !extended && is_shift(code) {
                    self.shift.store(true, Ordering::Relaxed);
                    return None;
                }
                if !extended && code == CAPS_LOCK {
                    self.caps_lock.fetch_xor(true, Ordering::Relaxed);
                    return None;
                }

                let shifted = self.shift.load(Ordering::Relaxed);
                self.extended.store(false, Ordering::Relaxed);
                let byte = layout::lookup(code, shifted)?;

                // CP437 extras (>= 0x80) ignore Caps Lock.
                if byte.is_ascii() && self.caps_lock.load(Ordering::Relaxed) {
                    Some(layout::apply_caps_lock(byte))
                } else {
                    Some(byte)
                }
            }
        }
    }

    pub fn has_char(&self) -> bool {
        !self.buffer.is_empty()
    }

    pub fn get_char(&self) -> Option<u8> {
        self.buffer.pop()
    }

    /// Discard queued characters; Shift and Caps Lock keep their state.
    pub fn flush(&self) {
        self.buffer.clear();
    }

    pub fn is_caps_lock_on(&self) -> bool {
        self.caps_lock.load(Ordering::Relaxed)
    }

    pub fn is_shift_held(&self) -> bool {
        self.shift.load(Ordering::Relaxed)
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers {
            shift: self.is_shift_held(),
            caps_lock: self.is_caps_lock_on(),
        }
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

static KEYBOARD: Keyboard = Keyboard::new();

fn on_interrupt(_context: &InterruptContext) {
    // IRQ context: port 0x60 is only ever read from here.
    let mut ports = unsafe { HardwarePorts::new() };
    KEYBOARD.service(&mut ports);
}

/// Reset the driver, hook IRQ 1 and unmask it.
pub fn init() {
    crate::without_interrupts(|| KEYBOARD.reset());
    irq::install(KEYBOARD_LINE, on_interrupt);
    crate::pic::unmask(KEYBOARD_LINE);
    log::info!("PS/2 keyboard on IRQ {} (ABNT2)", KEYBOARD_LINE);
}

pub fn has_char() -> bool {
    KEYBOARD.has_char()
}

/// Next decoded byte, `None` when nothing is queued.
pub fn get_char() -> Option<u8> {
    KEYBOARD.get_char()
}

pub fn flush() {
    crate::without_interrupts(|| KEYBOARD.flush());
}

pub fn is_caps_lock_on() -> bool {
    KEYBOARD.is_caps_lock_on()
}

pub fn is_shift_held() -> bool {
    KEYBOARD.is_shift_held()
}

pub fn modifiers() -> Modifiers {
    KEYBOARD.modifiers()
}
