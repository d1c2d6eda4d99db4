use core::fmt;
use lazy_static::lazy_static;
use log::{Level, LevelFilter, Log, Metadata, Record};
use spin::Mutex;
use volatile::Volatile;

use cinser::constants::vga::{
    BUFFER_ADDR, BUFFER_HEIGHT, BUFFER_WIDTH, FIRST_TEXT_ROW, STATUS_ROW,
};

#[allow(dead_code)]
#[derive(Clone, Copy)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    const fn new(foreground: Color, background: Color) -> ColorCode {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
struct ScreenChar {
    ascii_character: u8,
    color_code: ColorCode,
}

#[repr(transparent)]
pub struct Buffer {
    chars: [[Volatile<ScreenChar>; BUFFER_WIDTH]; BUFFER_HEIGHT],
}

/// Console below the status row. Bytes are CP437, so keyboard output such
/// as 0x87 (`ç`) is drawn as-is.
pub struct Writer {
    column_position: usize,
    row_position: usize,
    color_code: ColorCode,
    buffer: &'static mut Buffer,
}

impl Writer {
    pub fn write_byte(&mut self, byte: u8) {
        match byte {
            b'\n' => self.new_line(),
            b'\r' => { /* ignore carriage return */ }
            0x08 => self.backspace(),
            _ => {
                if self.column_position >= BUFFER_WIDTH {
                    self.new_line();
                }
                let row = self.row_position;
                let col = self.column_position;
                self.buffer.chars[row][col].write(ScreenChar {
                    ascii_character: byte,
                    color_code: self.color_code,
                });
                self.column_position += 1;
            }
        }
    }

    fn new_line(&mut self) {
        if self.row_position < BUFFER_HEIGHT - 1 {
            self.row_position += 1;
        } else {
            // Scroll the text rows only; the status row stays put
            for row in FIRST_TEXT_ROW + 1..BUFFER_HEIGHT {
                for col in 0..BUFFER_WIDTH {
                    let character = self.buffer.chars[row][col].read();
                    self.buffer.chars[row - 1][col].write(character);
                }
            }
            self.clear_row(BUFFER_HEIGHT - 1);
        }
        self.column_position = 0;
    }

    fn clear_row(&mut self, row: usize) {
        let blank = ScreenChar {
            ascii_character: b' ',
            color_code: self.color_code,
        };
        for col in 0..BUFFER_WIDTH {
            self.buffer.chars[row][col].write(blank);
        }
    }

    /// Text from `fmt`: printable ASCII and newlines, everything else as a block.
    pub fn write_string(&mut self, s: &str) {
        for byte in s.bytes() {
            match byte {
                0x20..=0x7e | b'\n' => self.write_byte(byte),
                _ => self.write_byte(0xfe),
            }
        }
    }

    // remove last printed character (for backspace)
    pub fn backspace(&mut self) {
        if self.column_position > 0 {
            self.column_position -= 1;
            let row = self.row_position;
            let col = self.column_position;
            self.buffer.chars[row][col].write(ScreenChar {
                ascii_character: b' ',
                color_code: self.color_code,
            });
        }
    }

    /// Right-aligned text on the status row; the cursor does not move.
    pub fn write_status(&mut self, text: &[u8], color_code: ColorCode) {
        let len = text.len().min(BUFFER_WIDTH);
        let start = BUFFER_WIDTH - len;
        for (offset, &byte) in text[..len].iter().enumerate() {
            self.buffer.chars[STATUS_ROW][start + offset].write(ScreenChar {
                ascii_character: byte,
                color_code,
            });
        }
    }

    pub fn set_color(&mut self, color_code: ColorCode) {
        self.color_code = color_code;
    }

    pub fn color(&self) -> ColorCode {
        self.color_code
    }
}

lazy_static! {
    pub static ref WRITER: Mutex<Writer> = Mutex::new(Writer {
        column_position: 0,
        row_position: FIRST_TEXT_ROW,
        color_code: DEFAULT_COLOR,
        buffer: unsafe { &mut *(BUFFER_ADDR as *mut Buffer) },
    });
}

const DEFAULT_COLOR: ColorCode = ColorCode::new(Color::White, Color::Black);
const STATUS_COLOR: ColorCode = ColorCode::new(Color::Yellow, Color::Blue);

impl fmt::Write for Writer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_string(s);
        Ok(())
    }
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::vga_buffer::_print(format_args!($($arg)*)));
}

#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}

// The writer lock is never taken with interrupts on, so an IRQ can't spin on it.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;
    cinser::without_interrupts(|| {
        let _ = WRITER.lock().write_fmt(args);
    });
}

/// Echo one decoded keyboard byte.
pub fn echo(byte: u8) {
    cinser::without_interrupts(|| WRITER.lock().write_byte(byte));
}

/// Redraw the clock in the top-right corner.
pub fn show_status(text: &[u8]) {
    cinser::without_interrupts(|| WRITER.lock().write_status(text, STATUS_COLOR));
}

struct ConsoleLogger;

impl ConsoleLogger {
    fn color(level: Level) -> ColorCode {
        match level {
            Level::Error => ColorCode::new(Color::LightRed, Color::Black),
            Level::Warn => ColorCode::new(Color::Yellow, Color::Black),
            Level::Info => ColorCode::new(Color::LightBlue, Color::Black),
            Level::Debug | Level::Trace => ColorCode::new(Color::DarkGray, Color::Black),
        }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        use core::fmt::Write;
        cinser::without_interrupts(|| {
            let mut writer = WRITER.lock();
            let previous = writer.color();
            writer.set_color(Self::color(record.level()));
            let _ = writeln!(writer, "[{:>5}] {}", record.level(), record.args());
            writer.set_color(previous);
        });
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Route `log` records to the console.
pub fn init_logger() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
