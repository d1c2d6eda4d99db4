//! Time service: one CMOS read at boot, then IRQ 0 ticks keep the clock running.
//!
//! Every `ticks_per_second` timer interrupts the wall clock moves forward one
//! second and the cached `HH:MM:SS DD/MM/YYYY` string is rebuilt. The kernel
//! loop polls [`has_update`] so it redraws once per second, not once per tick.
//!
//! Day, month and year never roll over; only seconds, minutes and hours carry.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;

use crate::cmos::{Cmos, WallClock};
use crate::constants::interrupts::TIMER_LINE;
use crate::constants::time::{DEFAULT_TICKS_PER_SECOND, TIME_STRING_LEN};
use crate::irq::{self, InterruptContext};
use crate::port::HardwarePorts;

/// Fixed-size rendering of a [`WallClock`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TimeString {
    bytes: [u8; TIME_STRING_LEN],
}

impl TimeString {
    pub const fn blank() -> Self {
        TimeString {
            bytes: *b"00:00:00 00/00/0000",
        }
    }

    pub fn render(clock: &WallClock) -> Self {
        let mut text = Self::blank();
        put2(&mut text.bytes[0..2], clock.hour);
        put2(&mut text.bytes[3..5], clock.minute);
        put2(&mut text.bytes[6..8], clock.second);
        put2(&mut text.bytes[9..11], clock.day);
        put2(&mut text.bytes[12..14], clock.month);
        put4(&mut text.bytes[15..19], clock.year);
        text
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes).unwrap_or("")
    }
}

impl fmt::Display for TimeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for TimeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeString({:?})", self.as_str())
    }
}

fn put2(out: &mut [u8], value: u8) {
    out[0] = b'0' + (value / 10) % 10;
    out[1] = b'0' + value % 10;
}

fn put4(out: &mut [u8], value: u16) {
    let mut value = value;
    for slot in out.iter_mut().rev() {
        *slot = b'0' + (value % 10) as u8;
        value /= 10;
    }
}

/// Carry one second into minutes and hours. Midnight wraps the hour only.
pub fn advance_one_second(clock: &mut WallClock) {
    clock.second = clock.second.saturating_add(1);
    if clock.second < 60 {
        return;
    }
    clock.second = 0;
    clock.minute = clock.minute.saturating_add(1);
    if clock.minute < 60 {
        return;
    }
    clock.minute = 0;
    clock.hour = clock.hour.saturating_add(1);
    if clock.hour >= 24 {
        clock.hour = 0;
    }
}

struct ClockState {
    clock: WallClock,
    text: TimeString,
    ticks_per_second: u32,
    ticks_this_second: u32,
    uptime_ticks: u64,
}

pub struct TimeService {
    state: Mutex<ClockState>,
    ready: AtomicBool,
    dirty: AtomicBool,
}

impl TimeService {
    pub const fn new() -> Self {
        TimeService {
            state: Mutex::new(ClockState {
                clock: WallClock {
                    second: 0,
                    minute: 0,
                    hour: 0,
                    day: 0,
                    month: 0,
                    year: 0,
                },
                text: TimeString::blank(),
                ticks_per_second: DEFAULT_TICKS_PER_SECOND,
                ticks_this_second: 0,
                uptime_ticks: 0,
            }),
            ready: AtomicBool::new(false),
            dirty: AtomicBool::new(false),
        }
    }

    /// Seed the clock and start counting. A rate of 0 falls back to 18.
    pub fn start(&self, clock: WallClock, ticks_per_second: u32) {
        let ticks_per_second = if ticks_per_second == 0 {
            DEFAULT_TICKS_PER_SECOND
        } else {
            ticks_per_second
        };

        let mut state = self.state.lock();
        state.clock = clock;
        state.text = TimeString::render(&clock);
        state.ticks_per_second = ticks_per_second;
        state.ticks_this_second = 0;
        state.uptime_ticks = 0;
        drop(state);

        self.dirty.store(true, Ordering::Release);
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_started(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Timer interrupt hook. Ticks before [`start`](Self::start) are ignored.
    pub fn tick(&self) {
        if !self.is_started() {
            return;
        }

        let mut state = self.state.lock();
        state.uptime_ticks = state.uptime_ticks.wrapping_add(1);
        state.ticks_this_second += 1;
        if state.ticks_this_second < state.ticks_per_second {
            return;
        }

        state.ticks_this_second = 0;
        advance_one_second(&mut state.clock);
        state.text = TimeString::render(&state.clock);
        drop(state);

        self.dirty.store(true, Ordering::Release);
    }

    pub fn now(&self) -> WallClock {
        self.state.lock().clock
    }

    pub fn formatted(&self) -> TimeString {
        self.state.lock().text
    }

    pub fn ticks_per_second(&self) -> u32 {
        self.state.lock().ticks_per_second
    }

    pub fn uptime_ticks(&self) -> u64 {
        self.state.lock().uptime_ticks
    }

    /// True once per rebuilt string until [`consume_update`](Self::consume_update).
    pub fn has_update(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn consume_update(&self) {
        self.dirty.store(false, Ordering::Release);
    }
}

impl Default for TimeService {
    fn default() -> Self {
        Self::new()
    }
}

static CLOCK: TimeService = TimeService::new();

fn on_tick(_context: &InterruptContext) {
    CLOCK.tick();
}

/// Read the RTC, hook IRQ 0 and unmask it.
pub fn init(ticks_per_second: u32) {
    let mut cmos = Cmos::new(unsafe { HardwarePorts::new() });
    let clock = cmos.read_clock();

    crate::without_interrupts(|| CLOCK.start(clock, ticks_per_second));
    irq::install(TIMER_LINE, on_tick);
    crate::pic::unmask(TIMER_LINE);

    log::info!(
        "RTC {} ({} ticks/s on IRQ {})",
        clock,
        crate::without_interrupts(|| CLOCK.ticks_per_second()),
        TIMER_LINE
    );
}

// Readers lock the state the timer writes, so they keep IRQ 0 out meanwhile.

pub fn now() -> WallClock {
    crate::without_interrupts(|| CLOCK.now())
}

pub fn formatted_string() -> TimeString {
    crate::without_interrupts(|| CLOCK.formatted())
}

pub fn uptime_ticks() -> u64 {
    crate::without_interrupts(|| CLOCK.uptime_ticks())
}

pub fn has_update() -> bool {
    CLOCK.has_update()
}

pub fn consume_update() {
    CLOCK.consume_update();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(hour: u8, minute: u8, second: u8) -> WallClock {
        WallClock {
            second,
            minute,
            hour,
            day: 19,
            month: 10,
            year: 2026,
        }
    }

    fn started(start: WallClock, ticks_per_second: u32) -> TimeService {
        let service = TimeService::new();
        service.start(start, ticks_per_second);
        assert!(service.has_update());
        service.consume_update();
        service
    }

    #[test]
    fn start_renders_and_marks_dirty() {
        let service = TimeService::new();
        assert!(!service.has_update());
        service.start(clock(9, 5, 3), 18);
        assert!(service.has_update());
        assert_eq!(service.formatted().as_str(), "09:05:03 19/10/2026");
        assert_eq!(service.now(), clock(9, 5, 3));
    }

    #[test]
    fn seventeen_ticks_do_not_advance() {
        let service = started(clock(12, 0, 0), 18);
        for _ in 0..17 {
            service.tick();
        }
        assert_eq!(service.now(), clock(12, 0, 0));
        assert!(!service.has_update());
        assert_eq!(service.uptime_ticks(), 17);
    }

    #[test]
    fn eighteen_ticks_advance_one_second_and_flag_once() {
        let service = started(clock(12, 0, 0), 18);
        let mut flagged = 0;
        for _ in 0..18 {
            service.tick();
            if service.has_update() {
                flagged += 1;
                service.consume_update();
            }
        }
        assert_eq!(flagged, 1);
        assert_eq!(service.now(), clock(12, 0, 1));
        assert_eq!(service.formatted().as_str(), "12:00:01 19/10/2026");
    }

    #[test]
    fn flag_stays_set_until_consumed() {
        let service = started(clock(0, 0, 0), 2);
        service.tick();
        service.tick();
        assert!(service.has_update());
        assert!(service.has_update());
        service.consume_update();
        assert!(!service.has_update());
    }

    #[test]
    fn custom_rate_and_zero_fallback() {
        let service = started(clock(0, 0, 0), 100);
        for _ in 0..250 {
            service.tick();
        }
        assert_eq!(service.now(), clock(0, 0, 2));

        let service = started(clock(0, 0, 0), 0);
        assert_eq!(service.ticks_per_second(), 18);
        for _ in 0..36 {
            service.tick();
        }
        assert_eq!(service.now(), clock(0, 0, 2));
    }

    #[test]
    fn ticks_before_start_are_ignored() {
        let service = TimeService::new();
        for _ in 0..100 {
            service.tick();
        }
        assert!(!service.is_started());
        assert_eq!(service.uptime_ticks(), 0);
        assert!(!service.has_update());
    }

    #[test]
    fn carries_into_minutes_and_hours() {
        let mut time = clock(10, 59, 59);
        advance_one_second(&mut time);
        assert_eq!(time, clock(11, 0, 0));

        let mut time = clock(10, 14, 59);
        advance_one_second(&mut time);
        assert_eq!(time, clock(10, 15, 0));
    }

    #[test]
    fn midnight_wraps_hour_without_touching_date() {
        let service = started(clock(23, 59, 59), 1);
        service.tick();
        assert_eq!(service.now(), clock(0, 0, 0));
        assert_eq!(service.formatted().as_str(), "00:00:00 19/10/2026");
    }

    #[test]
    fn formatted_string_tracks_clock_after_each_rollover() {
        let service = started(clock(7, 58, 30), 3);
        for _ in 0..(3 * 95) {
            service.tick();
            let now = service.now();
            let text = service.formatted();
            assert_eq!(text.as_str(), now.to_string());
            assert_eq!(text.as_bytes().len(), 19);
            assert_eq!(text.as_bytes()[2], b':');
            assert_eq!(text.as_bytes()[8], b' ');
            assert_eq!(text.as_bytes()[14], b'/');
        }
        assert_eq!(service.formatted().as_str(), "08:00:05 19/10/2026");
    }

    #[test]
    fn render_zero_pads_every_field() {
        let text = TimeString::render(&WallClock {
            second: 1,
            minute: 2,
            hour: 3,
            day: 4,
            month: 5,
            year: 987,
        });
        assert_eq!(text.as_str(), "03:02:01 04/05/0987");
        assert_eq!(format!("{}", text), "03:02:01 04/05/0987");
    }
}
