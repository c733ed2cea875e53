//! State shared between the two cores and the RTC interrupt.
//!
//! Every field is its own atomic and has exactly one writer:
//!
//! | field            | written by                                             |
//! |------------------|--------------------------------------------------------|
//! | `mode`           | input context                                          |
//! | `menu_index`     | input context                                          |
//! | `alarm_enabled`  | input context (alarm engine)                           |
//! | `alarm`          | input context (alarm engine)                           |
//! | `date_edit`      | input context                                          |
//! | `alarm_edit`     | input context                                          |
//! | `datetime_set`   | input context                                          |
//! | `alarm_pending`  | RTC interrupt raises it, input context clears it       |
//! | `alarm_fired`    | fire session                                           |
//! | `flicker`        | render context counts, fire session resets             |
//!
//! Only plain loads and stores are used: the Cortex-M0+ has no atomic read-modify-write.
//! Readers may see a value one update stale but never a torn one.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};

use time::macros::time;

use crate::datetime::{AlarmTime, DateTime};
use crate::mode::Mode;

/// Alarm time loaded at boot.
pub const DEFAULT_ALARM: AlarmTime = AlarmTime::from_time(time!(8:00:00));

pub struct AtomicAlarmTime {
    hour: AtomicU8,
    minute: AtomicU8,
    second: AtomicU8,
}

impl AtomicAlarmTime {
    pub const fn new(t: AlarmTime) -> Self {
        Self {
            hour: AtomicU8::new(t.hour),
            minute: AtomicU8::new(t.minute),
            second: AtomicU8::new(t.second),
        }
    }

    pub fn load(&self) -> AlarmTime {
        AlarmTime {
            hour: self.hour.load(Ordering::Acquire),
            minute: self.minute.load(Ordering::Acquire),
            second: self.second.load(Ordering::Acquire),
        }
    }

    pub fn store(&self, t: AlarmTime) {
        self.hour.store(t.hour, Ordering::Release);
        self.minute.store(t.minute, Ordering::Release);
        self.second.store(t.second, Ordering::Release);
    }
}

pub struct AtomicDateTime {
    year: AtomicU16,
    month: AtomicU8,
    day: AtomicU8,
    weekday: AtomicU8,
    hour: AtomicU8,
    minute: AtomicU8,
    second: AtomicU8,
}

impl AtomicDateTime {
    pub const fn new(dt: DateTime) -> Self {
        Self {
            year: AtomicU16::new(dt.year),
            month: AtomicU8::new(dt.month),
            day: AtomicU8::new(dt.day),
            weekday: AtomicU8::new(dt.weekday),
            hour: AtomicU8::new(dt.hour),
            minute: AtomicU8::new(dt.minute),
            second: AtomicU8::new(dt.second),
        }
    }

    pub fn load(&self) -> DateTime {
        DateTime {
            year: self.year.load(Ordering::Acquire),
            month: self.month.load(Ordering::Acquire),
            day: self.day.load(Ordering::Acquire),
            weekday: self.weekday.load(Ordering::Acquire),
            hour: self.hour.load(Ordering::Acquire),
            minute: self.minute.load(Ordering::Acquire),
            second: self.second.load(Ordering::Acquire),
        }
    }

    pub fn store(&self, dt: &DateTime) {
        self.year.store(dt.year, Ordering::Release);
        self.month.store(dt.month, Ordering::Release);
        self.day.store(dt.day, Ordering::Release);
        self.weekday.store(dt.weekday, Ordering::Release);
        self.hour.store(dt.hour, Ordering::Release);
        self.minute.store(dt.minute, Ordering::Release);
        self.second.store(dt.second, Ordering::Release);
    }
}

pub struct SharedState {
    mode: AtomicU8,
    menu_index: AtomicU8,
    alarm_enabled: AtomicBool,
    alarm: AtomicAlarmTime,
    date_edit: AtomicDateTime,
    alarm_edit: AtomicAlarmTime,
    datetime_set: AtomicBool,
    alarm_pending: AtomicBool,
    alarm_fired: AtomicBool,
    flicker: AtomicU8,
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            mode: AtomicU8::new(Mode::Menu as u8),
            menu_index: AtomicU8::new(0),
            alarm_enabled: AtomicBool::new(false),
            alarm: AtomicAlarmTime::new(DEFAULT_ALARM),
            date_edit: AtomicDateTime::new(DateTime::new(2022, 7, 1, 5, 0, 0, 0)),
            alarm_edit: AtomicAlarmTime::new(DEFAULT_ALARM),
            datetime_set: AtomicBool::new(false),
            alarm_pending: AtomicBool::new(false),
            alarm_fired: AtomicBool::new(false),
            flicker: AtomicU8::new(0),
        }
    }

    pub fn mode(&self) -> Mode {
        Mode::from_u8(self.mode.load(Ordering::Acquire)).unwrap_or(Mode::Menu)
    }

    pub fn set_mode(&self, mode: Mode) {
        self.mode.store(mode as u8, Ordering::Release);
    }

    pub fn menu_index(&self) -> u8 {
        self.menu_index.load(Ordering::Acquire)
    }

    pub fn set_menu_index(&self, index: u8) {
        self.menu_index.store(index, Ordering::Release);
    }

    pub fn alarm_enabled(&self) -> bool {
        self.alarm_enabled.load(Ordering::Acquire)
    }

    pub fn set_alarm_enabled(&self, enabled: bool) {
        self.alarm_enabled.store(enabled, Ordering::Release);
    }

    /// The time the alarm is (or would be) armed for.
    pub fn alarm(&self) -> AlarmTime {
        self.alarm.load()
    }

    pub fn set_alarm(&self, t: AlarmTime) {
        self.alarm.store(t)
    }

    pub fn date_edit(&self) -> DateTime {
        self.date_edit.load()
    }

    pub fn set_date_edit(&self, dt: &DateTime) {
        self.date_edit.store(dt)
    }

    pub fn alarm_edit(&self) -> AlarmTime {
        self.alarm_edit.load()
    }

    pub fn set_alarm_edit(&self, t: AlarmTime) {
        self.alarm_edit.store(t)
    }

    /// Outcome of the last commit to the RTC.
    pub fn datetime_set(&self) -> bool {
        self.datetime_set.load(Ordering::Acquire)
    }

    pub fn set_datetime_set(&self, ok: bool) {
        self.datetime_set.store(ok, Ordering::Release);
    }

    /// Called from the RTC interrupt when the armed time matches.
    pub fn raise_alarm(&self) {
        self.alarm_pending.store(true, Ordering::Release);
    }

    pub fn alarm_pending(&self) -> bool {
        self.alarm_pending.load(Ordering::Acquire)
    }

    /// Clears the pending flag, returning whether it was set. The interrupt only ever
    /// stores `true`; one landing between the load and the store merges into this one.
    pub fn take_alarm_pending(&self) -> bool {
        let pending = self.alarm_pending.load(Ordering::Acquire);
        if pending {
            self.alarm_pending.store(false, Ordering::Release);
        }
        pending
    }

    pub fn alarm_fired(&self) -> bool {
        self.alarm_fired.load(Ordering::Acquire)
    }

    pub fn set_alarm_fired(&self, fired: bool) {
        self.alarm_fired.store(fired, Ordering::Release);
    }

    pub fn flicker(&self) -> u8 {
        self.flicker.load(Ordering::Acquire)
    }

    pub fn set_flicker(&self, count: u8) {
        self.flicker.store(count, Ordering::Release);
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
