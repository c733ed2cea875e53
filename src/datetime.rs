//! Date-time values as the RTC sees them, and the field stepping used while editing.

use time::{PrimitiveDateTime, Time};

use crate::calendar::{days_in_month, MAX_YEAR};

/// Calendar date and time of day. `weekday` is 0 for Sunday and is never derived from
/// the date: whatever the user sets is what the RTC carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Time of day an alarm matches on. There is no date part, so it repeats daily.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// An editable component of a [`DateTime`] or [`AlarmTime`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Year,
    Month,
    Day,
    Weekday,
    Hour,
    Minute,
    Second,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Down,
    Up,
}

/// Moves `value` one step inside `min..=max`, wrapping at both ends.
pub fn wrap_step(value: u16, min: u16, max: u16, step: Step) -> u16 {
    match step {
        Step::Down if value <= min => max,
        Step::Down => value - 1,
        Step::Up if value >= max => min,
        Step::Up => value + 1,
    }
}

fn step_u8(value: u8, min: u8, max: u8, step: Step) -> u8 {
    wrap_step(value as u16, min as u16, max as u16, step) as u8
}

impl DateTime {
    pub const fn new(
        year: u16,
        month: u8,
        day: u8,
        weekday: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Self {
        Self {
            year,
            month,
            day,
            weekday,
            hour,
            minute,
            second,
        }
    }

    /// Every field in range, including the day for this year and month.
    pub fn is_valid(&self) -> bool {
        self.year <= MAX_YEAR
            && (1..=12).contains(&self.month)
            && self.day >= 1
            && self.day <= days_in_month(self.year, self.month)
            && self.weekday <= 6
            && self.hour <= 23
            && self.minute <= 59
            && self.second <= 59
    }

    /// Pulls the day back to the last day of the month if it overshoots.
    pub fn clamp_day(&mut self) {
        let last = days_in_month(self.year, self.month);
        if self.day > last {
            self.day = last;
        }
    }

    /// Steps one field, wrapping inside that field's range. The day wraps against the
    /// length of the currently staged month.
    pub fn step(&mut self, field: Field, step: Step) {
        match field {
            Field::Year => self.year = wrap_step(self.year, 0, MAX_YEAR, step),
            Field::Month => self.month = step_u8(self.month, 1, 12, step),
            Field::Day => {
                let last = days_in_month(self.year, self.month);
                self.day = step_u8(self.day, 1, last, step);
            }
            Field::Weekday => self.weekday = step_u8(self.weekday, 0, 6, step),
            Field::Hour => self.hour = step_u8(self.hour, 0, 23, step),
            Field::Minute => self.minute = step_u8(self.minute, 0, 59, step),
            Field::Second => self.second = step_u8(self.second, 0, 59, step),
        }
    }

    pub fn time_of_day(&self) -> AlarmTime {
        AlarmTime::new(self.hour, self.minute, self.second)
    }
}

impl From<PrimitiveDateTime> for DateTime {
    fn from(dt: PrimitiveDateTime) -> Self {
        Self {
            year: dt.year() as u16,
            month: dt.month() as u8,
            day: dt.day(),
            weekday: dt.weekday().number_days_from_sunday(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
        }
    }
}

impl AlarmTime {
    pub const fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    pub const fn from_time(t: Time) -> Self {
        Self::new(t.hour(), t.minute(), t.second())
    }

    /// Only the time of day is compared; the date of `now` is ignored.
    pub fn matches(&self, now: &DateTime) -> bool {
        self.hour == now.hour && self.minute == now.minute && self.second == now.second
    }

    /// Steps hour, minute or second. Date fields do not exist on an alarm and are ignored.
    pub fn step(&mut self, field: Field, step: Step) {
        match field {
            Field::Hour => self.hour = step_u8(self.hour, 0, 23, step),
            Field::Minute => self.minute = step_u8(self.minute, 0, 59, step),
            Field::Second => self.second = step_u8(self.second, 0, 59, step),
            _ => (),
        }
    }
}

impl From<Time> for AlarmTime {
    fn from(t: Time) -> Self {
        Self::from_time(t)
    }
}
