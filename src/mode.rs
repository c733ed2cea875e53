//! The menu/edit state set shared by the input and render contexts.

use crate::datetime::Field;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Menu = 0,
    Clock,
    SetClockYear,
    SetClockMonth,
    SetClockDay,
    SetClockWeekday,
    SetClockHour,
    SetClockMin,
    SetClockSec,
    SetClockFinal,
    AlarmMenu,
    /// Confirmation screen after the alarm was toggled either way.
    DisableAlarm,
    SetAlarmHour,
    SetAlarmMin,
    SetAlarmSec,
    SetAlarmFinal,
    SleepMode,
}

impl Mode {
    pub const ALL: [Mode; 17] = [
        Mode::Menu,
        Mode::Clock,
        Mode::SetClockYear,
        Mode::SetClockMonth,
        Mode::SetClockDay,
        Mode::SetClockWeekday,
        Mode::SetClockHour,
        Mode::SetClockMin,
        Mode::SetClockSec,
        Mode::SetClockFinal,
        Mode::AlarmMenu,
        Mode::DisableAlarm,
        Mode::SetAlarmHour,
        Mode::SetAlarmMin,
        Mode::SetAlarmSec,
        Mode::SetAlarmFinal,
        Mode::SleepMode,
    ];

    /// Inverse of `mode as u8`.
    pub fn from_u8(raw: u8) -> Option<Mode> {
        Self::ALL.get(raw as usize).copied()
    }

    /// The date-time field a clock edit step works on.
    pub fn clock_field(self) -> Option<Field> {
        match self {
            Mode::SetClockYear => Some(Field::Year),
            Mode::SetClockMonth => Some(Field::Month),
            Mode::SetClockDay => Some(Field::Day),
            Mode::SetClockWeekday => Some(Field::Weekday),
            Mode::SetClockHour => Some(Field::Hour),
            Mode::SetClockMin => Some(Field::Minute),
            Mode::SetClockSec => Some(Field::Second),
            _ => None,
        }
    }

    /// The alarm field an alarm edit step works on.
    pub fn alarm_field(self) -> Option<Field> {
        match self {
            Mode::SetAlarmHour => Some(Field::Hour),
            Mode::SetAlarmMin => Some(Field::Minute),
            Mode::SetAlarmSec => Some(Field::Second),
            _ => None,
        }
    }

    /// Where confirm leads from an edit step. `None` on the last step of a flow,
    /// where confirm commits instead.
    pub fn next_field(self) -> Option<Mode> {
        match self {
            Mode::SetClockYear => Some(Mode::SetClockMonth),
            Mode::SetClockMonth => Some(Mode::SetClockDay),
            Mode::SetClockDay => Some(Mode::SetClockWeekday),
            Mode::SetClockWeekday => Some(Mode::SetClockHour),
            Mode::SetClockHour => Some(Mode::SetClockMin),
            Mode::SetClockMin => Some(Mode::SetClockSec),
            Mode::SetAlarmHour => Some(Mode::SetAlarmMin),
            Mode::SetAlarmMin => Some(Mode::SetAlarmSec),
            _ => None,
        }
    }

    /// Where cancel leads from an edit step. The first step of either flow backs out to
    /// the main menu.
    pub fn previous_field(self) -> Mode {
        match self {
            Mode::SetClockMonth => Mode::SetClockYear,
            Mode::SetClockDay => Mode::SetClockMonth,
            Mode::SetClockWeekday => Mode::SetClockDay,
            Mode::SetClockHour => Mode::SetClockWeekday,
            Mode::SetClockMin => Mode::SetClockHour,
            Mode::SetClockSec => Mode::SetClockMin,
            Mode::SetAlarmMin => Mode::SetAlarmHour,
            Mode::SetAlarmSec => Mode::SetAlarmMin,
            _ => Mode::Menu,
        }
    }
}
