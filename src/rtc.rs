//! Boundary to the real-time clock peripheral.

use crate::datetime::{AlarmTime, DateTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError {
    /// The oscillator is stopped; there is no current time to report.
    NotRunning,
    /// The peripheral rejected the value, or holds one that makes no sense.
    InvalidDateTime,
}

/// What the firmware needs from an RTC.
///
/// When an armed alarm matches, the implementation raises the match interrupt; the
/// binary's handler forwards it to [`SharedState::raise_alarm`](crate::shared::SharedState::raise_alarm).
pub trait Rtc {
    fn now(&mut self) -> Result<DateTime, RtcError>;

    fn set_datetime(&mut self, dt: &DateTime) -> Result<(), RtcError>;

    /// Fire every time hour, minute and second all match `at`.
    fn arm_alarm(&mut self, at: AlarmTime);

    fn disarm_alarm(&mut self);
}

impl<T: Rtc + ?Sized> Rtc for &mut T {
    fn now(&mut self) -> Result<DateTime, RtcError> {
        (**self).now()
    }

    fn set_datetime(&mut self, dt: &DateTime) -> Result<(), RtcError> {
        (**self).set_datetime(dt)
    }

    fn arm_alarm(&mut self, at: AlarmTime) {
        (**self).arm_alarm(at)
    }

    fn disarm_alarm(&mut self) {
        (**self).disarm_alarm()
    }
}
