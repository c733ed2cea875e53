//! The alarm engine: arming, and the blocking fire session that rings the buzzer until
//! the user acknowledges or the ceiling elapses.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;

use crate::datetime::AlarmTime;
use crate::keys::{self, Button, Buttons, WAIT_DURATION_MS};
use crate::rtc::Rtc;
use crate::shared::SharedState;
use crate::ticker::Ticker;

/// Longest a fire session rings before giving up on the user.
pub const MAX_ALARM_TIME_SEC: u64 = 60;
/// A#4
pub const BUZZER_FREQ_HZ: u32 = 466;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No session running. The RTC match may or may not be armed.
    Armed,
    /// Ringing, select not yet pressed.
    Ringing,
    /// Ringing, select is down and its release ends the session.
    Acknowledging,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Silenced {
    Acknowledged,
    TimedOut,
}

pub struct Alarm<'a, B, L> {
    state: &'a SharedState,
    buzzer: B,
    indicator: L,
    phase: Phase,
}

impl<'a, B, L> Alarm<'a, B, L>
where
    B: OutputPin,
    L: OutputPin,
{
    pub fn new(state: &'a SharedState, mut buzzer: B, mut indicator: L) -> Self {
        buzzer.set_low().ok();
        indicator.set_low().ok();
        Self {
            state,
            buzzer,
            indicator,
            phase: Phase::Armed,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn enabled(&self) -> bool {
        self.state.alarm_enabled()
    }

    /// Makes `at` the active alarm and registers it with the RTC.
    pub fn arm<R: Rtc>(&mut self, rtc: &mut R, at: AlarmTime) {
        self.state.set_alarm(at);
        rtc.arm_alarm(at);
        self.state.set_alarm_enabled(true);
        info!("alarm armed for {}", at);
    }

    pub fn disarm<R: Rtc>(&mut self, rtc: &mut R) {
        rtc.disarm_alarm();
        self.state.set_alarm_enabled(false);
        info!("alarm disarmed");
    }

    /// Flips between armed and disarmed, keeping the active alarm time. Returns the new
    /// enabled state.
    pub fn toggle<R: Rtc>(&mut self, rtc: &mut R) -> bool {
        if self.enabled() {
            self.disarm(rtc);
        } else {
            self.arm(rtc, self.state.alarm());
        }
        self.enabled()
    }

    /// One full square-wave period on the buzzer.
    pub fn buzz<D: DelayUs<u32>>(&mut self, delay: &mut D, freq_hz: u32) {
        if freq_hz == 0 {
            return;
        }
        let half_period_us = 500_000 / freq_hz;
        self.buzzer.set_high().ok();
        delay.delay_us(half_period_us);
        self.buzzer.set_low().ok();
        delay.delay_us(half_period_us);
    }

    /// Runs a complete fire session and returns once it is over.
    ///
    /// Holds the calling context for up to [`MAX_ALARM_TIME_SEC`]. Afterwards the select
    /// button is released, and the RTC match is armed again for tomorrow if the alarm is
    /// still enabled.
    pub fn fire<K, T, R>(&mut self, keys: &K, ticker: &mut T, rtc: &mut R) -> Silenced
    where
        K: Buttons,
        T: Ticker,
        R: Rtc,
    {
        self.indicator.set_high().ok();
        self.state.set_alarm_fired(true);
        self.phase = Phase::Ringing;
        info!("alarm fired");

        let deadline = ticker.now_us() + MAX_ALARM_TIME_SEC * 1_000_000;
        let outcome = loop {
            if let Some(outcome) = self.ring(keys, ticker, deadline) {
                break outcome;
            }
        };

        self.indicator.set_low().ok();
        self.buzzer.set_low().ok();
        self.state.set_alarm_fired(false);
        self.state.set_flicker(0);
        self.phase = Phase::Armed;

        keys::wait_until_released(keys, Button::Select, || false);
        ticker.delay_ms(WAIT_DURATION_MS);

        match outcome {
            Silenced::Acknowledged => info!("alarm acknowledged"),
            Silenced::TimedOut => info!("alarm timed out"),
        }

        if self.enabled() {
            self.rearm(rtc, ticker);
        }
        outcome
    }

    /// One buzzer period of the session, or its outcome once select has gone down and
    /// up again or `deadline` has passed.
    fn ring<K: Buttons, T: Ticker>(
        &mut self,
        keys: &K,
        ticker: &mut T,
        deadline: u64,
    ) -> Option<Silenced> {
        if ticker.now_us() >= deadline {
            return Some(Silenced::TimedOut);
        }
        let pressed = keys.is_pressed(Button::Select);
        match (self.phase, pressed) {
            (Phase::Ringing, true) => self.phase = Phase::Acknowledging,
            (Phase::Acknowledging, false) => return Some(Silenced::Acknowledged),
            _ => (),
        }
        self.buzz(ticker, BUZZER_FREQ_HZ);
        None
    }

    // The match stays true for the whole second, so re-arming inside it would fire again.
    fn rearm<R: Rtc, T: Ticker>(&mut self, rtc: &mut R, ticker: &mut T) {
        let at = self.state.alarm();
        while rtc.now().map_or(false, |now| at.matches(&now)) {
            ticker.delay_ms(WAIT_DURATION_MS);
        }
        rtc.arm_alarm(at);
        debug!("alarm re-armed");
    }
}
