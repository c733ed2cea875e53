//! Input side of the menu state machine. Runs on its own core, polls the buttons every
//! [`WAIT_DURATION_MS`] and owns the alarm engine, so fire sessions run here too.

use embedded_hal::digital::v2::OutputPin;

use crate::alarm::Alarm;
use crate::datetime::{wrap_step, Step};
use crate::keys::{self, Button, Buttons, WAIT_DURATION_MS};
use crate::mode::Mode;
use crate::rtc::Rtc;
use crate::shared::SharedState;
use crate::ticker::Ticker;

/// Time in CLOCK without input before the display goes to sleep.
pub const SLEEP_TIMEOUT_MS: u32 = 10_000;
pub const SLEEP_TICKS: u32 = SLEEP_TIMEOUT_MS / WAIT_DURATION_MS;

pub const MENU_CLOCK: u8 = 0;
pub const MENU_SET_CLOCK: u8 = 1;
pub const MENU_ALARM: u8 = 2;
pub const MENU_ITEMS: u8 = 3;

pub const ALARM_MENU_TOGGLE: u8 = 0;
pub const ALARM_MENU_SET: u8 = 1;
pub const ALARM_MENU_ITEMS: u8 = 2;

const NAVIGATE: &[Button] = &[Button::Left, Button::Right, Button::Select];
const EDIT: &[Button] = &[Button::Left, Button::Right, Button::Select, Button::Back];
const CANCEL: &[Button] = &[Button::Back];
const CONFIRM: &[Button] = &[Button::Select];

/// Buttons a mode listens to, in sampling order, and what a press does there.
struct Bindings<C> {
    buttons: &'static [Button],
    on_press: fn(&mut C, Mode, Button),
}

pub struct Controller<'a, R, K, B, L> {
    state: &'a SharedState,
    rtc: R,
    keys: K,
    alarm: Alarm<'a, B, L>,
    idle_ticks: u32,
}

impl<'a, R, K, B, L> Controller<'a, R, K, B, L>
where
    R: Rtc,
    K: Buttons,
    B: OutputPin,
    L: OutputPin,
{
    pub fn new(state: &'a SharedState, rtc: R, keys: K, alarm: Alarm<'a, B, L>) -> Self {
        Self {
            state,
            rtc,
            keys,
            alarm,
            idle_ticks: 0,
        }
    }

    pub fn alarm(&self) -> &Alarm<'a, B, L> {
        &self.alarm
    }

    pub fn run<T: Ticker>(&mut self, ticker: &mut T) -> ! {
        info!("input loop started");
        loop {
            self.poll(ticker);
        }
    }

    /// One polling iteration: a pending alarm first, then at most one button action for
    /// the current mode, then the settle delay.
    pub fn poll<T: Ticker>(&mut self, ticker: &mut T) {
        self.service_alarm(ticker);

        let mode = self.state.mode();
        if mode == Mode::SleepMode {
            self.sleep(ticker);
        } else {
            let bindings = Self::bindings(mode);
            if let Some(button) = keys::first_pressed(&self.keys, bindings.buttons) {
                (bindings.on_press)(self, mode, button);
                self.await_release(ticker, Some(button));
            }
            if mode == Mode::Clock && self.state.mode() == Mode::Clock {
                self.count_idle();
            }
        }

        ticker.delay_ms(WAIT_DURATION_MS);
    }

    fn bindings(mode: Mode) -> Bindings<Self> {
        match mode {
            Mode::Menu => Bindings {
                buttons: NAVIGATE,
                on_press: Self::on_menu,
            },
            Mode::Clock => Bindings {
                buttons: CANCEL,
                on_press: Self::on_clock,
            },
            Mode::SetClockYear
            | Mode::SetClockMonth
            | Mode::SetClockDay
            | Mode::SetClockWeekday
            | Mode::SetClockHour
            | Mode::SetClockMin
            | Mode::SetClockSec => Bindings {
                buttons: EDIT,
                on_press: Self::on_clock_edit,
            },
            Mode::AlarmMenu => Bindings {
                buttons: EDIT,
                on_press: Self::on_alarm_menu,
            },
            Mode::SetAlarmHour | Mode::SetAlarmMin | Mode::SetAlarmSec => Bindings {
                buttons: EDIT,
                on_press: Self::on_alarm_edit,
            },
            Mode::SetClockFinal | Mode::SetAlarmFinal | Mode::DisableAlarm => Bindings {
                buttons: CONFIRM,
                on_press: Self::on_confirmation,
            },
            // woken by any button, see `sleep`
            Mode::SleepMode => Bindings {
                buttons: &[],
                on_press: Self::on_confirmation,
            },
        }
    }

    fn service_alarm<T: Ticker>(&mut self, ticker: &mut T) {
        if self.state.take_alarm_pending() && self.alarm.enabled() {
            self.alarm.fire(&self.keys, ticker, &mut self.rtc);
        }
    }

    /// Waits for `button` (or every button) to come up. An alarm raised meanwhile rings
    /// right away and the wait resumes after its session.
    fn await_release<T: Ticker>(&mut self, ticker: &mut T, button: Option<Button>) {
        let state = self.state;
        loop {
            let released = match button {
                Some(button) => {
                    keys::wait_until_released(&self.keys, button, || state.alarm_pending())
                }
                None => keys::wait_all_released(&self.keys, || state.alarm_pending()),
            };
            if released {
                return;
            }
            self.service_alarm(ticker);
        }
    }

    fn enter(&mut self, mode: Mode) {
        self.state.set_mode(mode);
        debug!("mode {}", mode);
    }

    fn count_idle(&mut self) {
        self.idle_ticks += 1;
        if self.idle_ticks >= SLEEP_TICKS {
            self.idle_ticks = 0;
            info!("going to sleep");
            self.enter(Mode::SleepMode);
        }
    }

    fn sleep<T: Ticker>(&mut self, ticker: &mut T) {
        let state = self.state;
        if keys::wait_for_any_press(&self.keys, ticker, || state.alarm_pending()) {
            self.await_release(ticker, None);
            info!("waking up");
            self.enter(Mode::Clock);
        }
    }

    fn move_cursor(&mut self, index: u8, items: u8, button: Button) {
        let step = match button {
            Button::Left => Step::Down,
            _ => Step::Up,
        };
        let next = wrap_step(index as u16, 0, (items - 1) as u16, step);
        self.state.set_menu_index(next as u8);
    }

    fn on_menu(&mut self, _: Mode, button: Button) {
        let index = self.state.menu_index();
        match button {
            Button::Left | Button::Right => self.move_cursor(index, MENU_ITEMS, button),
            Button::Select => {
                self.state.set_menu_index(0);
                match index {
                    MENU_CLOCK => self.enter(Mode::Clock),
                    MENU_SET_CLOCK => {
                        match self.rtc.now() {
                            Ok(now) => self.state.set_date_edit(&now),
                            Err(e) => warn!("editing stale date, rtc: {}", e),
                        }
                        self.enter(Mode::SetClockYear);
                    }
                    MENU_ALARM => self.enter(Mode::AlarmMenu),
                    _ => (),
                }
            }
            Button::Back => (),
        }
    }

    fn on_clock(&mut self, _: Mode, button: Button) {
        if button == Button::Back {
            self.idle_ticks = 0;
            self.enter(Mode::Menu);
        }
    }

    fn on_alarm_menu(&mut self, _: Mode, button: Button) {
        let index = self.state.menu_index();
        match button {
            Button::Left | Button::Right => self.move_cursor(index, ALARM_MENU_ITEMS, button),
            Button::Select => {
                self.state.set_menu_index(0);
                if index == ALARM_MENU_TOGGLE {
                    self.alarm.toggle(&mut self.rtc);
                    self.enter(Mode::DisableAlarm);
                } else {
                    self.state.set_alarm_edit(self.state.alarm());
                    self.enter(Mode::SetAlarmHour);
                }
            }
            Button::Back => {
                self.state.set_menu_index(0);
                self.enter(Mode::Menu);
            }
        }
    }

    fn on_clock_edit(&mut self, mode: Mode, button: Button) {
        let field = match mode.clock_field() {
            Some(field) => field,
            None => return,
        };
        let mut staged = self.state.date_edit();
        match button {
            Button::Left => staged.step(field, Step::Down),
            Button::Right => staged.step(field, Step::Up),
            Button::Select => match mode.next_field() {
                Some(next) => return self.enter_clock_field(next),
                None => return self.commit_clock(),
            },
            Button::Back => return self.enter_clock_field(mode.previous_field()),
        }
        self.state.set_date_edit(&staged);
        debug!("staged {}", staged);
    }

    /// Moving onto the month or the day pulls an overshooting day back into the month.
    fn enter_clock_field(&mut self, mode: Mode) {
        if matches!(mode, Mode::SetClockMonth | Mode::SetClockDay) {
            let mut staged = self.state.date_edit();
            staged.clamp_day();
            self.state.set_date_edit(&staged);
        }
        self.enter(mode);
    }

    fn commit_clock(&mut self) {
        let staged = self.state.date_edit();
        let ok = match self.rtc.set_datetime(&staged) {
            Ok(()) => {
                info!("clock set to {}", staged);
                true
            }
            Err(e) => {
                warn!("clock rejected {}: {}", staged, e);
                false
            }
        };
        self.state.set_datetime_set(ok);
        self.enter(Mode::SetClockFinal);
    }

    fn on_alarm_edit(&mut self, mode: Mode, button: Button) {
        let field = match mode.alarm_field() {
            Some(field) => field,
            None => return,
        };
        let mut staged = self.state.alarm_edit();
        match button {
            Button::Left => staged.step(field, Step::Down),
            Button::Right => staged.step(field, Step::Up),
            Button::Select => {
                match mode.next_field() {
                    Some(next) => self.enter(next),
                    None => {
                        self.alarm.arm(&mut self.rtc, staged);
                        self.enter(Mode::SetAlarmFinal);
                    }
                }
                return;
            }
            Button::Back => return self.enter(mode.previous_field()),
        }
        self.state.set_alarm_edit(staged);
    }

    fn on_confirmation(&mut self, _: Mode, button: Button) {
        if button == Button::Select {
            self.enter(Mode::Clock);
        }
    }
}
