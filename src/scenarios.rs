//! End-to-end walks through the controller and the renderer sharing one state.

use time::macros::datetime;

use crate::alarm::{Alarm, MAX_ALARM_TIME_SEC};
use crate::controller::{Controller, SLEEP_TICKS};
use crate::datetime::{AlarmTime, DateTime};
use crate::keys::Button::{self, Back, Left, Right, Select};
use crate::mode::Mode;
use crate::render::Renderer;
use crate::shared::SharedState;
use crate::testing::{MockRtc, RecordingPin, RecordingScreen, ScriptedButtons, SimTicker, Step};
use crate::ticker::Ticker;

type Device<'a> = Controller<'a, MockRtc, &'a ScriptedButtons, RecordingPin, RecordingPin>;
type Display<'a> = Renderer<'a, RecordingScreen, MockRtc>;

struct Bench {
    ticker: SimTicker,
    rtc: MockRtc,
    keys: ScriptedButtons,
    led: RecordingPin,
}

impl Bench {
    fn new() -> Self {
        let ticker = SimTicker::new();
        let rtc = MockRtc::new(&ticker, datetime!(2022-07-01 7:59:58));
        Self {
            ticker,
            rtc,
            keys: ScriptedButtons::new([]),
            led: RecordingPin::new(),
        }
    }

    fn device<'a>(&'a self, state: &'a SharedState) -> Device<'a> {
        let alarm = Alarm::new(state, RecordingPin::new(), self.led.clone());
        Controller::new(state, self.rtc.clone(), &self.keys, alarm)
    }

    fn display<'a>(&'a self, state: &'a SharedState) -> Display<'a> {
        Renderer::new(state, RecordingScreen::new(), self.rtc.clone())
    }

    fn press(&self, device: &mut Device<'_>, button: Button) {
        self.keys.push(Step::Hold(button, 1));
        device.poll(&mut self.ticker.clone());
    }

    fn presses(&self, device: &mut Device<'_>, buttons: &[Button]) {
        for b in buttons {
            self.press(device, *b);
        }
    }

    fn frame(&self, display: &mut Display<'_>) -> Vec<String> {
        display.render(&mut self.ticker.clone());
        display
            .screen()
            .last_texts()
            .into_iter()
            .map(String::from)
            .collect()
    }
}

/// Button sequences from a fresh boot to every mode.
const PATHS: [(Mode, &[Button]); 16] = [
    (Mode::Menu, &[]),
    (Mode::Clock, &[Select]),
    (Mode::SetClockYear, &[Right, Select]),
    (Mode::SetClockMonth, &[Right, Select, Select]),
    (Mode::SetClockDay, &[Right, Select, Select, Select]),
    (Mode::SetClockWeekday, &[Right, Select, Select, Select, Select]),
    (Mode::SetClockHour, &[Right, Select, Select, Select, Select, Select]),
    (Mode::SetClockMin, &[Right, Select, Select, Select, Select, Select, Select]),
    (
        Mode::SetClockSec,
        &[Right, Select, Select, Select, Select, Select, Select, Select],
    ),
    (
        Mode::SetClockFinal,
        &[Right, Select, Select, Select, Select, Select, Select, Select, Select],
    ),
    (Mode::AlarmMenu, &[Left, Select]),
    (Mode::DisableAlarm, &[Left, Select, Select]),
    (Mode::SetAlarmHour, &[Left, Select, Right, Select]),
    (Mode::SetAlarmMin, &[Left, Select, Right, Select, Select]),
    (Mode::SetAlarmSec, &[Left, Select, Right, Select, Select, Select]),
    (
        Mode::SetAlarmFinal,
        &[Left, Select, Right, Select, Select, Select, Select],
    ),
];

#[test]
fn every_mode_is_reachable_from_menu() {
    let mut reached = Vec::new();
    for (target, path) in PATHS {
        let state = SharedState::new();
        let bench = Bench::new();
        let mut device = bench.device(&state);
        let mut display = bench.display(&state);

        bench.presses(&mut device, path);
        assert_eq!(state.mode(), target, "path {:?}", path);
        assert!(!bench.frame(&mut display).is_empty(), "{:?} drew nothing", target);
        reached.push(target);
    }

    // sleep is reached by waiting in the clock view
    let state = SharedState::new();
    let bench = Bench::new();
    let mut device = bench.device(&state);
    bench.press(&mut device, Select);
    for _ in 0..SLEEP_TICKS {
        device.poll(&mut bench.ticker.clone());
    }
    assert_eq!(state.mode(), Mode::SleepMode);
    reached.push(Mode::SleepMode);

    for mode in Mode::ALL {
        assert!(reached.contains(&mode), "{:?} unreachable", mode);
    }
}

#[test]
fn every_mode_backs_out_to_menu_or_clock() {
    for (start, path) in PATHS {
        let state = SharedState::new();
        let bench = Bench::new();
        let mut device = bench.device(&state);
        bench.presses(&mut device, path);
        assert_eq!(state.mode(), start);

        let mut steps = 0;
        while !matches!(state.mode(), Mode::Menu | Mode::Clock) {
            let button = match state.mode() {
                Mode::SetClockFinal | Mode::SetAlarmFinal | Mode::DisableAlarm => Select,
                _ => Back,
            };
            bench.press(&mut device, button);
            steps += 1;
            assert!(steps <= 8, "{:?} does not terminate", start);
        }
    }
}

#[test]
fn day_is_clamped_when_year_changes_february() {
    let state = SharedState::new();
    let bench = Bench::new();
    let mut device = bench.device(&state);
    let mut display = bench.display(&state);

    state.set_date_edit(&DateTime::new(2024, 2, 30, 0, 0, 0, 0));
    state.set_mode(Mode::SetClockYear);
    bench.presses(&mut device, &[Left, Select]);
    assert_eq!(state.mode(), Mode::SetClockMonth);
    assert_eq!(state.date_edit().year, 2023);
    assert_eq!(state.date_edit().day, 28);

    bench.press(&mut device, Select);
    assert_eq!(bench.frame(&mut display), vec!["DAY", "28"]);
}

#[test]
fn alarm_rings_on_match_and_is_acknowledged() {
    let state = SharedState::new();
    let bench = Bench::new();
    let mut device = bench.device(&state);
    let mut display = bench.display(&state);

    bench.presses(&mut device, &[Left, Select, Select]);
    assert!(state.alarm_enabled());
    assert_eq!(bench.rtc.model().armed, Some(AlarmTime::new(8, 0, 0)));
    bench.press(&mut device, Select);
    assert_eq!(state.mode(), Mode::Clock);

    // the interrupt side: poll until the mock clock reaches the armed time
    let mut ticker = bench.ticker.clone();
    while !bench
        .rtc
        .peek()
        .map_or(false, |now| AlarmTime::new(8, 0, 0).matches(&now))
    {
        device.poll(&mut ticker);
    }
    state.raise_alarm();

    // nothing on the keys yet: the session rings briefly, then select goes down and up
    bench.keys.push(Step::Idle(50));
    bench.keys.push(Step::Hold(Select, 20));
    device.poll(&mut ticker);

    assert!(!state.alarm_fired());
    assert_eq!(bench.led.rises(), 1);
    assert!(!bench.led.is_high());
    assert_eq!(state.mode(), Mode::Clock);
    assert_eq!(bench.rtc.model().armed, Some(AlarmTime::new(8, 0, 0)));
    assert_eq!(bench.rtc.model().arm_count, 2);
    assert_eq!(bench.frame(&mut display)[1], "08:00:01");
}

#[test]
fn unanswered_alarm_times_out() {
    let state = SharedState::new();
    let bench = Bench::new();
    let mut device = bench.device(&state);

    bench.presses(&mut device, &[Left, Select, Select, Select]);
    let started = bench.ticker.now_us();
    state.raise_alarm();
    device.poll(&mut bench.ticker.clone());

    assert!(!state.alarm_fired());
    assert!(!bench.led.is_high());
    assert!(bench.ticker.now_us() - started >= MAX_ALARM_TIME_SEC * 1_000_000);
    assert_eq!(state.mode(), Mode::Clock);
}

#[test]
fn fired_view_replaces_any_mode() {
    let state = SharedState::new();
    let bench = Bench::new();
    let mut display = bench.display(&state);

    for mode in [Mode::Menu, Mode::SetClockWeekday, Mode::SleepMode] {
        state.set_mode(mode);
        state.set_alarm_fired(true);
        state.set_flicker(0);
        assert_eq!(bench.frame(&mut display), vec!["ALARM", "08:00:00"]);
        state.set_alarm_fired(false);
    }
}

#[test]
fn sleep_and_wake() {
    let state = SharedState::new();
    let bench = Bench::new();
    let mut device = bench.device(&state);

    bench.press(&mut device, Select);
    for _ in 0..SLEEP_TICKS {
        device.poll(&mut bench.ticker.clone());
    }
    assert_eq!(state.mode(), Mode::SleepMode);

    bench.press(&mut device, Back);
    assert_eq!(state.mode(), Mode::Clock);
    assert!(bench.keys.is_drained());
}
