//! Host-side doubles for the hardware seams.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::digital::v2::{InputPin, OutputPin};
use time::{Date, Duration, Month, PrimitiveDateTime, Time};

use crate::datetime::{AlarmTime, DateTime};
use crate::keys::{Button, Buttons};
use crate::render::Screen;
use crate::rtc::{Rtc, RtcError};
use crate::ticker::Ticker;

/// Simulated microsecond clock that only moves when something delays on it.
#[derive(Clone, Default)]
pub struct SimTicker {
    now: Rc<Cell<u64>>,
}

impl SimTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> Rc<Cell<u64>> {
        self.now.clone()
    }

    pub fn advance_us(&self, us: u64) {
        self.now.set(self.now.get() + us);
    }
}

impl DelayUs<u32> for SimTicker {
    fn delay_us(&mut self, us: u32) {
        self.advance_us(us as u64);
    }
}

impl DelayMs<u32> for SimTicker {
    fn delay_ms(&mut self, ms: u32) {
        self.advance_us(ms as u64 * 1_000);
    }
}

impl Ticker for SimTicker {
    fn now_us(&self) -> u64 {
        self.now.get()
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Step {
    /// Every read returns released, for this many reads.
    Idle(u32),
    /// Reads of the button return pressed, for this many reads of it. Reads of other
    /// buttons return released and do not consume the step.
    Hold(Button, u32),
}

/// Button levels driven by a script of read counts.
pub struct ScriptedButtons {
    script: RefCell<VecDeque<Step>>,
}

impl ScriptedButtons {
    pub fn new<I: IntoIterator<Item = Step>>(steps: I) -> Self {
        Self {
            script: RefCell::new(steps.into_iter().collect()),
        }
    }

    pub fn push(&self, step: Step) {
        self.script.borrow_mut().push_back(step);
    }

    pub fn is_drained(&self) -> bool {
        self.script.borrow().is_empty()
    }
}

impl Buttons for ScriptedButtons {
    fn is_pressed(&self, button: Button) -> bool {
        let mut script = self.script.borrow_mut();
        let (pressed, remaining) = match script.front_mut() {
            None => return false,
            Some(Step::Idle(n)) => {
                *n = n.saturating_sub(1);
                (false, *n)
            }
            Some(Step::Hold(held, n)) if *held == button => {
                *n = n.saturating_sub(1);
                (true, *n)
            }
            Some(Step::Hold(..)) => return false,
        };
        if remaining == 0 {
            script.pop_front();
        }
        pressed
    }
}

/// Input line with a level the test sets.
#[derive(Clone)]
pub struct FakeInput {
    level: Rc<Cell<bool>>,
}

impl FakeInput {
    pub fn new(level: bool) -> Self {
        Self {
            level: Rc::new(Cell::new(level)),
        }
    }

    pub fn set(&self, level: bool) {
        self.level.set(level);
    }
}

impl InputPin for FakeInput {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.level.get())
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(!self.level.get())
    }
}

/// Output line that remembers its level and counts rising edges.
#[derive(Clone, Default)]
pub struct RecordingPin {
    level: Rc<Cell<bool>>,
    rises: Rc<Cell<u32>>,
}

impl RecordingPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.level.get()
    }

    pub fn rises(&self) -> u32 {
        self.rises.get()
    }
}

impl OutputPin for RecordingPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.level.get() {
            self.rises.set(self.rises.get() + 1);
        }
        self.level.set(true);
        Ok(())
    }
}

fn to_primitive(dt: &DateTime) -> Option<PrimitiveDateTime> {
    let month = Month::try_from(dt.month).ok()?;
    let date = Date::from_calendar_date(dt.year as i32, month, dt.day).ok()?;
    let time = Time::from_hms(dt.hour, dt.minute, dt.second).ok()?;
    Some(PrimitiveDateTime::new(date, time))
}

pub struct RtcModel {
    pub running: bool,
    pub reject_writes: bool,
    pub base: PrimitiveDateTime,
    pub base_us: u64,
    pub written: Vec<DateTime>,
    pub armed: Option<AlarmTime>,
    pub arm_count: u32,
}

/// RTC that advances with a [`SimTicker`] clock.
#[derive(Clone)]
pub struct MockRtc {
    clock: Rc<Cell<u64>>,
    model: Rc<RefCell<RtcModel>>,
}

impl MockRtc {
    pub fn new(ticker: &SimTicker, start: PrimitiveDateTime) -> Self {
        let clock = ticker.clock();
        let base_us = clock.get();
        Self {
            clock,
            model: Rc::new(RefCell::new(RtcModel {
                running: true,
                reject_writes: false,
                base: start,
                base_us,
                written: Vec::new(),
                armed: None,
                arm_count: 0,
            })),
        }
    }

    pub fn model(&self) -> std::cell::RefMut<'_, RtcModel> {
        self.model.borrow_mut()
    }

    /// Current time, or `None` when stopped.
    pub fn peek(&self) -> Option<DateTime> {
        let model = self.model.borrow();
        if !model.running {
            return None;
        }
        let elapsed = self.clock.get().saturating_sub(model.base_us);
        Some(DateTime::from(
            model.base + Duration::microseconds(elapsed as i64),
        ))
    }
}

impl Rtc for MockRtc {
    fn now(&mut self) -> Result<DateTime, RtcError> {
        self.peek().ok_or(RtcError::NotRunning)
    }

    fn set_datetime(&mut self, dt: &DateTime) -> Result<(), RtcError> {
        let mut model = self.model.borrow_mut();
        if model.reject_writes || !dt.is_valid() {
            return Err(RtcError::InvalidDateTime);
        }
        let base = to_primitive(dt).ok_or(RtcError::InvalidDateTime)?;
        model.base = base;
        model.base_us = self.clock.get();
        model.running = true;
        model.written.push(*dt);
        Ok(())
    }

    fn arm_alarm(&mut self, at: AlarmTime) {
        let mut model = self.model.borrow_mut();
        model.armed = Some(at);
        model.arm_count += 1;
    }

    fn disarm_alarm(&mut self) {
        self.model.borrow_mut().armed = None;
    }
}

pub type Drawing = Vec<(i32, i32, String)>;

/// Screen that keeps every flushed frame.
#[derive(Default)]
pub struct RecordingScreen {
    current: Drawing,
    pub frames: Vec<Drawing>,
}

impl RecordingScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> &[(i32, i32, String)] {
        self.frames.last().map(|f| f.as_slice()).unwrap_or(&[])
    }

    pub fn last_texts(&self) -> Vec<&str> {
        self.last().iter().map(|(_, _, s)| s.as_str()).collect()
    }
}

impl Screen for RecordingScreen {
    fn clear(&mut self) {
        self.current.clear();
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        self.current.push((x, y, text.to_string()));
    }

    fn flush(&mut self) {
        self.frames.push(self.current.clone());
    }
}
