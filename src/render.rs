//! Display side: one full frame per iteration, chosen by the alarm flag and then the mode.

use core::fmt::{Arguments, Write};
use core::hint::spin_loop;

use embedded_graphics::{
    mono_font::MonoTextStyleBuilder,
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use embedded_hal::blocking::delay::DelayMs;
use heapless::String;
use profont::PROFONT_18_POINT;
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, Ssd1306};

use crate::calendar::{month_name, weekday_name};
use crate::mode::Mode;
use crate::rtc::Rtc;
use crate::shared::SharedState;

/// Frames the alarm view stays lit before it blinks off.
pub const FLICKER_FRAMES: u8 = 8;
pub const FLICKER_PAUSE_MS: u32 = 80;

/// Left edge of each weekday name on the clock view, Sunday first.
const WEEKDAY_X: [i32; 7] = [28, 24, 22, 8, 18, 32, 20];

const MENU_LABELS: [&str; 3] = ["CLOCK", "SET CLOCK", "ALARM"];
const ROW_HEIGHT: i32 = 20;

/// Text output the renderer draws through.
pub trait Screen {
    fn clear(&mut self);
    fn draw_text(&mut self, x: i32, y: i32, text: &str);
    fn flush(&mut self);
}

impl<DI, SIZE> Screen for Ssd1306<DI, SIZE, BufferedGraphicsMode<SIZE>>
where
    DI: WriteOnlyDataCommand,
    SIZE: DisplaySize,
{
    fn clear(&mut self) {
        Ssd1306::<DI, SIZE, BufferedGraphicsMode<SIZE>>::clear(self);
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        let text_style = MonoTextStyleBuilder::new()
            .font(&PROFONT_18_POINT)
            .text_color(BinaryColor::On)
            .build();

        Text::with_baseline(text, Point::new(x, y), text_style, Baseline::Top)
            .draw(self)
            .ok();
    }

    fn flush(&mut self) {
        if Ssd1306::<DI, SIZE, BufferedGraphicsMode<SIZE>>::flush(self).is_err() {
            warn!("display flush failed");
        }
    }
}

pub struct Renderer<'a, S, R> {
    state: &'a SharedState,
    screen: S,
    rtc: R,
    buf: String<32>,
}

impl<'a, S, R> Renderer<'a, S, R>
where
    S: Screen,
    R: Rtc,
{
    pub fn new(state: &'a SharedState, screen: S, rtc: R) -> Self {
        Self {
            state,
            screen,
            rtc,
            buf: String::new(),
        }
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn run<D: DelayMs<u32>>(&mut self, delay: &mut D) -> ! {
        info!("render loop started");
        loop {
            self.render(delay);
        }
    }

    /// Draws and flushes one frame.
    ///
    /// Blocks in two places: the blank pause of the alarm flicker, and in sleep mode,
    /// until the mode changes or an alarm fires.
    pub fn render<D: DelayMs<u32>>(&mut self, delay: &mut D) {
        self.screen.clear();

        if self.state.alarm_fired() {
            self.alarm_fired_view(delay);
            return;
        }

        let mode = self.state.mode();
        if mode == Mode::SleepMode {
            self.screen.flush();
            while self.state.mode() == Mode::SleepMode && !self.state.alarm_fired() {
                spin_loop();
            }
            return;
        }

        (Self::view(mode))(self, mode);
        self.screen.flush();
    }

    fn view(mode: Mode) -> fn(&mut Self, Mode) {
        match mode {
            Mode::Menu => Self::menu_view,
            Mode::Clock => Self::clock_view,
            Mode::SetClockYear
            | Mode::SetClockMonth
            | Mode::SetClockDay
            | Mode::SetClockWeekday
            | Mode::SetClockHour
            | Mode::SetClockMin
            | Mode::SetClockSec => Self::clock_field_view,
            Mode::SetClockFinal => Self::clock_set_view,
            Mode::AlarmMenu => Self::alarm_menu_view,
            Mode::DisableAlarm => Self::alarm_status_view,
            Mode::SetAlarmHour | Mode::SetAlarmMin | Mode::SetAlarmSec => Self::alarm_field_view,
            Mode::SetAlarmFinal => Self::alarm_set_view,
            Mode::SleepMode => Self::blank_view,
        }
    }

    fn draw(&mut self, x: i32, y: i32, text: &str) {
        self.screen.draw_text(x, y, text);
    }

    fn draw_fmt(&mut self, x: i32, y: i32, args: Arguments<'_>) {
        self.buf.clear();
        // 32 bytes hold every view; overlong text is cut, not fatal
        self.buf.write_fmt(args).ok();
        self.screen.draw_text(x, y, self.buf.as_str());
    }

    fn draw_cursor(&mut self) {
        let index = self.state.menu_index() as i32;
        self.draw(0, ROW_HEIGHT * index, "-");
    }

    fn alarm_fired_view<D: DelayMs<u32>>(&mut self, delay: &mut D) {
        let count = self.state.flicker();
        if count < FLICKER_FRAMES {
            let at = self.state.alarm();
            self.draw(32, 8, "ALARM");
            self.draw_fmt(
                20,
                32,
                format_args!("{:02}:{:02}:{:02}", at.hour, at.minute, at.second),
            );
            self.screen.flush();
            self.state.set_flicker(count + 1);
        } else {
            self.screen.flush();
            delay.delay_ms(FLICKER_PAUSE_MS);
            self.state.set_flicker(0);
        }
    }

    fn blank_view(&mut self, _: Mode) {}

    fn menu_view(&mut self, _: Mode) {
        for (row, label) in MENU_LABELS.iter().enumerate() {
            self.draw(8, ROW_HEIGHT * row as i32, label);
        }
        self.draw_cursor();
    }

    fn clock_view(&mut self, _: Mode) {
        match self.rtc.now() {
            Ok(now) => {
                self.draw_fmt(
                    2,
                    0,
                    format_args!("{:02} {} {:04}", now.day, month_name(now.month), now.year),
                );
                self.draw_fmt(
                    16,
                    20,
                    format_args!("{:02}:{:02}:{:02}", now.hour, now.minute, now.second),
                );
                let x = WEEKDAY_X.get(now.weekday as usize).copied().unwrap_or(0);
                self.draw(x, 40, weekday_name(now.weekday));
            }
            Err(_) => {
                self.draw(24, 8, "RTC NOT");
                self.draw(24, 32, "WORKING");
            }
        }
    }

    fn clock_field_view(&mut self, mode: Mode) {
        let staged = self.state.date_edit();
        match mode {
            Mode::SetClockYear => {
                self.draw(8, 8, "YEAR");
                self.draw_fmt(8, 28, format_args!("{:04}", staged.year));
            }
            Mode::SetClockMonth => {
                self.draw(8, 8, "MONTH");
                self.draw(8, 28, month_name(staged.month));
            }
            Mode::SetClockDay => {
                self.draw(8, 8, "DAY");
                self.draw_fmt(8, 28, format_args!("{:02}", staged.day));
            }
            Mode::SetClockWeekday => {
                self.draw(8, 8, "WEEKDAY");
                self.draw(8, 28, weekday_name(staged.weekday));
            }
            Mode::SetClockHour => {
                self.draw(8, 8, "HOUR");
                self.draw_fmt(8, 28, format_args!("{:02}", staged.hour));
            }
            Mode::SetClockMin => {
                self.draw(8, 8, "MIN");
                self.draw_fmt(8, 28, format_args!("{:02}", staged.minute));
            }
            Mode::SetClockSec => {
                self.draw(8, 8, "SEC");
                self.draw_fmt(8, 28, format_args!("{:02}", staged.second));
            }
            _ => (),
        }
    }

    fn clock_set_view(&mut self, _: Mode) {
        if self.state.datetime_set() {
            self.draw(30, 8, "CLOCK");
            self.draw(30, 32, "IS SET");
        } else {
            self.draw(8, 8, "INVALID");
            self.draw(24, 32, "DATE");
        }
    }

    fn alarm_menu_view(&mut self, _: Mode) {
        let toggle = if self.state.alarm_enabled() {
            "DISABLE"
        } else {
            "ENABLE"
        };
        self.draw(8, 0, toggle);
        self.draw(8, ROW_HEIGHT, "SET");
        self.draw_cursor();
    }

    fn alarm_status_view(&mut self, _: Mode) {
        self.draw(12, 8, "ALARM IS");
        if self.state.alarm_enabled() {
            self.draw(14, 32, "ENABLED");
        } else {
            self.draw(12, 32, "DISABLED");
        }
    }

    fn alarm_field_view(&mut self, mode: Mode) {
        let staged = self.state.alarm_edit();
        let (label, value) = match mode {
            Mode::SetAlarmHour => ("ALARM HOUR", staged.hour),
            Mode::SetAlarmMin => ("ALARM MIN", staged.minute),
            _ => ("ALARM SEC", staged.second),
        };
        self.draw(0, 8, label);
        self.draw_fmt(0, 28, format_args!("{:02}", value));
    }

    fn alarm_set_view(&mut self, _: Mode) {
        self.draw(30, 8, "ALARM");
        self.draw(30, 32, "IS SET");
    }
}
