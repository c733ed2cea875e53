//! Alarm clock firmware for the Raspberry Pi Pico.
//!
//! Core 0 brings the board up and then only draws. Core 1 reads the buttons, walks the
//! menus and rings the alarm; the RTC match interrupt is routed to it.
#![no_std]
#![no_main]

use core::cell::RefCell;

use critical_section::Mutex;
use defmt_rtt as _;
use panic_probe as _;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::digital::v2::OutputPin;
use rp_pico::entry;
use rp_pico::hal::{
    self,
    clocks::init_clocks_and_plls,
    fugit::RateExtU32,
    gpio::{FunctionI2C, Pin, PullUp},
    multicore::{Multicore, Stack},
    pac::{self, interrupt},
    rtc::{self, DateTimeFilter, DayOfWeek, RealTimeClock},
    Clock, Sio, Timer, Watchdog,
};
use ssd1306::{prelude::*, I2CDisplayInterface, Ssd1306};
use time::macros::datetime;

use pico_alarm_clock::{
    alarm::Alarm,
    controller::Controller,
    datetime::{AlarmTime, DateTime},
    keys::Keypad,
    render::Renderer,
    rtc::{Rtc, RtcError},
    shared::SharedState,
    ticker::Ticker,
};

const I2C_FREQ_KHZ: u32 = 400;
const CORE1_STACK_WORDS: usize = 4096;

static SHARED: SharedState = SharedState::new();

static RTC: Mutex<RefCell<Option<RealTimeClock>>> = Mutex::new(RefCell::new(None));

static mut CORE1_STACK: Stack<CORE1_STACK_WORDS> = Stack::new();

/// Handle to the RTC both cores hold. Every call is one short critical section.
#[derive(Clone, Copy)]
struct SharedRtc;

impl SharedRtc {
    fn with<T>(f: impl FnOnce(&mut RealTimeClock) -> T) -> Option<T> {
        critical_section::with(|cs| RTC.borrow_ref_mut(cs).as_mut().map(f))
    }
}

fn from_hal(dt: &rtc::DateTime) -> DateTime {
    DateTime::new(
        dt.year,
        dt.month,
        dt.day,
        dt.day_of_week as u8,
        dt.hour,
        dt.minute,
        dt.second,
    )
}

fn to_hal(dt: &DateTime) -> Option<rtc::DateTime> {
    let day_of_week = match dt.weekday {
        0 => DayOfWeek::Sunday,
        1 => DayOfWeek::Monday,
        2 => DayOfWeek::Tuesday,
        3 => DayOfWeek::Wednesday,
        4 => DayOfWeek::Thursday,
        5 => DayOfWeek::Friday,
        6 => DayOfWeek::Saturday,
        _ => return None,
    };
    Some(rtc::DateTime {
        year: dt.year,
        month: dt.month,
        day: dt.day,
        day_of_week,
        hour: dt.hour,
        minute: dt.minute,
        second: dt.second,
    })
}

impl Rtc for SharedRtc {
    fn now(&mut self) -> Result<DateTime, RtcError> {
        match Self::with(|rtc| rtc.now()) {
            Some(Ok(now)) => Ok(from_hal(&now)),
            Some(Err(rtc::RtcError::InvalidDateTime(_))) => Err(RtcError::InvalidDateTime),
            Some(Err(_)) | None => Err(RtcError::NotRunning),
        }
    }

    fn set_datetime(&mut self, dt: &DateTime) -> Result<(), RtcError> {
        if !dt.is_valid() {
            return Err(RtcError::InvalidDateTime);
        }
        let dt = to_hal(dt).ok_or(RtcError::InvalidDateTime)?;
        Self::with(|rtc| rtc.set_datetime(dt))
            .ok_or(RtcError::NotRunning)?
            .map_err(|_| RtcError::InvalidDateTime)
    }

    fn arm_alarm(&mut self, at: AlarmTime) {
        Self::with(|rtc| {
            rtc.schedule_alarm(
                DateTimeFilter::default()
                    .hour(at.hour)
                    .minute(at.minute)
                    .second(at.second),
            );
            rtc.enable_interrupt();
        });
    }

    fn disarm_alarm(&mut self) {
        Self::with(|rtc| {
            rtc.disable_interrupt();
            rtc.disable_alarm();
        });
    }
}

/// The 1 MHz system timer. Copies read the same counter, so each core gets its own.
struct HwTicker(Timer);

impl DelayMs<u32> for HwTicker {
    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms);
    }
}

impl DelayUs<u32> for HwTicker {
    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us);
    }
}

impl Ticker for HwTicker {
    fn now_us(&self) -> u64 {
        self.0.get_counter().ticks()
    }
}

#[entry]
fn main() -> ! {
    defmt::info!("init");

    let mut pac = pac::Peripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let clocks = init_clocks_and_plls(
        rp_pico::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let mut sio = Sio::new(pac.SIO);
    let pins = rp_pico::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );
    let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    let sda: Pin<_, FunctionI2C, PullUp> = pins.gpio18.reconfigure();
    let scl: Pin<_, FunctionI2C, PullUp> = pins.gpio19.reconfigure();
    let i2c = hal::I2C::i2c1(
        pac.I2C1,
        sda,
        scl,
        I2C_FREQ_KHZ.kHz(),
        &mut pac.RESETS,
        clocks.system_clock.freq(),
    );
    let mut display = Ssd1306::new(
        I2CDisplayInterface::new(i2c),
        DisplaySize128x64,
        DisplayRotation::Rotate0,
    )
    .into_buffered_graphics_mode();
    display.init().unwrap();
    display.clear();
    display.flush().unwrap();

    let boot = DateTime::from(datetime!(2022-07-01 0:00));
    let rtc = RealTimeClock::new(
        pac.RTC,
        clocks.rtc_clock,
        &mut pac.RESETS,
        to_hal(&boot).unwrap(),
    )
    .unwrap();
    critical_section::with(|cs| *RTC.borrow_ref_mut(cs) = Some(rtc));

    let keypad = Keypad::new(
        pins.gpio28.into_pull_down_input(),
        pins.gpio22.into_pull_down_input(),
        pins.gpio7.into_pull_down_input(),
        pins.gpio11.into_pull_down_input(),
    );
    let buzzer = pins.gpio13.into_push_pull_output();
    let alarm_led = pins.gpio12.into_push_pull_output();
    let mut power_led = pins.led.into_push_pull_output();

    let mut mc = Multicore::new(&mut pac.PSM, &mut pac.PPB, &mut sio.fifo);
    let cores = mc.cores();
    let core1 = &mut cores[1];
    // Safety: the stack is handed out exactly once, here.
    let stack = unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK.mem) };
    core1
        .spawn(stack, move || {
            power_led.set_high().ok();
            // Safety: the handler only touches the RTC through its mutex and SHARED.
            unsafe { cortex_m::peripheral::NVIC::unmask(pac::Interrupt::RTC_IRQ) };

            let alarm = Alarm::new(&SHARED, buzzer, alarm_led);
            let mut controller = Controller::new(&SHARED, SharedRtc, keypad, alarm);
            controller.run(&mut HwTicker(timer))
        })
        .unwrap();

    defmt::info!("core 1 up, entering render loop");
    let mut renderer = Renderer::new(&SHARED, display, SharedRtc);
    renderer.run(&mut HwTicker(timer))
}

#[interrupt]
fn RTC_IRQ() {
    SharedRtc::with(|rtc| rtc.clear_interrupt());
    SHARED.raise_alarm();
}
