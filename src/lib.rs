//! Dual-core alarm clock for the Raspberry Pi Pico.
//!
//! Core 1 runs the [`controller`]: it polls four buttons, walks the menu state machine and
//! owns the [`alarm`] engine. Core 0 runs the [`render`] loop. The two only talk through
//! [`shared::SharedState`]; the RTC is the one peripheral both of them touch.
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod alarm;
pub mod calendar;
pub mod controller;
pub mod datetime;
pub mod keys;
pub mod mode;
pub mod render;
pub mod rtc;
pub mod shared;
pub mod ticker;

#[cfg(test)]
mod scenarios;
#[cfg(test)]
mod testing;
