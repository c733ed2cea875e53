//! Buttons and the debounce discipline.
//!
//! Every input site does the same thing: sample the level, act once if it is down, then
//! spin until it is released. The outer polling loop adds one [`WAIT_DURATION_MS`] settle
//! delay per iteration to ride out contact bounce before the next sample.

use core::hint::spin_loop;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::InputPin;

/// Settle delay applied once per polling iteration.
pub const WAIT_DURATION_MS: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Decrement / move the cursor up.
    Left,
    /// Increment / move the cursor down.
    Right,
    /// Cancel.
    Back,
    /// Confirm, and acknowledge a ringing alarm.
    Select,
}

impl Button {
    pub const ALL: [Button; 4] = [Button::Select, Button::Back, Button::Left, Button::Right];
}

pub trait Buttons {
    fn is_pressed(&self, button: Button) -> bool;
}

impl<T: Buttons + ?Sized> Buttons for &T {
    fn is_pressed(&self, button: Button) -> bool {
        (**self).is_pressed(button)
    }
}

/// Four active-high button inputs.
pub struct Keypad<L, R, B, S> {
    left: L,
    right: R,
    back: B,
    select: S,
}

impl<L, R, B, S> Keypad<L, R, B, S>
where
    L: InputPin,
    R: InputPin,
    B: InputPin,
    S: InputPin,
{
    pub fn new(left: L, right: R, back: B, select: S) -> Self {
        Self {
            left,
            right,
            back,
            select,
        }
    }
}

impl<L, R, B, S> Buttons for Keypad<L, R, B, S>
where
    L: InputPin,
    R: InputPin,
    B: InputPin,
    S: InputPin,
{
    fn is_pressed(&self, button: Button) -> bool {
        match button {
            Button::Left => self.left.is_high().unwrap_or(false),
            Button::Right => self.right.is_high().unwrap_or(false),
            Button::Back => self.back.is_high().unwrap_or(false),
            Button::Select => self.select.is_high().unwrap_or(false),
        }
    }
}

/// Samples `candidates` in order and returns the first one that is down.
pub fn first_pressed<K: Buttons>(keys: &K, candidates: &[Button]) -> Option<Button> {
    candidates.iter().copied().find(|b| keys.is_pressed(*b))
}

pub fn any_pressed<K: Buttons>(keys: &K) -> bool {
    first_pressed(keys, &Button::ALL).is_some()
}

/// Spins until `button` reads released. Returns `false` as soon as `interrupted` turns
/// true while it is still down.
pub fn wait_until_released<K, F>(keys: &K, button: Button, interrupted: F) -> bool
where
    K: Buttons,
    F: Fn() -> bool,
{
    while keys.is_pressed(button) {
        if interrupted() {
            return false;
        }
        spin_loop();
    }
    true
}

/// Spins until no button reads pressed, with the same early exit as
/// [`wait_until_released`].
pub fn wait_all_released<K, F>(keys: &K, interrupted: F) -> bool
where
    K: Buttons,
    F: Fn() -> bool,
{
    while any_pressed(keys) {
        if interrupted() {
            return false;
        }
        spin_loop();
    }
    true
}

/// Polls every [`WAIT_DURATION_MS`] until some button is down. Returns `false` without
/// waiting for a press if `interrupted` turns true first.
pub fn wait_for_any_press<K, D, F>(keys: &K, delay: &mut D, interrupted: F) -> bool
where
    K: Buttons,
    D: DelayMs<u32>,
    F: Fn() -> bool,
{
    loop {
        if any_pressed(keys) {
            return true;
        }
        if interrupted() {
            return false;
        }
        delay.delay_ms(WAIT_DURATION_MS);
    }
}
