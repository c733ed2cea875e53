use embedded_hal::blocking::delay::{DelayMs, DelayUs};

/// Busy-wait delays plus a free running microsecond counter.
///
/// Every wait in the firmware spins on one of these; nothing sleeps, so the RTC
/// interrupt can always get in.
pub trait Ticker: DelayMs<u32> + DelayUs<u32> {
    fn now_us(&self) -> u64;
}

