//! Calendar tables and the Gregorian month-length rule.

pub const JAN: u8 = 1;
pub const FEB: u8 = 2;
pub const MAR: u8 = 3;
pub const APR: u8 = 4;
pub const MAY: u8 = 5;
pub const JUN: u8 = 6;
pub const JUL: u8 = 7;
pub const AUG: u8 = 8;
pub const SEP: u8 = 9;
pub const OCT: u8 = 10;
pub const NOV: u8 = 11;
pub const DEC: u8 = 12;

pub const MAX_YEAR: u16 = 4095;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Number of days in `month` of `year`, for `year` in `0..=4095` and `month` in `1..=12`.
///
/// February follows the century rule in this exact order: divisible by 400 is leap,
/// otherwise divisible by 100 is not, otherwise divisible by 4 is.
pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        JAN | MAR | MAY | JUL | AUG | OCT | DEC => 31,
        APR | JUN | SEP | NOV => 30,
        _ if year % 400 == 0 => 29,
        _ if year % 100 == 0 => 28,
        _ if year % 4 == 0 => 29,
        _ => 28,
    }
}

/// Three letter abbreviation, `"???"` outside `1..=12`.
pub fn month_name(month: u8) -> &'static str {
    match month {
        JAN..=DEC => MONTHS[(month - 1) as usize],
        _ => "???",
    }
}

/// Weekday name where 0 is Sunday.
pub fn weekday_name(weekday: u8) -> &'static str {
    WEEKDAYS.get(weekday as usize).copied().unwrap_or("???")
}
