//! Persian (Jalali) calendar arithmetic.
//!
//! Renewal dates are configured as Jalali `YYYY/MM/DD` strings and all
//! human-facing timestamps are Tehran wall-clock time in the Jalali
//! calendar. Conversions go through Julian day numbers using the
//! breaks-table algorithm shared by jdatetime and moment-jalaali, which
//! classifies leap years correctly where the 33-year cycle approximation
//! does not (1403 is a leap year, 1404 is not).

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use chrono_tz::Asia::Tehran;
use thiserror::Error;

/// Date error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("malformed date {0:?}: expected Jalali YYYY/MM/DD")]
    Format(String),
    #[error("date {0:?} is outside the supported Jalali range")]
    OutOfRange(String),
}

/// Year numbers at which the leap-year pattern changes.
const BREAKS: [i64; 20] = [
    -61, 9, 38, 199, 426, 686, 756, 818, 1111, 1181, 1210, 1635, 2060, 2097, 2192, 2262, 2324,
    2394, 2456, 3178,
];

/// A date in the Jalali calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JalaliDate {
    pub year: i64,
    pub month: u8,
    pub day: u8,
}

impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

impl JalaliDate {
    /// Parse a `YYYY/MM/DD` Jalali date string, validating month and day
    /// ranges (including the 30-day Esfand of leap years).
    pub fn parse(s: &str) -> Result<Self, DateError> {
        let malformed = || DateError::Format(s.to_string());

        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 3 {
            return Err(malformed());
        }
        let year: i64 = parts[0].trim().parse().map_err(|_| malformed())?;
        let month: u8 = parts[1].trim().parse().map_err(|_| malformed())?;
        let day: u8 = parts[2].trim().parse().map_err(|_| malformed())?;

        if month < 1 || month > 12 || day < 1 || day > month_length(year, month)? {
            return Err(malformed());
        }

        Ok(Self { year, month, day })
    }

    /// Convert a Gregorian civil date to its Jalali equivalent.
    pub fn from_gregorian(date: NaiveDate) -> Result<Self, DateError> {
        let jdn = gregorian_to_jdn(date);
        let gy = i64::from(date.year());
        let mut jy = gy - 621;
        let cal = jal_cal(jy)?;

        let new_year_jdn = gregorian_jdn(gy, 3, cal.march);
        let mut k = jdn - new_year_jdn;
        if k >= 0 {
            if k <= 185 {
                return Ok(Self {
                    year: jy,
                    month: (1 + k / 31) as u8,
                    day: (k % 31 + 1) as u8,
                });
            }
            k -= 186;
        } else {
            jy -= 1;
            k += 179;
            if cal.leap == 1 {
                k += 1;
            }
        }
        Ok(Self {
            year: jy,
            month: (7 + k / 30) as u8,
            day: (k % 30 + 1) as u8,
        })
    }

    /// Julian day number of this date.
    pub fn to_jdn(self) -> Result<i64, DateError> {
        let cal = jal_cal(self.year)?;
        let jm = i64::from(self.month);
        Ok(gregorian_jdn(cal.gy, 3, cal.march) + (jm - 1) * 31 - jm / 7 * (jm - 7)
            + i64::from(self.day)
            - 1)
    }
}

/// Whether the given Jalali year has a 366th day.
pub fn is_leap_year(year: i64) -> Result<bool, DateError> {
    Ok(jal_cal(year)?.leap == 0)
}

/// Number of days in the given Jalali month.
pub fn month_length(year: i64, month: u8) -> Result<u8, DateError> {
    match month {
        1..=6 => Ok(31),
        7..=11 => Ok(30),
        12 => Ok(if is_leap_year(year)? { 30 } else { 29 }),
        _ => Err(DateError::OutOfRange(format!("{year}/{month:02}"))),
    }
}

/// Accepted "no expiry" spellings for a renewal date.
pub fn is_no_expiry(renewal: &str) -> bool {
    let t = renewal.trim();
    t.eq_ignore_ascii_case("unlimited") || t == "نامحدود"
}

/// Signed days from `today` (a Gregorian civil date) until a Jalali
/// renewal date. `Ok(None)` means the service never expires; negative
/// values mean the renewal date has passed. Malformed dates are an error,
/// never silently zero.
pub fn days_remaining(renewal: &str, today: NaiveDate) -> Result<Option<i64>, DateError> {
    if is_no_expiry(renewal) {
        return Ok(None);
    }
    let renewal = JalaliDate::parse(renewal)?;
    Ok(Some(renewal.to_jdn()? - gregorian_to_jdn(today)))
}

/// The current Gregorian civil date in Tehran.
pub fn tehran_today(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Tehran).date_naive()
}

/// Tehran wall-clock timestamp as a Jalali `YYYY/MM/DD HH:MM` label.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    let local = now.with_timezone(&Tehran);
    match JalaliDate::from_gregorian(local.date_naive()) {
        Ok(date) => format!("{} {:02}:{:02}", date, local.hour(), local.minute()),
        // Gregorian fallback for dates outside the breaks table.
        Err(_) => local.format("%Y/%m/%d %H:%M").to_string(),
    }
}

/// Tehran-local Jalali date key, `YYYY/MM/DD`.
pub fn day_key(now: DateTime<Utc>) -> String {
    let local = now.with_timezone(&Tehran);
    match JalaliDate::from_gregorian(local.date_naive()) {
        Ok(date) => date.to_string(),
        Err(_) => local.format("%Y/%m/%d").to_string(),
    }
}

struct JalCal {
    /// Years since the last leap year; 0 for a leap year itself.
    leap: i64,
    gy: i64,
    /// Gregorian March day of the year's Nowruz.
    march: i64,
}

fn jal_cal(jy: i64) -> Result<JalCal, DateError> {
    if jy < BREAKS[0] || jy >= BREAKS[BREAKS.len() - 1] {
        return Err(DateError::OutOfRange(jy.to_string()));
    }

    let gy = jy + 621;
    let mut leap_j = -14i64;
    let mut jp = BREAKS[0];
    let mut jump = 0i64;
    for &b in &BREAKS[1..] {
        jump = b - jp;
        if jy < b {
            break;
        }
        leap_j += jump / 33 * 8 + jump % 33 / 4;
        jp = b;
    }
    let mut n = jy - jp;

    leap_j += n / 33 * 8 + (n % 33 + 3) / 4;
    if jump % 33 == 4 && jump - n == 4 {
        leap_j += 1;
    }

    let leap_g = gy / 4 - (gy / 100 + 1) * 3 / 4 - 150;
    let march = 20 + leap_j - leap_g;

    if jump - n < 6 {
        n = n - jump + (jump + 4) / 33 * 33;
    }
    let mut leap = ((n + 1) % 33 - 1) % 4;
    if leap == -1 {
        leap = 4;
    }

    Ok(JalCal { leap, gy, march })
}

/// Julian day number of a Gregorian date given as raw fields.
fn gregorian_jdn(gy: i64, gm: i64, gd: i64) -> i64 {
    let mut d = (gy + (gm - 8) / 6 + 100100) * 1461 / 4 + (153 * ((gm + 9) % 12) + 2) / 5 + gd
        - 34840408;
    d -= (gy + 100100 + (gm - 8) / 6) / 100 * 3 / 4;
    d + 752
}

fn gregorian_to_jdn(date: NaiveDate) -> i64 {
    gregorian_jdn(
        i64::from(date.year()),
        i64::from(date.month()),
        i64::from(date.day()),
    )
}
