/*
 * kind.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Calendar reckonings and conversion between them.
//!
//! Every date handled by this crate is stored as a [`NaiveDate`], which is
//! always proleptic Gregorian ("civil"). A [`CalendarKind`] decides how a
//! `(year, month, day)` label maps onto a civil date. For the Julian
//! reckoning the mapping goes through the Julian Day Number.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};

/// Offset between a Julian Day Number and chrono's days-from-CE count.
const JDN_CE_OFFSET: i32 = 1_721_425;

/// The calendar in which a template's dates are reckoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarKind {
    #[default]
    Gregorian,
    Julian,
}

impl CalendarKind {
    pub const ALL: [CalendarKind; 2] = [CalendarKind::Gregorian, CalendarKind::Julian];

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            CalendarKind::Gregorian => "gregorian",
            CalendarKind::Julian => "julian",
        }
    }

    /// Name as written in template headers.
    pub fn label(self) -> &'static str {
        match self {
            CalendarKind::Gregorian => "Gregorian",
            CalendarKind::Julian => "Julian",
        }
    }

    /// Number of days in `month` of `year` under this reckoning.
    pub fn days_in_month(self, year: i32, month: u32) -> u32 {
        match month {
            4 | 6 | 9 | 11 => 30,
            2 if self.is_leap_year(year) => 29,
            2 => 28,
            _ => 31,
        }
    }

    pub fn is_leap_year(self, year: i32) -> bool {
        match self {
            CalendarKind::Gregorian => {
                year.rem_euclid(4) == 0 && (year.rem_euclid(100) != 0 || year.rem_euclid(400) == 0)
            }
            CalendarKind::Julian => year.rem_euclid(4) == 0,
        }
    }

    /// Maps a date label in this reckoning to its civil date.
    pub fn to_civil(self, year: i32, month: u32, day: u32) -> CalendarResult<NaiveDate> {
        let no_such_date = || CalendarError::NoSuchDate {
            year,
            month,
            day,
            kind: self.as_str(),
        };
        if !(1..=12).contains(&month) {
            return Err(CalendarError::MonthOutOfRange(month));
        }
        if !(1..=31).contains(&day) {
            return Err(CalendarError::DayOutOfRange(day));
        }
        if day > self.days_in_month(year, month) {
            return Err(no_such_date());
        }
        match self {
            CalendarKind::Gregorian => NaiveDate::from_ymd_opt(year, month, day).ok_or_else(no_such_date),
            CalendarKind::Julian => {
                let jdn = julian_to_jdn(year, month, day);
                NaiveDate::from_num_days_from_ce_opt(jdn - JDN_CE_OFFSET).ok_or_else(no_such_date)
            }
        }
    }

    /// Returns the `(year, month, day)` label of a civil date in this reckoning.
    pub fn reckon(self, date: NaiveDate) -> (i32, u32, u32) {
        match self {
            CalendarKind::Gregorian => (date.year(), date.month(), date.day()),
            CalendarKind::Julian => jdn_to_julian(date.num_days_from_ce() + JDN_CE_OFFSET),
        }
    }
}

fn julian_to_jdn(year: i32, month: u32, day: u32) -> i32 {
    let month = month as i32;
    let a = (14 - month) / 12;
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day as i32 + (153 * m + 2) / 5 + 365 * y + y.div_euclid(4) - 32083
}

fn jdn_to_julian(jdn: i32) -> (i32, u32, u32) {
    let c = jdn + 32082;
    let d = (4 * c + 3).div_euclid(1461);
    let e = c - (1461 * d).div_euclid(4);
    let m = (5 * e + 2) / 153;
    let day = e - (153 * m + 2) / 5 + 1;
    let month = m + 3 - 12 * (m / 10);
    let year = d - 4800 + m / 10;
    (year, month as u32, day as u32)
}

impl fmt::Display for CalendarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CalendarKind {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CalendarKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CalendarError::UnknownCalendar(s.to_string()))
    }
}
