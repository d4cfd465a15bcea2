/*
 * pascha.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The Orthodox Paschalion.

use chrono::{Days, NaiveDate};

use crate::error::CalendarResult;
use crate::kind::CalendarKind;

/// Computes the day of Pascha for `year`.
///
/// Uses Gauss's congruence for the number of days after March 21 on the
/// Julian calendar. For the Gregorian reckoning the result is shifted by the
/// Julian-Gregorian century correction. The returned value is the civil date
/// of Pascha; use [`CalendarKind::reckon`] to obtain its label in `kind`.
///
/// Both reckonings name the same physical day, e.g. 2021 yields May 2
/// (Gregorian) or April 19 (Julian), which is civil 2021-05-02 in each case.
pub fn compute_pascha(year: i32, kind: CalendarKind) -> CalendarResult<NaiveDate> {
    let (month, day) = pascha_month_day(year, kind);
    let march_first = kind.to_civil(year, 3, 1)?;
    // The month/day pair can exceed May 31 for very late centuries; counting
    // from March 1 keeps the arithmetic exact.
    let offset = match month {
        3 => day - 1,
        4 => 31 + day - 1,
        _ => 61 + day - 1,
    };
    Ok(march_first + Days::new(u64::from(offset)))
}

/// Month and day of Pascha as produced by the Gauss formula.
///
/// The Gregorian result always lies between March 22 and May 8 for the
/// supported years.
pub fn pascha_month_day(year: i32, kind: CalendarKind) -> (u32, u32) {
    let r19 = year.rem_euclid(19);
    let r7 = year.rem_euclid(7);
    let r4 = year.rem_euclid(4);
    let n1 = (19 * r19 + 16) % 30;
    let n2 = (2 * r4 + 4 * r7 + 6 * n1) % 7;
    let mut n3 = n1 + n2;
    if kind == CalendarKind::Gregorian {
        let century = year / 100;
        n3 += century - century / 4 - 2;
    }
    if n3 > 40 {
        (5, (n3 - 40) as u32)
    } else if n3 > 10 {
        (4, (n3 - 10) as u32)
    } else {
        (3, (n3 + 21) as u32)
    }
}
