/*
 * ldp.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Liturgical day properties.
//!
//! A [`LiturgicalDay`] is a snapshot of everything the services of a given
//! day depend on: the movable cycle anchored on Pascha, the eight-mode
//! cycle, the eleven Resurrection Gospels, and the Lukan cycle of Gospel
//! readings anchored on the Elevation of the Cross.
//!
//! The snapshot is computed wholesale from a date and never mutated in
//! place. The only adjustment is [`LiturgicalDay::with_day_of_season`],
//! which yields a new value.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult, MAX_YEAR, MIN_YEAR};
use crate::kind::CalendarKind;
use crate::pascha::compute_pascha;

const TRIODION_BEFORE_PASCHA: u64 = 70;
const PALM_SUNDAY_BEFORE_PASCHA: u64 = 7;
const LAZARUS_SATURDAY_BEFORE_PASCHA: u64 = 8;
const GREAT_LENT_BEFORE_PASCHA: u64 = 48;
const THOMAS_SUNDAY_AFTER_PASCHA: u64 = 7;
const PENTECOST_AFTER_PASCHA: u64 = 49;
const ALL_SAINTS_AFTER_PASCHA: u64 = 56;

/// Day of season on which Pascha falls (the Triodion spans 70 days).
pub const PASCHA_DAY_OF_SEASON: i64 = 71;

/// Modes for Pascha through Bright Saturday. The Grave mode (7) is skipped.
const BRIGHT_WEEK_MODES: [u8; 7] = [1, 2, 3, 4, 5, 6, 8];

/// Years searched for the next occurrence of a month and day.
const MONTH_DAY_SEARCH_YEARS: i32 = 8;

/// Validates a date label before any liturgical computation.
pub fn validate_ymd(year: i32, month: u32, day: u32, kind: CalendarKind) -> CalendarResult<NaiveDate> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(CalendarError::YearOutOfRange(year));
    }
    kind.to_civil(year, month, day)
}

/// Computed properties of one liturgical day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiturgicalDay {
    pub kind: CalendarKind,
    /// The civil (proleptic Gregorian) date.
    pub date: NaiveDate,
    /// Year as reckoned in `kind`.
    pub year: i32,
    /// Month as reckoned in `kind`.
    pub month: u32,
    /// Day of month as reckoned in `kind`.
    pub day: u32,
    pub weekday: Weekday,

    pub pascha_last_year: NaiveDate,
    pub pascha_this_year: NaiveDate,
    /// Most recent Pascha on or before the date.
    pub pascha_last: NaiveDate,
    /// First Pascha strictly after the date.
    pub pascha_next: NaiveDate,

    pub triodion_start_last_year: NaiveDate,
    pub triodion_start_this_year: NaiveDate,
    pub triodion_start_next_year: NaiveDate,
    /// Most recent Triodion start on or before the date.
    pub triodion_start_last: NaiveDate,

    pub palm_sunday: NaiveDate,
    pub pentecost: NaiveDate,
    pub all_saints_last_year: NaiveDate,
    pub all_saints_this_year: NaiveDate,
    /// Clean Monday.
    pub great_lent_start: NaiveDate,
    /// Sunday after the most recent Pascha; the eight-mode cycle starts here.
    pub thomas_sunday: NaiveDate,
    pub palm_sunday_next: NaiveDate,
    pub lazarus_saturday_next: NaiveDate,

    pub elevation_of_cross_last: NaiveDate,
    pub sunday_after_elevation_of_cross_last: NaiveDate,
    pub start_of_lukan_cycle_last: NaiveDate,

    pub is_pascha: bool,
    pub is_triodion: bool,
    pub is_pentecostarion: bool,

    /// 1-based day counted from this year's Triodion start while the
    /// Triodion or Pentecostarion is in effect, otherwise 0.
    pub day_of_season: i64,
    /// 1-based day counted from the most recent Triodion start.
    pub days_since_start_of_triodion: i64,
    /// Days from January 15 to this year's Triodion start.
    pub days_until_start_of_triodion: i64,
    pub sundays_before_start_of_triodion: i64,

    /// Mode (tone) of the week, 1..=8.
    pub mode_of_week: u8,
    /// Resurrection Gospel number on Sundays (1..=11), otherwise 0.
    pub eothinon: u8,

    pub days_since_sunday_after_elevation: i64,
    /// 1-based day of the Lukan cycle.
    pub days_since_start_of_lukan_cycle: i64,

    #[serde(default)]
    computed_day_of_season: i64,
    #[serde(default)]
    computed_days_since_start_of_triodion: i64,
}

impl LiturgicalDay {
    /// Computes the properties of a civil date under the given reckoning.
    pub fn compute(date: NaiveDate, kind: CalendarKind) -> CalendarResult<Self> {
        let (year, month, day) = kind.reckon(date);
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalendarError::YearOutOfRange(year));
        }

        let pascha_last_year = compute_pascha(year - 1, kind)?;
        let pascha_this_year = compute_pascha(year, kind)?;
        let pascha_next_year = compute_pascha(year + 1, kind)?;
        let pascha_last = if pascha_this_year <= date {
            pascha_this_year
        } else {
            pascha_last_year
        };
        let pascha_next = if pascha_this_year > date {
            pascha_this_year
        } else {
            pascha_next_year
        };

        let triodion_start_this_year = before(pascha_this_year, TRIODION_BEFORE_PASCHA);
        let triodion_start_last_year = before(pascha_last_year, TRIODION_BEFORE_PASCHA);
        let triodion_start_next_year = before(pascha_next, TRIODION_BEFORE_PASCHA);
        let triodion_start_last = if date < triodion_start_this_year {
            triodion_start_last_year
        } else {
            triodion_start_this_year
        };

        let all_saints_this_year = after(pascha_this_year, ALL_SAINTS_AFTER_PASCHA);
        let all_saints_last_year = after(pascha_last_year, ALL_SAINTS_AFTER_PASCHA);

        let is_pentecostarion = pascha_this_year <= date && date <= all_saints_this_year;
        let is_triodion = triodion_start_this_year <= date && date < pascha_this_year;
        let day_of_season = if is_triodion || is_pentecostarion {
            days_between(triodion_start_this_year, date) + 1
        } else {
            0
        };
        let days_since_start_of_triodion = days_between(triodion_start_last, date) + 1;

        let (triodion_year, _, _) = kind.reckon(triodion_start_this_year);
        let jan15 = kind.to_civil(triodion_year, 1, 15)?;
        let days_until_start_of_triodion = days_between(jan15, triodion_start_this_year);

        let thomas_sunday = after(pascha_last, THOMAS_SUNDAY_AFTER_PASCHA);
        let weekday = date.weekday();

        let eothinon = if weekday == Weekday::Sun {
            let anchor = if date < all_saints_this_year {
                all_saints_last_year
            } else {
                all_saints_this_year
            };
            (days_between(anchor, date).div_euclid(7) % 11 + 1) as u8
        } else {
            0
        };

        let mut mode_of_week = (days_between(thomas_sunday, date).div_euclid(7).rem_euclid(8) + 1) as u8;
        if is_pentecostarion {
            let pentecostarion_day = day_of_season - (PASCHA_DAY_OF_SEASON - 1);
            if (1..=7).contains(&pentecostarion_day) {
                mode_of_week = BRIGHT_WEEK_MODES[(pentecostarion_day - 1) as usize];
            }
        }

        let sunday_after_this_year = sunday_after_elevation(year, kind)?;
        let sunday_after_last_year = sunday_after_elevation(year - 1, kind)?;
        let sunday_after_elevation_of_cross_last = if date < sunday_after_this_year {
            sunday_after_last_year
        } else {
            sunday_after_this_year
        };
        let lukan_start_this_year = after(sunday_after_this_year, 1);
        let start_of_lukan_cycle_last = if date < lukan_start_this_year {
            after(sunday_after_last_year, 1)
        } else {
            lukan_start_this_year
        };
        let (elevation_year, _, _) = kind.reckon(sunday_after_elevation_of_cross_last);
        let elevation_of_cross_last = kind.to_civil(elevation_year, 9, 14)?;

        Ok(LiturgicalDay {
            kind,
            date,
            year,
            month,
            day,
            weekday,
            pascha_last_year,
            pascha_this_year,
            pascha_last,
            pascha_next,
            triodion_start_last_year,
            triodion_start_this_year,
            triodion_start_next_year,
            triodion_start_last,
            palm_sunday: before(pascha_this_year, PALM_SUNDAY_BEFORE_PASCHA),
            pentecost: after(pascha_this_year, PENTECOST_AFTER_PASCHA),
            all_saints_last_year,
            all_saints_this_year,
            great_lent_start: before(pascha_this_year, GREAT_LENT_BEFORE_PASCHA),
            thomas_sunday,
            palm_sunday_next: before(pascha_next, PALM_SUNDAY_BEFORE_PASCHA),
            lazarus_saturday_next: before(pascha_next, LAZARUS_SATURDAY_BEFORE_PASCHA),
            elevation_of_cross_last,
            sunday_after_elevation_of_cross_last,
            start_of_lukan_cycle_last,
            is_pascha: date == pascha_this_year,
            is_triodion,
            is_pentecostarion,
            day_of_season,
            days_since_start_of_triodion,
            days_until_start_of_triodion,
            sundays_before_start_of_triodion: days_until_start_of_triodion / 7,
            mode_of_week,
            eothinon,
            days_since_sunday_after_elevation: days_between(sunday_after_elevation_of_cross_last, date),
            days_since_start_of_lukan_cycle: days_between(start_of_lukan_cycle_last, date) + 1,
            computed_day_of_season: day_of_season,
            computed_days_since_start_of_triodion: days_since_start_of_triodion,
        })
    }

    /// Computes the properties of a date label reckoned in `kind`.
    pub fn from_ymd(year: i32, month: u32, day: u32, kind: CalendarKind) -> CalendarResult<Self> {
        let date = validate_ymd(year, month, day, kind)?;
        Self::compute(date, kind)
    }

    /// Computes the properties of a month and day with no explicit year.
    ///
    /// The next occurrence of the month and day on or after `reference` is
    /// used. February 29 may be up to eight years away across a Gregorian
    /// century that is not a leap year.
    pub fn from_month_day(
        month: u32,
        day: u32,
        kind: CalendarKind,
        reference: NaiveDate,
    ) -> CalendarResult<Self> {
        let (reference_year, _, _) = kind.reckon(reference);
        let mut first_error = None;
        for year in reference_year..=reference_year + MONTH_DAY_SEARCH_YEARS {
            match validate_ymd(year, month, day, kind) {
                Ok(date) if date >= reference => return Self::compute(date, kind),
                Ok(_) => {}
                Err(CalendarError::NoSuchDate { .. }) if first_error.is_some() => {}
                Err(err @ CalendarError::NoSuchDate { .. }) => first_error = Some(err),
                Err(err) => return Err(err),
            }
        }
        Err(first_error.unwrap_or(CalendarError::NoSuchDate {
            year: reference_year,
            month,
            day,
            kind: kind.as_str(),
        }))
    }

    /// Returns a copy with the day of season forced to `day`.
    ///
    /// A `day` of 0 restores the computed value.
    pub fn with_day_of_season(mut self, day: i64) -> Self {
        if day == 0 {
            self.day_of_season = self.computed_day_of_season;
            self.days_since_start_of_triodion = self.computed_days_since_start_of_triodion;
        } else {
            self.day_of_season = day;
            self.days_since_start_of_triodion = day;
        }
        self
    }

    /// Day-of-week number, Sunday = 1 through Saturday = 7.
    pub fn day_of_week_number(&self) -> u8 {
        self.weekday.number_from_sunday() as u8
    }

    /// Three-letter English weekday name ("Sun" .. "Sat").
    pub fn day_of_week_name(&self) -> &'static str {
        match self.weekday {
            Weekday::Sun => "Sun",
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
        }
    }

    pub fn is_sunday(&self) -> bool {
        self.weekday == Weekday::Sun
    }

    pub fn is_saturday(&self) -> bool {
        self.weekday == Weekday::Sat
    }

    pub fn is_weekday(&self) -> bool {
        !self.is_sunday() && !self.is_saturday()
    }

    /// Day counted from Pascha (Pascha = 1) during the Pentecostarion.
    pub fn pentecostarion_day(&self) -> Option<i64> {
        self.is_pentecostarion
            .then(|| self.day_of_season - (PASCHA_DAY_OF_SEASON - 1))
    }

    /// Week of Great Lent (1..=7), counting Holy Week as the seventh.
    pub fn week_of_lent(&self) -> Option<u8> {
        match self.days_since_start_of_triodion {
            23..=29 => Some(1),
            30..=36 => Some(2),
            37..=43 => Some(3),
            44..=50 => Some(4),
            51..=57 => Some(5),
            58..=64 => Some(6),
            65..=70 => Some(7),
            _ => None,
        }
    }

    /// Week of the Lukan cycle, starting at 1.
    pub fn week_of_lukan_cycle(&self) -> i64 {
        if self.days_since_start_of_lukan_cycle < 8 {
            1
        } else {
            self.days_since_start_of_lukan_cycle / 7 + 1
        }
    }
}

/// The Sunday following September 14 of `year`.
///
/// When the Elevation itself falls on a Sunday the following Sunday is used.
pub fn sunday_after_elevation(year: i32, kind: CalendarKind) -> CalendarResult<NaiveDate> {
    let elevation = kind.to_civil(year, 9, 14)?;
    let offset = 7 - elevation.weekday().num_days_from_sunday();
    Ok(after(elevation, u64::from(offset)))
}

fn before(date: NaiveDate, days: u64) -> NaiveDate {
    date - Days::new(days)
}

fn after(date: NaiveDate, days: u64) -> NaiveDate {
    date + Days::new(days)
}

fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> LiturgicalDay {
        LiturgicalDay::from_ymd(y, m, d, CalendarKind::Gregorian).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_before_reform_rejected() {
        assert_eq!(
            LiturgicalDay::from_ymd(1500, 1, 1, CalendarKind::Gregorian),
            Err(CalendarError::YearOutOfRange(1500))
        );
    }

    #[test]
    fn test_pascha_is_day_71() {
        let pascha = day(2020, 4, 19);
        assert!(pascha.is_pascha);
        assert!(pascha.is_pentecostarion);
        assert!(!pascha.is_triodion);
        assert_eq!(pascha.day_of_season, PASCHA_DAY_OF_SEASON);
        assert_eq!(pascha.pentecostarion_day(), Some(1));
    }

    #[test]
    fn test_outside_seasons_day_of_season_is_zero() {
        let d = day(2020, 10, 1);
        assert!(!d.is_triodion && !d.is_pentecostarion);
        assert_eq!(d.day_of_season, 0);
        assert_eq!(d.pentecostarion_day(), None);
    }

    #[test]
    fn test_triodion_start_is_day_one() {
        let d = day(2020, 2, 9);
        assert!(d.is_triodion);
        assert_eq!(d.day_of_season, 1);
        assert_eq!(d.days_since_start_of_triodion, 1);
    }

    #[test]
    fn test_all_saints_closes_pentecostarion() {
        assert!(day(2020, 6, 14).is_pentecostarion);
        assert!(!day(2020, 6, 15).is_pentecostarion);
    }

    #[test]
    fn test_override_and_reset() {
        let d = day(2020, 3, 1);
        let computed = d.day_of_season;
        let overridden = d.with_day_of_season(40);
        assert_eq!(overridden.day_of_season, 40);
        assert_eq!(overridden.days_since_start_of_triodion, 40);
        let reset = overridden.with_day_of_season(0);
        assert_eq!(reset.day_of_season, computed);
    }

    #[test]
    fn test_bright_week_modes() {
        let modes: Vec<u8> = (19..=25).map(|d| day(2020, 4, d).mode_of_week).collect();
        assert_eq!(modes, vec![1, 2, 3, 4, 5, 6, 8]);
        assert_eq!(day(2020, 4, 26).mode_of_week, 1);
    }

    #[test]
    fn test_week_of_lent() {
        // Clean Monday 2020
        assert_eq!(day(2020, 3, 2).week_of_lent(), Some(1));
        assert_eq!(day(2020, 4, 13).week_of_lent(), Some(7));
        assert_eq!(day(2020, 2, 20).week_of_lent(), None);
    }

    #[test]
    fn test_sundays_before_triodion() {
        // Jan 15 to Feb 9 2020
        let d = day(2020, 1, 6);
        assert_eq!(d.days_until_start_of_triodion, 25);
        assert_eq!(d.sundays_before_start_of_triodion, 3);
    }

    #[test]
    fn test_month_day_rolls_into_next_year() {
        let reference = date(2024, 6, 1);
        let later = LiturgicalDay::from_month_day(10, 23, CalendarKind::Gregorian, reference).unwrap();
        assert_eq!(later.date, date(2024, 10, 23));
        let earlier = LiturgicalDay::from_month_day(1, 23, CalendarKind::Gregorian, reference).unwrap();
        assert_eq!(earlier.date, date(2025, 1, 23));
    }

    #[test]
    fn test_month_day_finds_next_leap_day() {
        let from_2021 = LiturgicalDay::from_month_day(2, 29, CalendarKind::Gregorian, date(2021, 1, 10)).unwrap();
        assert_eq!(from_2021.date, date(2024, 2, 29));
        let from_2024 = LiturgicalDay::from_month_day(2, 29, CalendarKind::Gregorian, date(2024, 6, 1)).unwrap();
        assert_eq!(from_2024.date, date(2028, 2, 29));
        // 2100 is not a Gregorian leap year
        let across_century = LiturgicalDay::from_month_day(2, 29, CalendarKind::Gregorian, date(2096, 3, 1)).unwrap();
        assert_eq!(across_century.date, date(2104, 2, 29));
    }

    #[test]
    fn test_month_day_reports_impossible_date() {
        assert_eq!(
            LiturgicalDay::from_month_day(2, 30, CalendarKind::Gregorian, date(2021, 1, 10)),
            Err(CalendarError::NoSuchDate {
                year: 2021,
                month: 2,
                day: 30,
                kind: "gregorian",
            })
        );
        assert_eq!(
            LiturgicalDay::from_month_day(13, 1, CalendarKind::Gregorian, date(2021, 1, 10)),
            Err(CalendarError::MonthOutOfRange(13))
        );
    }

    #[test]
    fn test_julian_label_and_civil_date() {
        let d = LiturgicalDay::from_ymd(2021, 4, 19, CalendarKind::Julian).unwrap();
        assert_eq!(d.date, date(2021, 5, 2));
        assert_eq!((d.year, d.month, d.day), (2021, 4, 19));
        assert!(d.is_pascha);
    }

    #[test]
    fn test_sunday_after_elevation_on_sunday() {
        assert_eq!(
            sunday_after_elevation(2008, CalendarKind::Gregorian).unwrap(),
            date(2008, 9, 21)
        );
        assert_eq!(
            sunday_after_elevation(2007, CalendarKind::Gregorian).unwrap(),
            date(2007, 9, 16)
        );
    }
}
