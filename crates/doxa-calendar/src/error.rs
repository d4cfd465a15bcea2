/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for calendar computations.

use thiserror::Error;

/// Earliest year the Paschalion is computed for (first full Gregorian year).
pub const MIN_YEAR: i32 = 1583;

/// Latest year accepted for a liturgical date.
pub const MAX_YEAR: i32 = 9999;

/// Errors that can occur while building a liturgical day.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// Year outside the supported Paschalion range.
    #[error("invalid Year {0}, expected value between 1583 and 9999")]
    YearOutOfRange(i32),

    #[error("invalid Month {0}, expected value between 1 and 12")]
    MonthOutOfRange(u32),

    #[error("invalid Day {0}, expected value between 1 and 31")]
    DayOutOfRange(u32),

    /// Month and day are individually valid but do not name a day of the year.
    #[error("invalid date {year}-{month:02}-{day:02} in the {kind} calendar")]
    NoSuchDate {
        year: i32,
        month: u32,
        day: u32,
        kind: &'static str,
    },

    /// Calendar kind name not recognized.
    #[error("invalid calendar type \"{0}\", expected one of: gregorian, julian")]
    UnknownCalendar(String),
}

/// Result type for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;
