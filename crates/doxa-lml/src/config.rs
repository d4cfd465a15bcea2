/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compiler options.

use chrono::NaiveDate;
use doxa_calendar::CalendarKind;

/// Options that apply to every template compiled by a [`Compiler`](crate::Compiler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Calendar used until a template sets its own `Calendar` property.
    pub default_calendar: CalendarKind,
    /// Date used for templates without `Month`/`Day`, and to choose the year
    /// of templates without `Year`.
    pub reference_date: NaiveDate,
}

impl CompilerOptions {
    pub fn new(default_calendar: CalendarKind, reference_date: NaiveDate) -> Self {
        Self {
            default_calendar,
            reference_date,
        }
    }

    pub fn with_calendar(mut self, calendar: CalendarKind) -> Self {
        self.default_calendar = calendar;
        self
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }
}

impl Default for CompilerOptions {
    /// Gregorian calendar, today's date.
    fn default() -> Self {
        Self {
            default_calendar: CalendarKind::Gregorian,
            reference_date: chrono::Local::now().date_naive(),
        }
    }
}
