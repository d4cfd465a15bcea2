/*
 * greek.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Greek labels for dates in page headers.

use chrono::Weekday;

use crate::ldp::LiturgicalDay;

const MONTHS: [&str; 12] = [
    "Ἰανουαρίου",
    "Φεβρουαρίου",
    "Μαρτίου",
    "Ἀπριλίου",
    "Μαΐου",
    "Ἰουνίου",
    "Ἰουλίου",
    "Αὐγούστου",
    "Σεπτεμβρίου",
    "Ὀκτωβρίου",
    "Νοεμβρίου",
    "Δεκεμβρίου",
];

const NUMERALS: [&str; 31] = [
    "αʹ", "βʹ", "γʹ", "δʹ", "εʹ", "Ϛʹ", "ζʹ", "ηʹ", "θʹ", "ιʹ", "ιαʹ", "ιβʹ", "ιγʹ", "ιδʹ", "ιεʹ",
    "ιϚʹ", "ιζʹ", "ιηʹ", "ιθʹ", "κʹ", "καʹ", "κβʹ", "κγʹ", "κδʹ", "κεʹ", "κϚʹ", "κζʹ", "κηʹ", "κθʹ",
    "λʹ", "λαʹ",
];

/// Genitive month name, e.g. "Μαρτίου" for March.
pub fn month_name(month: u32) -> Option<&'static str> {
    month.checked_sub(1).and_then(|i| MONTHS.get(i as usize)).copied()
}

/// Greek numeral for a day of the month (1..=31).
pub fn day_numeral(day: u32) -> Option<&'static str> {
    day.checked_sub(1).and_then(|i| NUMERALS.get(i as usize)).copied()
}

/// Genitive weekday phrase, e.g. "τῆς Κυριακῆς".
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "τῆς Κυριακῆς",
        Weekday::Mon => "τῆς Δευτέρας",
        Weekday::Tue => "τῆς Τρίτης",
        Weekday::Wed => "τῆς Τετάρτης",
        Weekday::Thu => "τῆς Πέμπτης",
        Weekday::Fri => "τῆς Παρασκευῆς",
        Weekday::Sat => "τοῦ Σαββάτου",
    }
}

impl LiturgicalDay {
    /// Greek date label, e.g. "τῆς Κυριακῆς, κβʹ Μαρτίου".
    pub fn greek_date(&self) -> String {
        let numeral = day_numeral(self.day).unwrap_or_default();
        let month = month_name(self.month).unwrap_or_default();
        format!("{}, {} {}", weekday_name(self.weekday), numeral, month)
    }
}
