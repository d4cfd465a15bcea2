/*
 * ldp.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Ldp command implementation
 */

//! Prints the liturgical properties of a date.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Datelike;
use doxa_calendar::{CalendarKind, LiturgicalDay};

use crate::cli::LdpArgs;

/// Compute the liturgical day named on the command line.
///
/// With `--julian` the date is read as a Julian calendar label.
pub fn liturgical_day(args: &LdpArgs) -> Result<LiturgicalDay> {
    let kind = if args.julian {
        CalendarKind::Julian
    } else {
        CalendarKind::Gregorian
    };
    let date = args.date;
    LiturgicalDay::from_ymd(date.year(), date.month(), date.day(), kind)
        .with_context(|| format!("cannot compute the {kind} liturgical day for {date}"))
}

pub fn execute(args: &LdpArgs, out: &mut impl Write) -> Result<()> {
    let day = liturgical_day(args)?;
    if args.json {
        let json = serde_json::to_string_pretty(&day).context("failed to serialize liturgical day")?;
        writeln!(out, "{json}")?;
        return Ok(());
    }

    let season = if day.is_triodion {
        "Triodion"
    } else if day.is_pentecostarion {
        "Pentecostarion"
    } else {
        "-"
    };
    writeln!(
        out,
        "{:04}-{:02}-{:02} ({}) {}",
        day.year,
        day.month,
        day.day,
        day.kind,
        day.day_of_week_name()
    )?;
    writeln!(out, "civil date:       {}", day.date)?;
    writeln!(out, "greek:            {}", day.greek_date())?;
    writeln!(out, "mode of week:     {}", day.mode_of_week)?;
    writeln!(out, "eothinon:         {}", day.eothinon)?;
    writeln!(out, "season:           {season}")?;
    writeln!(out, "day of season:    {}", day.day_of_season)?;
    if let Some(week) = day.week_of_lent() {
        writeln!(out, "week of lent:     {week}")?;
    }
    writeln!(out, "pascha:           {}", day.pascha_this_year)?;
    writeln!(out, "triodion start:   {}", day.triodion_start_this_year)?;
    writeln!(out, "pentecost:        {}", day.pentecost)?;
    writeln!(
        out,
        "lukan cycle:      day {}, week {}",
        day.days_since_start_of_lukan_cycle,
        day.week_of_lukan_cycle()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn args(date: (i32, u32, u32), julian: bool, json: bool) -> LdpArgs {
        LdpArgs {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            julian,
            json,
        }
    }

    #[test]
    fn test_julian_label() {
        let day = liturgical_day(&args((2021, 4, 19), true, false)).unwrap();
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2021, 5, 2).unwrap());
        assert!(day.is_pascha);
    }

    #[test]
    fn test_summary() {
        let mut out = Vec::new();
        execute(&args((2020, 3, 22), false, false), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("2020-03-22 (Gregorian) Sun\n"), "{text}");
        assert!(text.contains("mode of week:     7\n"));
        assert!(text.contains("season:           Triodion\n"));
        assert!(text.contains("pascha:           2020-04-19\n"));
    }

    #[test]
    fn test_json() {
        let mut out = Vec::new();
        execute(&args((2020, 4, 19), false, true), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["is_pascha"], true);
        assert_eq!(value["date"], "2020-04-19");
    }

    #[test]
    fn test_year_out_of_range() {
        let err = liturgical_day(&args((1500, 1, 1), false, false)).unwrap_err();
        assert!(format!("{err:#}").contains("invalid Year 1500"));
    }
}
