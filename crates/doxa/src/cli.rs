/*
 * cli.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use doxa_calendar::CalendarKind;

#[derive(Parser)]
#[command(name = "doxa")]
#[command(version)]
#[command(about = "Compile liturgical templates and compute liturgical days", long_about = None)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ./doxa.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile an LML template and report its errors
    Compile(CompileArgs),

    /// Show the liturgical properties of a date
    Ldp(LdpArgs),
}

#[derive(Args, Debug)]
pub struct CompileArgs {
    /// LML template file
    pub file: PathBuf,

    /// Topic-key index, one topic/key per line
    #[arg(short, long)]
    pub index: Option<PathBuf>,

    /// Print the compiled template as JSON
    #[arg(long)]
    pub json: bool,

    /// Report errors with the template ID and line/column labels
    #[arg(long)]
    pub long_errors: bool,

    /// Calendar for templates that do not set one (gregorian, julian)
    #[arg(long)]
    pub calendar: Option<CalendarKind>,

    /// Date used when a template has no Month/Day (YYYY-MM-DD)
    #[arg(long)]
    pub reference_date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct LdpArgs {
    /// Date to compute (YYYY-MM-DD)
    pub date: NaiveDate,

    /// Read the date as a Julian calendar date and reckon in the Julian calendar
    #[arg(long)]
    pub julian: bool,

    /// Print every property as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compile() {
        let cli = Cli::parse_from([
            "doxa",
            "-vv",
            "compile",
            "t.lml",
            "--index",
            "idx.txt",
            "--calendar",
            "julian",
            "--reference-date",
            "2024-05-01",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Compile(args) = cli.command else {
            panic!("expected compile");
        };
        assert_eq!(args.file, PathBuf::from("t.lml"));
        assert_eq!(args.calendar, Some(CalendarKind::Julian));
        assert_eq!(args.reference_date, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn test_parse_ldp() {
        let cli = Cli::parse_from(["doxa", "ldp", "2021-05-02", "--julian"]);
        let Command::Ldp(args) = cli.command else {
            panic!("expected ldp");
        };
        assert!(args.julian);
        assert!(!args.json);
    }
}
