/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `doxa.toml` configuration.
//!
//! ```toml
//! index = "library/index.txt"
//! calendar = "julian"
//! reference_date = "2024-09-01"
//! long_errors = true
//! ```
//!
//! Relative paths are resolved against the directory of the file.
//! Command-line flags take precedence over every key.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use doxa_calendar::CalendarKind;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "doxa.toml";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DoxaConfig {
    /// Topic-key index file.
    #[serde(default)]
    pub index: Option<PathBuf>,

    /// Calendar for templates that do not set one.
    #[serde(default)]
    pub calendar: Option<CalendarKind>,

    /// Date used for templates without Month/Day.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,

    /// Report errors in the long form.
    #[serde(default)]
    pub long_errors: bool,
}

impl DoxaConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let mut config: DoxaConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        if let (Some(index), Some(dir)) = (config.index.as_mut(), path.parent()) {
            if index.is_relative() {
                *index = dir.join(&*index);
            }
        }
        Ok(config)
    }

    /// Load `explicit`, or `doxa.toml` in the working directory if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
