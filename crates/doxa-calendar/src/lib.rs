/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Orthodox liturgical calendar engine.
//!
//! This crate computes the properties of a liturgical day that services and
//! templates depend on:
//!
//! - The Paschalion for the Gregorian and Julian reckonings
//! - The movable cycle: Triodion, Pentecostarion, and the feasts anchored on Pascha
//! - The mode (tone) of the week and the Resurrection Gospel (eothinon)
//! - The Lukan cycle of Gospel readings
//! - Resolution of calendar-relative topics such as `oc.*`
//!
//! # Example
//!
//! ```
//! use doxa_calendar::{CalendarKind, LiturgicalDay};
//!
//! let day = LiturgicalDay::from_ymd(2020, 3, 22, CalendarKind::Gregorian).unwrap();
//! assert_eq!(day.mode_of_week, 7);
//! assert_eq!(day.relative_topic("oc.*", None, None), "oc.m7.d1");
//! ```
//!
//! Every function here is pure; a [`LiturgicalDay`] is an immutable snapshot
//! and may be shared freely between threads.

pub mod error;
pub mod greek;
pub mod kind;
pub mod ldp;
pub mod pascha;
pub mod topic;

pub use error::{CalendarError, CalendarResult, MAX_YEAR, MIN_YEAR};
pub use kind::CalendarKind;
pub use ldp::{LiturgicalDay, PASCHA_DAY_OF_SEASON, sunday_after_elevation, validate_ymd};
pub use pascha::{compute_pascha, pascha_month_day};
pub use topic::is_octoechos_topic;
