/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types that abort a compilation.
//!
//! Everything wrong with the template itself is a collected
//! [`ParseError`](crate::ParseError). Only a failure of the environment,
//! such as an unreachable topic-key index, stops the walk.

use std::path::PathBuf;

use doxa_calendar::CalendarError;
use thiserror::Error;

/// Errors raised by a [`TopicKeyIndex`](crate::TopicKeyIndex).
#[derive(Debug, Error)]
pub enum IndexError {
    /// The index cannot answer queries.
    #[error("topic-key index unavailable: {0}")]
    Unavailable(String),

    /// Reading an index file failed.
    #[error("failed to read index {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An index file line is not a `topic/key` pair.
    #[error("index line {line}: expected topic/key, found \"{text}\"")]
    Malformed { line: usize, text: String },
}

/// Errors that abort a compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    IndexUnavailable(#[from] IndexError),

    /// The configured reference date has no liturgical day.
    #[error("invalid reference date: {0}")]
    ReferenceDate(#[from] CalendarError),
}

/// Result type for compiler operations.
pub type CompileResult<T> = Result<T, CompileError>;
