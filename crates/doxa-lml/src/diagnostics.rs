/*
 * diagnostics.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Diagnostics collected while compiling a template.
//!
//! Compilation is best effort. Syntax errors from the front end and semantic
//! errors from the document builder are recorded in a [`DiagnosticCollector`]
//! and the walk continues. The caller receives them as [`ParseError`]s.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// Source text does not match the LML grammar.
    Syntax,
    /// Well-formed source with an invalid value or reference.
    Semantic,
}

/// An error located in a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub template_id: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub kind: DiagnosticKind,
}

impl ParseError {
    pub fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    /// `line:column: message`
    pub fn compact(&self) -> String {
        format!("{}:{}: {}", self.line, self.column, self.message)
    }

    /// `template <id> Line <n> Column <n>: message`
    pub fn verbose(&self) -> String {
        format!(
            "template {} Line {} Column {}: {}",
            self.template_id, self.line, self.column, self.message
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Diagnostic {
    kind: DiagnosticKind,
    location: Location,
    message: String,
}

/// Collector for diagnostics raised during one compilation.
///
/// The template ID is only known once its `ID` property has been read, so
/// it is attached when the diagnostics are taken out of the collector.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, kind: DiagnosticKind, message: impl Into<String>, location: Location) {
        self.diagnostics.push(Diagnostic {
            kind,
            location,
            message: message.into(),
        });
    }

    pub fn syntax_at(&mut self, message: impl Into<String>, location: Location) {
        self.add(DiagnosticKind::Syntax, message, location);
    }

    pub fn semantic_at(&mut self, message: impl Into<String>, location: Location) {
        self.add(DiagnosticKind::Semantic, message, location);
    }

    /// Moves every diagnostic of `other` into this collector.
    pub fn merge(&mut self, other: DiagnosticCollector) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Messages in order of discovery.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.diagnostics.iter().map(|d| d.message.as_str())
    }

    /// Consume the collector, returning errors sorted by source location.
    ///
    /// The sort is stable, so errors at the same location keep their order
    /// of discovery.
    pub fn into_parse_errors(mut self, template_id: &str) -> Vec<ParseError> {
        self.diagnostics.sort_by_key(|d| d.location);
        self.diagnostics
            .into_iter()
            .map(|d| ParseError {
                template_id: template_id.to_string(),
                line: d.location.line,
                column: d.location.column,
                message: d.message,
                kind: d.kind,
            })
            .collect()
    }
}
