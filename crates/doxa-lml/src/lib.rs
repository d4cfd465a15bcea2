/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compiler for the Liturgical Markup Language (LML).
//!
//! An LML template declares properties, page headers and footers, and a body
//! of styled paragraphs whose text comes from references into a liturgical
//! library:
//!
//! - `nid "text"`: literal text
//! - `sid "topic/key"`: absolute reference
//! - `rid "oc.*/key" @Mode 1 @Day 1`: reference relative to the template's
//!   liturgical day, with optional overrides
//! - `span.class ... ( ... )`: nested styling
//!
//! Compiling a template produces an abstract liturgical template ([`Alt`]):
//! a format-independent document model that renderers walk to produce HTML
//! or PDF. Problems in the template are collected as [`ParseError`]s and never
//! stop the compilation; only an unreachable [`TopicKeyIndex`] does.
//!
//! # Example
//!
//! ```
//! use doxa_lml::{Compiler, CompilerOptions, MemoryIndex};
//! use doxa_calendar::CalendarKind;
//! use chrono::NaiveDate;
//!
//! let index = MemoryIndex::with_entries(["actors/Priest"]);
//! let options = CompilerOptions::new(
//!     CalendarKind::Gregorian,
//!     NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
//! );
//! let compilation = Compiler::new(&index)
//!     .with_options(options)
//!     .compile_source("example", "ID = \"en/blessing\"\n{ p.actor sid \"actors/Priest\" }")
//!     .unwrap();
//! assert!(compilation.errors.is_empty());
//! assert_eq!(compilation.template.paragraphs.len(), 1);
//! ```

pub mod ast;
pub mod builder;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod index;
pub mod lexer;
pub mod library;
pub mod model;
pub mod parser;
pub mod resolver;

// Re-export main types at crate root
pub use ast::{Location, Node, Template};
pub use builder::DocumentBuilder;
pub use compiler::{Compilation, Compiler};
pub use config::CompilerOptions;
pub use diagnostics::{DiagnosticCollector, DiagnosticKind, ParseError};
pub use error::{CompileError, CompileResult, IndexError};
pub use events::{Event, events};
pub use index::{CachedIndex, MemoryIndex, NullIndex, TopicKeyIndex};
pub use library::{LibraryId, LibraryIdError};
pub use model::{
    Alt, Directive, Lookup, PageBlock, PageKind, Paragraph, Parity, PdfLayout, PdfSettings,
    Reference, Slot, Span, Status, TemplateType,
};
pub use parser::{ParseOutput, parse};
pub use resolver::{ReferenceKind, ReferenceResolver, Resolved, Subject};
