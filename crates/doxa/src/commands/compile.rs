/*
 * compile.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Compile command implementation
 */

//! Compile command implementation.
//!
//! Reads an LML template, compiles it against a topic-key index, and prints
//! every error. With `--json` the compiled template follows the errors.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use doxa_lml::{Compiler, CompilerOptions, MemoryIndex, NullIndex, TopicKeyIndex};
use tracing::{info, warn};

use crate::cli::CompileArgs;
use crate::config::DoxaConfig;

/// Outcome of the compile command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileReport {
    pub errors: usize,
}

fn load_index(path: Option<&Path>) -> Result<Box<dyn TopicKeyIndex>> {
    match path {
        Some(path) => {
            let index = MemoryIndex::from_file(path)
                .with_context(|| format!("failed to load index: {}", path.display()))?;
            info!(entries = index.len(), path = %path.display(), "loaded topic-key index");
            Ok(Box::new(index))
        }
        None => {
            warn!("no topic-key index given, references are not checked");
            Ok(Box::new(NullIndex))
        }
    }
}

/// Execute the compile command, writing errors and output to `out`.
pub fn execute(args: &CompileArgs, config: &DoxaConfig, out: &mut impl Write) -> Result<CompileReport> {
    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read template: {}", args.file.display()))?;
    let index = load_index(args.index.as_deref().or(config.index.as_deref()))?;

    let mut options = CompilerOptions::default();
    if let Some(calendar) = args.calendar.or(config.calendar) {
        options = options.with_calendar(calendar);
    }
    if let Some(date) = args.reference_date.or(config.reference_date) {
        options = options.with_reference_date(date);
    }

    let name = args.file.display().to_string();
    let compilation = Compiler::new(&*index)
        .with_options(options)
        .compile_source(&name, &source)
        .with_context(|| format!("failed to compile {name}"))?;

    let long_errors = args.long_errors || config.long_errors;
    for error in &compilation.errors {
        let line = if long_errors {
            error.verbose()
        } else {
            format!("{name}:{}", error.compact())
        };
        writeln!(out, "{line}")?;
    }
    if args.json {
        let json = serde_json::to_string_pretty(&compilation.template)
            .context("failed to serialize template")?;
        writeln!(out, "{json}")?;
    }
    info!(template = %compilation.template.id, errors = compilation.errors.len(), "compile finished");
    Ok(CompileReport {
        errors: compilation.errors.len(),
    })
}
