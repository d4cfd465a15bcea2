/*
 * compiler.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compiler driver.
//!
//! A [`Compiler`] borrows a topic-key index and compiles templates one at a
//! time. Each call owns a fresh [`DocumentBuilder`], so a compiler can be
//! shared between threads when its index is `Sync`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ast::{Node, Template};
use crate::builder::DocumentBuilder;
use crate::config::CompilerOptions;
use crate::diagnostics::ParseError;
use crate::error::CompileResult;
use crate::events::{Event, events};
use crate::index::TopicKeyIndex;
use crate::model::Alt;
use crate::parser::parse;

/// A compiled template and the errors found in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compilation {
    pub template: Alt,
    /// Syntax and semantic errors, ordered by position.
    pub errors: Vec<ParseError>,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Compiles LML templates against a topic-key index.
pub struct Compiler<'a, I: ?Sized> {
    index: &'a I,
    options: CompilerOptions,
}

impl<'a, I: TopicKeyIndex + ?Sized> Compiler<'a, I> {
    pub fn new(index: &'a I) -> Self {
        Self {
            index,
            options: CompilerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile a parsed template.
    ///
    /// `name` identifies the template in diagnostics when it has no `ID`
    /// property.
    pub fn walk_template(&self, name: &str, template: &Template) -> CompileResult<Compilation> {
        let mut builder = self.builder(name)?;
        for node in &template.children {
            walk(&mut builder, node).inspect_err(|e| warn!(template = name, "{e}"))?;
        }
        Ok(builder.finish())
    }

    /// Compile a stream of enter/exit events.
    pub fn compile_events<'n>(
        &self,
        name: &str,
        events: impl IntoIterator<Item = Event<'n>>,
    ) -> CompileResult<Compilation> {
        let mut builder = self.builder(name)?;
        for event in events {
            let step = match event {
                Event::Enter(node) => builder.enter(node),
                Event::Exit(node) => {
                    builder.exit(node);
                    Ok(())
                }
            };
            step.inspect_err(|e| warn!(template = name, "{e}"))?;
        }
        Ok(builder.finish())
    }

    /// Parse and compile LML source.
    ///
    /// Syntax errors are reported together with semantic errors; the
    /// template is compiled as far as it could be parsed.
    pub fn compile_source(&self, name: &str, source: &str) -> CompileResult<Compilation> {
        let output = parse(source);
        debug!(
            template = name,
            syntax_errors = output.diagnostics.len(),
            "parsed template"
        );
        let mut builder = self.builder(name)?;
        builder.merge_diagnostics(output.diagnostics);
        for event in events(&output.template) {
            match event {
                Event::Enter(node) => builder
                    .enter(node)
                    .inspect_err(|e| warn!(template = name, "{e}"))?,
                Event::Exit(node) => builder.exit(node),
            }
        }
        Ok(builder.finish())
    }

    fn builder(&self, name: &str) -> CompileResult<DocumentBuilder<'a, I>> {
        DocumentBuilder::new(self.index, self.options.clone(), name)
    }
}

fn walk<I: TopicKeyIndex + ?Sized>(builder: &mut DocumentBuilder<'_, I>, node: &Node) -> CompileResult<()> {
    builder.enter(node)?;
    match node {
        Node::Template(_)
        | Node::PageBlock(_)
        | Node::Position(_)
        | Node::Lookup(_)
        | Node::Paragraph(_)
        | Node::Span(_) => {
            for child in node.children() {
                walk(builder, child)?;
            }
        }
        Node::Property(_)
        | Node::Directive(_)
        | Node::Nid(_)
        | Node::Rid(_)
        | Node::Sid(_)
        | Node::Media(_) => {}
    }
    builder.exit(node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{MemoryIndex, NullIndex};
    use chrono::NaiveDate;
    use doxa_calendar::CalendarKind;

    fn options() -> CompilerOptions {
        CompilerOptions::new(
            CalendarKind::Gregorian,
            NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
        )
    }

    #[test]
    fn test_walk_and_events_agree() {
        let source = "ID = \"a/b\"\n{ p.hymn span.it ( nid \"x\" sid \"t/k\" ) @Ver }";
        let compiler = Compiler::new(&NullIndex).with_options(options());
        let parsed = parse(source);
        let walked = compiler.walk_template("n", &parsed.template).unwrap();
        let streamed = compiler.compile_events("n", events(&parsed.template)).unwrap();
        assert_eq!(walked, streamed);
        assert_eq!(walked, compiler.compile_source("n", source).unwrap());
    }

    #[test]
    fn test_errors_carry_template_id() {
        let index = MemoryIndex::new();
        let compiler = Compiler::new(&index).with_options(options());
        let c = compiler
            .compile_source("fallback", "ID = \"a/b\"\n{ p.x sid \"t/k\" }")
            .unwrap();
        assert!(c.has_errors());
        assert_eq!(c.errors[0].template_id, "a/b");
        assert_eq!(c.errors[0].compact(), "2:7: not found: topic/key 't/k' does not exist");
    }

    #[test]
    fn test_syntax_and_semantic_errors_merged_in_order() {
        let compiler = Compiler::new(&NullIndex).with_options(options());
        let c = compiler
            .compile_source("t/x", "Month = 13\n{ p.a span.b }")
            .unwrap();
        let rendered: Vec<String> = c.errors.iter().map(ParseError::compact).collect();
        assert_eq!(
            rendered,
            vec![
                "1:1: invalid Month 13, expected value between 1 and 12",
                "2:7: span 'span.b' has no content",
            ]
        );
    }
}
