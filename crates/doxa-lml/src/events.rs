/*
 * events.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Enter/exit event stream over an LML AST.
//!
//! The document builder consumes these events. A parser other than the one
//! in this crate can drive the compiler by producing the same stream, one
//! `Enter`/`Exit` pair per node in depth-first order.

use crate::ast::{Node, Template};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event<'a> {
    Enter(&'a Node),
    Exit(&'a Node),
}

impl<'a> Event<'a> {
    pub fn node(&self) -> &'a Node {
        match self {
            Event::Enter(node) | Event::Exit(node) => node,
        }
    }
}

/// Depth-first events for the children of a template.
///
/// The template itself has no event; the consumer brackets the stream.
pub fn events(template: &Template) -> Events<'_> {
    Events {
        stack: template.children.iter().rev().map(Pending::Enter).collect(),
    }
}

enum Pending<'a> {
    Enter(&'a Node),
    Exit(&'a Node),
}

/// Iterator returned by [`events`].
pub struct Events<'a> {
    stack: Vec<Pending<'a>>,
}

impl<'a> Iterator for Events<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.stack.pop()? {
            Pending::Enter(node) => {
                self.stack.push(Pending::Exit(node));
                self.stack
                    .extend(node.children().iter().rev().map(Pending::Enter));
                Some(Event::Enter(node))
            }
            Pending::Exit(node) => Some(Event::Exit(node)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn trace(source: &str) -> Vec<String> {
        let output = parse(source);
        events(&output.template)
            .map(|event| {
                let name = match event.node() {
                    Node::Paragraph(p) => p.class.clone(),
                    Node::Span(s) => s.class.clone(),
                    Node::Nid(n) => n.text.clone(),
                    other => format!("{other:?}").chars().take(4).collect(),
                };
                match event {
                    Event::Enter(_) => format!("+{name}"),
                    Event::Exit(_) => format!("-{name}"),
                }
            })
            .collect()
    }

    #[test]
    fn test_depth_first_order() {
        assert_eq!(
            trace("{ p.a span.b ( nid \"x\" ) nid \"y\" }"),
            vec!["+p.a", "+span.b", "+x", "-x", "-span.b", "+y", "-y", "-p.a"]
        );
    }

    #[test]
    fn test_enter_exit_balanced() {
        let output = parse("PageHeader = left @Date right nid \"r\"\n{ p.a nid \"x\" p.b sid \"a/b\" }");
        let mut depth = 0i32;
        for event in events(&output.template) {
            match event {
                Event::Enter(_) => depth += 1,
                Event::Exit(_) => depth -= 1,
            }
            assert!(depth >= 0);
        }
        assert_eq!(depth, 0);
    }
}
