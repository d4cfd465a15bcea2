/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! LML abstract syntax tree.
//!
//! One node type per grammar production. Every node carries the location of
//! its first token so that diagnostics raised while building the document
//! model can point back into the source.

use std::fmt;

use crate::model::{PageKind, Parity};

/// A position in LML source. Lines and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A node in the LML AST.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Root of a template: properties, page blocks, and paragraphs.
    Template(Template),

    /// Template property: `Name = value`
    Property(Property),

    /// Page header or footer: `PageHeaderEven = left @PageNbr`
    PageBlock(PageBlock),

    /// Slot of a page block: `left`, `center`, or `right`
    Position(Position),

    /// Slot directive: `@Date`, `@PageNbr`
    Directive(Directive),

    /// Slot lookup: `@Lookup sid "t/k" rid "t/k" lang 1`
    Lookup(Lookup),

    /// Paragraph: `p.hymn ... @Ver`
    Paragraph(Paragraph),

    /// Styled span: `span.it sid "t/k" ( ... )`
    Span(Span),

    /// Literal text: `nid "text"`
    Nid(Nid),

    /// Calendar-relative reference: `rid "oc.*/key" @Mode 1 @Day 1`
    Rid(Rid),

    /// Absolute reference: `sid "topic/key"`
    Sid(Sid),

    /// Media reference: `media "topic/key"`
    Media(Media),
}

impl Node {
    /// Location of the node's first token.
    pub fn location(&self) -> Location {
        match self {
            Node::Template(n) => n.location,
            Node::Property(n) => n.location,
            Node::PageBlock(n) => n.location,
            Node::Position(n) => n.location,
            Node::Directive(n) => n.location,
            Node::Lookup(n) => n.location,
            Node::Paragraph(n) => n.location,
            Node::Span(n) => n.location,
            Node::Nid(n) => n.location,
            Node::Rid(n) => n.location,
            Node::Sid(n) => n.location,
            Node::Media(n) => n.location,
        }
    }

    /// Child nodes in source order.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Template(n) => &n.children,
            Node::PageBlock(n) => &n.children,
            Node::Position(n) => &n.children,
            Node::Lookup(n) => &n.children,
            Node::Paragraph(n) => &n.children,
            Node::Span(n) => &n.children,
            Node::Property(_)
            | Node::Directive(_)
            | Node::Nid(_)
            | Node::Rid(_)
            | Node::Sid(_)
            | Node::Media(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub children: Vec<Node>,
    pub location: Location,
}

/// Literal value of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Int(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: Value,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageBlock {
    pub kind: PageKind,
    pub parity: Parity,
    /// Position nodes.
    pub children: Vec<Node>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// Slot name as written; validated when the document is built.
    pub slot: String,
    /// Directive, Lookup, and Nid nodes.
    pub children: Vec<Node>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// Directive name without the leading `@`.
    pub name: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    /// Sid and Rid nodes.
    pub children: Vec<Node>,
    /// Library number from `lang N`, if present.
    pub library: Option<i64>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub class: String,
    pub children: Vec<Node>,
    /// Set by a trailing `@Ver`.
    pub version: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub class: String,
    pub children: Vec<Node>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nid {
    pub text: String,
    pub location: Location,
}

/// Which value an `@Mode` or `@Day` override replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideKind {
    Mode,
    Day,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub kind: OverrideKind,
    pub value: i64,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rid {
    pub path: String,
    pub overrides: Vec<Override>,
    pub location: Location,
}

impl Rid {
    /// Last `@Mode` override, if any.
    pub fn mode_override(&self) -> Option<i64> {
        self.last_override(OverrideKind::Mode).map(|o| o.value)
    }

    /// Last `@Day` override, if any.
    pub fn day_override(&self) -> Option<i64> {
        self.last_override(OverrideKind::Day).map(|o| o.value)
    }

    /// The override of `kind` that takes effect.
    pub fn last_override(&self, kind: OverrideKind) -> Option<&Override> {
        self.overrides.iter().rev().find(|o| o.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sid {
    pub path: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub path: String,
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: usize, column: usize) -> Location {
        Location::new(line, column)
    }

    #[test]
    fn test_location_ordering() {
        assert!(loc(1, 9) < loc(2, 1));
        assert!(loc(3, 2) < loc(3, 4));
        assert_eq!(loc(4, 7).to_string(), "4:7");
    }

    #[test]
    fn test_leaf_nodes_have_no_children() {
        let nid = Node::Nid(Nid {
            text: "Amen".to_string(),
            location: loc(1, 1),
        });
        assert!(nid.children().is_empty());
        assert_eq!(nid.location(), loc(1, 1));
    }

    #[test]
    fn test_span_children() {
        let span = Node::Span(Span {
            class: "span.it".to_string(),
            children: vec![Node::Sid(Sid {
                path: "actors/Deacon".to_string(),
                location: loc(1, 10),
            })],
            location: loc(1, 1),
        });
        assert_eq!(span.children().len(), 1);
    }

    #[test]
    fn test_rid_last_override_wins() {
        let rid = Rid {
            path: "oc.*/key".to_string(),
            overrides: vec![
                Override {
                    kind: OverrideKind::Mode,
                    value: 1,
                    location: loc(1, 1),
                },
                Override {
                    kind: OverrideKind::Day,
                    value: 2,
                    location: loc(1, 1),
                },
                Override {
                    kind: OverrideKind::Mode,
                    value: 3,
                    location: loc(1, 1),
                },
            ],
            location: loc(1, 1),
        };
        assert_eq!(rid.mode_override(), Some(3));
        assert_eq!(rid.day_override(), Some(2));
    }
}
