/*
 * model.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The abstract liturgical template (ALT).
//!
//! This is the document model produced by compiling an LML template. It is
//! independent of any output format: renderers walk the paragraphs and page
//! layout and look up the referenced texts in the library of their choice.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use doxa_calendar::{CalendarKind, LiturgicalDay};
use serde::{Deserialize, Serialize};

use crate::library::LibraryId;

/// Error for a keyword that is not in an enum's string table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {what} \"{value}\", expected one of {expected}")]
pub struct UnknownKeyword {
    pub what: &'static str,
    pub value: String,
    pub expected: String,
}

/// Declares an enum together with its lowercase string table.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal, default = $default:ident,
        { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            fn expected() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownKeyword;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| UnknownKeyword {
                        what: $what,
                        value: s.to_string(),
                        expected: Self::expected(),
                    })
            }
        }
    };
}

keyword_enum! {
    /// Kind of template.
    TemplateType, "template Type", default = Block,
    { Block => "block", Book => "book", Service => "service" }
}

keyword_enum! {
    /// Editorial status of a template.
    Status, "template Status", default = Na,
    { Na => "na", Draft => "draft", Review => "review", Final => "final" }
}

keyword_enum! {
    /// Pages a header or footer applies to.
    Parity, "page parity", default = Both,
    { Both => "both", Even => "even", Odd => "odd" }
}

keyword_enum! {
    /// Slot of a header or footer.
    Slot, "header/footer slot position", default = Center,
    { Left => "left", Center => "center", Right => "right" }
}

keyword_enum! {
    PageKind, "page block", default = Header,
    { Header => "header", Footer => "footer" }
}

pub const CLASS_NID: &str = "nid";
pub const CLASS_KVP: &str = "kvp";
pub const CLASS_MEDIA: &str = "media";
pub const CLASS_VERSION: &str = "versiondesignation";
pub const CLASS_DATE: &str = "span.date";
pub const CLASS_PAGE_NUMBER: &str = "span.pageNbr";
pub const CLASS_LITERAL: &str = "span.literal";
pub const CLASS_LOOKUP: &str = "span.lookup";

/// Topic/key of the version designation appended by `@Ver`.
pub const VERSION_DESIGNATION: &str = "properties/version.designation";

/// A reference to text, either literal or held in a library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Reference {
    /// Literal text, not looked up.
    Nid { text: String },
    /// Calendar-relative topic/key, resolved against the template's date.
    Rid {
        /// Topic/key as written in the template.
        topic_key: String,
        /// Topic/key after relative-topic rewriting.
        resolved: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        day: Option<u8>,
    },
    /// Absolute topic/key.
    Sid { topic_key: String },
}

impl Reference {
    /// Topic/key to look up, or `None` for literal text.
    pub fn topic_key(&self) -> Option<&str> {
        match self {
            Reference::Nid { .. } => None,
            Reference::Rid { resolved, .. } => Some(resolved),
            Reference::Sid { topic_key } => Some(topic_key),
        }
    }

    /// Library-qualified path, e.g. `gr_gr_cog/actors/Deacon`.
    pub fn qualified(&self, library: &LibraryId) -> Option<String> {
        self.topic_key().map(|tk| format!("{library}/{tk}"))
    }
}

/// A styled run of content. Leaves carry a reference; containers carry children.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub class: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Reference>,
}

impl Span {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            ..Default::default()
        }
    }

    /// Leaf span for a reference, classed by reference kind.
    pub fn leaf(reference: Reference) -> Self {
        let class = match reference {
            Reference::Nid { .. } => CLASS_NID,
            Reference::Rid { .. } | Reference::Sid { .. } => CLASS_KVP,
        };
        Self::leaf_with_class(class, reference)
    }

    pub fn leaf_with_class(class: impl Into<String>, reference: Reference) -> Self {
        Self {
            class: class.into(),
            children: Vec::new(),
            reference: Some(reference),
        }
    }

    /// Maximum nesting depth, counting this span as 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Span::depth).max().unwrap_or(0)
    }

    /// Visits every reference in document order.
    pub fn for_each_reference<'a>(&'a self, f: &mut impl FnMut(&'a Reference)) {
        if let Some(reference) = &self.reference {
            f(reference);
        }
        for child in &self.children {
            child.for_each_reference(f);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    pub class: String,
    pub spans: Vec<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Span>,
}

impl Paragraph {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            ..Default::default()
        }
    }

    /// Appends the version-designation span.
    pub fn add_version(&mut self) {
        self.version = Some(Span::leaf_with_class(
            CLASS_VERSION,
            Reference::Sid {
                topic_key: VERSION_DESIGNATION.to_string(),
            },
        ));
    }
}

/// Typed references inserted into a header or footer from one library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookup {
    pub references: Vec<Reference>,
    /// Library number, 1 through 3.
    pub library: u8,
}

/// Content placed in a header or footer slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    InsertDate {
        class: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date: Option<NaiveDate>,
    },
    InsertPageNumber { class: String },
    InsertLiteral { class: String, text: String },
    InsertLookup { class: String, lookup: Lookup },
}

impl Directive {
    pub fn date(date: Option<NaiveDate>) -> Self {
        Directive::InsertDate {
            class: CLASS_DATE.to_string(),
            date,
        }
    }

    pub fn page_number() -> Self {
        Directive::InsertPageNumber {
            class: CLASS_PAGE_NUMBER.to_string(),
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Directive::InsertLiteral {
            class: CLASS_LITERAL.to_string(),
            text: text.into(),
        }
    }

    pub fn lookup(lookup: Lookup) -> Self {
        Directive::InsertLookup {
            class: CLASS_LOOKUP.to_string(),
            lookup,
        }
    }

    pub fn class(&self) -> &str {
        match self {
            Directive::InsertDate { class, .. }
            | Directive::InsertPageNumber { class }
            | Directive::InsertLiteral { class, .. }
            | Directive::InsertLookup { class, .. } => class,
        }
    }
}

/// A page header or footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBlock {
    pub kind: PageKind,
    pub parity: Parity,
    pub left: Vec<Directive>,
    pub center: Vec<Directive>,
    pub right: Vec<Directive>,
}

impl PageBlock {
    pub fn new(kind: PageKind, parity: Parity) -> Self {
        Self {
            kind,
            parity,
            left: Vec::new(),
            center: Vec::new(),
            right: Vec::new(),
        }
    }

    pub fn slot(&self, slot: Slot) -> &[Directive] {
        match slot {
            Slot::Left => &self.left,
            Slot::Center => &self.center,
            Slot::Right => &self.right,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Vec<Directive> {
        match slot {
            Slot::Left => &mut self.left,
            Slot::Center => &mut self.center,
            Slot::Right => &mut self.right,
        }
    }

    pub fn directives_mut(&mut self) -> impl Iterator<Item = &mut Directive> {
        self.left
            .iter_mut()
            .chain(self.center.iter_mut())
            .chain(self.right.iter_mut())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PdfLayout {
    pub headers: Vec<PageBlock>,
    pub footers: Vec<PageBlock>,
}

impl PdfLayout {
    pub fn add(&mut self, block: PageBlock) {
        match block.kind {
            PageKind::Header => self.headers.push(block),
            PageKind::Footer => self.footers.push(block),
        }
    }

    /// Header for a page, preferring a parity-specific one over `Both`.
    pub fn header_for(&self, parity: Parity) -> Option<&PageBlock> {
        pick(&self.headers, parity)
    }

    /// Footer for a page, preferring a parity-specific one over `Both`.
    pub fn footer_for(&self, parity: Parity) -> Option<&PageBlock> {
        pick(&self.footers, parity)
    }
}

fn pick(blocks: &[PageBlock], parity: Parity) -> Option<&PageBlock> {
    blocks
        .iter()
        .rev()
        .find(|b| b.parity == parity)
        .or_else(|| blocks.iter().rev().find(|b| b.parity == Parity::Both))
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PdfSettings {
    pub css: String,
    pub title: String,
    /// Number of the first page.
    pub page_number: u32,
    pub layout: PdfLayout,
}

/// Abstract liturgical template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alt {
    pub id: String,
    #[serde(rename = "type")]
    pub template_type: TemplateType,
    pub status: Status,
    pub calendar: CalendarKind,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    /// Liturgical day the template is compiled for.
    pub ldp: LiturgicalDay,
    pub html_css: String,
    pub pdf: PdfSettings,
    pub paragraphs: Vec<Paragraph>,
}

impl Alt {
    pub fn new(id: impl Into<String>, ldp: LiturgicalDay) -> Self {
        Self {
            id: id.into(),
            template_type: TemplateType::default(),
            status: Status::default(),
            calendar: ldp.kind,
            year: None,
            month: None,
            day: None,
            ldp,
            html_css: String::new(),
            pdf: PdfSettings {
                page_number: 1,
                ..Default::default()
            },
            paragraphs: Vec::new(),
        }
    }

    /// Every reference in the body, in document order.
    pub fn references(&self) -> Vec<&Reference> {
        let mut out = Vec::new();
        for paragraph in &self.paragraphs {
            for span in &paragraph.spans {
                span.for_each_reference(&mut |r| out.push(r));
            }
            if let Some(version) = &paragraph.version {
                version.for_each_reference(&mut |r| out.push(r));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_keyword_tables_are_case_insensitive() {
        assert_eq!("Service".parse::<TemplateType>(), Ok(TemplateType::Service));
        assert_eq!("DRAFT".parse::<Status>(), Ok(Status::Draft));
        assert_eq!("Right".parse::<Slot>(), Ok(Slot::Right));
    }

    #[test]
    fn test_unknown_keyword_message() {
        let err = "pending".parse::<Status>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid template Status \"pending\", expected one of na, draft, review, final"
        );
        let err = "middle".parse::<Slot>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid header/footer slot position \"middle\", expected one of left, center, right"
        );
    }

    #[test]
    fn test_leaf_classes() {
        let nid = Span::leaf(Reference::Nid {
            text: "Amen".to_string(),
        });
        assert_eq!(nid.class, CLASS_NID);
        let sid = Span::leaf(Reference::Sid {
            topic_key: "actors/Priest".to_string(),
        });
        assert_eq!(sid.class, CLASS_KVP);
    }

    #[test]
    fn test_span_depth() {
        let mut outer = Span::new("span.it");
        let mut middle = Span::new("span.rubric");
        middle.children.push(Span::leaf(Reference::Nid {
            text: "x".to_string(),
        }));
        outer.children.push(middle);
        assert_eq!(outer.depth(), 3);
    }

    #[test]
    fn test_version_span() {
        let mut p = Paragraph::new("p.hymn");
        p.add_version();
        let version = p.version.unwrap();
        assert_eq!(version.class, CLASS_VERSION);
        assert_eq!(
            version.reference.unwrap().topic_key(),
            Some(VERSION_DESIGNATION)
        );
    }

    #[test]
    fn test_qualified_reference() {
        let library: LibraryId = "en_us_dedes".parse().unwrap();
        let sid = Reference::Sid {
            topic_key: "actors/Deacon".to_string(),
        };
        assert_eq!(sid.qualified(&library).as_deref(), Some("en_us_dedes/actors/Deacon"));
        let nid = Reference::Nid {
            text: "text".to_string(),
        };
        assert_eq!(nid.qualified(&library), None);
    }

    #[test]
    fn test_layout_prefers_parity_specific_block() {
        let mut layout = PdfLayout::default();
        layout.add(PageBlock::new(PageKind::Header, Parity::Both));
        let mut even = PageBlock::new(PageKind::Header, Parity::Even);
        even.slot_mut(Slot::Left).push(Directive::page_number());
        layout.add(even);
        assert_eq!(layout.header_for(Parity::Even).map(|b| b.parity), Some(Parity::Even));
        assert_eq!(layout.header_for(Parity::Odd).map(|b| b.parity), Some(Parity::Both));
        assert!(layout.footer_for(Parity::Odd).is_none());
    }

    #[test]
    fn test_directive_json_shape() {
        insta::assert_json_snapshot!(Directive::page_number(), @r#"
        {
          "type": "insert_page_number",
          "class": "span.pageNbr"
        }
        "#);
    }
}
