/*
 * builder.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document builder.
//!
//! Turns the enter/exit events of an LML template into an [`Alt`]. The
//! builder owns all state of one compilation: the document under
//! construction, the open paragraph, a single stack of open spans, the open
//! page header or footer and slot, and the open `@Lookup`.

use doxa_calendar::{CalendarKind, LiturgicalDay, MAX_YEAR, MIN_YEAR};
use tracing::debug;

use crate::ast::{self, Location, Node, OverrideKind, Value};
use crate::compiler::Compilation;
use crate::config::CompilerOptions;
use crate::diagnostics::DiagnosticCollector;
use crate::error::CompileResult;
use crate::index::TopicKeyIndex;
use crate::model::{
    Alt, CLASS_MEDIA, Directive, Lookup, PageBlock, Paragraph, Reference, Slot, Span, Status,
    TemplateType,
};
use crate::resolver::{Overrides, ReferenceKind, ReferenceResolver, Subject};

const PROPERTIES: &str =
    "ID, Type, Status, Calendar, HtmlCss, PdfCss, Title, Month, Day, Year, SetPageNumber";

/// Where header/footer content currently goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotTarget {
    Outside,
    /// Inside a position whose slot name was rejected.
    Rejected,
    Open(Slot),
}

/// Where a leaf and its overrides appear in the source.
#[derive(Debug, Clone, Copy)]
struct LeafLocations {
    reference: Location,
    mode: Option<Location>,
    day: Option<Location>,
}

impl LeafLocations {
    fn of(&self, subject: Subject) -> Location {
        match subject {
            Subject::Reference => self.reference,
            Subject::Mode => self.mode.unwrap_or(self.reference),
            Subject::Day => self.day.unwrap_or(self.reference),
        }
    }
}

impl From<Location> for LeafLocations {
    fn from(reference: Location) -> Self {
        Self {
            reference,
            mode: None,
            day: None,
        }
    }
}

/// Template properties that determine the liturgical day.
#[derive(Debug, Clone, Copy)]
struct DateProperties {
    kind: CalendarKind,
    month: Option<u32>,
    day: Option<u32>,
    year: Option<i32>,
}

#[derive(Debug)]
struct LookupFrame {
    library: Option<u8>,
    references: Vec<Reference>,
    in_slot: bool,
}

/// Builds an [`Alt`] from enter/exit events.
pub struct DocumentBuilder<'a, I: ?Sized> {
    resolver: ReferenceResolver<'a, I>,
    options: CompilerOptions,
    name: String,
    alt: Alt,
    diagnostics: DiagnosticCollector,
    paragraph: Option<Paragraph>,
    spans: Vec<Span>,
    page_block: Option<PageBlock>,
    slot: SlotTarget,
    lookup: Option<LookupFrame>,
    month: Option<u32>,
    day: Option<u32>,
    year: Option<i32>,
    last_location: Location,
}

impl<'a, I: TopicKeyIndex + ?Sized> DocumentBuilder<'a, I> {
    /// Create a builder for the template called `name`.
    ///
    /// `name` identifies the template in diagnostics until an `ID` property
    /// is read. The liturgical day starts at the reference date of
    /// `options`.
    pub fn new(index: &'a I, options: CompilerOptions, name: impl Into<String>) -> CompileResult<Self> {
        let ldp = LiturgicalDay::compute(options.reference_date, options.default_calendar)?;
        let name = name.into();
        Ok(Self {
            resolver: ReferenceResolver::new(index),
            alt: Alt::new(name.clone(), ldp),
            options,
            name,
            diagnostics: DiagnosticCollector::new(),
            paragraph: None,
            spans: Vec::new(),
            page_block: None,
            slot: SlotTarget::Outside,
            lookup: None,
            month: None,
            day: None,
            year: None,
            last_location: Location::new(1, 1),
        })
    }

    /// Add diagnostics found before the walk, such as syntax errors.
    pub fn merge_diagnostics(&mut self, diagnostics: DiagnosticCollector) {
        self.diagnostics.merge(diagnostics);
    }

    pub fn enter(&mut self, node: &Node) -> CompileResult<()> {
        self.last_location = node.location();
        match node {
            Node::Template(_) => {}
            Node::Property(p) => self.property(p),
            Node::PageBlock(b) => self.enter_page_block(b),
            Node::Position(p) => self.enter_position(p),
            Node::Directive(d) => self.directive(d),
            Node::Lookup(l) => self.enter_lookup(l),
            Node::Paragraph(p) => self.enter_paragraph(p),
            Node::Span(s) => self.enter_span(s),
            Node::Nid(n) => self.leaf(ReferenceKind::Nid, &n.text, Overrides::default(), None, n.location.into())?,
            Node::Rid(r) => {
                let overrides = Overrides {
                    mode: r.mode_override(),
                    day: r.day_override(),
                };
                let at = LeafLocations {
                    reference: r.location,
                    mode: r.last_override(OverrideKind::Mode).map(|o| o.location),
                    day: r.last_override(OverrideKind::Day).map(|o| o.location),
                };
                self.leaf(ReferenceKind::Rid, &r.path, overrides, None, at)?
            }
            Node::Sid(s) => self.leaf(ReferenceKind::Sid, &s.path, Overrides::default(), None, s.location.into())?,
            Node::Media(m) => self.leaf(
                ReferenceKind::Sid,
                &m.path,
                Overrides::default(),
                Some(CLASS_MEDIA),
                m.location.into(),
            )?,
        }
        Ok(())
    }

    pub fn exit(&mut self, node: &Node) {
        match node {
            Node::PageBlock(b) => self.exit_page_block(b),
            Node::Position(_) => self.slot = SlotTarget::Outside,
            Node::Lookup(l) => self.exit_lookup(l),
            Node::Paragraph(p) => self.exit_paragraph(p),
            Node::Span(s) => self.exit_span(s.location),
            Node::Template(_)
            | Node::Property(_)
            | Node::Directive(_)
            | Node::Nid(_)
            | Node::Rid(_)
            | Node::Sid(_)
            | Node::Media(_) => {}
        }
    }

    /// Close the template and return the document with its diagnostics.
    pub fn finish(mut self) -> Compilation {
        let location = self.last_location;
        if self.lookup.take().is_some() {
            self.diagnostics.semantic_at("@Lookup not closed", location);
        }
        if !self.spans.is_empty() {
            self.diagnostics.semantic_at("span not closed", location);
        }
        if self.paragraph.is_some() {
            self.diagnostics.semantic_at("paragraph not closed", location);
            self.close_paragraph(false);
        }
        if let Some(block) = self.page_block.take() {
            self.diagnostics
                .semantic_at("page header or footer not closed", location);
            self.alt.pdf.layout.add(block);
        }

        if self.alt.template_type == TemplateType::Service
            && (self.month.is_none() || self.day.is_none())
        {
            self.diagnostics.semantic_at(
                "service template requires Month and Day properties",
                Location::new(1, 1),
            );
        }

        let date = self.alt.ldp.date;
        let layout = &mut self.alt.pdf.layout;
        for block in layout.headers.iter_mut().chain(layout.footers.iter_mut()) {
            for directive in block.directives_mut() {
                if let Directive::InsertDate { date: d, .. } = directive {
                    *d = Some(date);
                }
            }
        }

        let id = if self.alt.id.is_empty() {
            self.name.clone()
        } else {
            self.alt.id.clone()
        };
        debug!(
            template = %id,
            paragraphs = self.alt.paragraphs.len(),
            errors = self.diagnostics.len(),
            "compiled template"
        );
        Compilation {
            errors: self.diagnostics.into_parse_errors(&id),
            template: self.alt,
        }
    }

    // Properties

    fn property(&mut self, p: &ast::Property) {
        let at = p.location;
        match p.name.as_str() {
            "ID" => {
                if let Some(id) = self.string_value(p) {
                    if id.is_empty() {
                        self.diagnostics.semantic_at("ID cannot be empty", at);
                    } else if !id.contains('/') {
                        self.diagnostics.semantic_at(
                            format!("expecting at least one forward slash in ID path \"{id}\""),
                            at,
                        );
                    } else {
                        self.alt.id = id;
                    }
                }
            }
            "Type" => {
                if let Some(text) = self.string_value(p) {
                    match text.parse::<TemplateType>() {
                        Ok(t) => self.alt.template_type = t,
                        Err(e) => self.diagnostics.semantic_at(e.to_string(), at),
                    }
                }
            }
            "Status" => {
                if let Some(text) = self.string_value(p) {
                    match text.parse::<Status>() {
                        Ok(s) => self.alt.status = s,
                        Err(e) => self.diagnostics.semantic_at(e.to_string(), at),
                    }
                }
            }
            "Calendar" => {
                if let Some(text) = self.string_value(p) {
                    match text.parse::<CalendarKind>() {
                        Ok(kind) => {
                            self.set_date(DateProperties { kind, ..self.date_properties() }, at);
                        }
                        Err(e) => self.diagnostics.semantic_at(e.to_string(), at),
                    }
                }
            }
            "HtmlCss" => {
                if let Some(text) = self.string_value(p) {
                    self.alt.html_css = text;
                }
            }
            "PdfCss" => {
                if let Some(text) = self.string_value(p) {
                    self.alt.pdf.css = text;
                }
            }
            "Title" => {
                if let Some(text) = self.string_value(p) {
                    self.alt.pdf.title = text;
                }
            }
            "Month" => {
                if let Some(n) = self.int_value(p) {
                    if (1..=12).contains(&n) {
                        let month = Some(n as u32);
                        self.set_date(DateProperties { month, ..self.date_properties() }, at);
                    } else {
                        self.diagnostics.semantic_at(
                            format!("invalid Month {n}, expected value between 1 and 12"),
                            at,
                        );
                    }
                }
            }
            "Day" => {
                if let Some(n) = self.int_value(p) {
                    if (1..=31).contains(&n) {
                        let day = Some(n as u32);
                        self.set_date(DateProperties { day, ..self.date_properties() }, at);
                    } else {
                        self.diagnostics.semantic_at(
                            format!("invalid Day {n}, expected value between 1 and 31"),
                            at,
                        );
                    }
                }
            }
            "Year" => {
                if let Some(n) = self.int_value(p) {
                    if n == 0 {
                        self.set_date(DateProperties { year: None, ..self.date_properties() }, at);
                    } else if (i64::from(MIN_YEAR)..=i64::from(MAX_YEAR)).contains(&n) {
                        let year = Some(n as i32);
                        self.set_date(DateProperties { year, ..self.date_properties() }, at);
                    } else {
                        self.diagnostics.semantic_at(
                            format!("invalid Year {n}, expected value between {MIN_YEAR} and {MAX_YEAR}"),
                            at,
                        );
                    }
                }
            }
            "SetPageNumber" => {
                if let Some(n) = self.int_value(p) {
                    match u32::try_from(n) {
                        Ok(page) if page >= 1 => self.alt.pdf.page_number = page,
                        _ => self.diagnostics.semantic_at(
                            format!("invalid SetPageNumber {n}, expected a value of 1 or more"),
                            at,
                        ),
                    }
                }
            }
            other => self.diagnostics.semantic_at(
                format!("unknown property '{other}', expected one of {PROPERTIES}"),
                at,
            ),
        }
    }

    fn string_value(&mut self, p: &ast::Property) -> Option<String> {
        match &p.value {
            Value::Str(s) => Some(s.clone()),
            Value::Int(_) => {
                self.diagnostics.semantic_at(
                    format!("invalid {} {}, expected a quoted string", p.name, p.value),
                    p.location,
                );
                None
            }
        }
    }

    fn int_value(&mut self, p: &ast::Property) -> Option<i64> {
        match &p.value {
            Value::Int(n) => Some(*n),
            Value::Str(_) => {
                self.diagnostics.semantic_at(
                    format!("invalid {} {}, expected an integer", p.name, p.value),
                    p.location,
                );
                None
            }
        }
    }

    fn date_properties(&self) -> DateProperties {
        DateProperties {
            kind: self.alt.calendar,
            month: self.month,
            day: self.day,
            year: self.year,
        }
    }

    /// Apply new date properties if they name a real liturgical day.
    ///
    /// Until both Month and Day are known the reference date is used. When
    /// the date does not exist the previous properties stay in effect.
    fn set_date(&mut self, date: DateProperties, at: Location) {
        let DateProperties { kind, month, day, year } = date;
        let result = match (month, day, year) {
            (Some(month), Some(day), Some(year)) => LiturgicalDay::from_ymd(year, month, day, kind),
            (Some(month), Some(day), None) => {
                LiturgicalDay::from_month_day(month, day, kind, self.options.reference_date)
            }
            _ => LiturgicalDay::compute(self.options.reference_date, kind),
        };
        match result {
            Ok(ldp) => {
                self.month = month;
                self.day = day;
                self.year = year;
                self.alt.calendar = kind;
                self.alt.month = month;
                self.alt.day = day;
                self.alt.year = if month.is_some() && day.is_some() {
                    Some(ldp.year)
                } else {
                    year
                };
                self.alt.ldp = ldp;
            }
            Err(e) => self.diagnostics.semantic_at(e.to_string(), at),
        }
    }

    // Headers and footers

    fn enter_page_block(&mut self, b: &ast::PageBlock) {
        if self.page_block.is_some() {
            self.diagnostics.semantic_at(
                "page header or footer starts before the previous one ends",
                b.location,
            );
        }
        self.page_block = Some(PageBlock::new(b.kind, b.parity));
        self.slot = SlotTarget::Outside;
    }

    fn exit_page_block(&mut self, b: &ast::PageBlock) {
        match self.page_block.take() {
            Some(block) => self.alt.pdf.layout.add(block),
            None => self
                .diagnostics
                .semantic_at("unexpected end of page header or footer", b.location),
        }
        self.slot = SlotTarget::Outside;
    }

    fn enter_position(&mut self, p: &ast::Position) {
        if self.page_block.is_none() {
            self.diagnostics.semantic_at(
                format!("slot '{}' outside a page header or footer", p.slot),
                p.location,
            );
            self.slot = SlotTarget::Rejected;
            return;
        }
        self.slot = match p.slot.parse::<Slot>() {
            Ok(slot) => SlotTarget::Open(slot),
            Err(e) => {
                self.diagnostics.semantic_at(e.to_string(), p.location);
                SlotTarget::Rejected
            }
        };
    }

    fn push_directive(&mut self, directive: Directive) {
        if let (SlotTarget::Open(slot), Some(block)) = (self.slot, self.page_block.as_mut()) {
            block.slot_mut(slot).push(directive);
        }
    }

    fn directive(&mut self, d: &ast::Directive) {
        let directive = match d.name.as_str() {
            "Date" => Directive::date(Some(self.alt.ldp.date)),
            "PageNbr" => Directive::page_number(),
            other => {
                self.diagnostics.semantic_at(
                    format!("unknown directive @{other}, expected one of @Date, @PageNbr, @Lookup"),
                    d.location,
                );
                return;
            }
        };
        match self.slot {
            SlotTarget::Open(_) => self.push_directive(directive),
            SlotTarget::Rejected => {}
            SlotTarget::Outside => self.diagnostics.semantic_at(
                format!("directive @{} outside a header/footer slot", d.name),
                d.location,
            ),
        }
    }

    fn enter_lookup(&mut self, l: &ast::Lookup) {
        let in_slot = self.slot != SlotTarget::Outside;
        if !in_slot {
            self.diagnostics
                .semantic_at("@Lookup outside a header/footer slot", l.location);
        }
        let library = match l.library {
            Some(n @ 1..=3) => Some(n as u8),
            Some(n) => {
                self.diagnostics.semantic_at(
                    format!("invalid language number {n}, expected 1, 2, or 3"),
                    l.location,
                );
                None
            }
            None => {
                self.diagnostics.semantic_at(
                    "@Lookup requires a language number: lang 1, 2, or 3",
                    l.location,
                );
                None
            }
        };
        self.lookup = Some(LookupFrame {
            library,
            references: Vec::new(),
            in_slot,
        });
    }

    fn exit_lookup(&mut self, l: &ast::Lookup) {
        let Some(frame) = self.lookup.take() else {
            self.diagnostics
                .semantic_at("unexpected end of @Lookup", l.location);
            return;
        };
        if frame.references.is_empty() {
            self.diagnostics
                .semantic_at("@Lookup requires at least one sid or rid", l.location);
            return;
        }
        if let (Some(library), true) = (frame.library, frame.in_slot) {
            self.push_directive(Directive::lookup(Lookup {
                references: frame.references,
                library,
            }));
        }
    }

    // Body

    fn enter_paragraph(&mut self, p: &ast::Paragraph) {
        if self.paragraph.is_some() {
            self.diagnostics.semantic_at(
                "paragraph starts before the previous one ends",
                p.location,
            );
            self.close_paragraph(false);
        }
        self.paragraph = Some(Paragraph::new(p.class.clone()));
    }

    fn exit_paragraph(&mut self, p: &ast::Paragraph) {
        if self.paragraph.is_none() {
            self.diagnostics
                .semantic_at("unexpected end of paragraph", p.location);
            return;
        }
        if !self.spans.is_empty() {
            self.diagnostics
                .semantic_at("span not closed before end of paragraph", p.location);
        }
        self.close_paragraph(p.version);
    }

    /// Attach any open spans and move the paragraph into the document.
    fn close_paragraph(&mut self, version: bool) {
        while let Some(span) = self.spans.pop() {
            self.attach_span(span);
        }
        if let Some(mut paragraph) = self.paragraph.take() {
            if version {
                paragraph.add_version();
            }
            self.alt.paragraphs.push(paragraph);
        }
    }

    fn enter_span(&mut self, s: &ast::Span) {
        if self.paragraph.is_none() {
            self.diagnostics
                .semantic_at(format!("span '{}' outside a paragraph", s.class), s.location);
        }
        self.spans.push(Span::new(s.class.clone()));
    }

    fn exit_span(&mut self, at: Location) {
        match self.spans.pop() {
            Some(span) => self.attach_span(span),
            None => self.diagnostics.semantic_at("unexpected end of span", at),
        }
    }

    /// Re-parent a span onto the enclosing span, or the paragraph.
    fn attach_span(&mut self, span: Span) {
        if let Some(parent) = self.spans.last_mut() {
            parent.children.push(span);
        } else if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.spans.push(span);
        }
    }

    fn leaf(
        &mut self,
        kind: ReferenceKind,
        raw: &str,
        overrides: Overrides,
        class: Option<&str>,
        locations: LeafLocations,
    ) -> CompileResult<()> {
        let resolved = self
            .resolver
            .resolve(kind, raw, overrides, &self.alt.ldp)?;
        for message in resolved.messages {
            self.diagnostics
                .semantic_at(message.text, locations.of(message.subject));
        }
        let at = locations.reference;
        let reference = resolved.reference;

        if let Some(frame) = self.lookup.as_mut() {
            match (kind, class) {
                (ReferenceKind::Rid | ReferenceKind::Sid, None) => frame.references.push(reference),
                _ => self
                    .diagnostics
                    .semantic_at("@Lookup accepts only sid and rid references", at),
            }
            return Ok(());
        }

        let span = match class {
            Some(class) => Span::leaf_with_class(class, reference),
            None => Span::leaf(reference),
        };
        if let Some(parent) = self.spans.last_mut() {
            parent.children.push(span);
        } else if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.spans.push(span);
        } else if self.slot != SlotTarget::Outside {
            match span.reference {
                Some(Reference::Nid { text }) if class.is_none() => {
                    self.push_directive(Directive::literal(text));
                }
                _ => self.diagnostics.semantic_at(
                    "only nid, @Date, @PageNbr, and @Lookup may appear in a header/footer slot",
                    at,
                ),
            }
        } else {
            self.diagnostics
                .semantic_at(format!("'{raw}' outside a paragraph"), at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Nid, PageBlock as AstPageBlock, Paragraph as AstParagraph, Position, Span as AstSpan};
    use crate::index::NullIndex;
    use crate::model::{PageKind, Parity};
    use chrono::NaiveDate;

    fn options() -> CompilerOptions {
        CompilerOptions::new(
            CalendarKind::Gregorian,
            NaiveDate::from_ymd_opt(2021, 1, 10).unwrap(),
        )
    }

    fn at(line: usize) -> Location {
        Location::new(line, 1)
    }

    fn prop(name: &str, value: Value) -> Node {
        Node::Property(ast::Property {
            name: name.to_string(),
            value,
            location: at(1),
        })
    }

    fn messages(c: &Compilation) -> Vec<&str> {
        c.errors.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn test_initial_ldp_uses_reference_date() {
        let builder = DocumentBuilder::new(&NullIndex, options(), "t/x").unwrap();
        let c = builder.finish();
        assert_eq!(c.template.ldp.date, NaiveDate::from_ymd_opt(2021, 1, 10).unwrap());
        assert_eq!(c.template.id, "t/x");
    }

    #[test]
    fn test_month_day_without_year_moves_forward() {
        let mut b = DocumentBuilder::new(&NullIndex, options(), "t/x").unwrap();
        b.enter(&prop("Month", Value::Int(1))).unwrap();
        b.enter(&prop("Day", Value::Int(6))).unwrap();
        let c = b.finish();
        assert!(c.errors.is_empty());
        assert_eq!(c.template.ldp.date, NaiveDate::from_ymd_opt(2022, 1, 6).unwrap());
        assert_eq!(c.template.year, Some(2022));
    }

    #[test]
    fn test_invalid_values_keep_last_valid() {
        let mut b = DocumentBuilder::new(&NullIndex, options(), "t/x").unwrap();
        b.enter(&prop("Month", Value::Int(4))).unwrap();
        b.enter(&prop("Month", Value::Int(13))).unwrap();
        b.enter(&prop("Status", Value::Str("pending".to_string()))).unwrap();
        let c = b.finish();
        assert_eq!(c.template.month, Some(4));
        assert_eq!(c.template.status, Status::Na);
        assert_eq!(c.errors.len(), 2);
        assert_eq!(c.errors[0].message, "invalid Month 13, expected value between 1 and 12");
    }

    #[test]
    fn test_unmatched_span_exit_is_diagnostic() {
        let mut b = DocumentBuilder::new(&NullIndex, options(), "t/x").unwrap();
        let span = Node::Span(AstSpan {
            class: "span.it".to_string(),
            children: Vec::new(),
            location: at(3),
        });
        b.exit(&span);
        let c = b.finish();
        assert_eq!(messages(&c), vec!["unexpected end of span"]);
    }

    #[test]
    fn test_nid_in_slot_becomes_literal() {
        let mut b = DocumentBuilder::new(&NullIndex, options(), "t/x").unwrap();
        let block = Node::PageBlock(AstPageBlock {
            kind: PageKind::Footer,
            parity: Parity::Odd,
            children: Vec::new(),
            location: at(1),
        });
        let position = Node::Position(Position {
            slot: "right".to_string(),
            children: Vec::new(),
            location: at(1),
        });
        let nid = Node::Nid(Nid {
            text: "Vespers".to_string(),
            location: at(1),
        });
        b.enter(&block).unwrap();
        b.enter(&position).unwrap();
        b.enter(&nid).unwrap();
        b.exit(&nid);
        b.exit(&position);
        b.exit(&block);
        let c = b.finish();
        assert!(c.errors.is_empty());
        let footer = c.template.pdf.layout.footer_for(Parity::Odd).unwrap();
        assert_eq!(footer.right, vec![Directive::literal("Vespers")]);
    }

    #[test]
    fn test_unclosed_paragraph_is_kept() {
        let mut b = DocumentBuilder::new(&NullIndex, options(), "t/x").unwrap();
        let p = Node::Paragraph(AstParagraph {
            class: "p.hymn".to_string(),
            children: Vec::new(),
            version: false,
            location: at(2),
        });
        b.enter(&p).unwrap();
        let c = b.finish();
        assert_eq!(messages(&c), vec!["paragraph not closed"]);
        assert_eq!(c.template.paragraphs.len(), 1);
    }
}
