/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Recursive descent parser for LML.
//!
//! ```text
//! template  := item* EOF
//! item      := property | pageBlock | '{' para* '}'
//! property  := NAME '=' (STRING | INTEGER)
//! pageBlock := ('PageHeader' | 'PageFooter') ('Even' | 'Odd')? '=' position+
//! position  := SLOT slotItem+
//! slotItem  := '@Date' | '@PageNbr' | '@Lookup' ref+ ('lang' INTEGER)? | 'nid' STRING
//! para      := 'p.' CLASS content+ '@Ver'?
//! content   := leaf | span
//! span      := 'span.' CLASS leaf* ('(' content+ ')')?
//! leaf      := ('nid' | 'sid' | 'media') STRING | ref
//! ref       := 'rid' STRING ('@Mode' INTEGER | '@Day' INTEGER)* | 'sid' STRING
//! ```
//!
//! Syntax errors are collected and parsing resumes at the next paragraph,
//! closing brace, or top-level item, so one mistake does not hide the rest
//! of the template. Values are not validated here; property names, slot
//! names, and directive names are checked by the document builder.

use crate::ast::{
    Directive, Location, Lookup, Media, Nid, Node, Override, OverrideKind, PageBlock, Paragraph,
    Position, Property, Rid, Sid, Span, Template, Value,
};
use crate::diagnostics::DiagnosticCollector;
use crate::lexer::{Token, TokenKind, tokenize};
use crate::model::{PageKind, Parity};

/// Result of parsing LML source.
#[derive(Debug)]
pub struct ParseOutput {
    pub template: Template,
    /// Syntax errors, in order of discovery.
    pub diagnostics: DiagnosticCollector,
}

/// Parse LML source into a [`Template`].
///
/// Always returns a template; syntax errors are in the output's diagnostics.
pub fn parse(source: &str) -> ParseOutput {
    let mut parser = Parser {
        tokens: tokenize(source),
        pos: 0,
        diagnostics: DiagnosticCollector::new(),
        last_error: None,
    };
    let template = parser.template();
    ParseOutput {
        template,
        diagnostics: parser.diagnostics,
    }
}

fn is_paragraph_class(word: &str) -> bool {
    word.starts_with("p.") && word.len() > 2
}

fn is_span_class(word: &str) -> bool {
    word.starts_with("span.") && word.len() > 5
}

fn page_block_kind(word: &str) -> Option<(PageKind, Parity)> {
    let (kind, rest) = if let Some(rest) = word.strip_prefix("PageHeader") {
        (PageKind::Header, rest)
    } else if let Some(rest) = word.strip_prefix("PageFooter") {
        (PageKind::Footer, rest)
    } else {
        return None;
    };
    let parity = match rest {
        "" => Parity::Both,
        "Even" => Parity::Even,
        "Odd" => Parity::Odd,
        _ => return None,
    };
    Some((kind, parity))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: DiagnosticCollector,
    /// Token of the last syntax error, so a token is reported at most once.
    last_error: Option<usize>,
}

impl Parser {
    fn peek(&self) -> &Token {
        // tokenize always ends with Eof, which is never consumed
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_second(&self) -> &TokenKind {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn peek_word(&self) -> Option<&str> {
        match self.peek_kind() {
            TokenKind::Word(w) => Some(w.as_str()),
            _ => None,
        }
    }

    fn at_eof(&self) -> bool {
        *self.peek_kind() == TokenKind::Eof
    }

    /// Records "expected X, found Y" at the current token.
    fn expected(&mut self, what: &str) {
        if self.last_error == Some(self.pos) {
            return;
        }
        self.last_error = Some(self.pos);
        let token = self.peek();
        let message = match &token.kind {
            TokenKind::Error(message) => message.clone(),
            other => format!("expected {what}, found {}", other.describe()),
        };
        let location = token.location;
        self.diagnostics.syntax_at(message, location);
    }

    fn starts_top_level_item(&self) -> bool {
        match self.peek_kind() {
            TokenKind::LBrace | TokenKind::Eof => true,
            TokenKind::Word(_) => *self.peek_second() == TokenKind::Equals,
            _ => false,
        }
    }

    fn template(&mut self) -> Template {
        let mut children = Vec::new();
        while !self.at_eof() {
            match self.peek_kind() {
                TokenKind::LBrace => self.body(&mut children),
                TokenKind::Word(word) if *self.peek_second() == TokenKind::Equals => {
                    match page_block_kind(word) {
                        Some((kind, parity)) => children.push(self.page_block(kind, parity)),
                        None => {
                            if let Some(property) = self.property() {
                                children.push(property);
                            }
                        }
                    }
                }
                _ => {
                    self.expected("a property, page header or footer, or '{'");
                    self.advance();
                    while !self.starts_top_level_item() {
                        self.advance();
                    }
                }
            }
        }
        Template {
            children,
            location: Location::new(1, 1),
        }
    }

    fn property(&mut self) -> Option<Node> {
        let name = self.advance();
        self.advance();
        let value = match self.peek_kind() {
            TokenKind::Str(s) => Value::Str(s.clone()),
            TokenKind::Int(n) => Value::Int(*n),
            _ => {
                self.expected("a string or integer value");
                return None;
            }
        };
        self.advance();
        let TokenKind::Word(name_text) = name.kind else {
            return None;
        };
        Some(Node::Property(Property {
            name: name_text,
            value,
            location: name.location,
        }))
    }

    fn page_block(&mut self, kind: PageKind, parity: Parity) -> Node {
        let start = self.advance().location;
        self.advance();
        let mut children = Vec::new();
        while let Some(word) = self.peek_word() {
            if *self.peek_second() == TokenKind::Equals {
                break;
            }
            let slot = word.to_string();
            children.push(self.position(slot));
        }
        if children.is_empty() {
            self.expected("a header/footer slot position");
        }
        Node::PageBlock(PageBlock {
            kind,
            parity,
            children,
            location: start,
        })
    }

    fn position(&mut self, slot: String) -> Node {
        let start = self.advance().location;
        let mut children = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::At(name) if name == "Lookup" => {
                    children.push(self.lookup());
                }
                TokenKind::At(name) => {
                    let name = name.clone();
                    let location = self.advance().location;
                    children.push(Node::Directive(Directive { name, location }));
                }
                TokenKind::Word(w) if w == "nid" => {
                    if let Some(leaf) = self.leaf() {
                        children.push(leaf);
                    }
                }
                _ => break,
            }
        }
        if children.is_empty() {
            self.expected(&format!("@Date, @PageNbr, @Lookup, or nid after slot '{slot}'"));
        }
        Node::Position(Position {
            slot,
            children,
            location: start,
        })
    }

    fn lookup(&mut self) -> Node {
        let start = self.advance().location;
        let mut children = Vec::new();
        while matches!(self.peek_word(), Some("sid" | "rid")) {
            if let Some(leaf) = self.leaf() {
                children.push(leaf);
            }
        }
        let mut library = None;
        if self.peek_word() == Some("lang") {
            self.advance();
            match self.peek_kind() {
                TokenKind::Int(n) => {
                    library = Some(*n);
                    self.advance();
                }
                _ => self.expected("a library number after 'lang'"),
            }
        }
        Node::Lookup(Lookup {
            children,
            library,
            location: start,
        })
    }

    fn body(&mut self, out: &mut Vec<Node>) {
        self.advance();
        loop {
            match self.peek_kind() {
                TokenKind::RBrace => {
                    self.advance();
                    return;
                }
                TokenKind::Eof => {
                    self.expected("'}'");
                    return;
                }
                TokenKind::Word(w) if is_paragraph_class(w) => {
                    let class = w.clone();
                    out.push(self.paragraph(class));
                }
                _ => {
                    self.expected("a paragraph style such as 'p.hymn'");
                    self.advance();
                    self.skip_to_paragraph();
                }
            }
        }
    }

    fn skip_to_paragraph(&mut self) {
        loop {
            match self.peek_kind() {
                TokenKind::RBrace | TokenKind::Eof => return,
                TokenKind::Word(w) if is_paragraph_class(w) => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn paragraph(&mut self, class: String) -> Node {
        let location = self.advance().location;
        let children = self.contents();
        if children.is_empty() {
            self.expected(&format!("content for paragraph '{class}'"));
        }
        let version = matches!(self.peek_kind(), TokenKind::At(name) if name == "Ver");
        if version {
            self.advance();
        }
        Node::Paragraph(Paragraph {
            class,
            children,
            version,
            location,
        })
    }

    fn contents(&mut self) -> Vec<Node> {
        let mut children = Vec::new();
        loop {
            match self.peek_word() {
                Some("nid" | "sid" | "rid" | "media") => {
                    if let Some(leaf) = self.leaf() {
                        children.push(leaf);
                    }
                }
                Some(w) if is_span_class(w) => {
                    let class = w.to_string();
                    children.push(self.span(class));
                }
                _ => return children,
            }
        }
    }

    fn span(&mut self, class: String) -> Node {
        let location = self.advance().location;
        let mut children = Vec::new();
        while matches!(self.peek_word(), Some("nid" | "sid" | "rid" | "media")) {
            if let Some(leaf) = self.leaf() {
                children.push(leaf);
            }
        }
        if *self.peek_kind() == TokenKind::LParen {
            let open = self.advance().location;
            let nested = self.contents();
            if nested.is_empty() {
                self.expected(&format!("content inside '(' of '{class}'"));
            }
            children.extend(nested);
            if *self.peek_kind() == TokenKind::RParen {
                self.advance();
            } else {
                self.expected(&format!("')' to close the '(' at {open}"));
            }
        } else if children.is_empty() {
            self.diagnostics
                .syntax_at(format!("span '{class}' has no content"), location);
        }
        Node::Span(Span {
            class,
            children,
            location,
        })
    }

    /// `nid`, `sid`, `rid`, or `media` followed by a string.
    fn leaf(&mut self) -> Option<Node> {
        let token = self.advance();
        let TokenKind::Word(keyword) = token.kind else {
            return None;
        };
        let location = token.location;
        let path = match self.peek_kind() {
            TokenKind::Str(s) => s.clone(),
            _ => {
                self.expected(&format!("a string after '{keyword}'"));
                return None;
            }
        };
        self.advance();
        let node = match keyword.as_str() {
            "nid" => Node::Nid(Nid {
                text: path,
                location,
            }),
            "sid" => Node::Sid(Sid { path, location }),
            "media" => Node::Media(Media { path, location }),
            _ => Node::Rid(Rid {
                path,
                overrides: self.overrides(),
                location,
            }),
        };
        Some(node)
    }

    fn overrides(&mut self) -> Vec<Override> {
        let mut overrides = Vec::new();
        loop {
            let kind = match self.peek_kind() {
                TokenKind::At(name) if name == "Mode" => OverrideKind::Mode,
                TokenKind::At(name) if name == "Day" => OverrideKind::Day,
                _ => return overrides,
            };
            let location = self.advance().location;
            match self.peek_kind() {
                TokenKind::Int(value) => {
                    overrides.push(Override {
                        kind,
                        value: *value,
                        location,
                    });
                    self.advance();
                }
                _ => self.expected("an integer"),
            }
        }
    }
}
