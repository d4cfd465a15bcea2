/*
 * lexer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! LML tokenizer.
//!
//! Tokens:
//!
//! - Strings in double quotes, with `\"`, `\\`, `\n`, and `\t` escapes
//! - Integers, optionally negative
//! - Words: identifiers and style classes such as `p.hymn` or `span.it`
//! - `@Word` directives and overrides
//! - Punctuation: `=`, `{`, `}`, `(`, `)`
//!
//! `//` starts a comment that runs to the end of the line.

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_while, take_while1};
use nom::character::complete::{char, line_ending, multispace1, none_of, not_line_ending};
use nom::combinator::{map, opt, recognize, value};
use nom::multi::{fold_many0, many0_count};
use nom::sequence::{delimited, pair, preceded};
use nom::{IResult, Parser};

use crate::ast::Location;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Str(String),
    Int(i64),
    Word(String),
    /// `@Name`, without the `@`.
    At(String),
    Equals,
    LBrace,
    RBrace,
    LParen,
    RParen,
    /// Unrecognized character or malformed literal.
    Error(String),
    Eof,
}

impl TokenKind {
    /// Short description for "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Str(s) => format!("string \"{s}\""),
            TokenKind::Int(n) => format!("integer {n}"),
            TokenKind::Word(w) => format!("'{w}'"),
            TokenKind::At(w) => format!("'@{w}'"),
            TokenKind::Equals => "'='".to_string(),
            TokenKind::LBrace => "'{'".to_string(),
            TokenKind::RBrace => "'}'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Error(message) => message.clone(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
}

/// Splits LML source into tokens, ending with [`TokenKind::Eof`].
///
/// Lexing never fails: anything that is not a token becomes a
/// [`TokenKind::Error`] and scanning resumes after it.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut cursor = Cursor::default();
    let mut rest = source;
    let mut tokens = Vec::new();
    loop {
        let after_trivia = skip_trivia(rest);
        cursor.advance(&rest[..rest.len() - after_trivia.len()]);
        rest = after_trivia;
        let location = cursor.location();
        if rest.is_empty() {
            tokens.push(Token {
                kind: TokenKind::Eof,
                location,
            });
            return tokens;
        }
        let (remaining, kind) = token(rest).unwrap_or_else(|_| unexpected(rest));
        cursor.advance(&rest[..rest.len() - remaining.len()]);
        rest = remaining;
        tokens.push(Token { kind, location });
    }
}

/// Line and column of the next unread character.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    line: usize,
    column: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl Cursor {
    fn advance(&mut self, consumed: &str) {
        for c in consumed.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '*')
}

/// Whitespace and `//` comments.
fn skip_trivia(input: &str) -> &str {
    let comment = recognize(pair(tag("//"), not_line_ending::<&str, nom::error::Error<&str>>));
    match many0_count(alt((multispace1, comment))).parse(input) {
        Ok((rest, _)) => rest,
        Err(_) => input,
    }
}

fn token(input: &str) -> IResult<&str, TokenKind> {
    alt((string, punctuation, directive, word_or_integer)).parse(input)
}

/// Consumes one character that starts no token.
fn unexpected(input: &str) -> (&str, TokenKind) {
    let mut chars = input.chars();
    let kind = match chars.next() {
        Some(c) => TokenKind::Error(format!("unexpected character '{c}'")),
        None => TokenKind::Eof,
    };
    (chars.as_str(), kind)
}

fn punctuation(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::Equals, char('=')),
        value(TokenKind::LBrace, char('{')),
        value(TokenKind::RBrace, char('}')),
        value(TokenKind::LParen, char('(')),
        value(TokenKind::RParen, char(')')),
    ))
    .parse(input)
}

fn directive(input: &str) -> IResult<&str, TokenKind> {
    map(preceded(char('@'), take_while(is_word_char)), |name: &str| {
        if name.is_empty() {
            TokenKind::Error("expected a name after '@'".to_string())
        } else {
            TokenKind::At(name.to_string())
        }
    })
    .parse(input)
}

fn word_or_integer(input: &str) -> IResult<&str, TokenKind> {
    map(take_while1(is_word_char), |text: &str| match text.parse::<i64>() {
        Ok(n) => TokenKind::Int(n),
        Err(_) if text.starts_with('-') => TokenKind::Error(format!("invalid integer '{text}'")),
        Err(_) => TokenKind::Word(text.to_string()),
    })
    .parse(input)
}

enum StringPart<'a> {
    Literal(&'a str),
    Escaped(char),
}

/// A double-quoted string on one line.
///
/// An unterminated string consumes the rest of its line.
fn string(input: &str) -> IResult<&str, TokenKind> {
    let part = alt((
        map(is_not("\"\\\n"), StringPart::Literal),
        map(preceded(char('\\'), none_of("\n")), StringPart::Escaped),
    ));
    let body = fold_many0(part, String::new, |mut text, part| {
        match part {
            StringPart::Literal(s) => text.push_str(s),
            StringPart::Escaped('n') => text.push('\n'),
            StringPart::Escaped('t') => text.push('\t'),
            StringPart::Escaped(c @ ('"' | '\\')) => text.push(c),
            StringPart::Escaped(c) => {
                text.push('\\');
                text.push(c);
            }
        }
        text
    });
    let terminated = map(delimited(char('"'), body, char('"')), TokenKind::Str);
    let unterminated = value(
        TokenKind::Error("unterminated string".to_string()),
        (char('"'), not_line_ending, opt(line_ending)),
    );
    alt((terminated, unterminated)).parse(input)
}
