//! Tokenizer for type-constraint strings.
//!
//! Single forward pass, one token of lookahead. Once a bad character has been
//! seen the lexer keeps reporting it.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::ast::{Position, Source};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Name,
    ParenL,
    ParenR,
    BraceL,
    BraceR,
    Equals,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Name => "Name",
            Self::ParenL => "\"(\"",
            Self::ParenR => "\")\"",
            Self::BraceL => "\"{\"",
            Self::BraceR => "\"}\"",
            Self::Equals => "\"=\"",
            Self::Eof => "<EOF>",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub value: &'src str,
    pub pos: Position<'src>,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Name => write!(f, "Name \"{}\"", self.value),
            kind => fmt::Display::fmt(&kind, f),
        }
    }
}

pub struct Lexer<'src> {
    src: &'src Source,
    chars: Peekable<CharIndices<'src>>,
    // cursor, in code points
    offset: usize,
    line: usize,
    column: usize,
    peeked: Option<Token<'src>>,
    poisoned: Option<(char, Position<'src>)>,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src Source) -> Self {
        Self {
            src,
            chars: src.input.char_indices().peekable(),
            offset: 0,
            line: 1,
            column: 1,
            peeked: None,
            poisoned: None,
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Result<Token<'src>> {
        if let Some(token) = self.peeked {
            return Ok(token);
        }
        let token = self.read_token()?;
        self.peeked = Some(token);
        Ok(token)
    }

    pub fn next(&mut self) -> Result<Token<'src>> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.read_token(),
        }
    }

    /// Consume the next token; it must be of `kind`.
    pub fn skip(&mut self, kind: TokenKind) -> Result<Token<'src>> {
        let token = self.next()?;
        if token.kind != kind {
            return Err(Error::Parse {
                found: token.to_string(),
                expected: kind.to_string(),
                location: token.pos.location(),
            });
        }
        Ok(token)
    }

    fn read_token(&mut self) -> Result<Token<'src>> {
        if let Some((character, pos)) = self.poisoned {
            return Err(lex_error(character, pos));
        }

        self.skip_whitespace();

        let Some(&(byte_start, c)) = self.chars.peek() else {
            let pos = self.position(self.offset, self.line, self.column);
            return Ok(Token { kind: TokenKind::Eof, value: "", pos });
        };
        let (start, line, column) = (self.offset, self.line, self.column);

        let kind = match c {
            '(' => TokenKind::ParenL,
            ')' => TokenKind::ParenR,
            '{' => TokenKind::BraceL,
            '}' => TokenKind::BraceR,
            '=' => TokenKind::Equals,
            c if is_name_char(c) => {
                let byte_end = self.read_name();
                let pos = Position { end: self.offset, ..self.position(start, line, column) };
                let value = &self.src.input[byte_start..byte_end];
                return Ok(Token { kind: TokenKind::Name, value, pos });
            }
            c => {
                let pos = Position { end: start + 1, ..self.position(start, line, column) };
                self.poisoned = Some((c, pos));
                return Err(lex_error(c, pos));
            }
        };

        self.bump();
        let value = &self.src.input[byte_start..byte_start + c.len_utf8()];
        let pos = Position { end: self.offset, ..self.position(start, line, column) };
        Ok(Token { kind, value, pos })
    }

    fn position(&self, start: usize, line: usize, column: usize) -> Position<'src> {
        Position { start, end: start, line, column, src: self.src }
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        self.offset += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Returns the byte offset one past the name.
    fn read_name(&mut self) -> usize {
        while let Some(&(_, c)) = self.chars.peek() {
            if !is_name_char(c) {
                break;
            }
            self.bump();
        }
        match self.chars.peek() {
            Some(&(byte, _)) => byte,
            None => self.src.input.len(),
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn lex_error(character: char, pos: Position<'_>) -> Error {
    Error::Lex { character, location: pos.location() }
}
