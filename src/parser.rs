//! Recursive-descent parser for type constraints.
//!
//! ```text
//! Type   := "optional" "(" Type ")"
//!         | "string" | "bool" | "number" | "null" | "any"
//!         | "map" "(" Type ")" | "list" "(" Type ")"
//!         | "object" "(" "{" Field* "}" ")"
//! Field  := Name "=" Type
//! ```

use crate::ast::{Field, Source, Type, TypeKind};
use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token, TokenKind};

/// Parse one complete type constraint. Trailing input is an error.
pub fn parse_type(source: &Source) -> Result<Type<'_>> {
    let mut p = Parser { lexer: Lexer::new(source), depth: 0 };
    let t = p.parse_type(false)?;
    p.expect(TokenKind::Eof)?;
    Ok(t)
}

struct Parser<'src> {
    lexer: Lexer<'src>,
    depth: usize,
}

/// Deepest `Type` nesting accepted; keeps recursion off the end of the stack.
pub const MAX_DEPTH: usize = 256;

const TYPE_KEYWORDS: &str = "optional, string, bool, number, null, any, map, list or object";

impl<'src> Parser<'src> {
    fn parse_type(&mut self, optional: bool) -> Result<Type<'src>> {
        self.depth += 1;
        let t = self.parse_type_at_depth(optional);
        self.depth -= 1;
        t
    }

    fn parse_type_at_depth(&mut self, optional: bool) -> Result<Type<'src>> {
        let token = self.lexer.peek()?;
        if self.depth > MAX_DEPTH {
            return Err(unexpected(token, "shallower nesting"));
        }
        if token.kind != TokenKind::Name {
            return Err(unexpected(token, TYPE_KEYWORDS));
        }

        let kind = match token.value {
            "optional" => {
                self.lexer.skip(TokenKind::Name)?;
                self.expect(TokenKind::ParenL)?;
                let t = self.parse_type(true)?;
                self.expect(TokenKind::ParenR)?;
                return Ok(t);
            }
            "string" => TypeKind::String,
            "bool" => TypeKind::Boolean,
            "number" => TypeKind::Number,
            "null" => TypeKind::Null,
            "any" => TypeKind::Any,
            "map" => return self.parse_wrapper(TypeKind::Map, optional),
            "list" => return self.parse_wrapper(TypeKind::List, optional),
            "object" => return self.parse_object(optional),
            _ => return Err(unexpected(token, TYPE_KEYWORDS)),
        };

        self.lexer.next()?;
        Ok(Type::scalar(token.value, kind).with_optional(optional).at(token.pos))
    }

    /// `map(T)` / `list(T)`; the element starts out non-optional.
    fn parse_wrapper(&mut self, kind: TypeKind, optional: bool) -> Result<Type<'src>> {
        let token = self.lexer.skip(TokenKind::Name)?;

        self.expect(TokenKind::ParenL)?;
        let elem = self.parse_type(false)?;
        self.expect(TokenKind::ParenR)?;

        let t = match kind {
            TypeKind::Map => Type::map(elem),
            _ => Type::list(elem),
        };
        Ok(t.with_optional(optional).at(token.pos))
    }

    fn parse_object(&mut self, optional: bool) -> Result<Type<'src>> {
        let token = self.lexer.skip(TokenKind::Name)?;
        let mut fields = Vec::new();

        self.expect(TokenKind::ParenL)?;
        self.expect(TokenKind::BraceL)?;
        loop {
            let next = self.lexer.peek()?;
            match next.kind {
                TokenKind::BraceR => break,
                TokenKind::Name => fields.push(self.parse_object_field()?),
                _ => return Err(unexpected(next, "Name or \"}\"")),
            }
        }
        self.expect(TokenKind::BraceR)?;
        self.expect(TokenKind::ParenR)?;

        Ok(Type::object(fields).with_optional(optional).at(token.pos))
    }

    fn parse_object_field(&mut self) -> Result<Field<'src>> {
        let name = self.lexer.skip(TokenKind::Name)?;
        self.expect(TokenKind::Equals)?;
        let ty = self.parse_type(false)?;

        Ok(Field { name: name.value.to_string(), ty, pos: Some(name.pos) })
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'src>> {
        self.lexer.skip(kind)
    }
}

fn unexpected(token: Token<'_>, expected: &str) -> Error {
    Error::Parse {
        found: token.to_string(),
        expected: expected.to_string(),
        location: token.pos.location(),
    }
}
