//! Parsed type constraints.
//!
//! A `Type` tree borrows the `Source` it was parsed from through its
//! positions; the tree itself is plain owned data and is dropped as soon as the
//! builder has flattened it.

use std::fmt;

/// One type-constraint string together with the name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Logical name, usually the variable the constraint belongs to.
    pub name: String,
    /// Raw constraint text, e.g. `list(object({ id = string }))`.
    pub input: String,
}

impl Source {
    pub fn new(name: impl Into<String>, input: impl Into<String>) -> Self {
        Self { name: name.into(), input: input.into() }
    }
}

/// Where a token starts and ends, in code points, plus its line/column.
#[derive(Debug, Clone, Copy)]
pub struct Position<'src> {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
    pub src: &'src Source,
}

impl<'src> Position<'src> {
    /// Detach from the source so the position can outlive it (errors).
    pub fn location(&self) -> Location {
        Location {
            source: self.src.name.clone(),
            line: self.line,
            column: self.column,
            start: self.start,
            end: self.end,
        }
    }
}

/// Owned snapshot of a [`Position`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub source: String,
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    String,
    Boolean,
    Number,
    Null,
    List,
    Map,
    Object,
    Any,
}

impl TypeKind {
    pub fn is_scalar(self) -> bool {
        matches!(self, Self::String | Self::Boolean | Self::Number | Self::Null | Self::Any)
    }
}

#[derive(Debug, Clone)]
pub struct Type<'src> {
    /// The keyword the type was spelled with (`string`, `list`, ...).
    pub name: String,
    pub kind: TypeKind,
    /// Element type; only `List` and `Map` carry one.
    pub elem: Option<Box<Type<'src>>>,
    pub optional: bool,
    /// Only `Object` carries fields.
    pub fields: Vec<Field<'src>>,
    pub pos: Option<Position<'src>>,
}

impl<'src> Type<'src> {
    /// A node with neither element nor fields. Meant for scalar kinds; any
    /// other kind makes a malformed node that the builder rejects.
    pub fn scalar(name: impl Into<String>, kind: TypeKind) -> Self {
        Self { name: name.into(), kind, elem: None, optional: false, fields: Vec::new(), pos: None }
    }

    pub fn list(elem: Type<'src>) -> Self {
        Self::wrapping("list", TypeKind::List, elem)
    }

    pub fn map(elem: Type<'src>) -> Self {
        Self::wrapping("map", TypeKind::Map, elem)
    }

    pub fn object(fields: Vec<Field<'src>>) -> Self {
        Self {
            name: "object".to_string(),
            kind: TypeKind::Object,
            elem: None,
            optional: false,
            fields,
            pos: None,
        }
    }

    fn wrapping(name: &str, kind: TypeKind, elem: Type<'src>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            elem: Some(Box::new(elem)),
            optional: false,
            fields: Vec::new(),
            pos: None,
        }
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn at(mut self, pos: Position<'src>) -> Self {
        self.pos = Some(pos);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field<'src>> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// Positions are diagnostics only.
impl PartialEq for Type<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.elem == other.elem
            && self.optional == other.optional
            && self.fields == other.fields
    }
}

#[derive(Debug, Clone)]
pub struct Field<'src> {
    pub name: String,
    pub ty: Type<'src>,
    pub pos: Option<Position<'src>>,
}

impl<'src> Field<'src> {
    pub fn new(name: impl Into<String>, ty: Type<'src>) -> Self {
        Self { name: name.into(), ty, pos: None }
    }
}

impl PartialEq for Field<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}
