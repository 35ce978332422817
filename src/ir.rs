// Flattened record definitions for codegen. No parser types here.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Serialization format name → key emitted for that format.
pub type Tags = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordDefinition {
    pub name: String,
    pub fields: Vec<RecordField>,  // declaration order
}

impl RecordDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordField {
    pub description: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    pub tags: Tags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Bool,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "lowercase")]
pub enum TypeExpr {
    Primitive(Primitive),
    Map(Box<TypeExpr>),       // string keys
    List(Box<TypeExpr>),
    Record(String),           // name of another RecordDefinition
    Nullable(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// Wrap in `Nullable` unless it already is.
    pub fn nullable(self) -> Self {
        if self.is_nullable() { self } else { Self::Nullable(Box::new(self)) }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(Primitive::String) => f.write_str("string"),
            Self::Primitive(Primitive::Bool) => f.write_str("bool"),
            Self::Primitive(Primitive::Any) => f.write_str("any"),
            Self::Map(elem) => write!(f, "map<string, {elem}>"),
            Self::List(elem) => write!(f, "list<{elem}>"),
            Self::Record(name) => f.write_str(name),
            Self::Nullable(inner) => write!(f, "{inner}?"),
        }
    }
}
