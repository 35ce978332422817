//! Errors for the whole pipeline.
//!
//! Every variant is terminal: the first one raised aborts the run and nothing
//! built so far is handed back.

use std::path::PathBuf;
use thiserror::Error;

use crate::ast::Location;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A character no token starts with.
    #[error("{location}: unexpected character {character:?}")]
    Lex { character: char, location: Location },

    /// A token that does not fit the grammar at this point.
    #[error("{location}: unexpected {found}, expected {expected}")]
    Parse {
        found: String,
        expected: String,
        location: Location,
    },

    /// A type node with no mapping to a record field type.
    #[error("unsupported type: {name}{}", at(.location))]
    UnsupportedType {
        name: String,
        location: Option<Location>,
    },

    /// Two naming paths produced the same record name.
    #[error("duplicate record name: {name}")]
    DuplicateRecord { name: String },

    /// Two variables or object fields produced the same field name in one record.
    #[error("duplicate field {field} in record {record}")]
    DuplicateField { record: String, field: String },

    /// Reading or decoding a module manifest failed.
    #[error("loading {}: {message}", .path.display())]
    Load { path: PathBuf, message: String },
}

fn at(location: &Option<Location>) -> String {
    match location {
        Some(location) => format!(" at {location}"),
        None => String::new(),
    }
}

impl Error {
    pub fn load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Load { path: path.into(), message: message.to_string() }
    }

    /// Position of the offending text, when the error has one.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Lex { location, .. } | Self::Parse { location, .. } => Some(location),
            Self::UnsupportedType { location, .. } => location.as_ref(),
            Self::DuplicateRecord { .. } | Self::DuplicateField { .. } | Self::Load { .. } => None,
        }
    }
}
