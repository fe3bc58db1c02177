//! Fatal errors for document loading and mutation
//!
//! Schema drift (unknown or missing children) is never fatal; it is repaired
//! and surfaced as [`crate::Warning`]s instead. Errors here are the cases
//! the engine refuses to paper over.

use std::path::PathBuf;

use thiserror::Error;

use crate::xml::XmlError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed XML: {0}")]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("not a uVision project document: expected <{expected}> root, found <{found}>")]
    MalformedDocument { expected: &'static str, found: String },

    #[error("invalid name {name:?}: names must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier { name: String },

    #[error("{kind} {name:?} already exists")]
    DuplicateName { kind: &'static str, name: String },

    #[error("absolute paths cannot be added to a project: {}", .path.display())]
    AbsolutePath { path: PathBuf },

    #[error("{kind} {name:?} not found")]
    NotFound { kind: &'static str, name: String },
}
