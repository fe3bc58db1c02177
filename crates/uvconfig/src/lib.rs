//! Schema-driven model of Keil uVision `.uvprojx` project files
//!
//! A `.uvprojx` file is an XML tree of text-only leaves. This crate
//! parses one into a typed [`Document`], repairs drift against a fixed
//! per-node schema catalog (unknown children pruned, missing options
//! filled from defaults, each repair recorded as a [`Warning`]), and
//! writes the normalized tree back out. A [`Document`] can also be
//! built from scratch: a fresh one serializes to a complete project
//! skeleton for a Cortex-M target.
//!
//! Structure mutation goes through [`Document::add_target`],
//! [`Document::add_group`] and [`Document::add_file`]; option values
//! through the typed accessors on the catalog nodes plus
//! [`ConfigNode::set_option`]. Queries used by external tooling
//! (target/group/file lists, include paths and defines split by tool)
//! live on [`Document`] as well.

pub mod catalog;
pub mod document;
pub mod error;
mod ident;
pub mod node;
pub mod schema;
pub mod warn;
pub mod xml;

pub use catalog::Project;
pub use document::{Document, NodeRef, ToolPartition};
pub use error::ConfigError;
pub use node::{Child, ConfigNode, NodeCore};
pub use schema::{OptionMap, OptionSpec, Schema};
pub use warn::{Warning, WarningKind, Warnings};
pub use xml::{Element, XmlError};
