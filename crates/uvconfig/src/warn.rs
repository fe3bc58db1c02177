//! Non-fatal findings produced while loading and repairing documents
//!
//! Every repair the engine performs is recorded here as data so callers can
//! count, filter or display them. Each finding is also mirrored to the
//! `log` facade at warn level for ad-hoc runs.

use std::fmt;

/// What kind of repair or drift was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A child element not present in the node's schema was discarded.
    UnknownChild,
    /// A declared option leaf was absent and filled from its default.
    MissingOption,
    /// An option leaf had to be recreated while syncing values back.
    CreatedOnSync,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::UnknownChild => "unknown child discarded",
            WarningKind::MissingOption => "missing option defaulted",
            WarningKind::CreatedOnSync => "option leaf recreated on sync",
        }
    }
}

/// One finding: which node, which child tag, what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub node: String,
    pub tag: String,
    pub kind: WarningKind,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>/<{}>: {}", self.node, self.tag, self.kind.as_str())
    }
}

/// Ordered collection of findings for one document.
#[derive(Debug, Clone, Default)]
pub struct Warnings {
    entries: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: &str, tag: &str, kind: WarningKind) {
        let warning = Warning {
            node: node.to_string(),
            tag: tag.to_string(),
            kind,
        };
        log::warn!("{warning}");
        self.entries.push(warning);
    }

    pub fn entries(&self) -> &[Warning] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of findings of one kind, for drift summaries.
    pub fn count_of(&self, kind: WarningKind) -> usize {
        self.entries.iter().filter(|w| w.kind == kind).count()
    }

    pub fn take(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.entries)
    }
}
