//! uVision project toolkit
//!
//! Library behind the `uvhelper` binary. The typed model of `.uvprojx`
//! project files lives in the `uvconfig` crate and is re-exported here;
//! this crate adds the filesystem-facing commands built on top of it:
//! staging vendor packs into a bare project, mirroring the project into
//! a stub tree for clangd and syncing stub edits back.

pub mod fsops;
pub mod locate;
pub mod pool;
pub mod report;
pub mod settings;
pub mod strap;
pub mod stub;

pub use report::{Reporter, Tally};
pub use settings::{Settings, SettingsError};
pub use strap::{StrapError, StrapOptions};
pub use stub::{Link, Snapshot, StubError, TargetCompileInfo};

pub use uvconfig::{ConfigError, Document, NodeRef, ToolPartition, Warning, WarningKind};
