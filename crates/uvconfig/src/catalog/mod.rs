//! Typed catalog of the uVision project-file hierarchy
//!
//! One type per node kind, each carrying a static schema and a
//! [`NodeCore`](crate::node::NodeCore). Structure and defaults mirror
//! what uVision 5 writes for a Cortex-M target using the ARM Compiler 6
//! toolchain; a fresh [`Project`] serializes to a buildable project
//! skeleton without further setup.

mod armads;
mod common;
mod debug;
mod files;
mod project;
mod target;

pub use armads::{
    Aads, ArmAdsMisc, Cads, Ldads, Memory, OnChipMemories, TargetArmAds, VariousControls,
    MEMORY_TAGS,
};
pub use common::{CommonProperty, TargetCommonOption, TargetStatus, UserCommands};
pub use debug::{DebugOption, DllOption, Flash1, OptHx, Utilities};
pub use files::{File, FileKind, Files, Group, Groups};
pub use project::{Layer, LayerInfo, Layers, Project, Rte};
pub use target::{Target, TargetOption, Targets};
