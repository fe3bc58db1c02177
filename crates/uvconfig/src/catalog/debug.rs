//! Debugger, simulator and flash-programming blocks
//!
//! Defaults describe the stock Cortex-M3 setup: the SARMCM3 simulator
//! pair and ULINK2 flash download via UL2CM3.

use crate::node::{adopt_child, ConfigNode, NodeCore};
use crate::schema::{opt, Schema};
use crate::warn::Warnings;
use crate::xml::Element;

static DLL_OPTION_SCHEMA: Schema = Schema {
    options: &[
        opt("SimDllName", "SARMCM3.DLL"),
        opt("SimDllArguments", "-REMAP"),
        opt("SimDlgDll", "DCM.DLL"),
        opt("SimDlgDllArguments", "-pCM3"),
        opt("TargetDllName", "SARMCM3.DLL"),
        opt("TargetDllArguments", ""),
        opt("TargetDlgDll", "TCM.DLL"),
        opt("TargetDlgDllArguments", "-pCM3"),
    ],
    children: &[],
};

/// Simulator and target driver DLL selection.
#[derive(Debug, Clone)]
pub struct DllOption {
    core: NodeCore,
}

impl DllOption {
    pub fn new() -> Self {
        Self {
            core: NodeCore::with_defaults("DllOption", &DLL_OPTION_SCHEMA),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("DllOption", el);
        core.load(&DLL_OPTION_SCHEMA, warnings);
        Self { core }
    }
}

impl Default for DllOption {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for DllOption {
    fn schema(&self) -> &'static Schema {
        &DLL_OPTION_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        Vec::new()
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        Vec::new()
    }
}

static OPT_HX_SCHEMA: Schema = Schema {
    options: &[
        opt("HexSelection", "1"),
        opt("HexRangeLowAddress", "0"),
        opt("HexRangeHighAddress", "0"),
        opt("HexOffset", "0x0"),
        opt("Oh166RecLen", "16"),
    ],
    children: &[],
};

/// HEX output format settings.
#[derive(Debug, Clone)]
pub struct OptHx {
    core: NodeCore,
}

impl OptHx {
    pub fn new() -> Self {
        Self {
            core: NodeCore::with_defaults("OPTHX", &OPT_HX_SCHEMA),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("OPTHX", el);
        core.load(&OPT_HX_SCHEMA, warnings);
        Self { core }
    }
}

impl Default for OptHx {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for OptHx {
    fn schema(&self) -> &'static Schema {
        &OPT_HX_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        Vec::new()
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        Vec::new()
    }
}

static DEBUG_OPTION_SCHEMA: Schema = Schema {
    options: &[],
    children: &["OPTHX"],
};

/// Wrapper around the HEX format block.
#[derive(Debug, Clone)]
pub struct DebugOption {
    core: NodeCore,
    opt_hx: OptHx,
}

impl DebugOption {
    pub fn new() -> Self {
        let mut core = NodeCore::with_defaults("DebugOption", &DEBUG_OPTION_SCHEMA);
        core.attach_sub(0);
        Self {
            core,
            opt_hx: OptHx::new(),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("DebugOption", el);
        core.load(&DEBUG_OPTION_SCHEMA, warnings);
        let opt_hx = adopt_child(&mut core, 0, "OPTHX", warnings, OptHx::from_element);
        Self { core, opt_hx }
    }

    pub fn opt_hx(&self) -> &OptHx {
        &self.opt_hx
    }

    pub fn opt_hx_mut(&mut self) -> &mut OptHx {
        &mut self.opt_hx
    }
}

impl Default for DebugOption {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for DebugOption {
    fn schema(&self) -> &'static Schema {
        &DEBUG_OPTION_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        vec![&self.opt_hx]
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        vec![&mut self.opt_hx]
    }
}

static FLASH1_SCHEMA: Schema = Schema {
    options: &[
        opt("UseTargetDll", "1"),
        opt("UseExternalTool", "0"),
        opt("RunIndependent", "0"),
        opt("UpdateFlashBeforeDebugging", "1"),
        opt("Capability", "1"),
        opt("DriverSelection", "4096"),
    ],
    children: &[],
};

/// Flash download driver selection.
#[derive(Debug, Clone)]
pub struct Flash1 {
    core: NodeCore,
}

impl Flash1 {
    pub fn new() -> Self {
        Self {
            core: NodeCore::with_defaults("Flash1", &FLASH1_SCHEMA),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("Flash1", el);
        core.load(&FLASH1_SCHEMA, warnings);
        Self { core }
    }
}

impl Default for Flash1 {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for Flash1 {
    fn schema(&self) -> &'static Schema {
        &FLASH1_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        Vec::new()
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        Vec::new()
    }
}

static UTILITIES_SCHEMA: Schema = Schema {
    options: &[
        opt("bUseTDR", "1"),
        opt("Flash2", "BIN\\UL2CM3.DLL"),
        opt("Flash3", "\"\" ()"),
        opt("Flash4", ""),
        opt("pFcarmOut", ""),
        opt("pFcarmGrp", ""),
        opt("pFcArmRoot", ""),
        opt("FcArmLst", "0"),
    ],
    children: &["Flash1"],
};

/// Flash utility configuration.
#[derive(Debug, Clone)]
pub struct Utilities {
    core: NodeCore,
    flash1: Flash1,
}

impl Utilities {
    pub fn new() -> Self {
        let mut core = NodeCore::with_defaults("Utilities", &UTILITIES_SCHEMA);
        core.attach_sub(0);
        Self {
            core,
            flash1: Flash1::new(),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("Utilities", el);
        core.load(&UTILITIES_SCHEMA, warnings);
        let flash1 = adopt_child(&mut core, 0, "Flash1", warnings, Flash1::from_element);
        Self { core, flash1 }
    }

    pub fn flash1(&self) -> &Flash1 {
        &self.flash1
    }

    pub fn flash1_mut(&mut self) -> &mut Flash1 {
        &mut self.flash1
    }
}

impl Default for Utilities {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for Utilities {
    fn schema(&self) -> &'static Schema {
        &UTILITIES_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        vec![&self.flash1]
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        vec![&mut self.flash1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_defaults() {
        let dll = DllOption::new();
        assert_eq!(dll.option("SimDllName"), Some("SARMCM3.DLL"));
        assert_eq!(dll.option("SimDlgDllArguments"), Some("-pCM3"));
    }

    #[test]
    fn test_debug_option_wraps_opthx() {
        let dbg = DebugOption::new();
        let el = dbg.to_element();
        assert_eq!(el.children.len(), 1);
        assert_eq!(el.children[0].tag, "OPTHX");
        assert_eq!(dbg.opt_hx().option("Oh166RecLen"), Some("16"));
    }

    #[test]
    fn test_utilities_defaults() {
        let util = Utilities::new();
        assert_eq!(util.option("Flash2"), Some("BIN\\UL2CM3.DLL"));
        assert_eq!(util.flash1().option("DriverSelection"), Some("4096"));
    }
}
