//! ARM-ADS toolchain settings: compiler, assembler, linker and the
//! target memory map

use crate::node::{adopt_child, ConfigNode, NodeCore};
use crate::schema::{opt, Schema};
use crate::warn::Warnings;
use crate::xml::Element;

/// Memory bank tags in the order uVision lists them.
pub const MEMORY_TAGS: [&str; 20] = [
    "Ocm1", "Ocm2", "Ocm3", "Ocm4", "Ocm5", "Ocm6", "IRAM", "IROM", "XRAM", "XROM", "OCR_RVCT1",
    "OCR_RVCT2", "OCR_RVCT3", "OCR_RVCT4", "OCR_RVCT5", "OCR_RVCT6", "OCR_RVCT7", "OCR_RVCT8",
    "OCR_RVCT9", "OCR_RVCT10",
];

static MEMORY_SCHEMA: Schema = Schema {
    options: &[
        opt("Type", "0"),
        opt("StartAddress", "0x0"),
        opt("Size", "0x0"),
    ],
    children: &[],
};

/// One memory bank entry. The same shape serves all twenty bank tags.
#[derive(Debug, Clone)]
pub struct Memory {
    core: NodeCore,
}

impl Memory {
    pub fn new(tag: &'static str) -> Self {
        Self {
            core: NodeCore::with_defaults(tag, &MEMORY_SCHEMA),
        }
    }

    pub(crate) fn from_element(tag: &'static str, el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element(tag, el);
        core.load(&MEMORY_SCHEMA, warnings);
        Self { core }
    }
}

impl ConfigNode for Memory {
    fn schema(&self) -> &'static Schema {
        &MEMORY_SCHEMA
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

static ON_CHIP_MEMORIES_SCHEMA: Schema = Schema {
    options: &[],
    children: &MEMORY_TAGS,
};

/// The full bank table under `ArmAdsMisc`, always twenty entries.
#[derive(Debug, Clone)]
pub struct OnChipMemories {
    core: NodeCore,
    memories: Vec<Memory>,
}

impl OnChipMemories {
    pub fn new() -> Self {
        let mut core = NodeCore::with_defaults("OnChipMemories", &ON_CHIP_MEMORIES_SCHEMA);
        let mut memories = Vec::with_capacity(MEMORY_TAGS.len());
        for (index, tag) in MEMORY_TAGS.iter().copied().enumerate() {
            core.attach_sub(index);
            memories.push(Memory::new(tag));
        }
        Self { core, memories }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("OnChipMemories", el);
        core.load(&ON_CHIP_MEMORIES_SCHEMA, warnings);
        let mut memories = Vec::with_capacity(MEMORY_TAGS.len());
        for (index, tag) in MEMORY_TAGS.iter().copied().enumerate() {
            memories.push(adopt_child(&mut core, index, tag, warnings, |el, w| {
                Memory::from_element(tag, el, w)
            }));
        }
        Self { core, memories }
    }

    pub fn memories(&self) -> &[Memory] {
        &self.memories
    }

    /// Bank lookup by tag, e.g. `IRAM`.
    pub fn memory(&self, tag: &str) -> Option<&Memory> {
        self.memories.iter().find(|m| m.tag() == tag)
    }

    pub fn memory_mut(&mut self, tag: &str) -> Option<&mut Memory> {
        self.memories.iter_mut().find(|m| m.tag() == tag)
    }
}

impl Default for OnChipMemories {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for OnChipMemories {
    fn schema(&self) -> &'static Schema {
        &ON_CHIP_MEMORIES_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        self.memories.iter().map(|m| m as &dyn ConfigNode).collect()
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        self.memories
            .iter_mut()
            .map(|m| m as &mut dyn ConfigNode)
            .collect()
    }
}

static ARM_ADS_MISC_SCHEMA: Schema = Schema {
    options: &[
        opt("GenerateListings", "0"),
        // assembler listing switches
        opt("asHll", "1"),
        opt("asAsm", "1"),
        opt("asMacX", "1"),
        opt("asSyms", "1"),
        opt("asFals", "1"),
        opt("asDbgD", "1"),
        opt("asForm", "1"),
        // linker listing switches
        opt("ldLst", "0"),
        opt("ldmm", "1"),
        opt("ldXref", "1"),
        opt("BigEnd", "0"),
        opt("AdsALst", "1"),
        opt("AdsACrf", "1"),
        opt("AdsANop", "0"),
        opt("AdsANot", "0"),
        opt("AdsLLst", "1"),
        opt("AdsLmap", "1"),
        opt("AdsLcgr", "1"),
        opt("AdsLsym", "1"),
        opt("AdsLszi", "1"),
        opt("AdsLtoi", "1"),
        opt("AdsLsun", "1"),
        opt("AdsLven", "1"),
        opt("AdsLsxf", "1"),
        opt("RvctClst", "0"),
        opt("GenPPlst", "0"),
        opt("AdsCpuType", "\"Cortex-M3\""),
        opt("RvctDeviceName", ""),
        opt("mOS", "0"),
        opt("uocRom", "0"),
        opt("uocRam", "0"),
        opt("hadIROM", "1"),
        opt("hadIRAM", "1"),
        opt("hadXRAM", "0"),
        opt("uocXRam", "0"),
        opt("RvdsVP", "0"),
        opt("RvdsMve", "0"),
        opt("RvdsCdeCp", "0"),
        opt("nBranchProt", "0"),
        opt("hadIRAM2", "0"),
        opt("hadIROM2", "0"),
        opt("StupSel", "8"),
        opt("useUlib", "0"),
        opt("EndSel", "0"),
        opt("uLtcg", "0"),
        opt("nSecure", "0"),
        opt("RoSelD", "3"),
        opt("RwSelD", "3"),
        opt("CodeSel", "0"),
        opt("OptFeed", "0"),
        opt("NoZi1", "0"),
        opt("NoZi2", "0"),
        opt("NoZi3", "0"),
        opt("NoZi4", "0"),
        opt("NoZi5", "0"),
        // linker region checkboxes
        opt("Ro1Chk", "0"),
        opt("Ro2Chk", "0"),
        opt("Ro3Chk", "0"),
        opt("Ir1Chk", "1"),
        opt("Ir2Chk", "0"),
        opt("Ra1Chk", "0"),
        opt("Ra2Chk", "0"),
        opt("Ra3Chk", "0"),
        opt("Im1Chk", "1"),
        opt("Im2Chk", "0"),
        opt("RvctStartVector", ""),
    ],
    children: &["OnChipMemories"],
};

/// The `Options for Target` dialog state that is not owned by a single
/// tool: listing switches, CPU selection and the memory layout.
#[derive(Debug, Clone)]
pub struct ArmAdsMisc {
    core: NodeCore,
    on_chip_memories: OnChipMemories,
}

impl ArmAdsMisc {
    pub fn new() -> Self {
        let mut core = NodeCore::with_defaults("ArmAdsMisc", &ARM_ADS_MISC_SCHEMA);
        core.attach_sub(0);
        Self {
            core,
            on_chip_memories: OnChipMemories::new(),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("ArmAdsMisc", el);
        core.load(&ARM_ADS_MISC_SCHEMA, warnings);
        let on_chip_memories = adopt_child(
            &mut core,
            0,
            "OnChipMemories",
            warnings,
            OnChipMemories::from_element,
        );
        Self {
            core,
            on_chip_memories,
        }
    }

    pub fn on_chip_memories(&self) -> &OnChipMemories {
        &self.on_chip_memories
    }

    pub fn on_chip_memories_mut(&mut self) -> &mut OnChipMemories {
        &mut self.on_chip_memories
    }
}

impl Default for ArmAdsMisc {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for ArmAdsMisc {
    fn schema(&self) -> &'static Schema {
        &ARM_ADS_MISC_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        vec![&self.on_chip_memories]
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        vec![&mut self.on_chip_memories]
    }
}

static VARIOUS_CONTROLS_SCHEMA: Schema = Schema {
    options: &[
        opt("MiscControls", ""),
        opt("Define", ""),
        opt("Undefine", ""),
        opt("IncludePath", ""),
    ],
    children: &[],
};

/// Free-form tool arguments: extra flags, preprocessor symbols and the
/// include search path. Both the compiler and the assembler own one.
#[derive(Debug, Clone)]
pub struct VariousControls {
    core: NodeCore,
}

impl VariousControls {
    pub fn new() -> Self {
        Self {
            core: NodeCore::with_defaults("VariousControls", &VARIOUS_CONTROLS_SCHEMA),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("VariousControls", el);
        core.load(&VARIOUS_CONTROLS_SCHEMA, warnings);
        Self { core }
    }
}

impl Default for VariousControls {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for VariousControls {
    fn schema(&self) -> &'static Schema {
        &VARIOUS_CONTROLS_SCHEMA
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

static CADS_SCHEMA: Schema = Schema {
    options: &[
        opt("interw", "1"),
        opt("Optim", "1"),
        opt("oTime", "0"),
        opt("SplitLS", "0"),
        opt("OneElfS", "1"),
        opt("Strict", "0"),
        opt("EnumInt", "0"),
        opt("PlainCh", "0"),
        opt("Ropi", "0"),
        opt("Rwpi", "0"),
        opt("wLevel", "2"),
        opt("uThumb", "0"),
        opt("uSurpInc", "0"),
        opt("uC99", "1"),
        opt("uGnu", "1"),
        opt("useXO", "0"),
        opt("v6Lang", "5"),
        opt("v6LangP", "3"),
        opt("vShortEn", "1"),
        opt("vShortWch", "1"),
        opt("v6Lto", "0"),
        opt("v6WtE", "0"),
        opt("v6Rtti", "0"),
    ],
    children: &["VariousControls"],
};

/// armclang compiler settings.
#[derive(Debug, Clone)]
pub struct Cads {
    core: NodeCore,
    various_controls: VariousControls,
}

impl Cads {
    pub fn new() -> Self {
        let mut core = NodeCore::with_defaults("Cads", &CADS_SCHEMA);
        core.attach_sub(0);
        Self {
            core,
            various_controls: VariousControls::new(),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("Cads", el);
        core.load(&CADS_SCHEMA, warnings);
        let various_controls = adopt_child(
            &mut core,
            0,
            "VariousControls",
            warnings,
            VariousControls::from_element,
        );
        Self {
            core,
            various_controls,
        }
    }

    pub fn various_controls(&self) -> &VariousControls {
        &self.various_controls
    }

    pub fn various_controls_mut(&mut self) -> &mut VariousControls {
        &mut self.various_controls
    }
}

impl Default for Cads {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for Cads {
    fn schema(&self) -> &'static Schema {
        &CADS_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        vec![&self.various_controls]
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        vec![&mut self.various_controls]
    }
}

static AADS_SCHEMA: Schema = Schema {
    options: &[
        opt("interw", "1"),
        opt("Ropi", "0"),
        opt("Rwpi", "0"),
        opt("thumb", "0"),
        opt("SplitLS", "0"),
        opt("SwStkChk", "0"),
        opt("NoWarn", "0"),
        opt("uSurpInc", "0"),
        opt("useXO", "0"),
        opt("ClangAsOpt", "1"),
    ],
    children: &["VariousControls"],
};

/// armasm assembler settings.
#[derive(Debug, Clone)]
pub struct Aads {
    core: NodeCore,
    various_controls: VariousControls,
}

impl Aads {
    pub fn new() -> Self {
        let mut core = NodeCore::with_defaults("Aads", &AADS_SCHEMA);
        core.attach_sub(0);
        Self {
            core,
            various_controls: VariousControls::new(),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("Aads", el);
        core.load(&AADS_SCHEMA, warnings);
        let various_controls = adopt_child(
            &mut core,
            0,
            "VariousControls",
            warnings,
            VariousControls::from_element,
        );
        Self {
            core,
            various_controls,
        }
    }

    pub fn various_controls(&self) -> &VariousControls {
        &self.various_controls
    }

    pub fn various_controls_mut(&mut self) -> &mut VariousControls {
        &mut self.various_controls
    }
}

impl Default for Aads {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for Aads {
    fn schema(&self) -> &'static Schema {
        &AADS_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        vec![&self.various_controls]
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        vec![&mut self.various_controls]
    }
}

static LDADS_SCHEMA: Schema = Schema {
    options: &[
        opt("umfTarg", "1"),
        opt("Ropi", "0"),
        opt("Rwpi", "0"),
        opt("noStLib", "0"),
        opt("RepFail", "1"),
        opt("useFile", "0"),
        opt("TextAddressRange", "0x08000000"),
        opt("DataAddressRange", "0x20000000"),
        opt("pXoBase", ""),
        opt("ScatterFile", ""),
        opt("IncludeLibs", ""),
        opt("IncludeLibsPath", ""),
        opt("Misc", ""),
        opt("LinkerInputFile", ""),
        opt("DisabledWarnings", ""),
    ],
    children: &[],
};

/// armlink settings. `umfTarg` keeps the linker on the memory layout
/// from the target dialog rather than a scatter file.
#[derive(Debug, Clone)]
pub struct Ldads {
    core: NodeCore,
}

impl Ldads {
    pub fn new() -> Self {
        Self {
            core: NodeCore::with_defaults("LDads", &LDADS_SCHEMA),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("LDads", el);
        core.load(&LDADS_SCHEMA, warnings);
        Self { core }
    }
}

impl Default for Ldads {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for Ldads {
    fn schema(&self) -> &'static Schema {
        &LDADS_SCHEMA
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

static TARGET_ARM_ADS_SCHEMA: Schema = Schema {
    options: &[],
    children: &["ArmAdsMisc", "Cads", "Aads", "LDads"],
};

/// Container for the four ARM-ADS tool blocks.
#[derive(Debug, Clone)]
pub struct TargetArmAds {
    core: NodeCore,
    misc: ArmAdsMisc,
    cads: Cads,
    aads: Aads,
    ldads: Ldads,
}

impl TargetArmAds {
    pub fn new() -> Self {
        let mut core = NodeCore::with_defaults("TargetArmAds", &TARGET_ARM_ADS_SCHEMA);
        for index in 0..4 {
            core.attach_sub(index);
        }
        Self {
            core,
            misc: ArmAdsMisc::new(),
            cads: Cads::new(),
            aads: Aads::new(),
            ldads: Ldads::new(),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("TargetArmAds", el);
        core.load(&TARGET_ARM_ADS_SCHEMA, warnings);
        let misc = adopt_child(&mut core, 0, "ArmAdsMisc", warnings, ArmAdsMisc::from_element);
        let cads = adopt_child(&mut core, 1, "Cads", warnings, Cads::from_element);
        let aads = adopt_child(&mut core, 2, "Aads", warnings, Aads::from_element);
        let ldads = adopt_child(&mut core, 3, "LDads", warnings, Ldads::from_element);
        Self {
            core,
            misc,
            cads,
            aads,
            ldads,
        }
    }

    pub fn misc(&self) -> &ArmAdsMisc {
        &self.misc
    }

    pub fn misc_mut(&mut self) -> &mut ArmAdsMisc {
        &mut self.misc
    }

    pub fn cads(&self) -> &Cads {
        &self.cads
    }

    pub fn cads_mut(&mut self) -> &mut Cads {
        &mut self.cads
    }

    pub fn aads(&self) -> &Aads {
        &self.aads
    }

    pub fn aads_mut(&mut self) -> &mut Aads {
        &mut self.aads
    }

    pub fn ldads(&self) -> &Ldads {
        &self.ldads
    }

    pub fn ldads_mut(&mut self) -> &mut Ldads {
        &mut self.ldads
    }
}

impl Default for TargetArmAds {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for TargetArmAds {
    fn schema(&self) -> &'static Schema {
        &TARGET_ARM_ADS_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        vec![&self.misc, &self.cads, &self.aads, &self.ldads]
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        vec![
            &mut self.misc,
            &mut self.cads,
            &mut self.aads,
            &mut self.ldads,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml;

    #[test]
    fn test_memory_bank_order_and_defaults() {
        let ocm = OnChipMemories::new();
        let tags: Vec<&str> = ocm.memories().iter().map(|m| m.tag()).collect();
        assert_eq!(tags, MEMORY_TAGS);

        let iram = ocm.memory("IRAM").unwrap();
        assert_eq!(iram.option("StartAddress"), Some("0x0"));
        assert_eq!(iram.option("Size"), Some("0x0"));
        assert!(ocm.memory("DRAM").is_none());
    }

    #[test]
    fn test_cads_defaults() {
        let cads = Cads::new();
        assert_eq!(cads.option("Optim"), Some("1"));
        assert_eq!(cads.option("v6Lang"), Some("5"));
        assert_eq!(cads.various_controls().option("IncludePath"), Some(""));
    }

    #[test]
    fn test_target_arm_ads_serialize_order() {
        let ads = TargetArmAds::new();
        let el = ads.to_element();
        let tags: Vec<&str> = el.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["ArmAdsMisc", "Cads", "Aads", "LDads"]);
    }

    #[test]
    fn test_wrap_keeps_bank_values() {
        let el = xml::parse(
            "<OnChipMemories><IRAM><Type>0</Type><StartAddress>0x20000000</StartAddress>\
             <Size>0x10000</Size></IRAM></OnChipMemories>",
        )
        .unwrap();
        let mut warnings = Warnings::new();
        let ocm = OnChipMemories::from_element(el, &mut warnings);

        assert_eq!(
            ocm.memory("IRAM").unwrap().option("StartAddress"),
            Some("0x20000000")
        );
        // The other nineteen banks were created from defaults.
        assert_eq!(ocm.memories().len(), 20);
        assert!(!warnings.is_empty());
    }

    #[test]
    fn test_arm_ads_misc_cpu_type_is_quoted() {
        let misc = ArmAdsMisc::new();
        assert_eq!(misc.option("AdsCpuType"), Some("\"Cortex-M3\""));
    }
}
