//! Target-wide settings: device selection, output products, build hooks
//!
//! `TargetCommonOption` carries the device and pack identity plus the
//! output configuration, with defaults describing the STM32F103ZE board
//! this tooling was built around. Swapping devices means overriding
//! `Device`, `Cpu`, `FlashDriverDll`, `RegisterFile` and `SFDFile`.

use crate::node::{adopt_child, ConfigNode, NodeCore};
use crate::schema::{opt, Schema};
use crate::warn::Warnings;
use crate::xml::Element;

static TARGET_STATUS_SCHEMA: Schema = Schema {
    options: &[
        opt("Error", "0"),
        opt("ExitCodeStop", "0"),
        opt("ButtonStop", "0"),
        opt("NotGenerated", "0"),
        opt("InvalidFlash", "1"),
    ],
    children: &[],
};

/// Build status flags uVision maintains between sessions.
#[derive(Debug, Clone)]
pub struct TargetStatus {
    core: NodeCore,
}

impl TargetStatus {
    pub fn new() -> Self {
        Self {
            core: NodeCore::with_defaults("TargetStatus", &TARGET_STATUS_SCHEMA),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("TargetStatus", el);
        core.load(&TARGET_STATUS_SCHEMA, warnings);
        Self { core }
    }
}

impl Default for TargetStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for TargetStatus {
    fn schema(&self) -> &'static Schema {
        &TARGET_STATUS_SCHEMA
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

// The three hook blocks share their shape but not their stop-flag tags:
// the letter encodes the hook (U = before compile, B = before make,
// A = after make).

static BEFORE_COMPILE_SCHEMA: Schema = Schema {
    options: &[
        opt("RunUserProg1", "0"),
        opt("RunUserProg2", "0"),
        opt("UserProg1Name", ""),
        opt("UserProg2Name", ""),
        opt("UserProg1Dos16Mode", "0"),
        opt("UserProg2Dos16Mode", "0"),
        opt("nStopU1X", "0"),
        opt("nStopU2X", "0"),
    ],
    children: &[],
};

static BEFORE_MAKE_SCHEMA: Schema = Schema {
    options: &[
        opt("RunUserProg1", "0"),
        opt("RunUserProg2", "0"),
        opt("UserProg1Name", ""),
        opt("UserProg2Name", ""),
        opt("UserProg1Dos16Mode", "0"),
        opt("UserProg2Dos16Mode", "0"),
        opt("nStopB1X", "0"),
        opt("nStopB2X", "0"),
    ],
    children: &[],
};

static AFTER_MAKE_SCHEMA: Schema = Schema {
    options: &[
        opt("RunUserProg1", "0"),
        opt("RunUserProg2", "0"),
        opt("UserProg1Name", ""),
        opt("UserProg2Name", ""),
        opt("UserProg1Dos16Mode", "0"),
        opt("UserProg2Dos16Mode", "0"),
        opt("nStopA1X", "0"),
        opt("nStopA2X", "0"),
    ],
    children: &[],
};

/// One user-command hook: `BeforeCompile`, `BeforeMake` or `AfterMake`.
#[derive(Debug, Clone)]
pub struct UserCommands {
    core: NodeCore,
    schema: &'static Schema,
}

impl UserCommands {
    pub fn before_compile() -> Self {
        Self::with_defaults("BeforeCompile", &BEFORE_COMPILE_SCHEMA)
    }

    pub fn before_make() -> Self {
        Self::with_defaults("BeforeMake", &BEFORE_MAKE_SCHEMA)
    }

    pub fn after_make() -> Self {
        Self::with_defaults("AfterMake", &AFTER_MAKE_SCHEMA)
    }

    fn with_defaults(tag: &'static str, schema: &'static Schema) -> Self {
        Self {
            core: NodeCore::with_defaults(tag, schema),
            schema,
        }
    }

    fn from_element(
        tag: &'static str,
        schema: &'static Schema,
        el: Element,
        warnings: &mut Warnings,
    ) -> Self {
        let mut core = NodeCore::from_element(tag, el);
        core.load(schema, warnings);
        Self { core, schema }
    }
}

impl ConfigNode for UserCommands {
    fn schema(&self) -> &'static Schema {
        self.schema
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

static TARGET_COMMON_OPTION_SCHEMA: Schema = Schema {
    options: &[
        opt("Device", "STM32F103ZE"),
        opt("Vendor", "STMicroelectronics"),
        opt("PackID", "Keil.STM32F1xx_DFP.2.4.1"),
        opt("PackURL", "https://www.keil.com/pack/"),
        opt(
            "Cpu",
            "IRAM(0x20000000,0x00010000) IROM(0x08000000,0x00080000) \
             CPUTYPE(\"Cortex-M3\") CLOCK(12000000) ELITTLE",
        ),
        opt("FlashUtilSpec", ""),
        opt("StartupFile", ""),
        opt(
            "FlashDriverDll",
            "UL2CM3(-S0 -C0 -P0 -FD20000000 -FC1000 -FN1 -FF0STM32F10x_512 -FS08000000 \
             -FL080000 -FP0($$Device:STM32F103ZE$Flash\\STM32F10x_512.FLM))",
        ),
        opt("DeviceId", "0"),
        opt(
            "RegisterFile",
            "$$Device:STM32F103ZE$Device\\Include\\stm32f10x.h",
        ),
        opt("MemoryEnv", ""),
        opt("Cmp", ""),
        opt("Asm", ""),
        opt("Linker", ""),
        opt("OHString", ""),
        opt("InfinionOptionDll", ""),
        opt("SLE66CMisc", ""),
        opt("SLE66AMisc", ""),
        opt("SLE66LinkerMisc", ""),
        opt("SFDFile", "$$Device:STM32F103ZE$SVD\\STM32F103xx.svd"),
        opt("bCustSvd", "0"),
        opt("UseEnv", "0"),
        opt("BinPath", ""),
        opt("IncludePath", ""),
        opt("LibPath", ""),
        opt("RegisterFilePath", ""),
        opt("DBRegisterFilePath", ""),
        opt("OutputDirectory", ".\\Objects\\"),
        opt("OutputName", ""),
        opt("CreateExecutable", "1"),
        opt("CreateLib", "0"),
        opt("CreateHexFile", "1"),
        opt("DebugInformation", "1"),
        opt("BrowseInformation", "1"),
        opt("ListingPath", ".\\Listings\\"),
        opt("HexFormatSelection", "1"),
        opt("Merge32K", "0"),
        opt("CreateBatchFile", "0"),
        opt("SelectedForBatchBuild", "0"),
        opt("SVCSIdString", ""),
    ],
    children: &["TargetStatus", "BeforeCompile", "BeforeMake", "AfterMake"],
};

/// Device identity, pack references, output products and build hooks.
#[derive(Debug, Clone)]
pub struct TargetCommonOption {
    core: NodeCore,
    target_status: TargetStatus,
    before_compile: UserCommands,
    before_make: UserCommands,
    after_make: UserCommands,
}

impl TargetCommonOption {
    pub fn new() -> Self {
        let mut core = NodeCore::with_defaults("TargetCommonOption", &TARGET_COMMON_OPTION_SCHEMA);
        for index in 0..4 {
            core.attach_sub(index);
        }
        Self {
            core,
            target_status: TargetStatus::new(),
            before_compile: UserCommands::before_compile(),
            before_make: UserCommands::before_make(),
            after_make: UserCommands::after_make(),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("TargetCommonOption", el);
        core.load(&TARGET_COMMON_OPTION_SCHEMA, warnings);
        let target_status = adopt_child(
            &mut core,
            0,
            "TargetStatus",
            warnings,
            TargetStatus::from_element,
        );
        let before_compile = adopt_child(&mut core, 1, "BeforeCompile", warnings, |el, w| {
            UserCommands::from_element("BeforeCompile", &BEFORE_COMPILE_SCHEMA, el, w)
        });
        let before_make = adopt_child(&mut core, 2, "BeforeMake", warnings, |el, w| {
            UserCommands::from_element("BeforeMake", &BEFORE_MAKE_SCHEMA, el, w)
        });
        let after_make = adopt_child(&mut core, 3, "AfterMake", warnings, |el, w| {
            UserCommands::from_element("AfterMake", &AFTER_MAKE_SCHEMA, el, w)
        });
        Self {
            core,
            target_status,
            before_compile,
            before_make,
            after_make,
        }
    }

    pub fn target_status(&self) -> &TargetStatus {
        &self.target_status
    }

    pub fn before_compile(&self) -> &UserCommands {
        &self.before_compile
    }

    pub fn before_make(&self) -> &UserCommands {
        &self.before_make
    }

    pub fn after_make(&self) -> &UserCommands {
        &self.after_make
    }
}

impl Default for TargetCommonOption {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for TargetCommonOption {
    fn schema(&self) -> &'static Schema {
        &TARGET_COMMON_OPTION_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        vec![
            &self.target_status,
            &self.before_compile,
            &self.before_make,
            &self.after_make,
        ]
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        vec![
            &mut self.target_status,
            &mut self.before_compile,
            &mut self.before_make,
            &mut self.after_make,
        ]
    }
}

static COMMON_PROPERTY_SCHEMA: Schema = Schema {
    options: &[
        opt("UseCPPCompiler", "0"),
        opt("RVCTCodeConst", "0"),
        opt("RVCTZI", "0"),
        opt("RVCTOtherData", "0"),
        opt("ModuleSelection", "0"),
        opt("IncludeInBuild", "1"),
        opt("AlwaysBuild", "0"),
        opt("GenerateAssemblyFile", "0"),
        opt("AssembleAssemblyFile", "0"),
        opt("PublicsOnly", "0"),
        opt("StopOnExitCode", "3"),
        opt("CustomArgument", ""),
        opt("IncludeLibraryModules", ""),
        opt("ComprImg", "1"),
    ],
    children: &[],
};

/// Per-target build property sheet.
#[derive(Debug, Clone)]
pub struct CommonProperty {
    core: NodeCore,
}

impl CommonProperty {
    pub fn new() -> Self {
        Self {
            core: NodeCore::with_defaults("CommonProperty", &COMMON_PROPERTY_SCHEMA),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("CommonProperty", el);
        core.load(&COMMON_PROPERTY_SCHEMA, warnings);
        Self { core }
    }
}

impl Default for CommonProperty {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for CommonProperty {
    fn schema(&self) -> &'static Schema {
        &COMMON_PROPERTY_SCHEMA
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warn::WarningKind;
    use crate::xml;

    #[test]
    fn test_hook_stop_flags_differ_per_block() {
        let before_compile = UserCommands::before_compile();
        let before_make = UserCommands::before_make();
        let after_make = UserCommands::after_make();

        assert_eq!(before_compile.option("nStopU1X"), Some("0"));
        assert!(before_compile.option("nStopB1X").is_none());
        assert_eq!(before_make.option("nStopB2X"), Some("0"));
        assert_eq!(after_make.option("nStopA1X"), Some("0"));
    }

    #[test]
    fn test_common_option_device_defaults() {
        let common = TargetCommonOption::new();
        assert_eq!(common.option("Device"), Some("STM32F103ZE"));
        assert_eq!(common.option("PackID"), Some("Keil.STM32F1xx_DFP.2.4.1"));
        assert_eq!(common.option("OutputDirectory"), Some(".\\Objects\\"));
        assert_eq!(common.option("CreateHexFile"), Some("1"));
    }

    #[test]
    fn test_hooks_adopted_from_document() {
        let el = xml::parse(
            "<TargetCommonOption><Device>STM32F103C8</Device>\
             <BeforeMake><RunUserProg1>1</RunUserProg1><UserProg1Name>fromelf.exe</UserProg1Name>\
             </BeforeMake></TargetCommonOption>",
        )
        .unwrap();
        let mut warnings = Warnings::new();
        let common = TargetCommonOption::from_element(el, &mut warnings);

        assert_eq!(common.option("Device"), Some("STM32F103C8"));
        assert_eq!(common.before_make().option("RunUserProg1"), Some("1"));
        assert_eq!(
            common.before_make().option("UserProg1Name"),
            Some("fromelf.exe")
        );
        // Everything not present in the snippet was defaulted.
        assert!(warnings.count_of(WarningKind::MissingOption) > 0);
        assert_eq!(warnings.count_of(WarningKind::UnknownChild), 0);
    }

    #[test]
    fn test_serialize_places_hooks_after_options() {
        let common = TargetCommonOption::new();
        let el = common.to_element();
        let n = el.children.len();
        // 40 option leaves followed by the four hook blocks.
        assert_eq!(n, 44);
        assert_eq!(el.children[0].tag, "Device");
        assert_eq!(el.children[n - 4].tag, "TargetStatus");
        assert_eq!(el.children[n - 1].tag, "AfterMake");
    }
}
