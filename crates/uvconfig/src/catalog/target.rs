//! Target nodes: toolset identity, the option block and the source tree

use crate::node::{adopt_child, adopt_children, ConfigNode, NodeCore};
use crate::schema::{opt, Schema};
use crate::warn::Warnings;
use crate::xml::Element;

use super::armads::TargetArmAds;
use super::common::{CommonProperty, TargetCommonOption};
use super::debug::{DebugOption, DllOption, Utilities};
use super::files::Groups;

static TARGET_OPTION_SCHEMA: Schema = Schema {
    options: &[],
    children: &[
        "TargetCommonOption",
        "CommonProperty",
        "DllOption",
        "DebugOption",
        "Utilities",
        "TargetArmAds",
    ],
};

/// The `<TargetOption>` block: every settings page of one target.
#[derive(Debug, Clone)]
pub struct TargetOption {
    core: NodeCore,
    common_option: TargetCommonOption,
    common_property: CommonProperty,
    dll_option: DllOption,
    debug_option: DebugOption,
    utilities: Utilities,
    arm_ads: TargetArmAds,
}

impl TargetOption {
    pub fn new() -> Self {
        let mut core = NodeCore::with_defaults("TargetOption", &TARGET_OPTION_SCHEMA);
        for index in 0..6 {
            core.attach_sub(index);
        }
        Self {
            core,
            common_option: TargetCommonOption::new(),
            common_property: CommonProperty::new(),
            dll_option: DllOption::new(),
            debug_option: DebugOption::new(),
            utilities: Utilities::new(),
            arm_ads: TargetArmAds::new(),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("TargetOption", el);
        core.load(&TARGET_OPTION_SCHEMA, warnings);
        let common_option = adopt_child(
            &mut core,
            0,
            "TargetCommonOption",
            warnings,
            TargetCommonOption::from_element,
        );
        let common_property = adopt_child(
            &mut core,
            1,
            "CommonProperty",
            warnings,
            CommonProperty::from_element,
        );
        let dll_option = adopt_child(&mut core, 2, "DllOption", warnings, DllOption::from_element);
        let debug_option = adopt_child(
            &mut core,
            3,
            "DebugOption",
            warnings,
            DebugOption::from_element,
        );
        let utilities = adopt_child(&mut core, 4, "Utilities", warnings, Utilities::from_element);
        let arm_ads = adopt_child(
            &mut core,
            5,
            "TargetArmAds",
            warnings,
            TargetArmAds::from_element,
        );
        Self {
            core,
            common_option,
            common_property,
            dll_option,
            debug_option,
            utilities,
            arm_ads,
        }
    }

    pub fn common_option(&self) -> &TargetCommonOption {
        &self.common_option
    }

    pub fn common_option_mut(&mut self) -> &mut TargetCommonOption {
        &mut self.common_option
    }

    pub fn common_property(&self) -> &CommonProperty {
        &self.common_property
    }

    pub fn dll_option(&self) -> &DllOption {
        &self.dll_option
    }

    pub fn debug_option(&self) -> &DebugOption {
        &self.debug_option
    }

    pub fn utilities(&self) -> &Utilities {
        &self.utilities
    }

    pub fn arm_ads(&self) -> &TargetArmAds {
        &self.arm_ads
    }

    pub fn arm_ads_mut(&mut self) -> &mut TargetArmAds {
        &mut self.arm_ads
    }
}

impl Default for TargetOption {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for TargetOption {
    fn schema(&self) -> &'static Schema {
        &TARGET_OPTION_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        vec![
            &self.common_option,
            &self.common_property,
            &self.dll_option,
            &self.debug_option,
            &self.utilities,
            &self.arm_ads,
        ]
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        vec![
            &mut self.common_option,
            &mut self.common_property,
            &mut self.dll_option,
            &mut self.debug_option,
            &mut self.utilities,
            &mut self.arm_ads,
        ]
    }
}

static TARGET_SCHEMA: Schema = Schema {
    options: &[
        opt("TargetName", ""),
        opt("ToolsetNumber", "0x4"),
        opt("ToolsetName", "ARM_ADS"),
        opt("pCCUsed", "6240000::V6.24::ARMCLANG"),
        opt("uAC6", "1"),
    ],
    children: &["TargetOption", "Groups"],
};

/// One build target.
#[derive(Debug, Clone)]
pub struct Target {
    core: NodeCore,
    target_option: TargetOption,
    groups: Groups,
}

impl Target {
    pub fn new() -> Self {
        let mut core = NodeCore::with_defaults("Target", &TARGET_SCHEMA);
        core.attach_sub(0);
        core.attach_sub(1);
        Self {
            core,
            target_option: TargetOption::new(),
            groups: Groups::new(),
        }
    }

    /// Fresh target with its name and output name already set.
    pub fn named(name: &str) -> Self {
        let mut target = Self::new();
        target.set_option("TargetName", name);
        target
            .target_option
            .common_option_mut()
            .set_option("OutputName", name);
        target
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("Target", el);
        core.load(&TARGET_SCHEMA, warnings);
        let target_option = adopt_child(
            &mut core,
            0,
            "TargetOption",
            warnings,
            TargetOption::from_element,
        );
        let groups = adopt_child(&mut core, 1, "Groups", warnings, Groups::from_element);
        Self {
            core,
            target_option,
            groups,
        }
    }

    pub fn name(&self) -> &str {
        self.core.options().get("TargetName").unwrap_or("")
    }

    pub fn target_option(&self) -> &TargetOption {
        &self.target_option
    }

    pub fn target_option_mut(&mut self) -> &mut TargetOption {
        &mut self.target_option
    }

    pub fn groups(&self) -> &Groups {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut Groups {
        &mut self.groups
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for Target {
    fn schema(&self) -> &'static Schema {
        &TARGET_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        vec![&self.target_option, &self.groups]
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        vec![&mut self.target_option, &mut self.groups]
    }
}

static TARGETS_SCHEMA: Schema = Schema {
    options: &[],
    children: &["Target"],
};

/// The target list under the project root.
#[derive(Debug, Clone)]
pub struct Targets {
    core: NodeCore,
    targets: Vec<Target>,
}

impl Targets {
    pub fn new() -> Self {
        Self {
            core: NodeCore::with_defaults("Targets", &TARGETS_SCHEMA),
            targets: Vec::new(),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("Targets", el);
        core.load(&TARGETS_SCHEMA, warnings);
        let targets = adopt_children(&mut core, 0, "Target", warnings, Target::from_element);
        Self { core, targets }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Target> {
        self.targets.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Target> {
        self.targets.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Target> {
        self.targets.get_mut(index)
    }

    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.targets.iter().position(|t| t.name() == name)
    }

    pub fn push(&mut self, target: Target) {
        let index = self.targets.len();
        self.targets.push(target);
        self.core.attach_sub(index);
    }
}

impl Default for Targets {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for Targets {
    type Output = Target;
    fn index(&self, index: usize) -> &Target {
        &self.targets[index]
    }
}

impl std::ops::IndexMut<usize> for Targets {
    fn index_mut(&mut self, index: usize) -> &mut Target {
        &mut self.targets[index]
    }
}

impl ConfigNode for Targets {
    fn schema(&self) -> &'static Schema {
        &TARGETS_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        self.targets.iter().map(|t| t as &dyn ConfigNode).collect()
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        self.targets
            .iter_mut()
            .map(|t| t as &mut dyn ConfigNode)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml;

    #[test]
    fn test_named_target_sets_output_name() {
        let target = Target::named("flight");
        assert_eq!(target.name(), "flight");
        assert_eq!(
            target.target_option().common_option().option("OutputName"),
            Some("flight")
        );
        assert_eq!(target.option("uAC6"), Some("1"));
    }

    #[test]
    fn test_target_serialize_shape() {
        let el = Target::named("app").to_element();
        let tags: Vec<&str> = el.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(
            tags,
            vec![
                "TargetName",
                "ToolsetNumber",
                "ToolsetName",
                "pCCUsed",
                "uAC6",
                "TargetOption",
                "Groups"
            ]
        );
    }

    #[test]
    fn test_targets_preserve_document_order() {
        let el = xml::parse(
            "<Targets>\
             <Target><TargetName>debug</TargetName></Target>\
             <Target><TargetName>release</TargetName></Target>\
             </Targets>",
        )
        .unwrap();
        let mut warnings = Warnings::new();
        let targets = Targets::from_element(el, &mut warnings);

        let names: Vec<&str> = targets.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["debug", "release"]);
        assert_eq!(targets.position_by_name("release"), Some(1));
        assert_eq!(targets.position_by_name("ship"), None);
    }
}
