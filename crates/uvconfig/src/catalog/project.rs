//! The document root and its non-target children

use crate::node::{adopt_child, adopt_children, ConfigNode, NodeCore};
use crate::schema::{opt, Schema};
use crate::warn::Warnings;
use crate::xml::Element;

use super::target::Targets;

static RTE_SCHEMA: Schema = Schema {
    options: &[opt("apis", ""), opt("components", ""), opt("files", "")],
    children: &[],
};

/// Run-Time Environment block. The pack manager writes real content
/// here; projects managed by this tooling keep it empty.
#[derive(Debug, Clone)]
pub struct Rte {
    core: NodeCore,
}

impl Rte {
    pub fn new() -> Self {
        Self {
            core: NodeCore::with_defaults("RTE", &RTE_SCHEMA),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("RTE", el);
        core.load(&RTE_SCHEMA, warnings);
        Self { core }
    }
}

impl Default for Rte {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for Rte {
    fn schema(&self) -> &'static Schema {
        &RTE_SCHEMA
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

static LAYER_SCHEMA: Schema = Schema {
    options: &[opt("LayName", ""), opt("LayPrjMark", "")],
    children: &[],
};

/// One project layer entry.
#[derive(Debug, Clone)]
pub struct Layer {
    core: NodeCore,
}

impl Layer {
    pub fn new() -> Self {
        Self {
            core: NodeCore::with_defaults("Layer", &LAYER_SCHEMA),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("Layer", el);
        core.load(&LAYER_SCHEMA, warnings);
        Self { core }
    }

    pub fn name(&self) -> &str {
        self.core.options().get("LayName").unwrap_or("")
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for Layer {
    fn schema(&self) -> &'static Schema {
        &LAYER_SCHEMA
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

static LAYERS_SCHEMA: Schema = Schema {
    options: &[],
    children: &["Layer"],
};

/// The layer list inside `LayerInfo`.
#[derive(Debug, Clone)]
pub struct Layers {
    core: NodeCore,
    layers: Vec<Layer>,
}

impl Layers {
    pub fn new() -> Self {
        Self {
            core: NodeCore::with_defaults("Layers", &LAYERS_SCHEMA),
            layers: Vec::new(),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("Layers", el);
        core.load(&LAYERS_SCHEMA, warnings);
        let layers = adopt_children(&mut core, 0, "Layer", warnings, Layer::from_element);
        Self { core, layers }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Layer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn push(&mut self, layer: Layer) {
        let index = self.layers.len();
        self.layers.push(layer);
        self.core.attach_sub(index);
    }
}

impl Default for Layers {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for Layers {
    fn schema(&self) -> &'static Schema {
        &LAYERS_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        self.layers.iter().map(|l| l as &dyn ConfigNode).collect()
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        self.layers
            .iter_mut()
            .map(|l| l as &mut dyn ConfigNode)
            .collect()
    }
}

static LAYER_INFO_SCHEMA: Schema = Schema {
    options: &[],
    children: &["Layers"],
};

/// Wrapper uVision writes around the layer list.
#[derive(Debug, Clone)]
pub struct LayerInfo {
    core: NodeCore,
    layers: Layers,
}

impl LayerInfo {
    pub fn new() -> Self {
        let mut core = NodeCore::with_defaults("LayerInfo", &LAYER_INFO_SCHEMA);
        core.attach_sub(0);
        Self {
            core,
            layers: Layers::new(),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("LayerInfo", el);
        core.load(&LAYER_INFO_SCHEMA, warnings);
        let layers = adopt_child(&mut core, 0, "Layers", warnings, Layers::from_element);
        Self { core, layers }
    }

    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut Layers {
        &mut self.layers
    }
}

impl Default for LayerInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for LayerInfo {
    fn schema(&self) -> &'static Schema {
        &LAYER_INFO_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        vec![&self.layers]
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        vec![&mut self.layers]
    }
}

static PROJECT_SCHEMA: Schema = Schema {
    options: &[
        opt("SchemaVersion", "2.1"),
        opt("Header", "### uVision Project, (C) Keil Software"),
    ],
    children: &["Targets", "RTE", "LayerInfo"],
};

/// The `<Project>` root.
#[derive(Debug, Clone)]
pub struct Project {
    core: NodeCore,
    targets: Targets,
    rte: Rte,
    layer_info: LayerInfo,
}

impl Project {
    pub fn new() -> Self {
        let mut core = NodeCore::with_defaults("Project", &PROJECT_SCHEMA);
        for index in 0..3 {
            core.attach_sub(index);
        }
        Self {
            core,
            targets: Targets::new(),
            rte: Rte::new(),
            layer_info: LayerInfo::new(),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("Project", el);
        core.load(&PROJECT_SCHEMA, warnings);
        let targets = adopt_child(&mut core, 0, "Targets", warnings, Targets::from_element);
        let rte = adopt_child(&mut core, 1, "RTE", warnings, Rte::from_element);
        let layer_info = adopt_child(&mut core, 2, "LayerInfo", warnings, LayerInfo::from_element);
        Self {
            core,
            targets,
            rte,
            layer_info,
        }
    }

    pub fn targets(&self) -> &Targets {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut Targets {
        &mut self.targets
    }

    pub fn rte(&self) -> &Rte {
        &self.rte
    }

    pub fn layer_info(&self) -> &LayerInfo {
        &self.layer_info
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for Project {
    fn schema(&self) -> &'static Schema {
        &PROJECT_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        vec![&self.targets, &self.rte, &self.layer_info]
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        vec![&mut self.targets, &mut self.rte, &mut self.layer_info]
    }
}
