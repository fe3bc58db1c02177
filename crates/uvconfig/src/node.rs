//! Node engine: schema-driven load, sync, link and serialize
//!
//! Every catalog type wraps a [`NodeCore`]. The core keeps two views of a
//! node: the extracted option map, and the ordered child list as it came
//! off disk. Child slots hold either a raw element (option leaves, plus
//! anything not yet claimed) or a reference into the owner's typed
//! subconfig list. Loading repairs the child list against the schema,
//! syncing pushes map values back into the leaves, linking replaces raw
//! structural children with typed references, and serialization renders
//! the normalized form from the map and the typed subconfigs.

use crate::ident;
use crate::schema::{OptionMap, Schema};
use crate::warn::{WarningKind, Warnings};
use crate::xml::Element;

/// One position in a node's child list.
#[derive(Debug, Clone)]
pub enum Child {
    /// An element not claimed by a typed subconfig. After load this is
    /// either an option leaf or a structural duplicate awaiting link.
    Raw(Element),
    /// Reference to the owner's subconfig at this index.
    Sub(usize),
}

/// Shared state of every config node.
#[derive(Debug, Clone)]
pub struct NodeCore {
    tag: &'static str,
    options: OptionMap,
    children: Vec<Child>,
}

impl NodeCore {
    /// Fresh node with every option at its default, leaves included.
    /// Used by the mutation path; emits no warnings.
    pub(crate) fn with_defaults(tag: &'static str, schema: &Schema) -> Self {
        debug_assert!(ident::is_bare_identifier(tag), "bad catalog tag {tag:?}");
        let mut core = Self {
            tag,
            options: OptionMap::new(),
            children: Vec::with_capacity(schema.options.len()),
        };
        for spec in schema.options {
            core.options.set(spec.tag, spec.default);
            core.children
                .push(Child::Raw(Element::with_text(spec.tag, spec.default)));
        }
        core
    }

    /// Wrap a parsed element. Children become raw slots; attributes and
    /// stray text are dropped (only the document root carries attributes,
    /// and those are reattached at write time).
    pub(crate) fn from_element(tag: &'static str, el: Element) -> Self {
        debug_assert_eq!(el.tag, tag, "constructed from a foreign element");
        Self {
            tag,
            options: OptionMap::new(),
            children: el.children.into_iter().map(Child::Raw).collect(),
        }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn options(&self) -> &OptionMap {
        &self.options
    }

    pub(crate) fn options_mut(&mut self) -> &mut OptionMap {
        &mut self.options
    }

    /// The child list in document order, for inspection.
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Repair this node against its schema and extract option values.
    ///
    /// Three passes over the child list: discard children the schema does
    /// not allow, append a default leaf for every declared option with no
    /// leaf present, then read each option's first matching leaf into the
    /// map. Each discard and each fill produces one warning. Running load
    /// again on a repaired node changes nothing and warns nothing.
    pub(crate) fn load(&mut self, schema: &Schema, warnings: &mut Warnings) {
        let node = self.tag;
        self.children.retain(|child| match child {
            Child::Sub(_) => true,
            Child::Raw(el) => {
                if schema.allows(&el.tag) {
                    true
                } else {
                    warnings.push(node, &el.tag, WarningKind::UnknownChild);
                    false
                }
            }
        });

        for spec in schema.options {
            let present = self
                .children
                .iter()
                .any(|c| matches!(c, Child::Raw(el) if el.tag == spec.tag));
            if !present {
                warnings.push(node, spec.tag, WarningKind::MissingOption);
                self.children
                    .push(Child::Raw(Element::with_text(spec.tag, spec.default)));
            }
        }

        for spec in schema.options {
            let value = self
                .children
                .iter()
                .find_map(|c| match c {
                    Child::Raw(el) if el.tag == spec.tag => Some(el.text.clone()),
                    _ => None,
                })
                .unwrap_or_else(|| spec.default.to_string());
            self.options.set(spec.tag, value);
        }
    }

    /// Push every option value back into its leaf, recreating leaves that
    /// have gone missing.
    pub(crate) fn sync_own_options(&mut self, warnings: &mut Warnings) {
        let node = self.tag;
        for (tag, value) in self.options.iter() {
            let leaf = self.children.iter_mut().find_map(|c| match c {
                Child::Raw(el) if el.tag == tag => Some(el),
                _ => None,
            });
            match leaf {
                Some(el) => el.text = value.to_string(),
                None => {
                    warnings.push(node, tag, WarningKind::CreatedOnSync);
                    self.children
                        .push(Child::Raw(Element::with_text(tag, value)));
                }
            }
        }
    }

    /// Claim the first raw child with `tag`, leaving a subconfig
    /// reference in its place.
    pub(crate) fn take_raw(&mut self, tag: &str, index: usize) -> Option<Element> {
        let pos = self
            .children
            .iter()
            .position(|c| matches!(c, Child::Raw(el) if el.tag == tag))?;
        match std::mem::replace(&mut self.children[pos], Child::Sub(index)) {
            Child::Raw(el) => Some(el),
            Child::Sub(_) => None,
        }
    }

    /// Claim every raw child with `tag`, numbering the references from
    /// `start`. Encounter order is preserved.
    pub(crate) fn take_raw_all(&mut self, tag: &str, start: usize) -> Vec<Element> {
        let mut taken = Vec::new();
        for child in self.children.iter_mut() {
            let is_match = matches!(&*child, Child::Raw(el) if el.tag == tag);
            if is_match {
                if let Child::Raw(el) =
                    std::mem::replace(child, Child::Sub(start + taken.len()))
                {
                    taken.push(el);
                }
            }
        }
        taken
    }

    /// Record a subconfig that had no element of its own.
    pub(crate) fn attach_sub(&mut self, index: usize) {
        self.children.push(Child::Sub(index));
    }

    /// Drop unclaimed structural children and make sure every subconfig
    /// index appears exactly where expected. Safe to run repeatedly.
    pub(crate) fn relink(&mut self, schema: &Schema, sub_count: usize) {
        self.children.retain(|c| match c {
            Child::Raw(el) => !schema.allows_child(&el.tag),
            Child::Sub(_) => true,
        });
        for index in 0..sub_count {
            let present = self
                .children
                .iter()
                .any(|c| matches!(c, Child::Sub(i) if *i == index));
            if !present {
                self.children.push(Child::Sub(index));
            }
        }
    }
}

/// Behavior shared by every node in the catalog.
///
/// Types provide their schema, their core and their typed subconfig list;
/// the document-wide operations are derived from those.
pub trait ConfigNode {
    fn schema(&self) -> &'static Schema;
    fn core(&self) -> &NodeCore;
    fn core_mut(&mut self) -> &mut NodeCore;

    /// Typed subconfigs in catalog order. Indices in [`Child::Sub`] slots
    /// refer to positions in this list.
    fn subconfigs(&self) -> Vec<&dyn ConfigNode>;
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode>;

    fn tag(&self) -> &'static str {
        self.core().tag()
    }

    fn option(&self, tag: &str) -> Option<&str> {
        self.core().options().get(tag)
    }

    /// Set an option value in the map. The leaf is updated on the next
    /// sync; setting a tag the schema does not declare still works and
    /// serializes after the declared options.
    fn set_option(&mut self, tag: &str, value: &str) {
        self.core_mut().options_mut().set(tag, value);
    }

    /// Repair this node against its schema. Constructors call this once;
    /// calling it again is harmless.
    fn load(&mut self, warnings: &mut Warnings) {
        let schema = self.schema();
        self.core_mut().load(schema, warnings);
    }

    /// Write option values back into their leaves, here and (when
    /// `recurse` is set) in every subconfig below.
    fn sync_options(&mut self, recurse: bool, warnings: &mut Warnings) {
        self.core_mut().sync_own_options(warnings);
        if recurse {
            for sub in self.subconfigs_mut() {
                sub.sync_options(true, warnings);
            }
        }
    }

    /// Re-establish the child-slot to subconfig mapping: duplicates of
    /// claimed structural children are dropped and missing subconfig
    /// references are appended. Idempotent.
    fn link(&mut self, recurse: bool) {
        let schema = self.schema();
        let count = self.subconfigs().len();
        self.core_mut().relink(schema, count);
        if recurse {
            for sub in self.subconfigs_mut() {
                sub.link(true);
            }
        }
    }

    /// Render the normalized element: declared options as text leaves in
    /// map order, then subconfigs in catalog order.
    fn to_element(&self) -> Element {
        let mut el = Element::new(self.tag());
        for (tag, value) in self.core().options().iter() {
            el.push(Element::with_text(tag, value));
        }
        for sub in self.subconfigs() {
            el.push(sub.to_element());
        }
        el
    }
}

/// Claim `tag` from `core` for the subconfig at `index`, building the
/// typed node from the claimed element or from an empty one when the
/// document lacks it. The empty case reports every option of the missing
/// subtree as defaulted.
pub(crate) fn adopt_child<T>(
    core: &mut NodeCore,
    index: usize,
    tag: &'static str,
    warnings: &mut Warnings,
    build: impl FnOnce(Element, &mut Warnings) -> T,
) -> T {
    match core.take_raw(tag, index) {
        Some(el) => build(el, warnings),
        None => {
            core.attach_sub(index);
            build(Element::new(tag), warnings)
        }
    }
}

/// Claim every instance of a repeatable child. Zero instances is valid
/// and builds nothing.
pub(crate) fn adopt_children<T>(
    core: &mut NodeCore,
    start: usize,
    tag: &'static str,
    warnings: &mut Warnings,
    build: impl Fn(Element, &mut Warnings) -> T,
) -> Vec<T> {
    core.take_raw_all(tag, start)
        .into_iter()
        .map(|el| build(el, warnings))
        .collect()
}
