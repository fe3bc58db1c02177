//! Static schemas and the per-node option store
//!
//! Every node type declares its schema as a `static`: the ordered option
//! table with default text, plus the set of structural child tags. Declared
//! order is load order, sync order and serialize order, so the tables in
//! `catalog` are written in the exact order uVision emits the leaves.

/// One declared option: leaf tag and default text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub tag: &'static str,
    pub default: &'static str,
}

/// Shorthand for building schema tables.
pub const fn opt(tag: &'static str, default: &'static str) -> OptionSpec {
    OptionSpec { tag, default }
}

/// A node type's contract: which leaves it owns and which child elements
/// it may contain.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub options: &'static [OptionSpec],
    pub children: &'static [&'static str],
}

impl Schema {
    pub const EMPTY: Schema = Schema {
        options: &[],
        children: &[],
    };

    pub fn allows_option(&self, tag: &str) -> bool {
        self.options.iter().any(|o| o.tag == tag)
    }

    pub fn allows_child(&self, tag: &str) -> bool {
        self.children.iter().any(|c| *c == tag)
    }

    /// Valid-key check: option leaves and structural children both count.
    pub fn allows(&self, tag: &str) -> bool {
        self.allows_option(tag) || self.allows_child(tag)
    }

    pub fn default_for(&self, tag: &str) -> Option<&'static str> {
        self.options.iter().find(|o| o.tag == tag).map(|o| o.default)
    }
}

/// Insertion-ordered option values for one node.
///
/// Lookups are linear; nodes carry at most a few dozen options and the
/// declared order must survive into serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    entries: Vec<(String, String)>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Set a value, replacing in place or appending at the end.
    pub fn set(&mut self, tag: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| t == tag) {
            Some((_, v)) => *v = value,
            None => self.entries.push((tag.to_string(), value)),
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.iter().any(|(t, _)| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static DEMO: Schema = Schema {
        options: &[opt("Device", "STM32F103ZE"), opt("Vendor", "STMicroelectronics")],
        children: &["TargetStatus"],
    };

    #[test]
    fn test_schema_lookups() {
        assert!(DEMO.allows_option("Device"));
        assert!(!DEMO.allows_option("TargetStatus"));
        assert!(DEMO.allows_child("TargetStatus"));
        assert!(DEMO.allows("Device"));
        assert!(DEMO.allows("TargetStatus"));
        assert!(!DEMO.allows("Bogus"));
        assert_eq!(DEMO.default_for("Vendor"), Some("STMicroelectronics"));
        assert_eq!(DEMO.default_for("Bogus"), None);
    }

    #[test]
    fn test_option_map_preserves_insertion_order() {
        let mut map = OptionMap::new();
        map.set("b", "2");
        map.set("a", "1");
        map.set("c", "3");
        map.set("b", "20");

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("b", "20"), ("a", "1"), ("c", "3")]);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_option_map_get() {
        let mut map = OptionMap::new();
        map.set("Device", "STM32F103ZE");
        assert_eq!(map.get("Device"), Some("STM32F103ZE"));
        assert_eq!(map.get("Vendor"), None);
        assert!(map.contains("Device"));
    }
}
