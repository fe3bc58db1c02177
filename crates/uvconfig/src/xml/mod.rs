//! Minimal XML layer for uVision project documents
//!
//! Project files use a narrow XML subset: a UTF-8 declaration, text-only
//! leaves, explicit closing tags, and attributes only on the document root.
//! This module owns exactly that subset; it is not a general XML library.

mod parse;
mod write;

pub use parse::{parse, XmlError};
pub use write::{write_document, XML_DECLARATION};

/// A single element: tag, attributes, text content and child elements.
///
/// Mixed content is out of contract: an element carries either text or
/// children. When both appear in input, children win and stray text is
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// Create an empty element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Create a text leaf
    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Look up an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Add an attribute
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.push((name.into(), value.into()));
    }

    /// First child with the given tag
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Append a child element
    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_lookup() {
        let mut el = Element::new("Project");
        el.set_attr("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance");

        assert_eq!(
            el.attr("xmlns:xsi"),
            Some("http://www.w3.org/2001/XMLSchema-instance")
        );
        assert_eq!(el.attr("missing"), None);
    }

    #[test]
    fn test_child_lookup_first_match() {
        let mut el = Element::new("Target");
        el.push(Element::with_text("TargetName", "app"));
        el.push(Element::with_text("TargetName", "shadow"));

        assert_eq!(el.child("TargetName").unwrap().text, "app");
        assert!(el.child("Groups").is_none());
    }
}
