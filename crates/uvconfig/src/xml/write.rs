//! Serializer matching the uVision on-disk layout
//!
//! Two-space indentation, one element per line, and explicit closing tags
//! even for empty leaves. uVision rewrites files in this exact shape, so
//! emitting it keeps diffs against IDE-saved projects quiet.

use super::Element;

/// Declaration line uVision writes at the top of every project file.
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\" ?>";

/// Render a complete document: declaration, root element, trailing newline.
pub fn write_document(root: &Element) -> String {
    let mut out = String::new();
    out.push_str(XML_DECLARATION);
    out.push('\n');
    write_element(&mut out, root, 0);
    out
}

fn write_element(out: &mut String, el: &Element, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(out, value, true);
        out.push('"');
    }
    out.push('>');

    if el.children.is_empty() {
        escape_into(out, &el.text, false);
    } else {
        out.push('\n');
        for child in &el.children {
            write_element(out, child, depth + 1);
        }
        for _ in 0..depth {
            out.push_str("  ");
        }
    }

    out.push_str("</");
    out.push_str(&el.tag);
    out.push_str(">\n");
}

fn escape_into(out: &mut String, text: &str, in_attr: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attr => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;

    #[test]
    fn test_write_empty_leaf_has_closing_tag() {
        let doc = write_document(&Element::new("OutputName"));
        assert_eq!(
            doc,
            format!("{XML_DECLARATION}\n<OutputName></OutputName>\n")
        );
    }

    #[test]
    fn test_write_indentation() {
        let mut root = Element::new("Project");
        let mut targets = Element::new("Targets");
        let mut target = Element::new("Target");
        target.push(Element::with_text("TargetName", "app"));
        targets.push(target);
        root.push(targets);

        let doc = write_document(&root);
        let expected = format!(
            "{XML_DECLARATION}\n\
             <Project>\n\
             \x20 <Targets>\n\
             \x20   <Target>\n\
             \x20     <TargetName>app</TargetName>\n\
             \x20   </Target>\n\
             \x20 </Targets>\n\
             </Project>\n"
        );
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_write_attributes_on_root() {
        let mut root = Element::new("Project");
        root.set_attr("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance");
        root.set_attr("xsi:noNamespaceSchemaLocation", "project_projx.xsd");

        let doc = write_document(&root);
        assert!(doc.contains(
            "<Project xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
             xsi:noNamespaceSchemaLocation=\"project_projx.xsd\">"
        ));
    }

    #[test]
    fn test_write_escapes_text() {
        let doc = write_document(&Element::with_text("MiscControls", "-DVAL=\"<a>&\""));
        assert!(doc.contains("<MiscControls>-DVAL=\"&lt;a&gt;&amp;\"</MiscControls>"));
    }

    #[test]
    fn test_write_parse_round_trip() {
        let mut root = Element::new("Project");
        root.set_attr("xsi:noNamespaceSchemaLocation", "project_projx.xsd");
        let mut target = Element::new("Target");
        target.push(Element::with_text("TargetName", "a & b"));
        target.push(Element::new("OutputName"));
        root.push(target);

        let reparsed = parse(&write_document(&root)).unwrap();
        assert_eq!(reparsed, root);
    }
}
