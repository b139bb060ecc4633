use crate::entities::{escape_attr, escape_text};
use crate::types::Node;

/// Serialize a DOM back to markup.
///
/// A `Document` serializes as its doctype (if any) followed by its
/// children, so a fragment parsed without a doctype round-trips as a bare
/// fragment. Rawtext elements (`script`, `style`) emit their text children
/// verbatim; everywhere else text and attribute values are re-escaped.
pub fn serialize(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn is_rawtext_element(name: &str) -> bool {
    name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style")
}

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Document { doctype, children } => {
            if let Some(dt) = doctype {
                out.push_str("<!");
                out.push_str(dt);
                out.push('>');
            }
            for child in children {
                write_node(child, out);
            }
        }
        Node::Element {
            name,
            attributes,
            children,
        } => {
            out.push('<');
            out.push_str(name);
            for (key, value) in attributes {
                out.push(' ');
                out.push_str(key);
                if let Some(value) = value {
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
            }
            out.push('>');

            if is_void_element(name) {
                return;
            }

            if is_rawtext_element(name) {
                for child in children {
                    if let Node::Text { text } = child {
                        out.push_str(text);
                    }
                }
            } else {
                for child in children {
                    write_node(child, out);
                }
            }

            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Node::Text { text } => out.push_str(&escape_text(text)),
        Node::Comment { text } => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}
