use crate::types::Node;

/// The executable payload of one `<script>` element, snapshotted out of the
/// tree so callers can keep running scripts while the tree mutates.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptSource {
    /// Inline code: the element's text content.
    Inline(String),
    /// Remote code: the `src` attribute value.
    Remote(String),
}

pub fn is_script(node: &Node) -> bool {
    node.is_element_named("script")
}

/// A script is remote iff it carries a non-empty `src`; otherwise its
/// inline body is the source, even when empty.
pub fn script_source(node: &Node) -> ScriptSource {
    match node.attr("src") {
        Some(src) if !src.trim().is_empty() => ScriptSource::Remote(src.trim().to_string()),
        _ => ScriptSource::Inline(node.text_content()),
    }
}
