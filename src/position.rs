//! Position assignment: label maximal runs of adjacent sibling scripts.
//!
//! Scripts are visited in document order. A script inherits the position of
//! its immediately preceding sibling when that sibling is itself a script
//! (already stamped by this same pass); any intervening sibling — element,
//! text, or comment — starts a fresh position. Position values therefore
//! increase in document order of first appearance and are unique within one
//! pipeline pass.

use html::Node;
use html::scripts::is_script;

/// Attribute used to stamp script elements. Stamped scripts are always
/// removed by the harvester, so the attribute never reaches serialized
/// output.
pub(crate) const POSITION_ATTR: &str = "position";

pub(crate) fn assign_positions(root: &mut Node) {
    let mut next = 0u32;
    walk(root, &mut next);
}

fn walk(node: &mut Node, next: &mut u32) {
    let Some(children) = node.children_mut() else {
        return;
    };
    for i in 0..children.len() {
        if is_script(&children[i]) {
            let inherited = if i > 0 && is_script(&children[i - 1]) {
                children[i - 1].attr(POSITION_ATTR).map(str::to_string)
            } else {
                None
            };
            let value = inherited.unwrap_or_else(|| {
                let fresh = next.to_string();
                *next += 1;
                fresh
            });
            children[i].set_attr(POSITION_ATTR, value);
        }
        walk(&mut children[i], next);
    }
}

/// The position value of the first (document order) script still carrying
/// one, i.e. the lowest remaining position.
pub(crate) fn first_position(node: &Node) -> Option<String> {
    let children = node.children()?;
    for child in children {
        if is_script(child) {
            if let Some(position) = child.attr(POSITION_ATTR) {
                return Some(position.to_string());
            }
        }
        if let Some(position) = first_position(child) {
            return Some(position);
        }
    }
    None
}

pub(crate) fn has_position(node: &Node, position: &str) -> bool {
    is_script(node) && node.attr(POSITION_ATTR) == Some(position)
}
