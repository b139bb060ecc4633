//! Position harvesting: run one position's scripts with their writes
//! captured, resolve the captured output through the whole pipeline, and
//! splice the result back where the scripts stood.

use html::Node;
use html::scripts::{ScriptSource, script_source};
use script::{Engine, Loader, run_script, sink};

use crate::position::{first_position, has_position};

/// Drive every remaining position to completion, lowest first.
///
/// Positions are processed strictly one at a time: a later position's
/// scripts may depend on global state mutated by an earlier one, so the
/// order a browser would have executed them in must be preserved. Each pass
/// re-queries the tree, which after splice-and-remove naturally yields the
/// next position in document order.
pub(crate) fn harvest_all_positions(
    engine: &dyn Engine,
    loader: &dyn Loader,
    root: &mut Node,
) {
    while let Some(position) = first_position(root) {
        let captured = harvest_position(engine, loader, root, &position);
        log::debug!(
            target: "swrite",
            "position {position}: captured {} bytes",
            captured.len()
        );

        // The captured text may itself contain scripts that write more
        // scripts; resolving it is a full pipeline pass of its own.
        let resolved = crate::transform_now(engine, loader, &captured);

        let fragment = html::parse(&resolved);
        let Node::Document { children, .. } = fragment else {
            unreachable!("parse always returns a document");
        };
        splice_before_first(root, &position, children);
        remove_position_scripts(root, &position);
    }
}

/// Run every script currently at `position`, strictly in document order,
/// with the write sink redirected into one capture buffer.
///
/// The script list is snapshotted once up front; the capture guard restores
/// the previous sink exactly once on every exit path, including the
/// zero-script case and panics inside the engine.
fn harvest_position(
    engine: &dyn Engine,
    loader: &dyn Loader,
    root: &Node,
    position: &str,
) -> String {
    let mut scripts: Vec<ScriptSource> = Vec::new();
    collect_scripts(root, position, &mut scripts);

    let capture = sink::Capture::begin();
    for source in &scripts {
        run_script(engine, loader, source);
    }
    capture.finish()
}

fn collect_scripts(node: &Node, position: &str, out: &mut Vec<ScriptSource>) {
    let Some(children) = node.children() else {
        return;
    };
    for child in children {
        if has_position(child, position) {
            out.push(script_source(child));
        }
        collect_scripts(child, position, out);
    }
}

/// Insert `fragment` immediately before the first (document order) script
/// at `position`. No-op when the position is gone or the fragment is empty.
fn splice_before_first(root: &mut Node, position: &str, fragment: Vec<Node>) {
    let mut pending = Some(fragment);
    splice(root, position, &mut pending);

    fn splice(node: &mut Node, position: &str, pending: &mut Option<Vec<Node>>) {
        let Some(children) = node.children_mut() else {
            return;
        };
        for i in 0..children.len() {
            if has_position(&children[i], position) {
                let fragment = pending.take().expect("fragment consumed at most once");
                children.splice(i..i, fragment);
                return;
            }
            splice(&mut children[i], position, pending);
            if pending.is_none() {
                return;
            }
        }
    }
}

/// Remove every script node at `position` from the tree. Their positions
/// are fully harvested; removal also drops the stamp attribute so nothing
/// leaks into serialized output.
fn remove_position_scripts(root: &mut Node, position: &str) {
    let Some(children) = root.children_mut() else {
        return;
    };
    children.retain(|child| !has_position(child, position));
    for child in children {
        remove_position_scripts(child, position);
    }
}
