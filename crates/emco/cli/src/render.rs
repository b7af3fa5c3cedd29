use std::fmt::Write;

use emco_api::{model::Resource, path::ResourcePath};
use emco_console::tree::{ResourceNode, TreeStore};

const INDENT: &str = "  ";

/// One line per resource: its name, version if any, and description.
pub(crate) fn line(resource: &Resource) -> String {
    let mut line = resource.name().to_string();
    if let Some(version) = resource.spec_str("version") {
        write!(line, " ({version})").ok();
    }
    let description = resource.metadata.description.trim();
    if !description.is_empty() {
        write!(line, "\t{description}").ok();
    }
    line
}

pub(crate) fn list(nodes: &[ResourceNode]) -> Vec<String> {
    nodes.iter().map(|node| line(&node.resource)).collect()
}

/// Renders every fetched collection below `path`; collections that were
/// never fetched are left out.
pub(crate) fn tree(store: &TreeStore, path: &ResourcePath) -> String {
    let mut out = String::default();
    if let Some(node) = store.get(path) {
        if path.is_root() {
            render_children(&mut out, node, 0);
        } else {
            render(&mut out, node, 0);
        }
    }
    out
}

fn render(out: &mut String, node: &ResourceNode, depth: usize) {
    writeln!(out, "{}{}", INDENT.repeat(depth), line(&node.resource)).ok();
    render_children(out, node, depth + 1);
}

fn render_children(out: &mut String, node: &ResourceNode, depth: usize) {
    for kind in node.fetched_kinds() {
        let children = node.children(kind).unwrap_or_default();
        writeln!(out, "{}[{kind}]", INDENT.repeat(depth)).ok();
        if children.is_empty() {
            writeln!(out, "{}(none)", INDENT.repeat(depth + 1)).ok();
        }
        for child in children {
            render(out, child, depth + 1);
        }
    }
}
