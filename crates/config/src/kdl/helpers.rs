//! Small accessors over KDL nodes.
//!
//! A field may be written either as a child node (`address "0.0.0.0:8000"`)
//! or as a property on the parent (`listener address="0.0.0.0:8000"`).

use kdl::{KdlNode, KdlValue};

/// Find a direct child node by name
pub fn get_child<'a>(node: &'a KdlNode, name: &str) -> Option<&'a KdlNode> {
    node.children()?
        .nodes()
        .iter()
        .find(|child| child.name().value() == name)
}

/// Value of a field, looked up as a property first and then as a child node
fn get_entry_value<'a>(node: &'a KdlNode, name: &str) -> Option<&'a KdlValue> {
    let property = node.entries().iter().find_map(|entry| match entry.name() {
        Some(key) if key.value() == name => Some(entry.value()),
        _ => None,
    });
    property.or_else(|| get_child(node, name).and_then(first_arg))
}

fn first_arg(node: &KdlNode) -> Option<&KdlValue> {
    node.entries()
        .iter()
        .find(|entry| entry.name().is_none())
        .map(|entry| entry.value())
}

pub fn get_string_entry(node: &KdlNode, name: &str) -> Option<String> {
    get_entry_value(node, name)
        .and_then(KdlValue::as_string)
        .map(str::to_string)
}
