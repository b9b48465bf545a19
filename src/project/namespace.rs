//! @acp:module "Namespace Reassembler"
//! @acp:summary "Folds dotted field names into nested namespace containers"
//! @acp:domain schema
//! @acp:layer service
//!
//! Folding runs in two passes: the dotted keys are first collected into a
//! tree, then each container type is built once from its finished subtree.

use std::sync::Arc;

use indexmap::IndexMap;

use super::enums::upper_first;
use super::types::{FieldConfig, FieldMap, NamespaceType};

enum Node {
    Leaf(FieldConfig),
    Branch(IndexMap<String, Node>),
}

/// @acp:summary "Nest every dotted key under namespace container fields"
///
/// `cat.aliases` and `cat.health` become one `cat` field whose container type
/// `<prefix>_Cat` exposes `aliases` and `health`. Deeper names nest further.
/// A leaf that has the same name as a namespace is dropped.
pub fn reassemble_nested_fields(fields: FieldMap, prefix: &str) -> FieldMap {
    let mut root: IndexMap<String, Node> = IndexMap::new();
    for (dotted, field) in fields {
        let segments: Vec<&str> = dotted.split('.').collect();
        insert_path(&mut root, &segments, field, &dotted);
    }
    build_fields(root, prefix, &mut Vec::new())
}

fn insert_path(level: &mut IndexMap<String, Node>, segments: &[&str], field: FieldConfig, dotted: &str) {
    match segments {
        [] => {}
        [name] => match level.get(*name) {
            Some(Node::Branch(_)) => {
                tracing::warn!("Field {} collides with a namespace of the same name, dropped", dotted);
            }
            _ => {
                level.insert(name.to_string(), Node::Leaf(field));
            }
        },
        [namespace, rest @ ..] => {
            let node = level
                .entry(namespace.to_string())
                .or_insert_with(|| Node::Branch(IndexMap::new()));
            if matches!(node, Node::Leaf(_)) {
                tracing::warn!("Field {} collides with the namespace of {}, dropped", namespace, dotted);
                *node = Node::Branch(IndexMap::new());
            }
            if let Node::Branch(children) = node {
                insert_path(children, rest, field, dotted);
            }
        }
    }
}

fn build_fields(level: IndexMap<String, Node>, prefix: &str, path: &mut Vec<String>) -> FieldMap {
    let mut fields = FieldMap::with_capacity(level.len());
    for (name, node) in level {
        match node {
            Node::Leaf(field) => {
                fields.insert(name, field);
            }
            Node::Branch(children) => {
                path.push(upper_first(&name));
                let type_name = format!("{}_{}", prefix, path.join("_"));
                let nested = build_fields(children, prefix, path);
                path.pop();

                let container = Arc::new(NamespaceType {
                    name: type_name,
                    fields: nested,
                });
                fields.insert(name, FieldConfig::namespace(container));
            }
        }
    }
    fields
}

/// @acp:summary "Move priority keys to the front, keeping the rest in order"
///
/// Priority keys missing from the map are ignored.
pub fn reorder_keys<V, S: AsRef<str>>(mut map: IndexMap<String, V>, priority: &[S]) -> IndexMap<String, V> {
    let mut ordered = IndexMap::with_capacity(map.len());
    for key in priority {
        if let Some((k, v)) = map.shift_remove_entry(key.as_ref()) {
            ordered.insert(k, v);
        }
    }
    ordered.extend(map);
    ordered
}
