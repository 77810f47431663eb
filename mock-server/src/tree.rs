//! In-memory JSON tree with the store's write semantics.
//!
//! `null` and empty objects do not exist in the tree: writing either removes
//! the node, and parents left without children are removed with it.

use serde_json::{Map, Value};

/// Value at `path`, or `Null` if absent.
pub fn lookup(node: &Value, path: &[String]) -> Value {
    path.iter()
        .try_fold(node, |node, segment| node.get(segment.as_str()))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Replace the value at `path`.
pub fn set(node: &mut Value, path: &[String], value: Value) {
    let value = prune(value);
    let Some((head, rest)) = path.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    if let Value::Object(children) = &mut *node {
        let child = children.entry(head.clone()).or_insert(Value::Null);
        set(child, rest, value);
        if child.is_null() {
            children.remove(head);
        }
        if children.is_empty() {
            *node = Value::Null;
        }
    }
}

/// Set each child of `patch` below `path`, leaving other children alone.
pub fn merge(node: &mut Value, path: &[String], patch: Map<String, Value>) {
    let mut child_path = path.to_vec();
    for (key, value) in patch {
        child_path.push(key);
        set(node, &child_path, value);
        child_path.pop();
    }
}

/// Drop `null` members and empty objects, recursively.
pub fn prune(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let pruned: Map<String, Value> = map
                .into_iter()
                .map(|(key, value)| (key, prune(value)))
                .filter(|(_, value)| !value.is_null())
                .collect();
            if pruned.is_empty() {
                Value::Null
            } else {
                Value::Object(pruned)
            }
        }
        other => other,
    }
}
