//! Helpers for writing patch functions
//!
//! Cached values are the raw `data` objects of query responses. These helpers
//! locate a node by a path of object keys and edit it in place. A path that
//! does not lead to a node of the expected shape leaves the value untouched.

use serde_json::Value;
use tracing::debug;

fn node_mut<'a>(value: &'a mut Value, path: &[&str]) -> Option<&'a mut Value> {
    path.iter().try_fold(value, |node, key| node.get_mut(*key))
}

fn array_mut<'a>(value: &'a mut Value, path: &[&str]) -> Option<&'a mut Vec<Value>> {
    let node = node_mut(value, path);
    if node.is_none() {
        debug!(?path, "Patch target not found");
    }
    node?.as_array_mut()
}

/// Shallow-merges the fields of `fields` into the object at `path`
pub fn merge_at(mut value: Value, path: &[&str], fields: &Value) -> Value {
    if let (Some(Value::Object(target)), Value::Object(fields)) = (node_mut(&mut value, path), fields) {
        for (key, field) in fields {
            target.insert(key.clone(), field.clone());
        }
    } else {
        debug!(?path, "Merge target is not an object");
    }
    value
}

/// Returns a patch function merging `fields` into the root object
pub fn merge(fields: Value) -> impl FnOnce(Value) -> Value + Send + 'static {
    move |value| merge_at(value, &[], &fields)
}

/// Inserts `item` at the front of the array at `path`
pub fn prepend_at(mut value: Value, path: &[&str], item: Value) -> Value {
    if let Some(items) = array_mut(&mut value, path) {
        items.insert(0, item);
    }
    value
}

/// Pushes `item` onto the end of the array at `path`
pub fn append_at(mut value: Value, path: &[&str], item: Value) -> Value {
    if let Some(items) = array_mut(&mut value, path) {
        items.push(item);
    }
    value
}

/// Drops every element whose `id` equals `id` from the array at `path`
pub fn remove_by_id_at(mut value: Value, path: &[&str], id: &str) -> Value {
    if let Some(items) = array_mut(&mut value, path) {
        items.retain(|item| item.get("id").and_then(Value::as_str) != Some(id));
    }
    value
}

/// Shallow-merges `fields` into the element with the given `id` in the array at `path`
pub fn merge_by_id_at(mut value: Value, path: &[&str], id: &str, fields: &Value) -> Value {
    if let Some(items) = array_mut(&mut value, path) {
        for item in items
            .iter_mut()
            .filter(|item| item.get("id").and_then(Value::as_str) == Some(id))
        {
            *item = merge_at(item.take(), &[], fields);
        }
    }
    value
}
