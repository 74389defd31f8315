//! Canonical argument serialization for storage field names.

use std::collections::BTreeMap;

use serde_json::Value;

/// Compact JSON with object keys sorted at every depth.
///
/// Two argument maps that are equal by value always serialize identically,
/// regardless of the order their keys were written in.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

// Keys are sorted here rather than relying on `Map` ordering: with
// serde_json's `preserve_order` feature enabled anywhere in the build, `Map`
// keeps insertion order.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                if let Some(inner) = map.get(key) {
                    write_canonical(inner, out);
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}

/// Storage field name for a field selected with bound argument values.
///
/// Fields without arguments are stored under their plain name; otherwise the
/// canonical JSON of the arguments is appended: `todos({"first":10})`.
pub fn field_storage_name(name: &str, arguments: &BTreeMap<String, Value>) -> String {
    if arguments.is_empty() {
        return name.to_string();
    }
    let object: serde_json::Map<String, Value> = arguments
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    format!("{name}({})", canonical_json(&Value::Object(object)))
}
