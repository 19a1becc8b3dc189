//! The packet document model shared by all pipeline stages.
//!
//! A packet is a JSON object whose key order is the order keys were first
//! seen. Merging is shallow: a later fragment replaces whole top-level values.

use serde_json::{Map, Value};

pub type Packet = Map<String, Value>;

/// Name of the top-level `[[name, value], ...]` fallback list.
pub const PARAMETERS: &str = "parameters";

/// Merges `fragment` over `base`.
///
/// Objects merge key by key (last write wins), arrays concatenate, and any
/// other pairing keeps only the later document.
pub fn merge(base: Option<Value>, fragment: Value) -> Value {
    match (base, fragment) {
        (Some(Value::Object(mut base)), Value::Object(fragment)) => {
            for (key, value) in fragment {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        (Some(Value::Array(mut base)), Value::Array(fragment)) => {
            base.extend(fragment);
            Value::Array(base)
        }
        (_, fragment) => fragment,
    }
}

/// Stamps `overrides` into the document: over the packet itself, or over
/// every object record of a list document.
pub fn cascade(document: Value, overrides: &Packet) -> Value {
    match document {
        Value::Object(packet) => Value::Object(stamp(packet, overrides)),
        Value::Array(records) => Value::Array(
            records
                .into_iter()
                .map(|record| match record {
                    Value::Object(packet) => Value::Object(stamp(packet, overrides)),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

fn stamp(mut packet: Packet, overrides: &Packet) -> Packet {
    for (key, value) in overrides {
        packet.insert(key.clone(), value.clone());
    }
    packet
}

/// Unwraps a one-element list to its element.
pub fn splat(value: &Value) -> &Value {
    match value {
        Value::Array(items) if items.len() == 1 => &items[0],
        other => other,
    }
}

/// The well-formed `[name, value]` pairs of a packet's `parameters` list.
pub fn parameters(packet: &Packet) -> impl Iterator<Item = (&str, &Value)> {
    packet
        .get(PARAMETERS)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|pair| match pair.as_array().map(Vec::as_slice) {
            Some([Value::String(name), value]) => Some((name.as_str(), value)),
            _ => None,
        })
}

/// Text of a scalar as a shell would want it: strings unquoted, null empty,
/// everything else as compact JSON.
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(_) | Value::Object(_) => {
            crate::util::wire_json::to_string(value, None).unwrap_or_else(|_| value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_is_last_write_wins_and_keeps_earlier_keys() {
        let first = json!({"AU Title": "WPA Folder 01", "Ingest Step": "staged"});
        let second = json!({"Ingest Step": "packaged", "Plugin JAR": "http://x/p.jar"});

        let merged = merge(Some(first), second);

        assert_eq!(
            merged,
            json!({
                "AU Title": "WPA Folder 01",
                "Ingest Step": "packaged",
                "Plugin JAR": "http://x/p.jar"
            })
        );
    }

    #[test]
    fn merge_is_shallow() {
        let merged = merge(
            Some(json!({"nested": {"a": 1, "b": 2}})),
            json!({"nested": {"c": 3}}),
        );
        assert_eq!(merged, json!({"nested": {"c": 3}}));
    }

    #[test]
    fn merge_keeps_first_seen_key_order() {
        let merged = merge(Some(json!({"z": 1, "a": 2})), json!({"m": 3, "z": 4}));
        let keys: Vec<_> = merged.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn merge_concatenates_lists_and_replaces_mismatches() {
        assert_eq!(merge(Some(json!([1, 2])), json!([3])), json!([1, 2, 3]));
        assert_eq!(merge(Some(json!([1])), json!({"a": 1})), json!({"a": 1}));
        assert_eq!(merge(None, json!({"a": 1})), json!({"a": 1}));
    }

    #[test]
    fn cascade_stamps_packet_and_each_record() {
        let overrides = json!({"Ingest Step": "packaged"});
        let overrides = overrides.as_object().unwrap();

        assert_eq!(
            cascade(json!({"Ingest Step": "staged", "a": 1}), overrides),
            json!({"Ingest Step": "packaged", "a": 1})
        );
        assert_eq!(
            cascade(json!([{"a": 1}, {"a": 2}, "loose"]), overrides),
            json!([
                {"a": 1, "Ingest Step": "packaged"},
                {"a": 2, "Ingest Step": "packaged"},
                "loose"
            ])
        );
    }

    #[test]
    fn splat_unwraps_only_single_element_lists() {
        assert_eq!(splat(&json!(["x"])), &json!("x"));
        assert_eq!(splat(&json!(["x", "y"])), &json!(["x", "y"]));
        assert_eq!(splat(&json!([])), &json!([]));
        assert_eq!(splat(&json!("x")), &json!("x"));
    }

    #[test]
    fn parameters_skips_malformed_pairs() {
        let packet = json!({
            "parameters": [
                ["base_url", "http://archives.alabama.gov/Lockss/"],
                ["lonely"],
                [3, "numeric name"],
                ["subdirectory", "WPA-Folder-01"]
            ]
        });

        let pairs: Vec<_> = parameters(packet.as_object().unwrap()).collect();

        assert_eq!(
            pairs,
            vec![
                ("base_url", &json!("http://archives.alabama.gov/Lockss/")),
                ("subdirectory", &json!("WPA-Folder-01")),
            ]
        );
    }

    #[test]
    fn plain_text_renders_scalars_for_the_shell() {
        assert_eq!(plain_text(&json!("WPA Folder 01")), "WPA Folder 01");
        assert_eq!(plain_text(&json!(42)), "42");
        assert_eq!(plain_text(&json!(true)), "true");
        assert_eq!(plain_text(&json!(null)), "");
        assert_eq!(plain_text(&json!({"a": [1, 2]})), r#"{"a": [1, 2]}"#);
    }
}
