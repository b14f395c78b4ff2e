// ABOUTME: Recursive merge of JSON values.
// ABOUTME: Objects merge key by key; any other overlay value replaces the base.

use serde_json::Value;

/// Merge `overlay` onto `base` in place.
///
/// Keys absent from `overlay` keep their `base` value.
pub fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overlay_keys_win() {
        let mut base = json!({"a": 1, "b": true});
        merge_values(&mut base, &json!({"b": false}));
        assert_eq!(base, json!({"a": 1, "b": false}));
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let mut base = json!({"k8s": {"namespace": "a", "chart": "c"}});
        merge_values(&mut base, &json!({"k8s": {"namespace": "b"}}));
        assert_eq!(base, json!({"k8s": {"namespace": "b", "chart": "c"}}));
    }

    #[test]
    fn new_keys_are_added() {
        let mut base = json!({"a": 1});
        merge_values(&mut base, &json!({"z": [1, 2]}));
        assert_eq!(base, json!({"a": 1, "z": [1, 2]}));
    }

    #[test]
    fn non_object_overlay_replaces() {
        let mut base = json!({"a": {"b": 1}});
        merge_values(&mut base, &json!({"a": null}));
        assert_eq!(base, json!({"a": null}));
    }
}
