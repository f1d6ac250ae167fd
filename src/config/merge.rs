//! Deep merge for layered YAML configuration.
//!
//! Later tiers override earlier ones field by field. Arrays are replaced
//! entirely, not concatenated.

use serde_json::Value;

/// Deep merge two values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans are replaced entirely
/// - A null overlay keeps the base value (null means "not specified")
///
/// # Example
/// ```
/// use serde_json::json;
/// use glossary_updater::config::deep_merge;
///
/// let base = json!({
///     "api": { "timeout_secs": 30, "max_retries": 3 },
///     "reserved_config_ids": ["a", "b"]
/// });
/// let overlay = json!({
///     "api": { "timeout_secs": 60 },
///     "reserved_config_ids": ["c"]
/// });
/// let result = deep_merge(base, overlay);
/// assert_eq!(result, json!({
///     "api": { "timeout_secs": 60, "max_retries": 3 },
///     "reserved_config_ids": ["c"]
/// }));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers in order, later tiers winning.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_sections_merge_field_by_field() {
        let base = json!({
            "api": {"domain": "a.example.com", "timeout_secs": 30},
            "output": {"format": "json"}
        });
        let overlay = json!({"api": {"timeout_secs": 90}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({
                "api": {"domain": "a.example.com", "timeout_secs": 90},
                "output": {"format": "json"}
            })
        );
    }

    #[test]
    fn reserved_id_lists_are_replaced() {
        let base = json!({"reserved_config_ids": ["x", "y"]});
        let overlay = json!({"reserved_config_ids": ["z"]});
        assert_eq!(deep_merge(base, overlay), json!({"reserved_config_ids": ["z"]}));
    }

    #[test]
    fn null_keeps_lower_tier() {
        let base = json!({"api": {"password": "secret"}, "backup": {"dir": "/tmp"}});
        let overlay = json!({"api": {"password": null}, "backup": null});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"api": {"password": "secret"}, "backup": {"dir": "/tmp"}})
        );
    }

    #[test]
    fn scalar_and_object_replace_each_other() {
        assert_eq!(deep_merge(json!({"v": 1}), json!({"v": {"n": true}})), json!({"v": {"n": true}}));
        assert_eq!(deep_merge(json!({"v": {"n": true}}), json!({"v": 1})), json!({"v": 1}));
    }

    #[test]
    fn merge_all_folds_in_order() {
        let tiers = vec![
            json!({"api": {"max_retries": 3}}),
            json!({"api": {"max_retries": 5, "ssl_verify": true}}),
            json!({"api": {"max_retries": 1}}),
        ];
        assert_eq!(
            deep_merge_all(tiers),
            json!({"api": {"max_retries": 1, "ssl_verify": true}})
        );
    }
}
