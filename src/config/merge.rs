//! Field-by-field merging of configuration tiers.
//!
//! Higher tiers override lower ones key by key; arrays are replaced whole.

use serde_json::Value;

/// Lay `overlay` over `base`, one tier over the one below it.
///
/// Mappings merge key by key. A null in `overlay` means the tier left the
/// key unset, so `base` shows through. Anything else in `overlay` wins
/// outright, lists included.
///
/// ```
/// use serde_json::json;
/// use task_market::config::deep_merge;
///
/// let defaults = json!({
///     "server": { "port": 3000, "host": "127.0.0.1" },
///     "auth": { "token_ttl_hours": 24 }
/// });
/// let project = json!({ "server": { "port": 9000 }, "auth": null });
/// assert_eq!(
///     deep_merge(defaults, project),
///     json!({
///         "server": { "port": 9000, "host": "127.0.0.1" },
///         "auth": { "token_ttl_hours": 24 }
///     })
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (base, Value::Null) => base,
        (Value::Object(mut merged), Value::Object(upper)) => {
            for (key, value) in upper {
                let lower = merged.remove(&key).unwrap_or(Value::Null);
                merged.insert(key, deep_merge(lower, value));
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay,
    }
}

/// Fold tiers lowest first; later tiers win.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_keys_merge() {
        let base = json!({
            "server": {"host": "127.0.0.1", "port": 3000},
            "auth": {"min_password_len": 8}
        });
        let overlay = json!({"server": {"port": 9000}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({
                "server": {"host": "127.0.0.1", "port": 9000},
                "auth": {"min_password_len": 8}
            })
        );
    }

    #[test]
    fn test_null_preserves_base() {
        let base = json!({"auth": {"jwt_secret": "abc"}});
        let overlay = json!({"auth": {"jwt_secret": null}});
        assert_eq!(deep_merge(base.clone(), overlay), base);
    }

    #[test]
    fn test_arrays_and_scalars_replace() {
        let base = json!({"items": [1, 2, 3], "value": {"nested": true}});
        let overlay = json!({"items": [4], "value": 42});
        assert_eq!(deep_merge(base, overlay), json!({"items": [4], "value": 42}));
    }

    #[test]
    fn test_merge_all_later_wins() {
        let values = vec![
            json!({"server": {"port": 1}}),
            json!({"server": {"host": "h"}}),
            json!({"server": {"port": 3}}),
        ];
        assert_eq!(
            deep_merge_all(values),
            json!({"server": {"port": 3, "host": "h"}})
        );
    }
}
