//! JSON utility functions shared across crates.
//!
//! Upstream payloads are loosely typed: the same field shows up under
//! different names, as a number or as a string, nested or flat. These helpers
//! read such values without committing to one schema.

use serde_json::Value;

/// Strip markdown code block wrappers from JSON content.
///
/// Handles `` ```json ... ``` ``, `` ``` ... ``` `` and other language identifiers.
#[must_use]
pub fn strip_markdown_json(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.len() >= 6 && trimmed.starts_with("```") && trimmed.ends_with("```") {
        let inner = trimmed.get(3..trimmed.len().saturating_sub(3)).unwrap_or(trimmed);
        return inner.split_once('\n').map_or_else(|| inner.trim(), |(_, rest)| rest.trim());
    }
    trimmed
}

/// Follow a dotted path (`"pricebreakdown.totalPrice.value"`) into a JSON value.
#[must_use]
pub fn json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// First non-empty string found under any of `paths`. Numbers are stringified.
#[must_use]
pub fn first_string(value: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| match json_path(value, path)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First number found under any of `paths`; numeric strings are accepted.
#[must_use]
pub fn first_f64(value: &Value, paths: &[&str]) -> Option<f64> {
    paths.iter().find_map(|path| match json_path(value, path)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// First array found under any of `paths`, or an empty array.
#[must_use]
pub fn first_array(value: &Value, paths: &[&str]) -> Value {
    paths
        .iter()
        .find_map(|path| json_path(value, path).filter(|v| v.is_array()).cloned())
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_block() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_markdown_json(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_plain_block() {
        let input = "  ```\n{\"key\": \"value\"}\n```  ";
        assert_eq!(strip_markdown_json(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_no_block() {
        assert_eq!(strip_markdown_json(" {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_json_path_nested_and_index() {
        let v = json!({"a": {"b": [{"c": 3}]}});
        assert_eq!(json_path(&v, "a.b.0.c"), Some(&json!(3)));
        assert_eq!(json_path(&v, "a.x"), None);
    }

    #[test]
    fn test_first_string_skips_blank_and_stringifies_numbers() {
        let v = json!({"ref": "  ", "id": 9263});
        assert_eq!(first_string(&v, &["ref", "id"]).as_deref(), Some("9263"));
    }

    #[test]
    fn test_first_f64_accepts_numeric_strings() {
        let v = json!({"price": {"value": "1234.50"}});
        assert_eq!(first_f64(&v, &["totalPrice", "price.value"]), Some(1234.5));
    }

    #[test]
    fn test_first_array_defaults_to_empty() {
        let v = json!({"hotels": {"not": "array"}});
        assert_eq!(first_array(&v, &["hotels"]), json!([]));
    }
}
