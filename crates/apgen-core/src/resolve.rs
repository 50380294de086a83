use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ResolveError;

/// Decode one JSON Pointer segment per RFC 6901 (`~1` → `/`, `~0` → `~`).
pub fn decode_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Encode a string for use as a single JSON Pointer segment.
pub fn encode_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Resolve a `$ref` JSON Pointer against a root document, returning the raw
/// node. The resolver does not detect cycles; callers that traverse schema
/// graphs maintain their own stack.
pub fn resolve_value<'a>(root: &'a Value, ref_path: &str) -> Result<&'a Value, ResolveError> {
    let pointer = ref_path
        .strip_prefix('#')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;

    if pointer.is_empty() {
        return Ok(root);
    }

    let pointer = pointer
        .strip_prefix('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;

    let mut current = root;
    for raw_segment in pointer.split('/') {
        let segment = decode_segment(raw_segment);
        current = match current {
            Value::Object(map) => map
                .get(&segment)
                .ok_or_else(|| ResolveError::RefNotFound(ref_path.to_string()))?,
            Value::Array(items) => {
                let index: usize = segment
                    .parse()
                    .map_err(|_| ResolveError::RefNotFound(ref_path.to_string()))?;
                items
                    .get(index)
                    .ok_or_else(|| ResolveError::RefNotFound(ref_path.to_string()))?
            }
            _ => return Err(ResolveError::RefNotFound(ref_path.to_string())),
        };
    }

    Ok(current)
}

/// Resolve a `$ref` and deserialize the target node.
pub fn resolve_ref<T: DeserializeOwned>(root: &Value, ref_path: &str) -> Result<T, ResolveError> {
    let node = resolve_value(root, ref_path)?;
    serde_json::from_value(node.clone()).map_err(|source| ResolveError::IncompatibleTarget {
        ref_path: ref_path.to_string(),
        source,
    })
}

/// Shallow-merge the referent into the holder, stripping `$ref`. Inline
/// fields on the holder override fields of the referenced node.
pub fn dereference(root: &Value, holder: &Value) -> Result<Value, ResolveError> {
    let Some(map) = holder.as_object() else {
        return Ok(holder.clone());
    };
    let Some(ref_path) = map.get("$ref").and_then(Value::as_str) else {
        return Ok(holder.clone());
    };

    let target = resolve_value(root, ref_path)?;
    let mut merged = target.clone();
    if let (Some(merged_map), Some(holder_map)) = (merged.as_object_mut(), holder.as_object()) {
        for (key, value) in holder_map {
            if key != "$ref" {
                merged_map.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_nested_pointer() {
        let root = json!({
            "components": { "schemas": { "Pet": { "type": "object" } } }
        });
        let node = resolve_value(&root, "#/components/schemas/Pet").unwrap();
        assert_eq!(node, &json!({ "type": "object" }));
    }

    #[test]
    fn resolves_array_index() {
        let root = json!({ "servers": [{ "url": "https://a" }, { "url": "https://b" }] });
        let node = resolve_value(&root, "#/servers/1").unwrap();
        assert_eq!(node["url"], "https://b");
    }

    #[test]
    fn decodes_rfc6901_escapes() {
        let root = json!({ "paths": { "/pets": { "get": {} }, "a~b": 1 } });
        assert!(resolve_value(&root, "#/paths/~1pets/get").is_ok());
        assert_eq!(resolve_value(&root, "#/paths/a~0b").unwrap(), &json!(1));
    }

    #[test]
    fn missing_segment_is_ref_not_found() {
        let root = json!({ "components": {} });
        let err = resolve_value(&root, "#/components/schemas/Pet").unwrap_err();
        assert!(matches!(err, ResolveError::RefNotFound(_)));
    }

    #[test]
    fn non_fragment_ref_is_invalid() {
        let root = json!({});
        let err = resolve_value(&root, "other.yaml#/Pet").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidRefFormat(_)));
    }

    #[test]
    fn dereference_merges_holder_over_referent() {
        let root = json!({
            "components": {
                "pathItems": {
                    "Pets": { "description": "referenced", "summary": "pets" }
                }
            }
        });
        let holder = json!({
            "$ref": "#/components/pathItems/Pets",
            "description": "inline"
        });
        let merged = dereference(&root, &holder).unwrap();
        assert_eq!(merged["description"], "inline");
        assert_eq!(merged["summary"], "pets");
        assert!(merged.get("$ref").is_none());
    }
}
