pub mod v2;
pub mod v3;

use serde_json::Value;

use crate::error::SpecError;

/// The OpenAPI dialects the parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Swagger 2.0.
    V2,
    /// OpenAPI 3.0.x.
    V30,
    /// OpenAPI 3.1.x.
    V31,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::V2 => "2.0",
            Dialect::V30 => "3.0",
            Dialect::V31 => "3.1",
        }
    }
}

/// The raw deserialized OpenAPI document, kept immutable after load.
///
/// The root is held as a JSON value so `$ref` pointers resolve uniformly
/// across dialects; typed models in [`v2`] and [`v3`] are deserialized from
/// slices of it during the walk.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    pub dialect: Dialect,
    pub root: Value,
}

impl SpecDocument {
    /// Detect the dialect from the `openapi`/`swagger` top-level key and wrap
    /// the document.
    pub fn from_value(root: Value) -> Result<Self, SpecError> {
        if !root.is_object() {
            return Err(SpecError::MalformedRoot(
                "root document is not an object".to_string(),
            ));
        }

        if let Some(version) = root.get("openapi").and_then(Value::as_str) {
            let dialect = if version.starts_with("3.1") {
                Dialect::V31
            } else if version.starts_with("3.0") {
                Dialect::V30
            } else {
                return Err(SpecError::UnsupportedVersion(version.to_string()));
            };
            return Ok(SpecDocument { dialect, root });
        }

        if let Some(version) = root.get("swagger").and_then(Value::as_str) {
            if version == "2.0" {
                return Ok(SpecDocument {
                    dialect: Dialect::V2,
                    root,
                });
            }
            return Err(SpecError::UnsupportedVersion(version.to_string()));
        }

        Err(SpecError::MalformedRoot(
            "missing 'openapi' or 'swagger' version key".to_string(),
        ))
    }

    pub fn from_json(input: &str) -> Result<Self, SpecError> {
        let root: Value = serde_json::from_str(input)?;
        Self::from_value(root)
    }

    pub fn from_yaml(input: &str) -> Result<Self, SpecError> {
        let root: Value = serde_yaml_ng::from_str(input)?;
        Self::from_value(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_v31() {
        let doc = SpecDocument::from_value(json!({ "openapi": "3.1.0" })).unwrap();
        assert_eq!(doc.dialect, Dialect::V31);
    }

    #[test]
    fn detects_v30() {
        let doc = SpecDocument::from_value(json!({ "openapi": "3.0.3" })).unwrap();
        assert_eq!(doc.dialect, Dialect::V30);
    }

    #[test]
    fn detects_swagger() {
        let doc = SpecDocument::from_value(json!({ "swagger": "2.0" })).unwrap();
        assert_eq!(doc.dialect, Dialect::V2);
    }

    #[test]
    fn rejects_unknown_version() {
        let err = SpecDocument::from_value(json!({ "openapi": "4.0.0" })).unwrap_err();
        assert!(matches!(err, SpecError::UnsupportedVersion(_)));
    }

    #[test]
    fn rejects_missing_version_key() {
        let err = SpecDocument::from_value(json!({ "info": {} })).unwrap_err();
        assert!(matches!(err, SpecError::MalformedRoot(_)));
    }
}
