use std::fmt;
use std::sync::Arc;

use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;

use crate::resolve::decode_segment;

/// Case conventions for emitted identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierCase {
    CamelCase,
    #[default]
    PascalCase,
    SnakeCase,
    ScreamingSnakeCase,
    Preserve,
}

impl IdentifierCase {
    /// Apply the case convention to a raw name, sanitizing it into a valid
    /// identifier first.
    pub fn apply(&self, name: &str) -> String {
        let sanitized = sanitize_identifier(name);
        match self {
            IdentifierCase::CamelCase => sanitized.to_lower_camel_case(),
            IdentifierCase::PascalCase => sanitized.to_pascal_case(),
            IdentifierCase::SnakeCase => sanitized.to_snake_case(),
            IdentifierCase::ScreamingSnakeCase => sanitized.to_shouty_snake_case(),
            IdentifierCase::Preserve => sanitized,
        }
    }
}

/// A user-supplied name transformer: either a pattern containing `{{name}}`
/// or an arbitrary function.
#[derive(Clone)]
pub enum NameTransform {
    Pattern(String),
    Fn(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl NameTransform {
    pub fn apply(&self, name: &str) -> String {
        match self {
            NameTransform::Pattern(pattern) => pattern.replace("{{name}}", name),
            NameTransform::Fn(f) => f(name),
        }
    }
}

impl fmt::Debug for NameTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameTransform::Pattern(p) => f.debug_tuple("Pattern").field(p).finish(),
            NameTransform::Fn(_) => f.debug_tuple("Fn").finish(),
        }
    }
}

/// Separates colliding names used for runtime values vs. static types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Value,
    Type,
}

/// A stable emitted symbol name bound to a `$ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub ref_path: String,
    pub namespace: Namespace,
    pub name: String,
    pub created: bool,
}

/// Lookup/creation request for an identifier.
pub struct IdentifierRequest<'a> {
    pub ref_path: &'a str,
    pub namespace: Namespace,
    pub create: bool,
    pub case: Option<IdentifierCase>,
    pub transform: Option<&'a NameTransform>,
}

/// Per-file `$ref → name` map with collision discipline.
#[derive(Debug, Default)]
pub struct IdentifierTable {
    by_ref: IndexMap<(String, Namespace), String>,
    used: IndexSet<(Namespace, String)>,
}

impl IdentifierTable {
    /// Resolve an identifier per the request. An existing mapping for
    /// `($ref, namespace)` is returned with `created = false`; otherwise a new
    /// name is derived when `create` is set, and the empty-name sentinel is
    /// returned when it is not.
    pub fn identifier(&mut self, default_case: IdentifierCase, req: IdentifierRequest<'_>) -> Identifier {
        let key = (req.ref_path.to_string(), req.namespace);
        if let Some(name) = self.by_ref.get(&key) {
            return Identifier {
                ref_path: key.0,
                namespace: req.namespace,
                name: name.clone(),
                created: false,
            };
        }

        if !req.create {
            return Identifier {
                ref_path: key.0,
                namespace: req.namespace,
                name: String::new(),
                created: false,
            };
        }

        let base = base_name(req.ref_path);
        let transformed = match req.transform {
            Some(t) => t.apply(&base),
            None => base,
        };
        let cased = req.case.unwrap_or(default_case).apply(&transformed);

        // Numeric suffix on collision within (file, namespace).
        let mut name = cased.clone();
        let mut counter = 2;
        while self.used.contains(&(req.namespace, name.clone())) {
            name = format!("{cased}{counter}");
            counter += 1;
        }

        self.used.insert((req.namespace, name.clone()));
        self.by_ref.insert(key.clone(), name.clone());

        Identifier {
            ref_path: key.0,
            namespace: req.namespace,
            name,
            created: true,
        }
    }

    pub fn lookup(&self, ref_path: &str, namespace: Namespace) -> Option<&str> {
        self.by_ref
            .get(&(ref_path.to_string(), namespace))
            .map(String::as_str)
    }
}

/// Derive a base name from the last segment of a `$ref`.
fn base_name(ref_path: &str) -> String {
    let segment = ref_path.rsplit('/').next().unwrap_or(ref_path);
    decode_segment(segment)
}

/// Sanitize a string to be a valid identifier.
fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_separator = false;

    for (i, ch) in name.chars().enumerate() {
        if ch.is_alphanumeric() {
            if i == 0 && ch.is_ascii_digit() {
                result.push('_');
            }
            if prev_was_separator && !result.is_empty() {
                result.push('_');
            }
            result.push(ch);
            prev_was_separator = false;
        } else {
            prev_was_separator = true;
        }
    }

    if result.is_empty() {
        return "unnamed".to_string();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(ref_path: &str, create: bool) -> IdentifierRequest<'_> {
        IdentifierRequest {
            ref_path,
            namespace: Namespace::Value,
            create,
            case: None,
            transform: None,
        }
    }

    #[test]
    fn creates_once_then_returns_existing() {
        let mut table = IdentifierTable::default();
        let first = table.identifier(
            IdentifierCase::PascalCase,
            request("#/components/schemas/pet-store", true),
        );
        assert_eq!(first.name, "PetStore");
        assert!(first.created);

        let second = table.identifier(
            IdentifierCase::PascalCase,
            request("#/components/schemas/pet-store", true),
        );
        assert_eq!(second.name, "PetStore");
        assert!(!second.created);
    }

    #[test]
    fn empty_sentinel_without_create() {
        let mut table = IdentifierTable::default();
        let id = table.identifier(
            IdentifierCase::PascalCase,
            request("#/components/schemas/Pet", false),
        );
        assert_eq!(id.name, "");
        assert!(!id.created);
    }

    #[test]
    fn collisions_get_numeric_suffix() {
        let mut table = IdentifierTable::default();
        let a = table.identifier(
            IdentifierCase::PascalCase,
            request("#/components/schemas/pet", true),
        );
        let b = table.identifier(
            IdentifierCase::PascalCase,
            request("#/components/schemas/Pet", true),
        );
        assert_eq!(a.name, "Pet");
        assert_eq!(b.name, "Pet2");
    }

    #[test]
    fn namespaces_are_independent() {
        let mut table = IdentifierTable::default();
        let value = table.identifier(
            IdentifierCase::PascalCase,
            IdentifierRequest {
                ref_path: "#/components/schemas/Pet",
                namespace: Namespace::Value,
                create: true,
                case: None,
                transform: None,
            },
        );
        let ty = table.identifier(
            IdentifierCase::PascalCase,
            IdentifierRequest {
                ref_path: "#/components/schemas/Pet",
                namespace: Namespace::Type,
                create: true,
                case: None,
                transform: None,
            },
        );
        assert_eq!(value.name, "Pet");
        assert_eq!(ty.name, "Pet");
    }

    #[test]
    fn pattern_transform_applies_before_case() {
        let mut table = IdentifierTable::default();
        let transform = NameTransform::Pattern("z{{name}}".to_string());
        let id = table.identifier(
            IdentifierCase::CamelCase,
            IdentifierRequest {
                ref_path: "#/components/schemas/Pet",
                namespace: Namespace::Value,
                create: true,
                case: None,
                transform: Some(&transform),
            },
        );
        assert_eq!(id.name, "zPet");
    }

    #[test]
    fn escaped_ref_segments_decode() {
        let mut table = IdentifierTable::default();
        let id = table.identifier(
            IdentifierCase::PascalCase,
            request("#/components/schemas/a~1b", true),
        );
        assert_eq!(id.name, "AB");
    }

    #[test]
    fn case_conversions() {
        assert_eq!(IdentifierCase::CamelCase.apply("pet-store"), "petStore");
        assert_eq!(IdentifierCase::PascalCase.apply("pet-store"), "PetStore");
        assert_eq!(IdentifierCase::SnakeCase.apply("PetStore"), "pet_store");
        assert_eq!(
            IdentifierCase::ScreamingSnakeCase.apply("petStore"),
            "PET_STORE"
        );
        assert_eq!(IdentifierCase::Preserve.apply("Pet Store"), "Pet_Store");
    }
}
