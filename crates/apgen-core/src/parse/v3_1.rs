//! OpenAPI 3.1.x parser. Nullability is expressed through type arrays,
//! `const` is first-class, exclusive bounds are numbers, and tuples use
//! `prefixItems`.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::context::Context;
use crate::error::Error;
use crate::ir::{AccessScope, IrSchema, IrSchemaKind, LogicalOperator};
use crate::spec::v3;

use super::v3_0::enum_member;
use super::{components, parse_servers, paths, ParserState};

pub(crate) fn parse(ctx: &mut Context, state: &mut ParserState) -> Result<(), Error> {
    let strict = ctx.config.parser.strict;
    let Context { spec, ir, .. } = ctx;

    components::parse_components(&spec.root, ir, state, strict, schema_to_ir)?;
    paths::parse_paths(&spec.root, ir, state, strict, schema_to_ir)?;
    parse_servers(&spec.root, ir);
    Ok(())
}

/// Normalize a 3.1 schema (or reference) into the IR.
pub(crate) fn schema_to_ir(schema: &v3::SchemaOrRef) -> IrSchema {
    match schema {
        v3::SchemaOrRef::Ref { ref_path } => IrSchema::reference(ref_path.clone()),
        v3::SchemaOrRef::Schema(schema) => normalize(schema),
    }
}

fn normalize(schema: &v3::Schema) -> IrSchema {
    IrSchema {
        description: schema.description.clone(),
        default: schema.default_value.clone(),
        access_scope: access_scope(schema),
        kind: normalize_kind(schema),
    }
}

fn access_scope(schema: &v3::Schema) -> AccessScope {
    if schema.read_only == Some(true) {
        AccessScope::Read
    } else if schema.write_only == Some(true) {
        AccessScope::Write
    } else {
        AccessScope::Unscoped
    }
}

fn normalize_kind(schema: &v3::Schema) -> IrSchemaKind {
    if !schema.enum_values.is_empty() {
        return IrSchemaKind::Enum {
            members: schema.enum_values.iter().map(enum_member).collect(),
        };
    }

    // A bare `const` is a single-value schema even without `type`.
    if let Some(const_value) = &schema.const_value {
        if let Some(kind) = const_kind(schema, const_value) {
            return kind;
        }
    }

    match &schema.schema_type {
        Some(v3::TypeSet::Single(ty)) => typed_kind(schema, *ty),
        Some(v3::TypeSet::Multiple(types)) => multi_type_kind(schema, types),
        None => untyped_kind(schema),
    }
}

fn const_kind(schema: &v3::Schema, value: &Value) -> Option<IrSchemaKind> {
    match value {
        Value::Null => Some(IrSchemaKind::Null),
        Value::String(s) => Some(IrSchemaKind::String {
            format: schema.format.clone(),
            min_length: schema.min_length,
            max_length: schema.max_length,
            pattern: schema.pattern.clone(),
            const_value: Some(s.clone()),
        }),
        Value::Number(n) => Some(IrSchemaKind::Number {
            integer: n.is_i64() || n.is_u64(),
            format: schema.format.clone(),
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
            const_value: Some(n.clone()),
        }),
        Value::Bool(b) => Some(IrSchemaKind::Boolean {
            const_value: Some(*b),
        }),
        // Array consts become tuples of literals.
        Value::Array(values) => Some(IrSchemaKind::Tuple {
            items: Vec::new(),
            const_values: Some(values.clone()),
        }),
        Value::Object(_) => None,
    }
}

/// A type array widens to a union of its projections; `null` becomes a
/// union member.
fn multi_type_kind(schema: &v3::Schema, types: &[v3::SchemaType]) -> IrSchemaKind {
    let mut items: Vec<IrSchema> = Vec::with_capacity(types.len());
    for ty in types {
        let kind = typed_kind(schema, *ty);
        items.push(IrSchema::of(kind));
    }

    match items.len() {
        0 => IrSchemaKind::Unknown,
        1 => items.remove(0).kind,
        _ => IrSchemaKind::Composite {
            items,
            logical_operator: LogicalOperator::Or,
        },
    }
}

fn typed_kind(schema: &v3::Schema, ty: v3::SchemaType) -> IrSchemaKind {
    match ty {
        v3::SchemaType::String => IrSchemaKind::String {
            format: schema.format.clone(),
            min_length: schema.min_length,
            max_length: schema.max_length,
            pattern: schema.pattern.clone(),
            const_value: schema
                .const_value
                .as_ref()
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        v3::SchemaType::Integer | v3::SchemaType::Number => {
            number_kind(schema, ty == v3::SchemaType::Integer)
        }
        v3::SchemaType::Boolean => IrSchemaKind::Boolean {
            const_value: schema.const_value.as_ref().and_then(Value::as_bool),
        },
        v3::SchemaType::Null => IrSchemaKind::Null,
        v3::SchemaType::Array => array_kind(schema),
        v3::SchemaType::Object => object_kind(schema),
    }
}

/// In 3.1, exclusive bounds carry their own limits.
fn number_kind(schema: &v3::Schema, integer: bool) -> IrSchemaKind {
    let exclusive_minimum = match schema.exclusive_minimum {
        Some(v3::Exclusive::Limit(n)) => Some(n),
        _ => None,
    };
    let exclusive_maximum = match schema.exclusive_maximum {
        Some(v3::Exclusive::Limit(n)) => Some(n),
        _ => None,
    };

    IrSchemaKind::Number {
        integer,
        format: schema.format.clone(),
        minimum: schema.minimum,
        maximum: schema.maximum,
        exclusive_minimum,
        exclusive_maximum,
        const_value: schema.const_value.as_ref().and_then(|v| match v {
            Value::Number(n) => Some(n.clone()),
            _ => None,
        }),
    }
}

fn array_kind(schema: &v3::Schema) -> IrSchemaKind {
    // `prefixItems` makes this a tuple.
    if !schema.prefix_items.is_empty() {
        return IrSchemaKind::Tuple {
            items: schema.prefix_items.iter().map(schema_to_ir).collect(),
            const_values: schema.const_value.as_ref().and_then(|v| match v {
                Value::Array(values) => Some(values.clone()),
                _ => None,
            }),
        };
    }

    IrSchemaKind::Array {
        items: schema.items.iter().map(|item| schema_to_ir(item)).collect(),
        min_items: schema.min_items,
        max_items: schema.max_items,
        logical_operator: LogicalOperator::And,
    }
}

fn object_kind(schema: &v3::Schema) -> IrSchemaKind {
    let properties: IndexMap<String, IrSchema> = schema
        .properties
        .iter()
        .map(|(name, prop)| (name.clone(), schema_to_ir(prop)))
        .collect();

    let required: IndexSet<String> = schema.required.iter().cloned().collect();

    let additional_properties = match &schema.additional_properties {
        Some(v3::AdditionalProperties::Bool(true)) => Some(Box::new(IrSchema::unknown())),
        Some(v3::AdditionalProperties::Bool(false)) | None => None,
        Some(v3::AdditionalProperties::Schema(inner)) => Some(Box::new(schema_to_ir(inner))),
    };

    IrSchemaKind::Object {
        properties,
        required,
        additional_properties,
    }
}

fn untyped_kind(schema: &v3::Schema) -> IrSchemaKind {
    if !schema.all_of.is_empty() {
        return IrSchemaKind::Composite {
            items: schema.all_of.iter().map(schema_to_ir).collect(),
            logical_operator: LogicalOperator::And,
        };
    }
    if !schema.one_of.is_empty() {
        return IrSchemaKind::Composite {
            items: schema.one_of.iter().map(schema_to_ir).collect(),
            logical_operator: LogicalOperator::Or,
        };
    }
    if !schema.any_of.is_empty() {
        return IrSchemaKind::Composite {
            items: schema.any_of.iter().map(schema_to_ir).collect(),
            logical_operator: LogicalOperator::Or,
        };
    }
    if !schema.properties.is_empty() {
        return object_kind(schema);
    }
    IrSchemaKind::Unknown
}
