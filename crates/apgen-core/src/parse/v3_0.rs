//! OpenAPI 3.0.x parser. Nullability is the `nullable` keyword and
//! exclusive bounds are boolean modifiers on `minimum`/`maximum`.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::context::Context;
use crate::error::Error;
use crate::ir::{AccessScope, IrSchema, IrSchemaKind, LogicalOperator};
use crate::spec::v3;

use super::{components, parse_servers, paths, ParserState};

pub(crate) fn parse(ctx: &mut Context, state: &mut ParserState) -> Result<(), Error> {
    let strict = ctx.config.parser.strict;
    let Context { spec, ir, .. } = ctx;

    components::parse_components(&spec.root, ir, state, strict, schema_to_ir)?;
    paths::parse_paths(&spec.root, ir, state, strict, schema_to_ir)?;
    parse_servers(&spec.root, ir);
    Ok(())
}

/// Normalize a 3.0 schema (or reference) into the IR.
pub(crate) fn schema_to_ir(schema: &v3::SchemaOrRef) -> IrSchema {
    match schema {
        v3::SchemaOrRef::Ref { ref_path } => IrSchema::reference(ref_path.clone()),
        v3::SchemaOrRef::Schema(schema) => normalize(schema),
    }
}

fn normalize(schema: &v3::Schema) -> IrSchema {
    let kind = normalize_kind(schema);

    // `nullable` widens the type to a union with null. Enums absorb the
    // null member directly.
    let kind = if schema.nullable == Some(true) {
        match kind {
            IrSchemaKind::Enum { mut members } => {
                if !members.iter().any(IrSchema::is_null) {
                    members.push(IrSchema::null());
                }
                IrSchemaKind::Enum { members }
            }
            IrSchemaKind::Null | IrSchemaKind::Unknown => kind,
            other => IrSchemaKind::Composite {
                items: vec![IrSchema::of(other), IrSchema::null()],
                logical_operator: LogicalOperator::Or,
            },
        }
    } else {
        kind
    };

    IrSchema {
        description: schema.description.clone(),
        default: schema.default_value.clone(),
        access_scope: access_scope(schema),
        kind,
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

    match &schema.schema_type {
        Some(v3::TypeSet::Single(ty)) => typed_kind(schema, *ty),
        // Type arrays are a 3.1 construct; an unrecognized shape degrades.
        Some(v3::TypeSet::Multiple(_)) => IrSchemaKind::Unknown,
        None => untyped_kind(schema),
    }
}

fn typed_kind(schema: &v3::Schema, ty: v3::SchemaType) -> IrSchemaKind {
    match ty {
        v3::SchemaType::String => IrSchemaKind::String {
            format: schema.format.clone(),
            min_length: schema.min_length,
            max_length: schema.max_length,
            pattern: schema.pattern.clone(),
            const_value: None,
        },
        v3::SchemaType::Integer | v3::SchemaType::Number => {
            number_kind(schema, ty == v3::SchemaType::Integer)
        }
        v3::SchemaType::Boolean => IrSchemaKind::Boolean { const_value: None },
        v3::SchemaType::Null => IrSchemaKind::Null,
        v3::SchemaType::Array => IrSchemaKind::Array {
            items: schema.items.iter().map(|item| schema_to_ir(item)).collect(),
            min_items: schema.min_items,
            max_items: schema.max_items,
            logical_operator: LogicalOperator::And,
        },
        v3::SchemaType::Object => object_kind(schema),
    }
}

/// In 3.0, `exclusiveMinimum: true` turns `minimum` into an exclusive bound.
fn number_kind(schema: &v3::Schema, integer: bool) -> IrSchemaKind {
    let min_exclusive = matches!(schema.exclusive_minimum, Some(v3::Exclusive::Flag(true)));
    let max_exclusive = matches!(schema.exclusive_maximum, Some(v3::Exclusive::Flag(true)));

    IrSchemaKind::Number {
        integer,
        format: schema.format.clone(),
        minimum: if min_exclusive { None } else { schema.minimum },
        maximum: if max_exclusive { None } else { schema.maximum },
        exclusive_minimum: if min_exclusive { schema.minimum } else { None },
        exclusive_maximum: if max_exclusive { schema.maximum } else { None },
        const_value: None,
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
    // Sloppy specs omit `type: object` when properties are present.
    if !schema.properties.is_empty() {
        return object_kind(schema);
    }
    IrSchemaKind::Unknown
}

/// Turn one enum member value into a primitive-const schema.
pub(crate) fn enum_member(value: &Value) -> IrSchema {
    match value {
        Value::Null => IrSchema::null(),
        Value::String(s) => IrSchema::string_const(s.clone()),
        Value::Number(n) => IrSchema::of(IrSchemaKind::Number {
            integer: n.is_i64() || n.is_u64(),
            format: None,
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
            const_value: Some(n.clone()),
        }),
        Value::Bool(b) => IrSchema::of(IrSchemaKind::Boolean {
            const_value: Some(*b),
        }),
        _ => IrSchema::unknown(),
    }
}
