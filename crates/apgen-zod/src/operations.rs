//! Per-operation emission: one request bundle object per operation
//! (`{ body, headers, path, query }`) and a response schema from the
//! success responses.

use apgen_core::error::Error;
use apgen_core::ir::{IrOperation, IrParameter, IrSchema, IrSchemaKind, LogicalOperator};
use indexmap::{IndexMap, IndexSet};

use crate::emit::SchemaEmitter;

/// Emit the request bundle declaration for an operation.
pub fn emit_request(emitter: &mut SchemaEmitter<'_>, operation: &IrOperation) -> Result<(), Error> {
    let mut properties: IndexMap<String, IrSchema> = IndexMap::new();
    let mut required: IndexSet<String> = IndexSet::new();

    // Groups appear in a fixed order; absent groups are `never` and stay
    // required so their absence is visible in the inferred type.
    match &operation.body {
        Some(body) => {
            properties.insert(
                "body".to_string(),
                body.schema.clone().unwrap_or_else(IrSchema::unknown),
            );
            if body.required {
                required.insert("body".to_string());
            }
        }
        None => {
            properties.insert("body".to_string(), IrSchema::never());
            required.insert("body".to_string());
        }
    }

    for (key, group) in [
        ("headers", &operation.parameters.header),
        ("path", &operation.parameters.path),
        ("query", &operation.parameters.query),
    ] {
        let (schema, group_required) = group_schema(group);
        properties.insert(key.to_string(), schema);
        if group_required {
            required.insert(key.to_string());
        }
    }

    let bundle = IrSchema::of(IrSchemaKind::Object {
        properties,
        required,
        additional_properties: None,
    });

    let ref_path = format!("#/operations/{}-data", operation.id);
    let doc = operation
        .summary
        .clone()
        .or_else(|| operation.description.clone());
    emitter.emit_synthetic(&ref_path, &bundle, doc)?;
    Ok(())
}

/// Emit the response schema declaration for an operation: the union of its
/// success responses, or `void` when there are none.
pub fn emit_response(emitter: &mut SchemaEmitter<'_>, operation: &IrOperation) -> Result<(), Error> {
    let mut schemas: Vec<IrSchema> = Vec::new();
    for (status, response) in &operation.responses {
        if !(status.starts_with('2') || status == "default") {
            continue;
        }
        if let Some(schema) = &response.schema {
            schemas.push(schema.clone());
        }
    }

    let schema = match schemas.len() {
        0 => IrSchema::of(IrSchemaKind::Void),
        1 => schemas.remove(0),
        _ => IrSchema::of(IrSchemaKind::Composite {
            items: schemas,
            logical_operator: LogicalOperator::Or,
        }),
    };

    let ref_path = format!("#/operations/{}-response", operation.id);
    emitter.emit_synthetic(&ref_path, &schema, None)?;
    Ok(())
}

/// Build one parameter group's object schema. Empty groups are `never`; a
/// group is required when any member is.
fn group_schema(group: &IndexMap<String, IrParameter>) -> (IrSchema, bool) {
    if group.is_empty() {
        // Absent groups still appear in the bundle.
        return (IrSchema::never(), true);
    }

    let mut properties: IndexMap<String, IrSchema> = IndexMap::new();
    let mut required: IndexSet<String> = IndexSet::new();
    let mut any_required = false;

    for (name, parameter) in group {
        if parameter.required {
            required.insert(name.clone());
            any_required = true;
        }
        properties.insert(
            name.clone(),
            parameter.schema.clone().unwrap_or_else(IrSchema::unknown),
        );
    }

    (
        IrSchema::of(IrSchemaKind::Object {
            properties,
            required,
            additional_properties: None,
        }),
        any_required,
    )
}
