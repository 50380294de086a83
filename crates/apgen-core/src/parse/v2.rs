//! Legacy Swagger 2.0 parser. Reusable schemas live under
//! `#/definitions`, reusable parameters under `#/parameters`; body
//! parameters become request bodies, and the server list is synthesized
//! from `host`, `basePath`, and `schemes`.

use indexmap::{IndexMap, IndexSet};
use log::warn;
use serde_json::Value;

use crate::context::Context;
use crate::error::Error;
use crate::ir::{
    AccessScope, HttpMethod, IrComponent, IrModel, IrOperation, IrParameter, IrParameterGroups,
    IrRequestBody, IrResponse, IrSchema, IrSchemaKind, IrServer, LogicalOperator,
    ParameterLocation,
};
use crate::resolve;
use crate::spec::v2;

use super::components::deserialize_entry;
use super::{ParserState, v3_0::enum_member};

pub(crate) fn parse(ctx: &mut Context, state: &mut ParserState) -> Result<(), Error> {
    let strict = ctx.config.parser.strict;
    let Context { spec, ir, .. } = ctx;
    let root = &spec.root;

    parse_parameter_components(root, ir, state, strict)?;
    parse_definitions(root, ir, state, strict)?;
    parse_paths(root, ir, state, strict)?;
    parse_servers(root, ir);
    Ok(())
}

fn parse_parameter_components(
    root: &Value,
    ir: &mut IrModel,
    state: &mut ParserState,
    strict: bool,
) -> Result<(), Error> {
    let Some(entries) = root.get("parameters").and_then(Value::as_object) else {
        return Ok(());
    };

    for (name, value) in entries {
        let canonical = format!("#/parameters/{name}");
        if !state.filters.accepts(&canonical) {
            ir.excluded.insert(canonical.clone());
        }
        let Some(parameter) = deserialize_entry::<v2::Parameter>(value, &canonical, strict)?
        else {
            continue;
        };
        // Reusable body parameters are request bodies in IR terms.
        let component = match parameter.location {
            v2::ParameterLocation::Body => IrComponent::RequestBody(body_parameter_to_ir(&parameter)),
            _ => match parameter_to_ir(&parameter) {
                Some(p) => IrComponent::Parameter(p),
                None => continue,
            },
        };
        ir.components.insert(canonical, component);
    }
    Ok(())
}

fn parse_definitions(
    root: &Value,
    ir: &mut IrModel,
    state: &mut ParserState,
    strict: bool,
) -> Result<(), Error> {
    let Some(entries) = root.get("definitions").and_then(Value::as_object) else {
        return Ok(());
    };

    for (name, value) in entries {
        let canonical = format!("#/definitions/{name}");
        if !state.filters.accepts(&canonical) {
            ir.excluded.insert(canonical.clone());
        }
        let schema = match deserialize_entry::<v2::SchemaOrRef>(value, &canonical, strict)? {
            Some(parsed) => schema_to_ir(&parsed),
            None => IrSchema::unknown(),
        };
        ir.components.insert(canonical, IrComponent::Schema(schema));
    }
    Ok(())
}

fn parse_paths(
    root: &Value,
    ir: &mut IrModel,
    state: &mut ParserState,
    strict: bool,
) -> Result<(), Error> {
    let Some(paths) = root.get("paths").and_then(Value::as_object) else {
        return Ok(());
    };

    for (path, item_value) in paths {
        let ref_path = format!("#/paths/{}", resolve::encode_segment(path));
        let Some(item) = deserialize_entry::<v2::PathItem>(item_value, &ref_path, strict)? else {
            continue;
        };

        let path_parameters = collect_parameters(root, &item.parameters, &ref_path, strict)?;

        for method in HttpMethod::ALL {
            let Some(op) = item.operation(method) else {
                continue;
            };
            let op_ref = format!("{ref_path}/{}", method.as_str());
            if !state.filters.accepts(&op_ref) {
                continue;
            }

            let operation =
                build_operation(root, state, path, method, op, &path_parameters, strict)?;
            ir.paths
                .entry(path.clone())
                .or_default()
                .insert(method, operation);
        }
    }
    Ok(())
}

fn build_operation(
    root: &Value,
    state: &mut ParserState,
    path: &str,
    method: HttpMethod,
    op: &v2::Operation,
    path_parameters: &[ResolvedParameter],
    strict: bool,
) -> Result<IrOperation, Error> {
    let op_ref = format!("#/paths/{}/{}", resolve::encode_segment(path), method.as_str());

    // Path-item parameters first, then method parameters; the method wins
    // on name collision. Body and formData entries feed the request body
    // instead of a parameter group.
    let mut parameters = IrParameterGroups::default();
    let mut body: Option<IrRequestBody> = None;
    let mut form_fields: Vec<(String, bool, IrSchema)> = Vec::new();

    let method_parameters = collect_parameters(root, &op.parameters, &op_ref, strict)?;
    for resolved in path_parameters.iter().chain(method_parameters.iter()) {
        match resolved {
            ResolvedParameter::Plain(parameter) => parameters.insert(parameter.clone()),
            ResolvedParameter::Body(request_body) => body = Some(request_body.clone()),
            ResolvedParameter::FormField { name, required, schema } => {
                form_fields.retain(|(existing, _, _)| existing != name);
                form_fields.push((name.clone(), *required, schema.clone()));
            }
        }
    }

    if body.is_none() && !form_fields.is_empty() {
        body = Some(form_body(form_fields));
    }

    let responses = collect_responses(root, op, &op_ref, strict)?;

    Ok(IrOperation {
        id: state.operation_id(op.operation_id.as_deref(), method, path),
        method,
        path: path.to_string(),
        summary: op.summary.clone(),
        description: op.description.clone(),
        deprecated: op.deprecated,
        parameters,
        body,
        responses,
        security: op.security.clone().unwrap_or_default(),
        servers: Vec::new(),
    })
}

/// A 2.0 parameter resolves to one of three IR destinations.
enum ResolvedParameter {
    Plain(IrParameter),
    Body(IrRequestBody),
    FormField {
        name: String,
        required: bool,
        schema: IrSchema,
    },
}

fn collect_parameters(
    root: &Value,
    parameters: &[v2::ParameterOrRef],
    holder: &str,
    strict: bool,
) -> Result<Vec<ResolvedParameter>, Error> {
    let mut out = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        let parameter = match parameter {
            v2::ParameterOrRef::Parameter(p) => (**p).clone(),
            v2::ParameterOrRef::Ref { ref_path } => {
                match resolve::resolve_ref::<v2::Parameter>(root, ref_path) {
                    Ok(p) => p,
                    Err(err) => {
                        if strict {
                            return Err(err.into());
                        }
                        warn!("{err} (referenced from {holder}); parameter skipped");
                        continue;
                    }
                }
            }
        };

        match parameter.location {
            v2::ParameterLocation::Body => {
                out.push(ResolvedParameter::Body(body_parameter_to_ir(&parameter)));
            }
            v2::ParameterLocation::FormData => {
                out.push(ResolvedParameter::FormField {
                    name: parameter.name.clone(),
                    required: parameter.required,
                    schema: inline_parameter_schema(&parameter),
                });
            }
            _ => {
                if let Some(p) = parameter_to_ir(&parameter) {
                    out.push(ResolvedParameter::Plain(p));
                }
            }
        }
    }
    Ok(out)
}

fn collect_responses(
    root: &Value,
    op: &v2::Operation,
    holder: &str,
    strict: bool,
) -> Result<IndexMap<String, IrResponse>, Error> {
    let mut responses = IndexMap::new();
    for (status, response_or_ref) in &op.responses {
        let response = match response_or_ref {
            v2::ResponseOrRef::Response(r) => r.clone(),
            v2::ResponseOrRef::Ref { ref_path } => {
                match resolve::resolve_ref::<v2::Response>(root, ref_path) {
                    Ok(r) => r,
                    Err(err) => {
                        if strict {
                            return Err(err.into());
                        }
                        warn!("{err} (referenced from {holder}); response skipped");
                        continue;
                    }
                }
            }
        };
        responses.insert(
            status.clone(),
            IrResponse {
                description: response.description.clone(),
                schema: response.schema.as_ref().map(schema_to_ir),
            },
        );
    }
    Ok(responses)
}

/// Synthesize the server list from `schemes` × `host` + `basePath`.
fn parse_servers(root: &Value, ir: &mut IrModel) {
    let Some(host) = root.get("host").and_then(Value::as_str) else {
        return;
    };
    let base_path = root.get("basePath").and_then(Value::as_str).unwrap_or("");
    let schemes: Vec<&str> = root
        .get("schemes")
        .and_then(Value::as_array)
        .map(|schemes| schemes.iter().filter_map(Value::as_str).collect())
        .unwrap_or_else(|| vec!["https"]);

    for scheme in schemes {
        ir.servers.push(IrServer {
            url: format!("{scheme}://{host}{base_path}"),
            description: None,
        });
    }
}

fn parameter_to_ir(parameter: &v2::Parameter) -> Option<IrParameter> {
    let location = match parameter.location {
        v2::ParameterLocation::Query => ParameterLocation::Query,
        v2::ParameterLocation::Header => ParameterLocation::Header,
        v2::ParameterLocation::Path => ParameterLocation::Path,
        v2::ParameterLocation::Body | v2::ParameterLocation::FormData => return None,
    };

    Some(IrParameter {
        name: parameter.name.clone(),
        location,
        required: parameter.required,
        description: parameter.description.clone(),
        schema: Some(inline_parameter_schema(parameter)),
    })
}

fn body_parameter_to_ir(parameter: &v2::Parameter) -> IrRequestBody {
    IrRequestBody {
        description: parameter.description.clone(),
        required: parameter.required,
        schema: parameter.schema.as_ref().map(schema_to_ir),
    }
}

/// Build an object schema from collected formData fields.
fn form_body(fields: Vec<(String, bool, IrSchema)>) -> IrRequestBody {
    let mut properties = IndexMap::new();
    let mut required = IndexSet::new();
    for (name, field_required, schema) in fields {
        if field_required {
            required.insert(name.clone());
        }
        properties.insert(name, schema);
    }
    IrRequestBody {
        description: None,
        required: !required.is_empty(),
        schema: Some(IrSchema::of(IrSchemaKind::Object {
            properties,
            required,
            additional_properties: None,
        })),
    }
}

/// Non-body parameters describe their value with inline type keywords.
fn inline_parameter_schema(parameter: &v2::Parameter) -> IrSchema {
    if !parameter.enum_values.is_empty() {
        return IrSchema::of(IrSchemaKind::Enum {
            members: parameter.enum_values.iter().map(enum_member).collect(),
        });
    }

    let kind = match parameter.schema_type {
        Some(v2::SchemaType::String) => IrSchemaKind::String {
            format: parameter.format.clone(),
            min_length: parameter.min_length,
            max_length: parameter.max_length,
            pattern: parameter.pattern.clone(),
            const_value: None,
        },
        Some(v2::SchemaType::Integer) | Some(v2::SchemaType::Number) => IrSchemaKind::Number {
            integer: parameter.schema_type == Some(v2::SchemaType::Integer),
            format: parameter.format.clone(),
            minimum: parameter.minimum,
            maximum: parameter.maximum,
            exclusive_minimum: None,
            exclusive_maximum: None,
            const_value: None,
        },
        Some(v2::SchemaType::Boolean) => IrSchemaKind::Boolean { const_value: None },
        Some(v2::SchemaType::Array) => IrSchemaKind::Array {
            items: parameter
                .items
                .iter()
                .map(|item| schema_to_ir(item))
                .collect(),
            min_items: None,
            max_items: None,
            logical_operator: LogicalOperator::And,
        },
        _ => IrSchemaKind::Unknown,
    };
    IrSchema::of(kind)
}

/// Normalize a 2.0 schema (or reference) into the IR.
pub(crate) fn schema_to_ir(schema: &v2::SchemaOrRef) -> IrSchema {
    match schema {
        v2::SchemaOrRef::Ref { ref_path } => IrSchema::reference(ref_path.clone()),
        v2::SchemaOrRef::Schema(schema) => normalize(schema),
    }
}

fn normalize(schema: &v2::Schema) -> IrSchema {
    IrSchema {
        description: schema.description.clone(),
        default: schema.default_value.clone(),
        access_scope: if schema.read_only == Some(true) {
            AccessScope::Read
        } else {
            AccessScope::Unscoped
        },
        kind: normalize_kind(schema),
    }
}

fn normalize_kind(schema: &v2::Schema) -> IrSchemaKind {
    if !schema.enum_values.is_empty() {
        return IrSchemaKind::Enum {
            members: schema.enum_values.iter().map(enum_member).collect(),
        };
    }

    match schema.schema_type {
        Some(v2::SchemaType::String) => IrSchemaKind::String {
            format: schema.format.clone(),
            min_length: schema.min_length,
            max_length: schema.max_length,
            pattern: schema.pattern.clone(),
            const_value: None,
        },
        Some(v2::SchemaType::Integer) | Some(v2::SchemaType::Number) => IrSchemaKind::Number {
            integer: schema.schema_type == Some(v2::SchemaType::Integer),
            format: schema.format.clone(),
            minimum: if schema.exclusive_minimum == Some(true) {
                None
            } else {
                schema.minimum
            },
            maximum: if schema.exclusive_maximum == Some(true) {
                None
            } else {
                schema.maximum
            },
            exclusive_minimum: if schema.exclusive_minimum == Some(true) {
                schema.minimum
            } else {
                None
            },
            exclusive_maximum: if schema.exclusive_maximum == Some(true) {
                schema.maximum
            } else {
                None
            },
            const_value: None,
        },
        Some(v2::SchemaType::Boolean) => IrSchemaKind::Boolean { const_value: None },
        Some(v2::SchemaType::Null) => IrSchemaKind::Null,
        Some(v2::SchemaType::Array) => IrSchemaKind::Array {
            items: schema.items.iter().map(|item| schema_to_ir(item)).collect(),
            min_items: schema.min_items,
            max_items: schema.max_items,
            logical_operator: LogicalOperator::And,
        },
        Some(v2::SchemaType::Object) => object_kind(schema),
        None => untyped_kind(schema),
    }
}

fn object_kind(schema: &v2::Schema) -> IrSchemaKind {
    let properties: IndexMap<String, IrSchema> = schema
        .properties
        .iter()
        .map(|(name, prop)| (name.clone(), schema_to_ir(prop)))
        .collect();

    let required: IndexSet<String> = schema.required.iter().cloned().collect();

    let additional_properties = match &schema.additional_properties {
        Some(v2::AdditionalProperties::Bool(true)) => Some(Box::new(IrSchema::unknown())),
        Some(v2::AdditionalProperties::Bool(false)) | None => None,
        Some(v2::AdditionalProperties::Schema(inner)) => Some(Box::new(schema_to_ir(inner))),
    };

    IrSchemaKind::Object {
        properties,
        required,
        additional_properties,
    }
}

fn untyped_kind(schema: &v2::Schema) -> IrSchemaKind {
    if !schema.all_of.is_empty() {
        return IrSchemaKind::Composite {
            items: schema.all_of.iter().map(schema_to_ir).collect(),
            logical_operator: LogicalOperator::And,
        };
    }
    if !schema.properties.is_empty() {
        return object_kind(schema);
    }
    IrSchemaKind::Unknown
}
