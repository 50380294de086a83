//! Shared 3.x component walk. Dialect modules supply the schema
//! normalization function; everything else about the document shape is
//! identical between 3.0 and 3.1.

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, ParseError};
use crate::ir::{
    IrComponent, IrModel, IrParameter, IrRequestBody, IrSchema, ParameterLocation,
};
use crate::resolve;
use crate::spec::v3;

use super::ParserState;

/// Dialect-specific schema normalization.
pub(crate) type SchemaFn = fn(&v3::SchemaOrRef) -> IrSchema;

/// Walk `#/components` in kind order: parameters, request bodies, schemas.
/// Entries rejected by filters are still parsed (transitive references must
/// resolve) but recorded as excluded from component-level events.
pub(crate) fn parse_components(
    root: &Value,
    ir: &mut IrModel,
    state: &mut ParserState,
    strict: bool,
    schema_fn: SchemaFn,
) -> Result<(), Error> {
    parse_parameters(root, ir, state, strict, schema_fn)?;
    parse_request_bodies(root, ir, state, strict, schema_fn)?;
    parse_schemas(root, ir, state, strict, schema_fn)?;
    Ok(())
}

fn parse_parameters(
    root: &Value,
    ir: &mut IrModel,
    state: &mut ParserState,
    strict: bool,
    schema_fn: SchemaFn,
) -> Result<(), Error> {
    let Some(entries) = root
        .pointer("/components/parameters")
        .and_then(Value::as_object)
    else {
        return Ok(());
    };

    for (name, value) in entries {
        let canonical = format!("#/components/parameters/{name}");
        if !state.filters.accepts(&canonical) {
            ir.excluded.insert(canonical.clone());
        }
        let Some(parameter) = deserialize_entry::<v3::ParameterOrRef>(value, &canonical, strict)?
        else {
            continue;
        };
        let Some(parameter) = materialize_parameter(root, &parameter, &canonical, strict)? else {
            continue;
        };
        ir.components.insert(
            canonical,
            IrComponent::Parameter(parameter_to_ir(&parameter, schema_fn)),
        );
    }
    Ok(())
}

fn parse_request_bodies(
    root: &Value,
    ir: &mut IrModel,
    state: &mut ParserState,
    strict: bool,
    schema_fn: SchemaFn,
) -> Result<(), Error> {
    let Some(entries) = root
        .pointer("/components/requestBodies")
        .and_then(Value::as_object)
    else {
        return Ok(());
    };

    for (name, value) in entries {
        let canonical = format!("#/components/requestBodies/{name}");
        if !state.filters.accepts(&canonical) {
            ir.excluded.insert(canonical.clone());
        }
        let Some(body) = deserialize_entry::<v3::RequestBodyOrRef>(value, &canonical, strict)?
        else {
            continue;
        };
        let Some(body) = materialize_request_body(root, &body, &canonical, strict)? else {
            continue;
        };
        ir.components.insert(
            canonical,
            IrComponent::RequestBody(request_body_to_ir(&body, schema_fn)),
        );
    }
    Ok(())
}

fn parse_schemas(
    root: &Value,
    ir: &mut IrModel,
    state: &mut ParserState,
    strict: bool,
    schema_fn: SchemaFn,
) -> Result<(), Error> {
    let Some(entries) = root
        .pointer("/components/schemas")
        .and_then(Value::as_object)
    else {
        return Ok(());
    };

    for (name, value) in entries {
        let canonical = format!("#/components/schemas/{name}");
        if !state.filters.accepts(&canonical) {
            ir.excluded.insert(canonical.clone());
        }
        let schema = match deserialize_entry::<v3::SchemaOrRef>(value, &canonical, strict)? {
            Some(parsed) => schema_fn(&parsed),
            // Unknown types and malformed entries degrade instead of failing.
            None => IrSchema::unknown(),
        };
        ir.components.insert(canonical, IrComponent::Schema(schema));
    }
    Ok(())
}

/// Deserialize one component entry, degrading to `None` with a warning when
/// strictness is off.
pub(crate) fn deserialize_entry<T: DeserializeOwned>(
    value: &Value,
    ref_path: &str,
    strict: bool,
) -> Result<Option<T>, Error> {
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(source) => {
            let err = ParseError::Schema {
                ref_path: ref_path.to_string(),
                source,
            };
            if strict {
                Err(err.into())
            } else {
                warn!("{err}; entry degraded");
                Ok(None)
            }
        }
    }
}

/// Resolve a parameter reference to its inline form.
pub(crate) fn materialize_parameter(
    root: &Value,
    parameter: &v3::ParameterOrRef,
    holder: &str,
    strict: bool,
) -> Result<Option<v3::Parameter>, Error> {
    match parameter {
        v3::ParameterOrRef::Parameter(p) => Ok(Some(p.clone())),
        v3::ParameterOrRef::Ref { ref_path } => {
            match resolve::resolve_ref::<v3::Parameter>(root, ref_path) {
                Ok(p) => Ok(Some(p)),
                Err(err) => {
                    if strict {
                        Err(Error::Resolve(err))
                    } else {
                        warn!("{err} (referenced from {holder}); parameter skipped");
                        Ok(None)
                    }
                }
            }
        }
    }
}

/// Resolve a request body reference to its inline form.
pub(crate) fn materialize_request_body(
    root: &Value,
    body: &v3::RequestBodyOrRef,
    holder: &str,
    strict: bool,
) -> Result<Option<v3::RequestBody>, Error> {
    match body {
        v3::RequestBodyOrRef::RequestBody(b) => Ok(Some(b.clone())),
        v3::RequestBodyOrRef::Ref { ref_path } => {
            match resolve::resolve_ref::<v3::RequestBody>(root, ref_path) {
                Ok(b) => Ok(Some(b)),
                Err(err) => {
                    if strict {
                        Err(Error::Resolve(err))
                    } else {
                        warn!("{err} (referenced from {holder}); request body skipped");
                        Ok(None)
                    }
                }
            }
        }
    }
}

pub(crate) fn parameter_to_ir(parameter: &v3::Parameter, schema_fn: SchemaFn) -> IrParameter {
    IrParameter {
        name: parameter.name.clone(),
        location: match parameter.location {
            v3::ParameterLocation::Header => ParameterLocation::Header,
            v3::ParameterLocation::Path => ParameterLocation::Path,
            v3::ParameterLocation::Query => ParameterLocation::Query,
            v3::ParameterLocation::Cookie => ParameterLocation::Cookie,
        },
        required: parameter.required,
        description: parameter.description.clone(),
        schema: parameter.schema.as_ref().map(schema_fn),
    }
}

pub(crate) fn request_body_to_ir(body: &v3::RequestBody, schema_fn: SchemaFn) -> IrRequestBody {
    // Prefer application/json, fall back to the first content type.
    let media_type = body
        .content
        .get("application/json")
        .or_else(|| body.content.values().next());

    IrRequestBody {
        description: body.description.clone(),
        required: body.required,
        schema: media_type.and_then(|mt| mt.schema.as_ref()).map(schema_fn),
    }
}
