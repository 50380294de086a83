//! Shared 3.x paths walk: path-item merging, parameter grouping with
//! method-wins precedence, and per-method operation construction.

use log::warn;
use serde_json::Value;

use crate::error::Error;
use crate::ir::{
    HttpMethod, IrModel, IrOperation, IrParameter, IrParameterGroups, IrResponse, IrServer,
};
use crate::resolve;
use crate::spec::v3;

use super::components::{
    deserialize_entry, materialize_parameter, materialize_request_body, parameter_to_ir,
    request_body_to_ir, SchemaFn,
};
use super::ParserState;

pub(crate) fn parse_paths(
    root: &Value,
    ir: &mut IrModel,
    state: &mut ParserState,
    strict: bool,
    schema_fn: SchemaFn,
) -> Result<(), Error> {
    let Some(paths) = root.get("paths").and_then(Value::as_object) else {
        return Ok(());
    };

    for (path, item_value) in paths {
        // A referenced path item is merged with its inline overlay; inline
        // fields override referenced ones.
        let merged = match resolve::dereference(root, item_value) {
            Ok(merged) => merged,
            Err(err) => {
                if strict {
                    return Err(err.into());
                }
                warn!("{err}; path '{path}' skipped");
                continue;
            }
        };

        let ref_path = format!("#/paths/{}", resolve::encode_segment(path));
        let Some(item) = deserialize_entry::<v3::PathItem>(&merged, &ref_path, strict)? else {
            continue;
        };

        let path_parameters = collect_parameters(root, &item.parameters, &ref_path, strict, schema_fn)?;

        for method in HttpMethod::ALL {
            let Some(op) = item.operation(method) else {
                continue;
            };
            let op_ref = format!("{ref_path}/{}", method.as_str());
            if !state.filters.accepts(&op_ref) {
                continue;
            }

            let operation =
                build_operation(root, state, path, method, op, &path_parameters, strict, schema_fn)?;
            ir.paths
                .entry(path.clone())
                .or_default()
                .insert(method, operation);
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build_operation(
    root: &Value,
    state: &mut ParserState,
    path: &str,
    method: HttpMethod,
    op: &v3::Operation,
    path_parameters: &[IrParameter],
    strict: bool,
    schema_fn: SchemaFn,
) -> Result<IrOperation, Error> {
    // Path-item parameters first, then method parameters: a later insert
    // with the same name replaces the earlier one, so the method wins.
    let mut parameters = IrParameterGroups::default();
    for parameter in path_parameters {
        parameters.insert(parameter.clone());
    }
    let op_ref = format!("#/paths/{}/{}", resolve::encode_segment(path), method.as_str());
    for parameter in collect_parameters(root, &op.parameters, &op_ref, strict, schema_fn)? {
        parameters.insert(parameter);
    }

    let body = match &op.request_body {
        Some(body_or_ref) => materialize_request_body(root, body_or_ref, &op_ref, strict)?
            .map(|body| request_body_to_ir(&body, schema_fn)),
        None => None,
    };

    let responses = collect_responses(root, op, &op_ref, strict, schema_fn)?;

    let servers = op
        .servers
        .iter()
        .map(|s| IrServer {
            url: s.url.clone(),
            description: s.description.clone(),
        })
        .collect();

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
        servers,
    })
}

fn collect_parameters(
    root: &Value,
    parameters: &[v3::ParameterOrRef],
    holder: &str,
    strict: bool,
    schema_fn: SchemaFn,
) -> Result<Vec<IrParameter>, Error> {
    let mut out = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        if let Some(parameter) = materialize_parameter(root, parameter, holder, strict)? {
            out.push(parameter_to_ir(&parameter, schema_fn));
        }
    }
    Ok(out)
}

fn collect_responses(
    root: &Value,
    op: &v3::Operation,
    holder: &str,
    strict: bool,
    schema_fn: SchemaFn,
) -> Result<indexmap::IndexMap<String, IrResponse>, Error> {
    let mut responses = indexmap::IndexMap::new();
    for (status, response_or_ref) in &op.responses {
        let response = match response_or_ref {
            v3::ResponseOrRef::Response(r) => r.clone(),
            v3::ResponseOrRef::Ref { ref_path } => {
                match resolve::resolve_ref::<v3::Response>(root, ref_path) {
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

        let media_type = response
            .content
            .get("application/json")
            .or_else(|| response.content.values().next());

        responses.insert(
            status.clone(),
            IrResponse {
                description: response.description.clone(),
                schema: media_type.and_then(|mt| mt.schema.as_ref()).map(schema_fn),
            },
        );
    }
    Ok(responses)
}
