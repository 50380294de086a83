//! TypeScript plugin: `export type` declarations for components in
//! `types.gen.ts` and a typed fetch client in `client.gen.ts`.

pub mod type_mapper;

use apgen_core::config::PluginRecord;
use apgen_core::error::{ConfigError, Error};
use apgen_core::events::{Event, EventKind};
use apgen_core::files::{FileRegistry, FileSpec, GeneratedFile};
use apgen_core::ir::{IrOperation, IrParameter, IrSchema, IrSchemaKind};
use apgen_core::naming::IdentifierCase;
use apgen_core::{Context, Plugin, Subscriptions};
use indexmap::IndexMap;
use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};

use type_mapper::TypeEmitter;

/// Options for the TypeScript plugin.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TypeScriptConfig {
    pub case: IdentifierCase,
    /// Emit the typed fetch client alongside the type declarations.
    pub client: bool,
    pub base_url: Option<String>,
}

impl Default for TypeScriptConfig {
    fn default() -> Self {
        Self {
            case: IdentifierCase::PascalCase,
            client: true,
            base_url: None,
        }
    }
}

const TYPES_FILE_ID: &str = "types";
const TYPES_FILE_PATH: &str = "types.gen.ts";
const CLIENT_FILE_ID: &str = "client";
const CLIENT_FILE_PATH: &str = "client.gen.ts";

/// One client method, pre-rendered for the template.
#[derive(Debug, Serialize)]
struct ClientOperation {
    name: String,
    method: String,
    path: String,
    interpolated_path: String,
    summary: Option<String>,
    deprecated: bool,
    has_args: bool,
    args_type: String,
    has_body: bool,
    has_headers: bool,
    has_query: bool,
    response_type: String,
    returns_void: bool,
}

/// The TypeScript plugin.
pub struct TypeScriptPlugin {
    config: TypeScriptConfig,
    operations: Vec<ClientOperation>,
    server_url: Option<String>,
}

impl TypeScriptPlugin {
    pub fn new(config: TypeScriptConfig) -> Self {
        TypeScriptPlugin {
            config,
            operations: Vec::new(),
            server_url: None,
        }
    }

    pub fn from_record(record: &PluginRecord) -> Result<Self, ConfigError> {
        let config = match &record.options {
            serde_json::Value::Null => TypeScriptConfig::default(),
            options => serde_json::from_value(options.clone()).map_err(|source| {
                ConfigError::InvalidPluginOptions {
                    plugin: "typescript".to_string(),
                    source,
                }
            })?,
        };
        Ok(TypeScriptPlugin::new(config))
    }

    fn ensure_types_file<'f>(&self, files: &'f mut FileRegistry) -> &'f mut GeneratedFile {
        if files.file(TYPES_FILE_ID).is_none() {
            files.create_file(FileSpec {
                id: TYPES_FILE_ID.to_string(),
                path: TYPES_FILE_PATH.to_string(),
                case: self.config.case,
                export_from_index: true,
            });
        }
        files.file_mut(TYPES_FILE_ID).expect("file just ensured")
    }

    fn collect_operation(
        &mut self,
        ir: &apgen_core::ir::IrModel,
        files: &mut FileRegistry,
        operation: &IrOperation,
    ) -> Result<(), Error> {
        let types_file = self.ensure_types_file(files);
        let mut emitter = TypeEmitter::new(ir, types_file, "models.");

        let mut args_fields: Vec<String> = Vec::new();

        let (has_body, body_type, body_required) = match &operation.body {
            Some(body) => {
                let schema = body.schema.clone().unwrap_or_else(IrSchema::unknown);
                (true, emitter.ts_type(&schema)?, body.required)
            }
            None => (false, String::new(), false),
        };
        if has_body {
            let marker = if body_required { "" } else { "?" };
            args_fields.push(format!("body{marker}: {body_type}"));
        }

        let mut has_headers = false;
        let mut has_query = false;
        for (key, group, flag) in [
            ("path", &operation.parameters.path, None),
            ("headers", &operation.parameters.header, Some(&mut has_headers)),
            ("query", &operation.parameters.query, Some(&mut has_query)),
        ] {
            if group.is_empty() {
                continue;
            }
            if let Some(flag) = flag {
                *flag = true;
            }
            let (schema, any_required) = group_object(group);
            let rendered = emitter.ts_type(&schema)?;
            let marker = if any_required { "" } else { "?" };
            args_fields.push(format!("{key}{marker}: {rendered}"));
        }

        let response_type = {
            let mut success: Vec<String> = Vec::new();
            for (status, response) in &operation.responses {
                if !(status.starts_with('2') || status == "default") {
                    continue;
                }
                if let Some(schema) = &response.schema {
                    let rendered = emitter.ts_type(schema)?;
                    if !success.contains(&rendered) {
                        success.push(rendered);
                    }
                }
            }
            if success.is_empty() {
                "void".to_string()
            } else {
                success.join(" | ")
            }
        };

        let name = IdentifierCase::CamelCase.apply(&operation.id);
        self.operations.push(ClientOperation {
            name,
            method: operation.method.as_str().to_uppercase(),
            path: operation.path.clone(),
            interpolated_path: interpolate_path(&operation.path),
            // Escape sequences that would close the JSDoc block early.
            summary: operation.summary.clone().map(|s| s.replace("*/", "*\\/")),
            deprecated: operation.deprecated,
            has_args: !args_fields.is_empty(),
            args_type: format!("{{ {} }}", args_fields.join("; ")),
            has_body,
            has_headers,
            has_query,
            returns_void: response_type == "void",
            response_type,
        });
        Ok(())
    }

    fn emit_client(&mut self, files: &mut FileRegistry) -> Result<(), Error> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.add_template("client.ts.j2", include_str!("../templates/client.ts.j2"))
            .expect("template should be valid");
        let template = env.get_template("client.ts.j2").expect("template just added");

        let rendered = template
            .render(context! {
                operations => &self.operations,
                base_url => self.config.base_url.clone().or_else(|| self.server_url.clone()),
                has_types => files.file(TYPES_FILE_ID).is_some_and(|f| !f.is_empty()),
            })
            .expect("render should succeed");

        let file = files.create_file(FileSpec {
            id: CLIENT_FILE_ID.to_string(),
            path: CLIENT_FILE_PATH.to_string(),
            case: self.config.case,
            export_from_index: true,
        });
        file.add(rendered.trim_end().to_string());
        Ok(())
    }
}

impl Plugin for TypeScriptPlugin {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn setup(
        &mut self,
        _ctx: &mut Context,
        subscriptions: &mut Subscriptions<'_>,
    ) -> Result<(), Error> {
        subscriptions.subscribe(EventKind::Schema);
        if self.config.client {
            subscriptions.subscribe(EventKind::Server);
            subscriptions.subscribe(EventKind::Operation);
            subscriptions.subscribe(EventKind::After);
        }
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut Context, event: &Event) -> Result<(), Error> {
        let Context { ir, files, .. } = ctx;
        match event {
            Event::Schema { ref_path, .. } => {
                let types_file = self.ensure_types_file(files);
                let mut emitter = TypeEmitter::new(ir, types_file, "");
                emitter.emit_component(ref_path)?;
            }
            Event::Server { server } => {
                if self.server_url.is_none() {
                    self.server_url = Some(server.url.clone());
                }
            }
            Event::Operation { operation } => {
                self.collect_operation(ir, files, operation)?;
            }
            Event::After => {
                self.emit_client(files)?;
            }
            _ => {}
        }
        Ok(())
    }
}

/// Build one parameter group's object schema for the args type.
fn group_object(group: &IndexMap<String, IrParameter>) -> (IrSchema, bool) {
    let mut properties: IndexMap<String, IrSchema> = IndexMap::new();
    let mut required: indexmap::IndexSet<String> = indexmap::IndexSet::new();
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

/// Turn `/pets/{petId}` into `/pets/${params.path["petId"]}` for template
/// literals. Bracket access tolerates parameter names that are not valid
/// identifiers.
fn interpolate_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &rest[start + 1..start + end];
        out.push_str(&format!("${{params.path[\"{name}\"]}}"));
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);
    out
}

/// Sanitize an object property key for type position; quoting rules match
/// the value emitters.
pub(crate) fn sanitize_property_key(key: &str) -> String {
    if !key.is_empty() && key.parse::<f64>().is_ok() {
        if key.starts_with('-') {
            return format!("\"{key}\"");
        }
        return key.to_string();
    }
    let starts_with_digit = key.chars().next().is_some_and(|c| c.is_ascii_digit());
    let has_non_word = key
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'));
    if starts_with_digit || has_non_word || key.is_empty() {
        return format!("\"{}\"", key.replace('\\', "\\\\").replace('"', "\\\""));
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_path_parameters() {
        assert_eq!(
            interpolate_path("/pets/{petId}/photos/{photoId}"),
            "/pets/${params.path[\"petId\"]}/photos/${params.path[\"photoId\"]}"
        );
        assert_eq!(interpolate_path("/pets"), "/pets");
    }

    #[test]
    fn sanitizes_type_keys() {
        assert_eq!(sanitize_property_key("petId"), "petId");
        assert_eq!(sanitize_property_key("content-type"), "\"content-type\"");
        assert_eq!(sanitize_property_key("42"), "42");
    }
}
