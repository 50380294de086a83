//! Zod plugin: emits runtime validator schemas for components and
//! per-operation request/response bundles into `zod.gen.ts`.

pub mod emit;
pub mod expr;
pub mod operations;

use apgen_core::config::PluginRecord;
use apgen_core::error::{ConfigError, Error};
use apgen_core::events::{Event, EventKind};
use apgen_core::files::{FileRegistry, FileSpec};
use apgen_core::naming::{IdentifierCase, NameTransform};
use apgen_core::{Context, Plugin, Subscriptions};
use serde::Deserialize;

use emit::SchemaEmitter;

/// Options for the zod plugin, mirroring its configuration schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZodConfig {
    pub definitions: DefinitionsConfig,
    pub requests: ToggleConfig,
    pub responses: ToggleConfig,
    /// Emit JSDoc comments above declarations.
    pub comments: bool,
    /// Emit `.describe(…)` metadata from descriptions.
    pub metadata: bool,
}

impl Default for ZodConfig {
    fn default() -> Self {
        Self {
            definitions: DefinitionsConfig::default(),
            requests: ToggleConfig { enabled: true },
            responses: ToggleConfig { enabled: true },
            comments: true,
            metadata: false,
        }
    }
}

/// Component schema emission options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefinitionsConfig {
    pub enabled: bool,
    pub case: IdentifierCase,
    /// Optional name pattern containing `{{name}}`, applied before case
    /// conversion (e.g. `z{{name}}`).
    pub name: Option<String>,
}

impl Default for DefinitionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            case: IdentifierCase::PascalCase,
            name: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToggleConfig {
    pub enabled: bool,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

const FILE_ID: &str = "zod";
const FILE_PATH: &str = "zod.gen.ts";

/// The zod validator plugin.
pub struct ZodPlugin {
    config: ZodConfig,
    transform: Option<NameTransform>,
}

impl ZodPlugin {
    pub fn new(config: ZodConfig) -> Self {
        let transform = config
            .name_pattern()
            .map(|pattern| NameTransform::Pattern(pattern.to_string()));
        ZodPlugin { config, transform }
    }

    /// Build the plugin from its configured record.
    pub fn from_record(record: &PluginRecord) -> Result<Self, ConfigError> {
        let config = match &record.options {
            serde_json::Value::Null => ZodConfig::default(),
            options => serde_json::from_value(options.clone()).map_err(|source| {
                ConfigError::InvalidPluginOptions {
                    plugin: "zod".to_string(),
                    source,
                }
            })?,
        };
        Ok(ZodPlugin::new(config))
    }

    /// Files are created lazily on first reference.
    fn ensure_file<'f>(&self, files: &'f mut FileRegistry) -> &'f mut apgen_core::files::GeneratedFile {
        if files.file(FILE_ID).is_none() {
            let file = files.create_file(FileSpec {
                id: FILE_ID.to_string(),
                path: FILE_PATH.to_string(),
                case: self.config.definitions.case,
                export_from_index: true,
            });
            file.import("zod", "z");
        }
        files.file_mut(FILE_ID).expect("file just ensured")
    }
}

impl ZodConfig {
    fn name_pattern(&self) -> Option<&str> {
        self.definitions.name.as_deref()
    }
}

impl Plugin for ZodPlugin {
    fn name(&self) -> &'static str {
        "zod"
    }

    fn setup(
        &mut self,
        _ctx: &mut Context,
        subscriptions: &mut Subscriptions<'_>,
    ) -> Result<(), Error> {
        if self.config.definitions.enabled {
            subscriptions.subscribe(EventKind::Schema);
        }
        if self.config.requests.enabled || self.config.responses.enabled {
            subscriptions.subscribe(EventKind::Operation);
        }
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut Context, event: &Event) -> Result<(), Error> {
        let Context { ir, files, .. } = ctx;

        match event {
            Event::Schema { ref_path, .. } => {
                let file = self.ensure_file(files);
                let mut emitter = SchemaEmitter::new(
                    ir,
                    file,
                    self.transform.clone(),
                    self.config.comments,
                    self.config.metadata,
                );
                emitter.emit_component(ref_path)?;
            }
            Event::Operation { operation } => {
                let file = self.ensure_file(files);
                let mut emitter = SchemaEmitter::new(
                    ir,
                    file,
                    self.transform.clone(),
                    self.config.comments,
                    self.config.metadata,
                );
                if self.config.requests.enabled {
                    operations::emit_request(&mut emitter, operation)?;
                }
                if self.config.responses.enabled {
                    operations::emit_response(&mut emitter, operation)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
