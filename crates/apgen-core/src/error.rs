use thiserror::Error;

use crate::events::EventKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("plugin '{plugin}' depends on '{dependency}', which is not configured")]
    MissingDependency { plugin: String, dependency: String },

    #[error("plugin dependency cycle involving '{0}'")]
    DependencyCycle(String),

    #[error("plugin '{plugin}' must precede '{dependent}' in the plugin order")]
    OrderViolation { plugin: String, dependent: String },

    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("invalid plugin options for '{plugin}': {source}")]
    InvalidPluginOptions {
        plugin: String,
        source: serde_json::Error,
    },

    #[error("invalid output path: {0}")]
    InvalidOutputPath(String),

    #[error("failed to read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse config {path}: {source}")]
    Format {
        path: String,
        source: serde_yaml_ng::Error,
    },
}

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("malformed root document: {0}")]
    MalformedRoot(String),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("reference target not found: {0}")]
    RefNotFound(String),

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference {ref_path} resolved to an incompatible node: {source}")]
    IncompatibleTarget {
        ref_path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to normalize {ref_path}: {source}")]
    Schema {
        ref_path: String,
        source: serde_json::Error,
    },

    #[error("failed to parse path item {path}: {source}")]
    PathItem {
        path: String,
        source: serde_json::Error,
    },

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
}

/// Wraps a failure raised by a subscriber during event delivery.
#[derive(Debug, Error)]
#[error("plugin '{plugin}' failed while handling '{event}' event")]
pub struct BroadcastError {
    pub event: EventKind,
    pub plugin: String,
    #[source]
    pub source: Box<Error>,
}

#[derive(Debug, Error)]
pub enum EmissionError {
    #[error("duplicate identifier '{name}' in file '{file}' cannot be disambiguated")]
    DuplicateIdentifier { file: String, name: String },

    #[error("no file with id '{0}' has been created")]
    UnknownFile(String),

    #[error("failed to write {path}: {message}")]
    Write { path: String, message: String },
}

/// Fatal pipeline error, reported to the host for exit-code mapping.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("spec error: {0}")]
    Spec(#[from] SpecError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("broadcast error: {0}")]
    Broadcast(#[from] BroadcastError),

    #[error("emission error: {0}")]
    Emission(#[from] EmissionError),
}
