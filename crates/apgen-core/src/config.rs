use std::fs;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level project configuration loaded from `.apgen.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the spec file; the host fetches and deserializes it.
    pub input: String,

    /// Ref patterns selecting what gets component-level emission. Empty
    /// means accept-all.
    pub include: Vec<String>,
    pub exclude: Vec<String>,

    pub output: OutputConfig,

    pub parser: ParserConfig,

    /// Plugin name → plugin record, in configuration order.
    pub plugins: IndexMap<String, PluginRecord>,

    /// Explicit topological order. Computed from dependencies when absent.
    pub plugin_order: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
            output: OutputConfig::default(),
            parser: ParserConfig::default(),
            plugins: IndexMap::new(),
            plugin_order: None,
        }
    }
}

/// Output layout options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for all emitted files.
    pub path: String,
    /// Whether a barrel file is produced from `export_from_index` flags.
    pub index_file: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "src/generated".to_string(),
            index_file: true,
        }
    }
}

/// Parser behavior options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Escalate per-entry normalization failures instead of substituting
    /// `unknown`.
    pub strict: bool,
    pub transforms: TransformsConfig,
}

/// Post-parse IR rewrites.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransformsConfig {
    pub enums: EnumTransformConfig,
    pub read_write: ReadWriteTransformConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnumTransformConfig {
    pub enabled: bool,
    pub mode: EnumMode,
}

impl Default for EnumTransformConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: EnumMode::Lift,
        }
    }
}

/// Whether inline enums stay in place or move to synthesized components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumMode {
    Inline,
    #[default]
    Lift,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReadWriteTransformConfig {
    pub enabled: bool,
}

impl Default for ReadWriteTransformConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// A configured plugin: its dependencies plus plugin-specific options, which
/// each plugin deserializes against its own schema.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginRecord {
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(flatten)]
    pub options: serde_json::Value,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".apgen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let config: Config = serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Format {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r##"# apgen configuration
input: openapi.yaml

# include: ["#/components/schemas/Pet*"]
# exclude: []

output:
  path: src/generated
  index_file: true

parser:
  strict: false
  transforms:
    enums:
      enabled: true
      mode: lift          # inline | lift
    read_write:
      enabled: true

plugins:
  typescript:
    case: pascal_case
  zod:
    definitions:
      enabled: true
    requests:
      enabled: true
    responses:
      enabled: true
    comments: true
    metadata: false
"##
}

/// Produce a topological plugin order from declared dependencies, or
/// validate an explicit order. For every plugin P and dependency D, D
/// precedes P; unknown names and cycles are fatal.
pub fn resolve_plugin_order(
    plugins: &IndexMap<String, PluginRecord>,
    explicit: Option<&[String]>,
) -> Result<Vec<String>, ConfigError> {
    // Dependencies must name configured plugins.
    for (name, record) in plugins {
        for dependency in &record.dependencies {
            if !plugins.contains_key(dependency) {
                return Err(ConfigError::MissingDependency {
                    plugin: name.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }

    if let Some(order) = explicit {
        let mut seen: IndexSet<&str> = IndexSet::new();
        for name in order {
            let record = plugins
                .get(name)
                .ok_or_else(|| ConfigError::UnknownPlugin(name.clone()))?;
            for dependency in &record.dependencies {
                if !seen.contains(dependency.as_str()) {
                    return Err(ConfigError::OrderViolation {
                        plugin: dependency.clone(),
                        dependent: name.clone(),
                    });
                }
            }
            seen.insert(name);
        }
        return Ok(order.to_vec());
    }

    // Depth-first topological sort with temporary marks for cycle detection.
    let mut order = Vec::with_capacity(plugins.len());
    let mut visited: IndexSet<String> = IndexSet::new();
    let mut in_progress: IndexSet<String> = IndexSet::new();

    fn visit(
        name: &str,
        plugins: &IndexMap<String, PluginRecord>,
        visited: &mut IndexSet<String>,
        in_progress: &mut IndexSet<String>,
        order: &mut Vec<String>,
    ) -> Result<(), ConfigError> {
        if visited.contains(name) {
            return Ok(());
        }
        if !in_progress.insert(name.to_string()) {
            return Err(ConfigError::DependencyCycle(name.to_string()));
        }
        let record = &plugins[name];
        for dependency in &record.dependencies {
            visit(dependency, plugins, visited, in_progress, order)?;
        }
        in_progress.shift_remove(name);
        visited.insert(name.to_string());
        order.push(name.to_string());
        Ok(())
    }

    for name in plugins.keys() {
        visit(name, plugins, &mut visited, &mut in_progress, &mut order)?;
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(dependencies: &[&str]) -> PluginRecord {
        PluginRecord {
            dependencies: dependencies.iter().map(|s| s.to_string()).collect(),
            options: serde_json::Value::Null,
        }
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.input, "openapi.yaml");
        assert_eq!(config.output.path, "src/generated");
        assert!(config.output.index_file);
        assert!(!config.parser.strict);
        assert!(config.parser.transforms.enums.enabled);
        assert_eq!(config.parser.transforms.enums.mode, EnumMode::Lift);
    }

    #[test]
    fn parse_config_yaml() {
        let yaml = r##"
input: spec.yaml
include:
  - "#/components/schemas/Pet*"
output:
  path: out
  index_file: false
parser:
  strict: true
  transforms:
    enums:
      mode: inline
plugins:
  typescript: {}
  zod:
    dependencies: [typescript]
    metadata: true
"##;
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "spec.yaml");
        assert_eq!(config.include, ["#/components/schemas/Pet*"]);
        assert_eq!(config.output.path, "out");
        assert!(!config.output.index_file);
        assert!(config.parser.strict);
        assert_eq!(config.parser.transforms.enums.mode, EnumMode::Inline);
        assert_eq!(config.plugins.len(), 2);
        assert_eq!(config.plugins["zod"].dependencies, ["typescript"]);
        assert_eq!(config.plugins["zod"].options["metadata"], true);
    }

    #[test]
    fn parse_minimal_config() {
        let yaml = "input: api.yaml\n";
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "api.yaml");
        assert_eq!(config.output.path, "src/generated");
    }

    #[test]
    fn order_puts_dependencies_first() {
        let mut plugins = IndexMap::new();
        plugins.insert("zod".to_string(), record(&["typescript"]));
        plugins.insert("typescript".to_string(), record(&[]));

        let order = resolve_plugin_order(&plugins, None).unwrap();
        assert_eq!(order, ["typescript", "zod"]);
    }

    #[test]
    fn missing_dependency_is_fatal() {
        let mut plugins = IndexMap::new();
        plugins.insert("zod".to_string(), record(&["typescript"]));

        let err = resolve_plugin_order(&plugins, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDependency { .. }));
    }

    #[test]
    fn cycle_is_fatal() {
        let mut plugins = IndexMap::new();
        plugins.insert("a".to_string(), record(&["b"]));
        plugins.insert("b".to_string(), record(&["a"]));

        let err = resolve_plugin_order(&plugins, None).unwrap_err();
        assert!(matches!(err, ConfigError::DependencyCycle(_)));
    }

    #[test]
    fn explicit_order_is_validated() {
        let mut plugins = IndexMap::new();
        plugins.insert("zod".to_string(), record(&["typescript"]));
        plugins.insert("typescript".to_string(), record(&[]));

        let bad = ["zod".to_string(), "typescript".to_string()];
        let err = resolve_plugin_order(&plugins, Some(&bad)).unwrap_err();
        assert!(matches!(err, ConfigError::OrderViolation { .. }));

        let good = ["typescript".to_string(), "zod".to_string()];
        let order = resolve_plugin_order(&plugins, Some(&good)).unwrap();
        assert_eq!(order, good);
    }
}
