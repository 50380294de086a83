use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use apgen_core::config::{self, Config, PluginRecord, CONFIG_FILE_NAME};
use apgen_core::error::{ConfigError, EmissionError};
use apgen_core::ir::IrComponent;
use apgen_core::spec::SpecDocument;
use apgen_core::{parse, transform, Context, Plugin};
use apgen_typescript::TypeScriptPlugin;
use apgen_zod::ZodPlugin;

#[derive(Parser)]
#[command(name = "apgen", about = "OpenAPI client and validator code generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate code from an OpenAPI spec
    Generate {
        /// Path to the OpenAPI spec file (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate an OpenAPI spec
    Validate {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Inspect the parsed IR of an OpenAPI spec
    Inspect {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new apgen configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { input, output } => cmd_generate(input, output),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "apgen", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<Config>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

/// Read and deserialize a spec file, detecting the dialect.
fn load_spec(path: &Path) -> Result<SpecDocument> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let spec = match ext {
        "json" => SpecDocument::from_json(&content)?,
        _ => SpecDocument::from_yaml(&content)?,
    };
    Ok(spec)
}

/// Instantiate a plugin by its configured name.
fn build_plugin(name: &str, record: &PluginRecord) -> Result<Box<dyn Plugin>> {
    match name {
        "typescript" => Ok(Box::new(TypeScriptPlugin::from_record(record)?)),
        "zod" => Ok(Box::new(ZodPlugin::from_record(record)?)),
        other => Err(ConfigError::UnknownPlugin(other.to_string()).into()),
    }
}

fn cmd_generate(input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let mut cfg = try_load_config()?.unwrap_or_default();
    if cfg.plugins.is_empty() {
        // Default plugin set when nothing is configured.
        cfg.plugins
            .insert("typescript".to_string(), PluginRecord::default());
        cfg.plugins.insert("zod".to_string(), PluginRecord::default());
    }
    if let Some(output) = output {
        cfg.output.path = output.display().to_string();
    }

    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let spec = load_spec(&input)?;

    // Resolve plugin order up front; a bad plugin graph fails before any
    // work happens.
    let order = config::resolve_plugin_order(&cfg.plugins, cfg.plugin_order.as_deref())?;
    let mut plugins: Vec<Box<dyn Plugin>> = Vec::with_capacity(order.len());
    for name in &order {
        plugins.push(build_plugin(name, &cfg.plugins[name])?);
    }

    let output_dir = PathBuf::from(&cfg.output.path);
    let index_file = cfg.output.index_file;

    let mut ctx = Context::new(cfg, spec);
    apgen_core::run(&mut ctx, plugins)?;

    write_files(&output_dir, &ctx, index_file)?;

    eprintln!("Generated {} files in {}", ctx.files.len(), output_dir.display());
    Ok(())
}

/// Finalize the run: render every file in memory, then write everything.
/// No partial tree is flushed when rendering fails.
fn write_files(base: &Path, ctx: &Context, index_file: bool) -> Result<()> {
    let mut rendered: Vec<(PathBuf, String)> = Vec::with_capacity(ctx.files.len() + 1);
    let mut index_exports: Vec<String> = Vec::new();

    for file in ctx.files.iter() {
        if file.is_empty() {
            continue;
        }
        rendered.push((base.join(&file.path), file.render()));
        if index_file && file.export_from_index {
            let module = file.path.trim_end_matches(".ts");
            index_exports.push(format!("export * from \"./{module}\";"));
        }
    }

    if index_file && !index_exports.is_empty() {
        let mut barrel = index_exports.join("\n");
        barrel.push('\n');
        rendered.push((base.join("index.ts"), barrel));
    }

    for (path, content) in rendered {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, content).map_err(|e| EmissionError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        eprintln!("  wrote {}", path.display());
    }
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let spec = load_spec(&input)?;
    eprintln!("Valid OpenAPI {} spec", spec.dialect.as_str());

    // Also check that it parses into the IR.
    let mut ctx = Context::new(Config::default(), spec);
    parse::parse(&mut ctx)?;

    eprintln!("  Components: {}", ctx.ir.components.len());
    eprintln!("  Paths: {}", ctx.ir.paths.len());
    eprintln!("  Operations: {}", ctx.ir.operations().count());
    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: PathBuf, format: InspectFormat) -> Result<()> {
    let spec = load_spec(&input)?;
    let mut ctx = Context::new(try_load_config()?.unwrap_or_default(), spec);
    parse::parse(&mut ctx)?;
    transform::apply(&mut ctx)?;

    let summary = build_inspect_summary(&ctx);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(ctx: &Context) -> serde_json::Value {
    let components: Vec<serde_json::Value> = ctx
        .ir
        .components
        .iter()
        .map(|(ref_path, component)| {
            serde_json::json!({
                "ref": ref_path,
                "kind": match component {
                    IrComponent::Schema(_) => "schema",
                    IrComponent::Parameter(_) => "parameter",
                    IrComponent::RequestBody(_) => "requestBody",
                },
                "excluded": ctx.ir.excluded.contains(ref_path),
            })
        })
        .collect();

    let operations: Vec<serde_json::Value> = ctx
        .ir
        .operations()
        .map(|op| {
            serde_json::json!({
                "id": op.id,
                "method": op.method.as_str(),
                "path": op.path,
                "responses": op.responses.keys().collect::<Vec<_>>(),
            })
        })
        .collect();

    serde_json::json!({
        "dialect": ctx.spec.dialect.as_str(),
        "components": components,
        "operations": operations,
        "servers": ctx.ir.servers.iter().map(|s| &s.url).collect::<Vec<_>>(),
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
