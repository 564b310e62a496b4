//! `movie-index` command-line host.
//!
//! Loads config, wires the MongoDB index store and JSON logger into the
//! provisioning use case, and renders results as text or JSON.

mod error;
mod format;

use clap::{Args, Parser, Subcommand};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode};
use movie_index_adapters::{
    JsonLogger, MongoIndexStore, StderrLogSink, connect_collection, parse_log_level,
};
use movie_index_app::{
    ProvisionIndexesDeps, ProvisionIndexesInput, ProvisionIndexesOutput, provision_indexes,
};
use movie_index_config::{
    ProvisionConfigOverrides, ValidatedProvisionConfig, load_provision_config_std_env,
    to_pretty_json, to_pretty_toml,
};
use movie_index_domain::{IndexPlan, build_index_plan};
use movie_index_ports::{IndexStorePort, LogFields, LogLevel, LoggerPort};
use movie_index_shared::{ErrorEnvelope, RequestContext, redact_if_secret};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Provision the indexes of a movie collection.
#[derive(Debug, Parser)]
#[command(name = "movie-index", version, about)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,
    /// Minimum log level for stderr diagnostics (debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the index specs a provisioning run would submit.
    Specs {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Inspect the effective configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Create the vector-search index, then the conventional indexes.
    Provision {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Validate config loading, merging, and normalization.
    Check {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Show the effective config after applying overrides.
    Show {
        #[command(flatten)]
        config: ConfigArgs,
        /// Render the config as TOML instead of JSON (text output only).
        #[arg(long)]
        toml: bool,
    },
}

/// Config sources shared by every command.
#[derive(Debug, Args)]
struct ConfigArgs {
    /// Optional config file path (JSON/TOML).
    #[arg(long)]
    path: Option<PathBuf>,
    /// Optional JSON overrides (partial config).
    #[arg(long)]
    overrides_json: Option<String>,
    /// Database holding the movie collection.
    #[arg(long)]
    database: Option<String>,
    /// Movie collection name.
    #[arg(long)]
    collection: Option<String>,
    /// Embedding dimensionality of the vector-search index.
    #[arg(long, conflicts_with = "no_vector_search")]
    dimensions: Option<u32>,
    /// Create conventional indexes only.
    #[arg(long)]
    no_vector_search: bool,
}

impl ConfigArgs {
    fn overrides(&self) -> Result<ProvisionConfigOverrides, ErrorEnvelope> {
        let mut overrides = match self.overrides_json.as_deref() {
            Some(input) => ProvisionConfigOverrides::from_json(input)?,
            None => ProvisionConfigOverrides::default(),
        };
        if let Some(database) = &self.database {
            overrides.database = Some(database.as_str().into());
        }
        if let Some(collection) = &self.collection {
            overrides.collection = Some(collection.as_str().into());
        }
        if let Some(dimensions) = self.dimensions {
            overrides.vector_search_enabled = Some(true);
            overrides.vector_dimensions = Some(dimensions);
        }
        if self.no_vector_search {
            overrides.vector_search_enabled = Some(false);
        }
        Ok(overrides)
    }

    fn load(&self) -> Result<ValidatedProvisionConfig, ErrorEnvelope> {
        load_provision_config_std_env(self.path.as_deref(), &self.overrides()?)
    }
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);

    let Some(log_level) = parse_log_level(&cli.log_level) else {
        return exit_with_error(&CliError::InvalidInput(format!(
            "unknown log level: {}",
            cli.log_level
        )));
    };
    init_tracing(log_level, mode.no_progress);

    match run(&cli.command, mode, log_level) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

/// Driver-level diagnostics go through `tracing`; `RUST_LOG` overrides the flag.
fn init_tracing(level: LogLevel, no_progress: bool) {
    let default_directive = if no_progress { "error" } else { level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,movie_index={default_directive}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .json()
        .try_init();
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    if !output.stderr.is_empty() {
        io::stderr().write_all(output.stderr.as_bytes())?;
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn run(command: &Commands, mode: OutputMode, log_level: LogLevel) -> Result<CliOutput, CliError> {
    match command {
        Commands::Specs { config } => run_specs(mode, config),
        Commands::Config { command } => match command {
            ConfigCommands::Check { config } => config_check(mode, config),
            ConfigCommands::Show { config, toml } => config_show(mode, config, *toml),
        },
        Commands::Provision { config } => run_provision(mode, config, log_level),
    }
}

fn run_specs(mode: OutputMode, args: &ConfigArgs) -> Result<CliOutput, CliError> {
    let config = match args.load() {
        Ok(config) => config,
        Err(error) => return Ok(format_error_output(mode, &error)),
    };
    let vector_search = config.vector_search_mode();
    let plan = build_index_plan(vector_search);

    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "vectorSearch": vector_search,
            "plan": plan,
        });
        pretty_json_line(&payload)?
    } else {
        format_plan_text(&plan)?
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn format_plan_text(plan: &IndexPlan) -> Result<String, CliError> {
    let mut out = String::new();
    out.push_str("status: ok\n");
    out.push_str("vector:\n");
    for spec in &plan.vector {
        out.push_str("  - name: ");
        out.push_str(spec.name.as_deref().unwrap_or("(store default)"));
        out.push('\n');
        for path in spec.definition.indexed_paths() {
            out.push_str("    field: ");
            out.push_str(&path);
            out.push('\n');
        }
    }
    out.push_str("standard:\n");
    for spec in &plan.standard {
        out.push_str("  - name: ");
        out.push_str(spec.name());
        out.push('\n');
        for key in spec.keys() {
            let kind = serde_json::to_string(&key.kind)?;
            out.push_str("    key: ");
            out.push_str(&key.path);
            out.push_str(" = ");
            out.push_str(&kind);
            out.push('\n');
        }
    }
    Ok(out)
}

fn config_check(mode: OutputMode, args: &ConfigArgs) -> Result<CliOutput, CliError> {
    let config = match args.load() {
        Ok(config) => config,
        Err(error) => return Ok(format_error_output(mode, &error)),
    };

    let mut stderr = String::new();
    log_info(&mut stderr, "config check completed", mode.no_progress);

    let path = args.path.as_deref();
    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "configPath": path_label(path),
            "namespace": format!("{}.{}", config.database().as_str(), config.collection().as_str()),
            "vectorSearch": config.vector_search_mode(),
        });
        pretty_json_line(&payload)?
    } else {
        path.map_or_else(
            || "status: ok\nconfig: ok\n".to_string(),
            |path| format!("status: ok\nconfig: ok\npath: {}\n", path.to_string_lossy()),
        )
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

fn config_show(mode: OutputMode, args: &ConfigArgs, as_toml: bool) -> Result<CliOutput, CliError> {
    let rendered = args.load().and_then(|config| {
        if as_toml && !mode.is_json() {
            to_pretty_toml(config.as_ref())
        } else {
            to_pretty_json(config.as_ref())
        }
    });
    let config_text = match rendered {
        Ok(text) => text,
        Err(error) => return Ok(format_error_output(mode, &error)),
    };

    let mut stderr = String::new();
    log_info(&mut stderr, "config show completed", mode.no_progress);

    let stdout = if mode.is_json() {
        let config_value: serde_json::Value = serde_json::from_str(config_text.trim())?;
        let payload = serde_json::json!({
            "status": "ok",
            "configPath": path_label(args.path.as_deref()),
            "effectiveConfig": config_value,
        });
        pretty_json_line(&payload)?
    } else {
        let mut out = String::new();
        out.push_str("status: ok\nconfig:\n");
        out.push_str(&config_text);
        out
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

fn run_provision(
    mode: OutputMode,
    args: &ConfigArgs,
    log_level: LogLevel,
) -> Result<CliOutput, CliError> {
    let config = match args.load() {
        Ok(config) => config,
        Err(error) => return Ok(format_error_output(mode, &error)),
    };

    let ctx = RequestContext::new_request();
    let logger = build_logger(&ctx, log_level, mode.no_progress);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        let interrupt = spawn_interrupt_watcher(&ctx);
        let outcome = provision_with_store(&ctx, &config, logger).await;
        interrupt.abort();
        outcome
    });

    let output = match result {
        Ok(output) => output,
        Err(error) => return Ok(format_error_output(mode, &error)),
    };

    let mut stderr = String::new();
    log_info(&mut stderr, "provision completed", mode.no_progress);

    let namespace = format!(
        "{}.{}",
        config.database().as_str(),
        config.collection().as_str()
    );
    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "namespace": namespace,
            "vectorIndexNames": output.vector_index_names,
            "standardIndexNames": output.standard_index_names,
            "indexNames": output.index_names(),
        });
        pretty_json_line(&payload)?
    } else {
        let mut out = format!("status: ok\nnamespace: {namespace}\nindexes:\n");
        for name in output.index_names() {
            out.push_str("  - ");
            out.push_str(&name);
            out.push('\n');
        }
        out
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

async fn provision_with_store(
    ctx: &RequestContext,
    config: &ValidatedProvisionConfig,
    logger: Option<Arc<dyn LoggerPort>>,
) -> Result<ProvisionIndexesOutput, ErrorEnvelope> {
    let collection = connect_collection(config).await?;
    let store: Arc<dyn IndexStorePort> = Arc::new(MongoIndexStore::new(&collection));
    tracing::debug!(namespace = %store.info().namespace(), "index store ready");

    let deps = ProvisionIndexesDeps { store, logger };
    let input = ProvisionIndexesInput {
        vector_search: config.vector_search_mode(),
    };
    provision_indexes(ctx, &deps, input).await
}

/// Cancel the request on Ctrl-C; in-flight driver calls observe it.
fn spawn_interrupt_watcher(ctx: &RequestContext) -> tokio::task::JoinHandle<()> {
    let ctx = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctx.cancel();
        }
    })
}

fn build_logger(
    ctx: &RequestContext,
    level: LogLevel,
    no_progress: bool,
) -> Option<Arc<dyn LoggerPort>> {
    if no_progress {
        return None;
    }
    let mut base_fields = LogFields::new();
    base_fields.insert(
        "correlationId".into(),
        serde_json::Value::String(ctx.correlation_id().as_str().to_owned()),
    );
    let logger = JsonLogger::new(Arc::new(StderrLogSink))
        .with_base_fields(base_fields)
        .with_min_level(level);
    Some(Arc::new(logger))
}

pub(crate) fn format_error_output(mode: OutputMode, error: &ErrorEnvelope) -> CliOutput {
    let error = sanitize_error(error);

    let mut stderr = String::new();
    log_info(&mut stderr, "command failed", mode.no_progress);

    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "error",
            "error": error,
        });

        // This is a CLI boundary, so JSON serialization errors are internal.
        pretty_json_line(&payload).unwrap_or_else(|_| {
            "{\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\"}}\n".to_string()
        })
    } else {
        format_error_text(&error)
    };

    CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::for_envelope(&error),
    }
}

fn sanitize_error(error: &ErrorEnvelope) -> ErrorEnvelope {
    let mut error = error.clone();
    for (key, value) in &mut error.metadata {
        *value = redact_if_secret(key, value);
    }
    error
}

fn format_error_text(error: &ErrorEnvelope) -> String {
    let mut out = String::new();
    out.push_str("status: error\n");
    out.push_str("code: ");
    out.push_str(&error.code.to_string());
    out.push('\n');
    out.push_str("message: ");
    out.push_str(&error.message);
    out.push('\n');
    out.push_str("kind: ");
    out.push_str(&error.kind.to_string());
    out.push('\n');
    if error.is_retriable() {
        out.push_str("retriable: true\n");
    }

    if !error.metadata.is_empty() {
        out.push_str("meta:\n");
        for (key, value) in &error.metadata {
            out.push_str("  ");
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
    }

    out
}

fn pretty_json_line(value: &serde_json::Value) -> Result<String, CliError> {
    let mut output = serde_json::to_string_pretty(value)?;
    output.push('\n');
    Ok(output)
}

fn path_label(path: Option<&Path>) -> Option<String> {
    path.map(|value| value.to_string_lossy().to_string())
}

fn log_info(stderr: &mut String, message: &str, no_progress: bool) {
    if no_progress {
        return;
    }
    stderr.push_str("info: ");
    stderr.push_str(message);
    stderr.push('\n');
}
