//! `deploycfg` command line interface
//!
//! Resolves the GitLab deployment schema against the process environment
//! (optionally layered with a snapshot file) and prints the result.
//!
//! Exit codes: `0` success, `1` validation failed (every error printed to
//! stderr), `2` usage or I/O error.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{Environment, Schema, SettingSpec, SettingValue};
use crate::gitlab;
use crate::resolved::{REDACTED, ResolvedConfig};
use crate::validation::ValidationErrors;

/// Resolution succeeded
pub const EXIT_OK: u8 = 0;
/// At least one setting failed validation
pub const EXIT_INVALID: u8 = 1;
/// Usage or I/O error
pub const EXIT_ERROR: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "deploycfg", version, about = "Resolve GitLab deployment configuration from the environment")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve and print the configuration
    Resolve(ResolveArgs),
    /// Validate only; print nothing on success
    Check(EnvArgs),
    /// List every setting with its default, env var and constraints
    Schema(SchemaArgs),
}

#[derive(Debug, Args)]
pub struct EnvArgs {
    /// JSON (or TOML) file of variables layered over the process environment
    #[arg(long, env = "DEPLOYCFG_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Ignore the process environment
    #[arg(long)]
    pub no_process_env: bool,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub env: EnvArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Print secret values instead of redacting them
    #[arg(long)]
    pub show_secrets: bool,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Print the schema as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Text,
    #[cfg(feature = "toml")]
    Toml,
    #[cfg(feature = "yaml")]
    Yaml,
}

/// Run a parsed command
///
/// `process_env` stands in for the real process environment so the whole
/// command can be exercised in tests.
///
/// # Errors
///
/// Returns an error for I/O failures (snapshot file, output stream); the
/// caller maps it to [`EXIT_ERROR`].
pub fn run(
    cli: &Cli,
    process_env: &Environment,
    out: &mut impl Write,
    err: &mut impl Write,
) -> anyhow::Result<u8> {
    let schema = gitlab::schema();

    match &cli.command {
        Command::Resolve(args) => {
            let env = build_env(&args.env, process_env)?;
            match schema.resolve(&env) {
                Ok(config) => {
                    write_config(&config, args.format, !args.show_secrets, out)?;
                    Ok(EXIT_OK)
                }
                Err(errors) => report(&errors, err),
            }
        }
        Command::Check(args) => {
            let env = build_env(args, process_env)?;
            match schema.resolve(&env) {
                Ok(config) => {
                    log::info!("{} settings valid", config.len());
                    Ok(EXIT_OK)
                }
                Err(errors) => report(&errors, err),
            }
        }
        Command::Schema(args) => {
            write_schema(&schema, args.json, out)?;
            Ok(EXIT_OK)
        }
    }
}

fn build_env(args: &EnvArgs, process_env: &Environment) -> anyhow::Result<Environment> {
    let base = if args.no_process_env {
        Environment::new()
    } else {
        process_env.clone()
    };

    match &args.env_file {
        Some(path) => {
            let file = Environment::load_file(path)
                .with_context(|| format!("loading environment snapshot {}", path.display()))?;
            Ok(base.merged(&file))
        }
        None => Ok(base),
    }
}

fn report(errors: &ValidationErrors, err: &mut impl Write) -> anyhow::Result<u8> {
    writeln!(err, "configuration is invalid ({} error(s)):", errors.len())?;
    writeln!(err, "{errors}")?;
    Ok(EXIT_INVALID)
}

fn write_config(
    config: &ResolvedConfig,
    format: Format,
    redact: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let rendered = match format {
        Format::Json => config.to_json_string(redact)?,
        Format::Text if redact => config.to_string(),
        Format::Text => config
            .iter()
            .map(|e| format!("{} = {}\n", e.key, e.value))
            .collect(),
        #[cfg(feature = "toml")]
        Format::Toml => config.to_toml_string(redact)?,
        #[cfg(feature = "yaml")]
        Format::Yaml => config.to_yaml_string(redact)?,
    };
    out.write_all(rendered.as_bytes())?;
    if !rendered.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

fn write_schema(schema: &Schema, json: bool, out: &mut impl Write) -> anyhow::Result<()> {
    if json {
        let specs: Vec<SettingSpec> = schema
            .iter()
            .map(|spec| {
                let mut spec = spec.clone();
                if spec.secret && spec.default.is_some() {
                    spec.default = Some(SettingValue::from(REDACTED));
                }
                spec
            })
            .collect();
        serde_json::to_writer_pretty(&mut *out, &specs)?;
        writeln!(out)?;
        return Ok(());
    }

    let width = schema.keys().map(str::len).max().unwrap_or(0);
    for spec in schema {
        let default = match (&spec.default, spec.secret) {
            (Some(_), true) => REDACTED.to_string(),
            (Some(value), false) => value.to_string(),
            (None, _) => "(required)".to_string(),
        };
        write!(out, "{:<width$}  {:<8} {default}", spec.key, spec.kind.to_string())?;
        if let Some(ref var) = spec.env_var {
            write!(out, "  ${var}")?;
        }
        if !spec.constraints.is_empty() {
            write!(out, "  [{}]", spec.constraints)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
