//! Response-contract checker CLI.
//!
//! Provides the `routecheck` binary. `check` runs the checker over parsed
//! source trees (the JSON form emitted by a host parser) and prints the
//! findings; `explain` documents a diagnostic kind.
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use routecheck_check::{check_source, CheckerConfig, ConfigError, DiagnosticKind, Report};
use routecheck_core::{CoreError, SourceFile};

/// Static checker for route-handler response contracts.
#[derive(Parser)]
#[command(name = "routecheck", version, about = "Static checker for route-handler response contracts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Check one or more parsed source files.
    Check {
        /// Source tree files (JSON).
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Checker configuration file (JSON).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Describe a diagnostic kind, e.g. `typeMismatch`.
    Explain { kind: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Errors that stop the CLI before or while reading its inputs.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Config { path: PathBuf, source: ConfigError },

    #[error("invalid source tree '{path}': {source}")]
    Tree { path: PathBuf, source: CoreError },

    #[error("failed to serialize reports: {0}")]
    Output(#[from] serde_json::Error),

    #[error("unknown diagnostic kind '{0}'")]
    UnknownKind(String),
}

impl CliError {
    /// 2 = bad config, tree or argument, 3 = I/O error.
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io { .. } | CliError::Output(_) => 3,
            CliError::Config { .. } | CliError::Tree { .. } | CliError::UnknownKind(_) => 2,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Check {
            files,
            config,
            format,
        } => run_check(&files, config.as_deref(), format),
        Commands::Explain { kind } => run_explain(&kind),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(err.exit_code());
        }
    }
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 = no findings, 1 = findings.
fn run_check(files: &[PathBuf], config_path: Option<&Path>, format: Format) -> Result<i32, CliError> {
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => CheckerConfig::default(),
    };

    let mut reports = Vec::with_capacity(files.len());
    for path in files {
        let report = check_file(path, &config)?;
        debug!(path = %path.display(), findings = report.diagnostics.len(), "checked file");
        reports.push(report);
    }

    match format {
        Format::Text => {
            for report in &reports {
                print!("{}", report.render_text());
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    let findings: usize = reports.iter().map(|r| r.diagnostics.len()).sum();
    if findings > 0 {
        eprintln!("{} finding(s) in {} file(s)", findings, reports.len());
        Ok(1)
    } else {
        Ok(0)
    }
}

fn load_config(path: &Path) -> Result<CheckerConfig, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    CheckerConfig::from_json(&raw).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}

fn check_file(path: &Path, config: &CheckerConfig) -> Result<Report, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tree_error = |source| CliError::Tree {
        path: path.to_path_buf(),
        source,
    };
    let mut file = SourceFile::from_json(&raw).map_err(tree_error)?;
    if file.path.is_empty() {
        file.path = path.display().to_string();
    }
    check_source(&file, config).map_err(tree_error)
}

/// Execute the explain subcommand.
fn run_explain(tag: &str) -> Result<i32, CliError> {
    let kind = DiagnosticKind::parse(tag).ok_or_else(|| CliError::UnknownKind(tag.to_string()))?;
    println!("{}", kind);
    println!("  {}", kind.description());
    println!("  message: {}", kind.template());
    Ok(0)
}
