//! fieldcheck: validate JSON documents against compact rule tokens.
//!
//! Usage:
//!   fieldcheck check --rules demo/rules/booking.toml --data demo/data/booking.json
//!   fieldcheck resolve 'date>=<=' --config demo/fieldcheck.toml
//!   fieldcheck scenarios

mod scenarios;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fieldcheck_contracts::error::{FieldcheckError, FieldcheckResult};
use fieldcheck_engine::{Engine, EngineConfig, RuleSet};

// ── CLI definition ────────────────────────────────────────────────────────────

/// fieldcheck: per-field rule validation with temporal comparisons.
#[derive(Parser)]
#[command(
    name = "fieldcheck",
    about = "Validate JSON documents against compact per-field rule tokens",
    long_about = "Resolves rule symbols across precedence-ordered sources, dispatches them\n\
                  to predicates, and reports per-field failures and rule errors."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a JSON document against a TOML rule set. Exits 1 on failure.
    Check {
        /// Rule set (TOML, `[[fields]]` tables).
        #[arg(long)]
        rules: PathBuf,
        /// Document to validate (JSON).
        #[arg(long)]
        data: PathBuf,
        /// Engine configuration (TOML). Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show which entry and source a symbol resolves to.
    Resolve {
        symbol: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run the reference scenarios and print their outcomes.
    Scenarios,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for per-token dispatch logs.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check { rules, data, config } => run_check(&rules, &data, config.as_deref()),
        Command::Resolve { symbol, config } => run_resolve(&symbol, config.as_deref()),
        Command::Scenarios => run_scenarios(),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("fieldcheck error: {e}");
            std::process::exit(2);
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn load_engine(config: Option<&Path>) -> FieldcheckResult<Engine> {
    let config = match config {
        Some(path) => {
            debug!(path = %path.display(), "loading engine config");
            EngineConfig::from_file(path)?
        }
        None => EngineConfig::default(),
    };
    Engine::new(config)
}

fn run_check(rules: &Path, data: &Path, config: Option<&Path>) -> FieldcheckResult<bool> {
    let engine = load_engine(config)?;
    let rules = RuleSet::from_file(rules)?;

    let raw = std::fs::read_to_string(data).map_err(|e| FieldcheckError::Data {
        reason: format!("failed to read document '{}': {e}", data.display()),
    })?;
    let document: serde_json::Value = serde_json::from_str(&raw).map_err(|e| FieldcheckError::Data {
        reason: format!("document '{}' is not valid JSON: {e}", data.display()),
    })?;

    let report = engine.check(&rules, &document);
    println!("{}", to_pretty_json(&report)?);
    Ok(report.passed)
}

fn run_resolve(symbol: &str, config: Option<&Path>) -> FieldcheckResult<bool> {
    let engine = load_engine(config)?;
    let resolved = engine.resolve(symbol).ok_or_else(|| FieldcheckError::UnknownSymbol {
        symbol: symbol.to_string(),
    })?;
    println!("{}", to_pretty_json(&resolved)?);
    Ok(true)
}

fn run_scenarios() -> FieldcheckResult<bool> {
    let engine = load_engine(None)?;
    Ok(scenarios::run_all(&engine))
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> FieldcheckResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| FieldcheckError::Data {
        reason: format!("failed to render output: {e}"),
    })
}
