//! auditctl - operator interface to the audit ledger
//!
//! - Append events and verify the hash chain
//! - Export, report on and prune the ledger
//! - Record and inspect data provenance
//! - Attest computations through the commitment/proof pipeline

use anyhow::Context as _;
use audit_ledger::Ledger;
use audit_store::FileRecordStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

use commands::{attest, events, provenance};
use config::AppConfig;

/// auditctl CLI
#[derive(Parser)]
#[command(name = "auditctl")]
#[command(about = "Tamper-evident audit ledger tooling", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "AUDIT_CONFIG")]
    config: Option<String>,

    /// Log level (overrides the configuration file)
    #[arg(long, env = "AUDIT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "AUDIT_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Append an event to the ledger
    Log(events::LogArgs),

    /// Verify the hash chain (exit code 1 when tampering is found)
    Verify,

    /// Export events as JSON or CSV
    Export(events::ExportArgs),

    /// Event counts by category, severity, user, session, action and resource
    Report(events::FilterArgs),

    /// Drop events older than the retention period
    Retention,

    /// Data provenance
    Provenance {
        #[command(subcommand)]
        command: provenance::ProvenanceCommands,
    },

    /// Attest a computation described in a JSON file
    Attest {
        /// Computation descriptor (inputData, outputData, function, parameters, ...)
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Shared state handed to every command
pub struct Context {
    pub config: AppConfig,
    pub ledger: Arc<Ledger>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(
        cli.log_level.as_deref().unwrap_or(&config.logging.level),
        cli.json || config.logging.json,
    );

    let store = FileRecordStore::open(config.storage.dir.clone())
        .await
        .with_context(|| format!("failed to open store at {}", config.storage.dir.display()))?;
    let ledger = Ledger::from_config(config.ledger.clone())?.with_store(Arc::new(store));
    ledger.restore().await.context("failed to restore ledger")?;

    let ctx = Context {
        config,
        ledger: Arc::new(ledger),
    };

    match cli.command {
        Commands::Log(args) => events::log(&ctx, args).await,
        Commands::Verify => {
            if !events::verify(&ctx)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Export(args) => events::export(&ctx, args),
        Commands::Report(args) => events::report(&ctx, args),
        Commands::Retention => events::retention(&ctx).await,
        Commands::Provenance { command } => provenance::execute(&ctx, command).await,
        Commands::Attest { input } => attest::execute(&ctx, &input).await,
    }
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
