//! ---
//! girder_section: "01-core-functionality"
//! girder_subsection: "binary"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Binary entrypoint for the Girder daemon."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use girder_common::config::ServerConfig;
use girder_common::logging::{init_tracing, LogFormat};
use girder_common::version::VersionInfo;
use girder_model::load_updates;
use girder_server::{ServerEnvironment, StandaloneServer};
use tokio::signal;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(author, version, about = "Girder standalone server daemon", long_about = None)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to daemon configuration file")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, help = "Override the configured log format")]
    log_format: Option<CliLogFormat>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogFormat {
    Json,
    Pretty,
}

impl From<CliLogFormat> for LogFormat {
    fn from(value: CliLogFormat) -> Self {
        match value {
            CliLogFormat::Json => LogFormat::StructuredJson,
            CliLogFormat::Pretty => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Run the server until interrupted")]
    Run,
    #[command(about = "Load and validate the server document, then exit")]
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let version = VersionInfo::current();

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/girderd.toml"));

    let loaded = ServerConfig::load_with_source(&candidates)?;
    let mut config = loaded.config;
    if let Some(format) = cli.log_format {
        config.logging.format = format.into();
    }
    init_tracing("girderd", &config.logging)?;
    info!(banner = %version.banner(), config = %loaded.source.display(), "daemon starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Check => check(&config),
        Commands::Run => run(&config).await,
    }
}

fn check(config: &ServerConfig) -> Result<()> {
    let document = config.document_path();
    let updates = load_updates(&document)
        .with_context(|| format!("server document {} failed validation", document.display()))?;
    println!(
        "{}: ok ({} update{})",
        document.display(),
        updates.len(),
        if updates.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

async fn run(config: &ServerConfig) -> Result<()> {
    let env = ServerEnvironment::from_config(config);
    let server = StandaloneServer::new(env);

    server
        .start()
        .await
        .context("server failed to reach running state")?;

    info!("server running; waiting for shutdown signal");
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }

    info!("shutdown signal received");
    server.stop().await.context("server shutdown faulted")?;
    Ok(())
}
