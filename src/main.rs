//! HookForge - Compliance-Filtered Marketing Copy Generation
//!
//! A service that generates marketing angles, hooks, and image prompts
//! through local or remote text-generation backends, gated by a fixed
//! advertising-content-policy rule set.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hookforge::{
    api::build_app,
    compliance::{default_compliance_rules, ComplianceState, Normalizer},
    config::{resolve_api_keys_from_env, HookForgeConfig},
    corpus::{AdCorpusProvider, EmptyCorpusProvider, FileCorpusProvider},
    generation::{GenerationClient, GenerationState, Orchestrator},
    memory::{MemoryState, SessionMemory},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hookforge")]
#[command(version)]
#[command(about = "Compliance-filtered marketing copy generation service")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "HOOKFORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HookForge API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check a piece of copy against the compliance rule set
    Check {
        /// Text to check
        text: String,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("hookforge={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => HookForgeConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => HookForgeConfig::default(),
    };

    match cli.command {
        Commands::Serve { host, port } => run_server(config, host, port).await?,
        Commands::Check { text } => run_check(&text)?,
        Commands::Config { default } => {
            let shown = if default {
                HookForgeConfig::default()
            } else {
                config
            };
            println!("{}", toml::to_string_pretty(&shown)?);
        }
    }

    Ok(())
}

async fn run_server(
    mut config: HookForgeConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let rules = default_compliance_rules();
    let normalizer = Arc::new(Normalizer::new(rules.clone()).context("invalid compliance rule set")?);

    let api_keys = resolve_api_keys_from_env(&config.backends);
    let client = Arc::new(
        GenerationClient::from_config(&config.backends, &api_keys)
            .context("failed to build generation client")?,
    );
    tracing::info!(
        backends = ?client.available(),
        fallback = %client.fallback(),
        "generation backends registered"
    );

    let memory = Arc::new(SessionMemory::new(config.memory.capacity));

    let corpus: Arc<dyn AdCorpusProvider> = match &config.corpus.data_file {
        Some(path) => Arc::new(FileCorpusProvider::new(
            path.clone(),
            config.corpus.snippet_count,
        )),
        None => Arc::new(EmptyCorpusProvider),
    };
    tracing::info!(corpus = corpus.name(), "ad corpus provider initialized");

    let orchestrator = Arc::new(Orchestrator::new(
        client,
        normalizer.clone(),
        memory.clone(),
        corpus,
        config.generation.clone(),
        config.memory.context_entries,
    ));

    let app = build_app(
        GenerationState { orchestrator },
        ComplianceState {
            normalizer,
            rules: Arc::new(rules),
        },
        MemoryState { memory },
        &config.server.cors_origins,
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "HookForge API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}

fn run_check(text: &str) -> Result<()> {
    let normalizer =
        Normalizer::new(default_compliance_rules()).context("invalid compliance rule set")?;

    let violations = normalizer.violations(text);
    if violations.is_empty() {
        println!("COMPLIANT");
        return Ok(());
    }

    println!("NON-COMPLIANT");
    println!("violated rules: {}", violations.join(", "));

    let rewritten = normalizer.sanitize(text);
    if normalizer.is_compliant(&rewritten) {
        println!("suggested rewrite: {}", rewritten);
    } else {
        println!("no safe rewrite available; revise the text");
    }
    Ok(())
}
