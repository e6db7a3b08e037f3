// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routewise - cost-aware query routing for coding assistants.
//!
//! This is the binary entry point. The `hook` subcommand is what the host
//! invokes on every prompt; the others are for inspection and maintenance.

mod directive;
mod hook;
mod stats;

use std::io::Read;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use routewise_anthropic::{AnthropicEscalation, CredentialSource};
use routewise_config::RoutewiseConfig;
use routewise_core::{EscalationOracle, RoutewiseError};
use routewise_router::DecisionRouter;
use tracing::{debug, warn};

/// Routewise - cost-aware query routing for coding assistants.
#[derive(Parser, Debug)]
#[command(name = "routewise", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Handle a host prompt event read from stdin.
    Hook,
    /// Route a query and print the decision as JSON.
    Classify {
        /// Query text; multiple arguments are joined with spaces.
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Show routing statistics.
    Stats {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Manage the decision cache.
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
}

#[derive(Subcommand, Debug)]
enum CacheCommands {
    /// Remove every cached decision.
    Clear,
    /// Show cache size and hit totals.
    Stats {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config();
    init_tracing(&config.log.level);

    if let Commands::Hook = cli.command {
        // The hook never fails the host: any error means no directive.
        run_hook_command(&config).await;
        return;
    }

    if let Err(err) = run(cli.command, &config).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &RoutewiseConfig) -> Result<(), RoutewiseError> {
    match command {
        Commands::Hook => Ok(()),
        Commands::Classify { query } => {
            let query = query.join(" ");
            let mut router = build_router(config)?;
            match router.route(&query).await {
                Some(decision) => {
                    let json = serde_json::to_string_pretty(&decision).map_err(|e| {
                        RoutewiseError::Internal(format!("failed to encode decision: {e}"))
                    })?;
                    println!("{json}");
                    Ok(())
                }
                None => Err(RoutewiseError::InvalidInput(format!(
                    "query skipped (shorter than {} characters or a host command)",
                    config.router.min_query_chars
                ))),
            }
        }
        Commands::Stats { json } => stats::run_stats(config, json),
        Commands::Cache { action } => match action {
            CacheCommands::Clear => stats::run_cache_clear(config),
            CacheCommands::Stats { json } => stats::run_cache_stats(config, json),
        },
    }
}

async fn run_hook_command(config: &RoutewiseConfig) {
    let mut input = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut input) {
        debug!(error = %err, "failed to read hook input");
        return;
    }
    let mut router = match build_router(config) {
        Ok(router) => router,
        Err(err) => {
            warn!(error = %err, "router unavailable");
            return;
        }
    };
    if let Some(line) = hook::run_hook(&mut router, &config.directive.agent_namespace, &input).await {
        println!("{line}");
    }
}

/// Load configuration, falling back to defaults after reporting problems.
fn load_config() -> RoutewiseConfig {
    match routewise_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            routewise_config::render_errors(&errors);
            eprintln!("routewise: using default configuration");
            RoutewiseConfig::default()
        }
    }
}

fn build_router(config: &RoutewiseConfig) -> Result<DecisionRouter, RoutewiseError> {
    DecisionRouter::from_config(config, build_oracle(config))
}

fn build_oracle(config: &RoutewiseConfig) -> Option<Arc<dyn EscalationOracle>> {
    if !config.escalation.enabled {
        return None;
    }
    match AnthropicEscalation::from_config(&config.escalation, &CredentialSource::standard()) {
        Ok(oracle) => Some(Arc::new(oracle)),
        Err(err) => {
            debug!(error = %err, "escalation disabled for this run");
            None
        }
    }
}

/// Initialize tracing to stderr; stdout carries the host protocol.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("routewise={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
