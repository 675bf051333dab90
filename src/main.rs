//! Action router CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   declaration files (TOML)
//!        │
//!        ▼
//!   ┌──────────┐   ┌──────────────┐   ┌─────────────┐   ┌──────────────┐
//!   │  loader  │──▶│ declaration  │──▶│  package    │──▶│   runtime    │
//!   │+validate │   │    store     │   │ graph/merge │   │   snapshot   │
//!   └──────────┘   └──────────────┘   └──────┬──────┘   └──────┬───────┘
//!                                            │                 │
//!                                  ┌─────────▼──────┐  ┌───────▼───────┐
//!                                  │  interceptor   │  │   wildcard    │
//!                                  │   resolver     │  │    router     │
//!                                  └────────────────┘  └───────────────┘
//!
//!   watcher ──▶ manager.reload_if_needed() ──▶ ArcSwap<RuntimeConfiguration>
//! ```

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use action_router::config::loader::{load_settings, DeclarationLoader, TomlFileLoader};
use action_router::config::{ConfigWatcher, ReloadEvent};
use action_router::observability::{logging, metrics};
use action_router::{ClassRegistry, ConfigurationManager, EngineSettings};

#[derive(Parser)]
#[command(name = "action-router")]
#[command(about = "Resolve and inspect action routing declarations", long_about = None)]
struct Cli {
    /// Declaration files, loaded in the given order.
    #[arg(short, long = "config", required = true)]
    configs: Vec<PathBuf>,

    /// Engine settings file.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the configuration and report warnings
    Check,
    /// Print every exact action as JSON
    List,
    /// Resolve one action and print it as JSON
    Resolve { namespace: String, name: String },
    /// Reload whenever a declaration file changes
    Watch {
        #[arg(long)]
        metrics_address: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => EngineSettings::default(),
    };
    logging::init_logging(&settings.log_level);

    let loaders: Vec<Box<dyn DeclarationLoader>> = cli
        .configs
        .iter()
        .map(|path| Box::new(TomlFileLoader::new(path)) as Box<dyn DeclarationLoader>)
        .collect();
    let manager = Arc::new(ConfigurationManager::load(
        loaders,
        Arc::new(ClassRegistry::permissive()),
        settings,
    )?);

    match cli.command {
        Commands::Check => {
            let snapshot = manager.snapshot();
            for warning in snapshot.diagnostics() {
                println!("warning: {}", warning);
            }
            println!(
                "ok: {} namespace(s), {} action(s), {} warning(s)",
                snapshot.namespaces().len(),
                snapshot.action_count(),
                snapshot.diagnostics().len()
            );
        }
        Commands::List => {
            let all: BTreeMap<_, _> = manager.all_action_configs().into_iter().collect();
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
        Commands::Resolve { namespace, name } => match manager.resolve(&namespace, &name) {
            Some(action) => println!("{}", serde_json::to_string_pretty(action.as_ref())?),
            None => {
                eprintln!("no action '{}' in namespace '{}'", name, namespace);
                std::process::exit(1);
            }
        },
        Commands::Watch { metrics_address } => {
            if let Some(addr) = metrics_address {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }

            let (watcher, mut events) = ConfigWatcher::new(cli.configs.clone(), manager.clone());
            let _watcher = watcher.run()?;

            loop {
                tokio::select! {
                    Some(event) = events.recv() => match event {
                        ReloadEvent::Reloaded { actions } => tracing::info!(actions, "Declarations reloaded"),
                        ReloadEvent::Failed(error) => tracing::warn!(error = %error, "Reload rejected"),
                    },
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown signal received");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
