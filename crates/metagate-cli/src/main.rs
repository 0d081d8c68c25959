//! Metagate CLI entry point

mod cli;
mod manifest;

use clap::Parser;
use cli::{Cli, Commands};
use metagate_server::{restapi, AppState, ControllerConfig};
use metagate_store::{MemoryActivationStore, MemoryAuthStore, MemoryEntityStore};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { listen, api_host, meta_prefix, system_namespace, manifest } => {
            let entities = MemoryEntityStore::new();
            let auths = MemoryAuthStore::new();
            if let Some(path) = manifest {
                tracing::info!(path = %path, "seeding stores from manifest");
                manifest::Manifest::from_path(&path)?.seed(&entities, &auths).await;
            }

            let config = ControllerConfig {
                host_base: api_host,
                meta_prefix,
                system_namespace,
                ..Default::default()
            };
            let state = AppState::new(
                config,
                Arc::new(entities),
                Arc::new(auths),
                Arc::new(MemoryActivationStore::new()),
            )?;
            restapi::serve(state, &listen).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
