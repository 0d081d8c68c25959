//! CLI argument definitions using clap

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "metagate", about = "Metagate - Meta API controller", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the controller
    Serve {
        /// Host and port to listen on
        #[arg(long, env = "METAGATE_LISTEN", default_value = "0.0.0.0:8080")]
        listen: String,

        /// Base URL of the action backend
        #[arg(long, env = "METAGATE_API_HOST", default_value = "http://localhost:10001")]
        api_host: String,

        /// Deployment-chosen meta routing prefix
        #[arg(long, env = "METAGATE_META_PREFIX", default_value = "meta")]
        meta_prefix: String,

        /// Namespace of the privileged system identity
        #[arg(long, env = "METAGATE_SYSTEM_NAMESPACE", default_value = "system")]
        system_namespace: String,

        /// JSON manifest seeding subjects, packages, actions and triggers
        #[arg(long, env = "METAGATE_MANIFEST")]
        manifest: Option<String>,
    },
}
