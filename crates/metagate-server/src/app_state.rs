//! Application state shared across request handlers

use crate::config::ControllerConfig;
use metagate_client::{ActivationClient, SystemCredentialSource};
use metagate_core::store::{ActivationStore, AuthStore, EntityStore};
use std::sync::Arc;

/// Shared application state. All fields are read-only after construction;
/// per-request state travels through request extensions.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ControllerConfig>,
    pub entities: Arc<dyn EntityStore>,
    pub auths: Arc<dyn AuthStore>,
    pub activations: Arc<dyn ActivationStore>,
    pub invoker: Arc<ActivationClient>,
}

impl AppState {
    pub fn new(
        config: ControllerConfig,
        entities: Arc<dyn EntityStore>,
        auths: Arc<dyn AuthStore>,
        activations: Arc<dyn ActivationStore>,
    ) -> anyhow::Result<Self> {
        let credentials =
            SystemCredentialSource::new(auths.clone(), config.system_namespace.clone());
        let invoker = ActivationClient::new(
            &config.host_base,
            &config.api_path,
            &config.api_version,
            &config.system_namespace,
            credentials,
        )?;

        Ok(Self {
            config: Arc::new(config),
            entities,
            auths,
            activations,
            invoker: Arc::new(invoker),
        })
    }
}
