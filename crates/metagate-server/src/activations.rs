//! Trigger activation persistence

use chrono::{DateTime, Utc};
use metagate_core::{store::ActivationStore, Identity, Trigger, TriggerActivation};
use serde_json::json;
use std::sync::Arc;

const ACTIVATION_VERSION: &str = "0.0.1";

/// Writes the one activation record produced by a trigger fire.
///
/// The activation id was handed to the HTTP caller before fan-out started,
/// so a failed put is logged and never retried: a second put could produce a
/// duplicate record for an id the caller already holds.
pub struct TriggerActivationWriter {
    activations: Arc<dyn ActivationStore>,
}

impl TriggerActivationWriter {
    pub fn new(activations: Arc<dyn ActivationStore>) -> Self {
        Self { activations }
    }

    pub async fn write(
        &self,
        identity: &Identity,
        trigger: &Trigger,
        activation_id: &str,
        start: DateTime<Utc>,
        logs: Vec<String>,
    ) {
        let end = Utc::now();
        let record = TriggerActivation {
            namespace: identity.namespace.clone(),
            entity_name: trigger.name.clone(),
            subject: identity.subject.clone(),
            activation_id: activation_id.to_string(),
            start,
            end,
            response: json!({ "status": "success" }),
            version: ACTIVATION_VERSION.to_string(),
            duration: Some((end - start).num_milliseconds()),
            logs,
        };

        if let Err(e) = self.activations.put(&record).await {
            tracing::error!(
                activation_id = %activation_id,
                trigger = %trigger.name,
                error = %e,
                "failed to persist trigger activation"
            );
        }
    }
}
