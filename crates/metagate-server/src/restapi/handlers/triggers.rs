//! Trigger fire handler

use crate::{
    activations::TriggerActivationWriter,
    error::ApiError,
    fanout,
    merge::parse_json_body,
    middleware::TransactionId,
    AppState,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use metagate_core::{EntityName, Identity};
use serde_json::json;
use uuid::Uuid;

/// POST /api/v1/namespaces/:namespace/triggers/:trigger
///
/// Answers 202 with a fresh activation id before any rule action runs; the
/// fan-out and the single activation record write continue in a detached
/// task. The id stays valid even if the fan-out later fails.
pub async fn fire_trigger(
    State(state): State<AppState>,
    Extension(transaction_id): Extension<TransactionId>,
    Extension(identity): Extension<Identity>,
    Path((namespace, trigger_name)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload = if body.is_empty() { None } else { Some(parse_json_body(&body)?) };

    let trigger = state
        .entities
        .get_trigger(&EntityName::new(&namespace, &trigger_name))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::NotFound)?;

    let activation_id = Uuid::new_v4().simple().to_string();
    let start = Utc::now();

    tracing::info!(
        transaction_id = %transaction_id.as_str(),
        namespace = %namespace,
        trigger = %trigger_name,
        activation_id = %activation_id,
        active_rules = trigger.active_rules().count(),
        "trigger fired"
    );

    {
        let state = state.clone();
        let identity = identity.clone();
        let activation_id = activation_id.clone();
        tokio::spawn(async move {
            let logs = fanout::fan_out(&state.invoker, &identity, &trigger, payload).await;
            TriggerActivationWriter::new(state.activations.clone())
                .write(&identity, &trigger, &activation_id, start, logs)
                .await;
        });
    }

    Ok((StatusCode::ACCEPTED, Json(json!({ "activationId": activation_id }))).into_response())
}
