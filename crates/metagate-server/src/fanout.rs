//! Rule fan-out for fired triggers

use chrono::Utc;
use futures::future::join_all;
use metagate_client::{ActivationClient, ClientError};
use metagate_core::{
    activation::format_log_line, ActivationOutcome, Identity, LogLevel, Trigger, TriggerRule,
};
use serde_json::{Map, Value as JsonValue};

/// Invoke every active rule of a fired trigger concurrently and collect one
/// formatted log line per rule.
///
/// Invocations carry the caller's credentials, not the system identity.
/// Rules are independent: one failing does not cancel the others, and the
/// returned lines follow rule declaration order, not completion order.
pub async fn fan_out(
    client: &ActivationClient,
    identity: &Identity,
    trigger: &Trigger,
    payload: Option<Map<String, JsonValue>>,
) -> Vec<String> {
    let active: Vec<&TriggerRule> = trigger.active_rules().collect();
    if active.is_empty() {
        return Vec::new();
    }

    // One merged body for every rule: trigger parameters, payload overriding
    let mut body = trigger.parameters.to_object();
    if let Some(payload) = payload {
        for (key, value) in payload {
            body.insert(key, value);
        }
    }

    let invocations = active.into_iter().map(|rule| {
        let body = body.clone();
        async move {
            let outcome = client
                .invoke(
                    &identity.authkey,
                    &rule.action.namespace,
                    rule.action.package.as_deref(),
                    &rule.action.name,
                    &body,
                    true,
                )
                .await;
            rule_log_line(&trigger.name, rule, outcome)
        }
    });

    join_all(invocations).await
}

/// Classify one rule's invocation outcome into its activation log line.
fn rule_log_line(
    trigger_name: &str,
    rule: &TriggerRule,
    outcome: Result<ActivationOutcome, ClientError>,
) -> String {
    let action = rule.action.to_string();
    let (level, message) = match outcome {
        Ok(ActivationOutcome::Success { record }) => {
            let id = record
                .get("activationId")
                .and_then(JsonValue::as_str)
                .unwrap_or("unknown");
            (LogLevel::Info, format!("invoked {action} with activation {id}"))
        }
        Ok(ActivationOutcome::Pending { activation_id }) => {
            (LogLevel::Info, format!("invoked {action} with activation {activation_id}"))
        }
        Ok(ActivationOutcome::Failure { cause }) if cause.status == Some(404) => {
            (LogLevel::Error, format!("action {action} not found"))
        }
        Ok(ActivationOutcome::Failure { cause }) => {
            (LogLevel::Error, format!("failed to invoke {action}: {cause}"))
        }
        Err(e) => (LogLevel::Error, format!("failed to invoke {action}: {e}")),
    };

    format_log_line(Utc::now(), level, trigger_name, &rule.name, &action, &message)
}
