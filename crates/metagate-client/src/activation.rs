use crate::credentials::SystemCredentialSource;
use crate::error::{ClientError, ClientResult};
use metagate_core::{ActivationOutcome, AuthKey, FailureCause};
use reqwest::Url;
use serde_json::{Map, Value as JsonValue};

// Failure messages quote backend bodies; keep them short.
const MAX_CAUSE_LEN: usize = 256;

/// Issues authenticated invocation requests against the action backend.
///
/// One blocking invocation maps onto
/// `POST <host>/api/<v>/namespaces/<ns>/actions/[<pkg>/]<action>?blocking=…`
/// and the two-shape response (activation record vs. activation id) comes
/// back as an [`ActivationOutcome`]. The client never retries: invocations
/// are not idempotent.
pub struct ActivationClient {
    http: reqwest::Client,
    host_base: Url,
    api_path: String,
    api_version: String,
    system_namespace: String,
    credentials: SystemCredentialSource,
}

impl ActivationClient {
    pub fn new(
        host_base: &str,
        api_path: impl Into<String>,
        api_version: impl Into<String>,
        system_namespace: impl Into<String>,
        credentials: SystemCredentialSource,
    ) -> ClientResult<Self> {
        let host_base =
            Url::parse(host_base).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        let http =
            reqwest::Client::builder().build().map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self {
            http,
            host_base,
            api_path: api_path.into(),
            api_version: api_version.into(),
            system_namespace: system_namespace.into(),
            credentials,
        })
    }

    pub fn system_namespace(&self) -> &str {
        &self.system_namespace
    }

    /// Invoke a system-namespace action with the cached system credentials,
    /// blocking until the backend produces a result or times out.
    pub async fn invoke_system(
        &self,
        package: &str,
        action: &str,
        body: &Map<String, JsonValue>,
    ) -> ClientResult<ActivationOutcome> {
        let key = self.credentials.get().await?;
        self.invoke(&key, &self.system_namespace, Some(package), action, body, true).await
    }

    /// Invoke an arbitrary action with explicit caller credentials.
    pub async fn invoke(
        &self,
        key: &AuthKey,
        namespace: &str,
        package: Option<&str>,
        action: &str,
        body: &Map<String, JsonValue>,
        blocking: bool,
    ) -> ClientResult<ActivationOutcome> {
        let url = self.action_url(namespace, package, action, blocking)?;
        tracing::debug!(url = %url, namespace = %namespace, action = %action, "invoking action");

        let response = match self
            .http
            .post(url)
            .basic_auth(&key.uuid, Some(&key.key))
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Ok(ActivationOutcome::Failure {
                    cause: FailureCause::transport(truncate(&e.to_string())),
                });
            }
        };

        let status = response.status().as_u16();
        match status {
            200 => match response.json::<JsonValue>().await {
                Ok(record @ JsonValue::Object(_)) => Ok(ActivationOutcome::Success { record }),
                Ok(_) | Err(_) => Ok(ActivationOutcome::Failure {
                    cause: FailureCause::status(status, "malformed activation record"),
                }),
            },
            202 => match response.json::<JsonValue>().await {
                Ok(body) => match body.get("activationId").and_then(JsonValue::as_str) {
                    Some(id) => Ok(ActivationOutcome::Pending { activation_id: id.to_string() }),
                    None => Ok(ActivationOutcome::Failure {
                        cause: FailureCause::status(status, "accepted without activationId"),
                    }),
                },
                Err(_) => Ok(ActivationOutcome::Failure {
                    cause: FailureCause::status(status, "accepted without activationId"),
                }),
            },
            _ => {
                let text = response.text().await.unwrap_or_default();
                Ok(ActivationOutcome::Failure { cause: failure_from_body(status, &text) })
            }
        }
    }

    fn action_url(
        &self,
        namespace: &str,
        package: Option<&str>,
        action: &str,
        blocking: bool,
    ) -> ClientResult<Url> {
        let mut url = self.host_base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl("host base cannot carry a path".into()))?;
            segments.pop_if_empty();
            segments.extend([
                self.api_path.as_str(),
                self.api_version.as_str(),
                "namespaces",
                namespace,
                "actions",
            ]);
            if let Some(package) = package {
                segments.push(package);
            }
            segments.push(action);
        }
        url.query_pairs_mut()
            .append_pair("blocking", if blocking { "true" } else { "false" });
        Ok(url)
    }
}

/// Prefer the JSON `error` field of an error body; fall back to raw text.
fn failure_from_body(status: u16, text: &str) -> FailureCause {
    let message = serde_json::from_str::<JsonValue>(text)
        .ok()
        .and_then(|v| v.get("error").and_then(JsonValue::as_str).map(str::to_string))
        .unwrap_or_else(|| text.trim().to_string());
    FailureCause::status(status, truncate(&message))
}

fn truncate(message: &str) -> String {
    if message.len() <= MAX_CAUSE_LEN {
        message.to_string()
    } else {
        let mut end = MAX_CAUSE_LEN;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message[..end].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use httpmock::prelude::*;
    use metagate_core::SubjectRecord;
    use metagate_store::MemoryAuthStore;
    use serde_json::json;
    use std::sync::Arc;

    async fn client_for(server: &MockServer) -> ActivationClient {
        let auths = MemoryAuthStore::new();
        auths
            .put_subject(SubjectRecord {
                subject: "system".to_string(),
                namespace: "system".to_string(),
                authkey: AuthKey::new("sys-uuid", "sys-key"),
            })
            .await;
        let credentials = SystemCredentialSource::new(Arc::new(auths), "system");
        ActivationClient::new(&server.base_url(), "api", "v1", "system", credentials).unwrap()
    }

    #[tokio::test]
    async fn blocking_success_wraps_activation_record() {
        let server = MockServer::start();
        let basic = STANDARD.encode("sys-uuid:sys-key");
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/namespaces/system/actions/routing/getApi")
                .query_param("blocking", "true")
                .header("authorization", format!("Basic {basic}"))
                .header("content-type", "application/json");
            then.status(200).json_body(json!({"activationId": "AID", "response": {"ok": true}}));
        });

        let client = client_for(&server).await;
        let outcome =
            client.invoke_system("routing", "getApi", &Map::new()).await.unwrap();

        mock.assert();
        match outcome {
            ActivationOutcome::Success { record } => {
                assert_eq!(record["activationId"], "AID");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn accepted_yields_pending_with_activation_id() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/namespaces/system/actions/routing/getApi");
            then.status(202).json_body(json!({"activationId": "AID-202"}));
        });

        let client = client_for(&server).await;
        let outcome =
            client.invoke_system("routing", "getApi", &Map::new()).await.unwrap();
        assert_eq!(outcome, ActivationOutcome::Pending { activation_id: "AID-202".to_string() });
    }

    #[tokio::test]
    async fn error_status_with_json_body_extracts_error_field() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/namespaces/system/actions/routing/getApi");
            then.status(502).json_body(json!({"error": "backend exploded"}));
        });

        let client = client_for(&server).await;
        let outcome =
            client.invoke_system("routing", "getApi", &Map::new()).await.unwrap();
        assert_eq!(
            outcome,
            ActivationOutcome::Failure { cause: FailureCause::status(502, "backend exploded") }
        );
    }

    #[tokio::test]
    async fn error_status_with_text_body_keeps_raw_text() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/namespaces/system/actions/routing/getApi");
            then.status(404).body("no such action");
        });

        let client = client_for(&server).await;
        let outcome =
            client.invoke_system("routing", "getApi", &Map::new()).await.unwrap();
        assert_eq!(
            outcome,
            ActivationOutcome::Failure { cause: FailureCause::status(404, "no such action") }
        );
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/namespaces/system/actions/routing/getApi");
            then.status(200).json_body(json!(["not", "an", "object"]));
        });

        let client = client_for(&server).await;
        let outcome =
            client.invoke_system("routing", "getApi", &Map::new()).await.unwrap();
        match outcome {
            ActivationOutcome::Failure { cause } => {
                assert_eq!(cause.status, Some(200));
                assert!(cause.message.contains("malformed"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_errors_become_failures_without_status() {
        let auths = MemoryAuthStore::new();
        auths
            .put_subject(SubjectRecord {
                subject: "system".to_string(),
                namespace: "system".to_string(),
                authkey: AuthKey::new("sys-uuid", "sys-key"),
            })
            .await;
        let credentials = SystemCredentialSource::new(Arc::new(auths), "system");
        // Nothing listens on the discard port
        let client =
            ActivationClient::new("http://127.0.0.1:9", "api", "v1", "system", credentials)
                .unwrap();

        let outcome =
            client.invoke_system("routing", "getApi", &Map::new()).await.unwrap();
        match outcome {
            ActivationOutcome::Failure { cause } => assert_eq!(cause.status, None),
            other => panic!("expected transport failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn caller_invocations_use_caller_credentials() {
        let server = MockServer::start();
        let basic = STANDARD.encode("guest-uuid:guest-key");
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/namespaces/guest/actions/a1")
                .query_param("blocking", "true")
                .header("authorization", format!("Basic {basic}"));
            then.status(202).json_body(json!({"activationId": "AID-r1"}));
        });

        let client = client_for(&server).await;
        let caller = AuthKey::new("guest-uuid", "guest-key");
        let outcome = client
            .invoke(&caller, "guest", None, "a1", &Map::new(), true)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(outcome, ActivationOutcome::Pending { activation_id: "AID-r1".to_string() });
    }
}
