//! Error translation onto the HTTP surface

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metagate_core::ActivationOutcome;
use serde_json::json;
use sha2::{Digest, Sha256};

pub type ApiResult<T> = Result<T, ApiError>;

/// Resolution and request-shape failures of the meta pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no meta package named in request path")]
    NotFound,

    #[error("package is not meta-routable")]
    NotMeta,

    #[error("verb is not mapped by the meta package")]
    VerbNotMapped,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("request body is not an application/json object")]
    UnsupportedMedia,

    #[error("resolved action is missing: {0}")]
    ActionMissing(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::NotMeta | ApiError::VerbNotMapped | ApiError::MethodNotAllowed => {
                StatusCode::METHOD_NOT_ALLOWED.into_response()
            }
            ApiError::UnsupportedMedia => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "request body must be a valid application/json object",
            )
                .into_response(),
            ApiError::ActionMissing(msg) | ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": msg }))).into_response()
            }
        }
    }
}

/// Translate a backend invocation outcome into the terminal HTTP response.
///
/// The `code` field of 202/500 bodies is an opaque numeric token clients can
/// echo back; it derives from the activation id when one exists, otherwise
/// from the transaction id.
pub fn outcome_response(outcome: ActivationOutcome, transaction_id: &str) -> Response {
    match outcome {
        ActivationOutcome::Success { record } => (StatusCode::OK, Json(record)).into_response(),
        ActivationOutcome::Pending { activation_id } => (
            StatusCode::ACCEPTED,
            Json(json!({ "code": activation_code(&activation_id) })),
        )
            .into_response(),
        ActivationOutcome::Failure { cause } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": cause.to_string(),
                "code": activation_code(transaction_id),
            })),
        )
            .into_response(),
    }
}

/// First eight bytes of SHA-256 over the token, read big-endian.
pub fn activation_code(token: &str) -> u64 {
    let digest = Sha256::digest(token.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metagate_core::FailureCause;

    #[test]
    fn activation_code_is_stable_and_token_sensitive() {
        assert_eq!(activation_code("AID"), activation_code("AID"));
        assert_ne!(activation_code("AID"), activation_code("AID2"));
    }

    #[test]
    fn resolution_errors_map_to_spec_statuses() {
        assert_eq!(ApiError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::NotMeta.into_response().status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            ApiError::VerbNotMapped.into_response().status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::UnsupportedMedia.into_response().status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            ApiError::ActionMissing("gone".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn pending_body_has_exactly_one_field() {
        let response = outcome_response(
            ActivationOutcome::Pending { activation_id: "AID".to_string() },
            "txid",
        );
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let object = body.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object["code"].is_u64());
    }

    #[tokio::test]
    async fn failure_body_has_error_and_code() {
        let response = outcome_response(
            ActivationOutcome::Failure { cause: FailureCause::status(503, "upstream down") },
            "txid",
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let object = body.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(object["error"].as_str().unwrap().contains("upstream down"));
        assert!(object["code"].is_u64());
    }
}
