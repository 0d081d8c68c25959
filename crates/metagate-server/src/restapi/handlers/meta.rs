//! Meta routing handler
//!
//! Turns `/<apiroot>/<prefix>/<metaPackage>[/<residual>]` into a blocking
//! invocation of the action the package's verb annotation names, running the
//! resolve → merge → invoke → translate pipeline.

use crate::{
    error::{outcome_response, ApiError},
    merge::{merge_payload, parse_json_body, MetaContext},
    middleware::TransactionId,
    resolve::{resolve_meta_package, ResolveError},
    AppState,
};
use axum::{
    extract::{Query, Request, State},
    http::Method,
    response::Response,
    Extension,
};
use metagate_core::{EntityName, Identity};

const BODY_LIMIT: usize = 1 << 20;

/// Bare meta root: there is no package segment to route on.
pub async fn meta_root() -> ApiError {
    ApiError::NotFound
}

/// ANY /<apiroot>/<prefix>/*path
pub async fn handle_meta(
    State(state): State<AppState>,
    Extension(transaction_id): Extension<TransactionId>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<Vec<(String, String)>>,
    req: Request,
) -> Result<Response, ApiError> {
    if !matches!(*req.method(), Method::GET | Method::POST | Method::DELETE) {
        return Err(ApiError::MethodNotAllowed);
    }
    let verb = req.method().as_str().to_ascii_lowercase();

    // Split package and residual off the raw (still percent-encoded) path
    let (package_name, residual) = split_meta_path(req.uri().path(), &state.config.meta_root())?;
    let package_name = package_name.to_string();
    let residual = residual.to_string();

    tracing::info!(
        transaction_id = %transaction_id.as_str(),
        namespace = %identity.namespace,
        package = %package_name,
        verb = %verb,
        "meta request"
    );

    let resolved =
        resolve_meta_package(state.entities.as_ref(), &state.config.system_namespace, &package_name, &verb)
            .await
            .map_err(|e| match e {
                ResolveError::NotMeta => ApiError::NotMeta,
                ResolveError::VerbNotMapped => ApiError::VerbNotMapped,
                ResolveError::Backend(e) => ApiError::Internal(e.to_string()),
            })?;

    // The package names the action; it living elsewhere is a server fault
    let action_path = EntityName::in_package(
        &state.config.system_namespace,
        &package_name,
        &resolved.action_name,
    );
    let action = state
        .entities
        .get_action(&action_path)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::ActionMissing(format!("action {action_path} does not exist")))?;

    let bytes = axum::body::to_bytes(req.into_body(), BODY_LIMIT)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to read request body: {e}")))?;
    let body = parse_json_body(&bytes)?;

    let meta = MetaContext { verb, path: residual, namespace: identity.namespace.clone() };
    let payload =
        merge_payload(&resolved.package.parameters, &action.parameters, &query, body, &meta);

    let outcome = state
        .invoker
        .invoke_system(&package_name, &resolved.action_name, &payload)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(outcome_response(outcome, transaction_id.as_str()))
}

/// Split `<metaRoot>/<package>[<residual>]` into package and raw residual.
fn split_meta_path<'a>(path: &'a str, meta_root: &str) -> Result<(&'a str, &'a str), ApiError> {
    let rest = path
        .strip_prefix(meta_root)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or(ApiError::NotFound)?;

    let (package, residual) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    if package.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok((package, residual))
}
