//! Payload assembly for meta-routed invocations

use crate::error::ApiError;
use metagate_core::Parameters;
use serde_json::{Map, Value as JsonValue};

/// Reserved keys stamped over every payload; caller-supplied values for
/// these keys never survive the merge.
pub const META_VERB_KEY: &str = "__ow_meta_verb";
pub const META_PATH_KEY: &str = "__ow_meta_path";
pub const META_NAMESPACE_KEY: &str = "__ow_meta_namespace";

/// Request facts injected into every merged payload.
#[derive(Debug, Clone)]
pub struct MetaContext {
    /// Lower-cased HTTP method.
    pub verb: String,
    /// Raw residual path after the meta package segment, percent-encoding
    /// untouched. May be empty.
    pub path: String,
    /// The caller's namespace, never the system namespace.
    pub namespace: String,
}

/// Parse a request body into a JSON object.
///
/// An absent body counts as the empty object; anything non-empty must parse
/// as a JSON object or the request is unsupported media.
pub fn parse_json_body(bytes: &[u8]) -> Result<Map<String, JsonValue>, ApiError> {
    if bytes.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<JsonValue>(bytes) {
        Ok(JsonValue::Object(object)) => Ok(object),
        _ => Err(ApiError::UnsupportedMedia),
    }
}

/// Build the payload posted to the backend action.
///
/// Strict left-to-right fold, each stage overriding keys of the previous
/// ones: package defaults, action defaults, query parameters, body, then the
/// reserved meta fields.
pub fn merge_payload(
    package_params: &Parameters,
    action_params: &Parameters,
    query: &[(String, String)],
    body: Map<String, JsonValue>,
    meta: &MetaContext,
) -> Map<String, JsonValue> {
    let mut payload = package_params.to_object();

    for (key, value) in action_params.to_object() {
        payload.insert(key, value);
    }

    for (key, value) in query {
        payload.insert(key.clone(), JsonValue::String(value.clone()));
    }

    for (key, value) in body {
        payload.insert(key, value);
    }

    payload.insert(META_VERB_KEY.to_string(), JsonValue::String(meta.verb.clone()));
    payload.insert(META_PATH_KEY.to_string(), JsonValue::String(meta.path.clone()));
    payload.insert(META_NAMESPACE_KEY.to_string(), JsonValue::String(meta.namespace.clone()));

    payload
}
