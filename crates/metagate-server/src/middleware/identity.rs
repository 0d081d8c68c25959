//! Identity resolution middleware
//!
//! Decodes HTTP Basic credentials, resolves the uuid against the auth store
//! and injects the caller [`Identity`] as a request extension. Handlers
//! downstream treat the identity as already resolved.

use axum::{
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use metagate_core::{store::AuthStore, Identity};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

#[derive(Clone)]
pub struct IdentityLayer {
    auths: Arc<dyn AuthStore>,
}

impl IdentityLayer {
    pub fn new(auths: Arc<dyn AuthStore>) -> Self {
        Self { auths }
    }
}

impl<S> Layer<S> for IdentityLayer {
    type Service = IdentityService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        IdentityService { inner, auths: self.auths.clone() }
    }
}

#[derive(Clone)]
pub struct IdentityService<S> {
    inner: S,
    auths: Arc<dyn AuthStore>,
}

impl<S, B> Service<Request<B>> for IdentityService<S>
where
    S: Service<Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let credentials = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(decode_basic);
        let auths = self.auths.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let (uuid, key) = match credentials {
                Some(pair) => pair,
                None => return Ok(StatusCode::UNAUTHORIZED.into_response()),
            };

            let record = match auths.lookup_uuid(&uuid).await {
                Ok(Some(record)) if record.authkey.key == key => record,
                Ok(_) => return Ok(StatusCode::UNAUTHORIZED.into_response()),
                Err(e) => {
                    tracing::error!(error = %e, "auth store lookup failed");
                    return Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response());
                }
            };

            req.extensions_mut().insert(Identity::from(record));
            inner.call(req).await
        })
    }
}

fn decode_basic(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (uuid, key) = text.split_once(':')?;
    Some((uuid.to_string(), key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_well_formed_basic_credentials() {
        let encoded = STANDARD.encode("uuid-1:secret:with:colons");
        let decoded = decode_basic(&format!("Basic {encoded}")).unwrap();
        // Only the first colon splits uuid from key
        assert_eq!(decoded, ("uuid-1".to_string(), "secret:with:colons".to_string()));
    }

    #[test]
    fn rejects_non_basic_schemes_and_garbage() {
        assert_eq!(decode_basic("Bearer token"), None);
        assert_eq!(decode_basic("Basic not-base64!!"), None);
        let no_colon = STANDARD.encode("uuidonly");
        assert_eq!(decode_basic(&format!("Basic {no_colon}")), None);
    }
}
