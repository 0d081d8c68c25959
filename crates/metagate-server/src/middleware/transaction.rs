//! Transaction id middleware
//!
//! Every request carries a transaction id used purely for log correlation.
//! An incoming `x-transaction-id` header is honored so edge proxies can
//! stitch traces together; otherwise a fresh id is minted.

use axum::{http::Request, response::Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use uuid::Uuid;

const TRANSACTION_HEADER: &str = "x-transaction-id";

#[derive(Clone)]
pub struct TransactionIdLayer;

impl<S> Layer<S> for TransactionIdLayer {
    type Service = TransactionIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TransactionIdService { inner }
    }
}

#[derive(Clone)]
pub struct TransactionIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for TransactionIdService<S>
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
        let transaction_id = req
            .headers()
            .get(TRANSACTION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        req.extensions_mut().insert(TransactionId(transaction_id.clone()));

        let mut inner = self.inner.clone();
        Box::pin(async move {
            let mut response = inner.call(req).await?;
            if let Ok(value) = transaction_id.parse() {
                response.headers_mut().insert(TRANSACTION_HEADER, value);
            }
            Ok(response)
        })
    }
}

/// Transaction id extractor
#[derive(Clone)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
