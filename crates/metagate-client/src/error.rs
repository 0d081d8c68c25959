use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Client setup failures. Invocation failures are not errors here: they are
/// `ActivationOutcome::Failure` values, so callers handle them as outcomes.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),

    #[error("http client: {0}")]
    Http(String),

    #[error("system credentials unavailable: {0}")]
    Credentials(String),
}
