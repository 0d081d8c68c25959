pub mod activation;
pub mod credentials;
pub mod error;

pub use activation::ActivationClient;
pub use credentials::SystemCredentialSource;
pub use error::{ClientError, ClientResult};
