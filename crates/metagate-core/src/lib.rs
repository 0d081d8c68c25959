pub mod activation;
pub mod entity;
pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use activation::{ActivationOutcome, FailureCause, LogLevel, TriggerActivation};
pub use entity::{Action, Exec, Package, RuleStatus, Trigger, TriggerRule};
pub use error::{CoreError, CoreResult};
pub use types::{AuthKey, EntityName, Identity, Parameter, Parameters, SubjectRecord};
