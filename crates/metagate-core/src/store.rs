use crate::activation::TriggerActivation;
use crate::entity::{Action, Package, Trigger};
use crate::error::CoreResult;
use crate::types::{AuthKey, EntityName, SubjectRecord};
use async_trait::async_trait;

/// Read-only access to packages, actions and triggers.
///
/// `Ok(None)` is the missing-document case; `Err` means the backend itself
/// misbehaved.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get_package(&self, name: &EntityName) -> CoreResult<Option<Package>>;
    async fn get_action(&self, name: &EntityName) -> CoreResult<Option<Action>>;
    async fn get_trigger(&self, name: &EntityName) -> CoreResult<Option<Trigger>>;
}

/// Credential lookups for subjects.
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn get_key(&self, subject: &str) -> CoreResult<Option<AuthKey>>;
    async fn lookup_uuid(&self, uuid: &str) -> CoreResult<Option<SubjectRecord>>;
}

/// Write-once sink for trigger activation records.
#[async_trait]
pub trait ActivationStore: Send + Sync {
    async fn put(&self, activation: &TriggerActivation) -> CoreResult<()>;
}
