use async_trait::async_trait;
use metagate_core::{
    store::{ActivationStore, AuthStore, EntityStore},
    Action, AuthKey, CoreResult, EntityName, Package, SubjectRecord, Trigger, TriggerActivation,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of EntityStore for tests and embedded use
#[derive(Debug, Clone, Default)]
pub struct MemoryEntityStore {
    packages: Arc<RwLock<HashMap<String, Package>>>,
    actions: Arc<RwLock<HashMap<String, Action>>>,
    triggers: Arc<RwLock<HashMap<String, Trigger>>>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_package(&self, package: Package) {
        let key = format!("{}/{}", package.namespace, package.name);
        self.packages.write().await.insert(key, package);
    }

    pub async fn put_action(&self, action: Action) {
        let key = EntityName {
            namespace: action.namespace.clone(),
            package: None,
            name: action.name.clone(),
        };
        self.actions.write().await.insert(key.to_string(), action);
    }

    pub async fn put_trigger(&self, trigger: Trigger) {
        let key = format!("{}/{}", trigger.namespace, trigger.name);
        self.triggers.write().await.insert(key, trigger);
    }
}

// Actions inside a package are stored flat under `namespace/package/name`;
// package-less lookups use `namespace/name`.
fn document_id(name: &EntityName) -> String {
    name.to_string()
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn get_package(&self, name: &EntityName) -> CoreResult<Option<Package>> {
        let data = self.packages.read().await;
        Ok(data.get(&document_id(name)).cloned())
    }

    async fn get_action(&self, name: &EntityName) -> CoreResult<Option<Action>> {
        let data = self.actions.read().await;
        Ok(data.get(&document_id(name)).cloned())
    }

    async fn get_trigger(&self, name: &EntityName) -> CoreResult<Option<Trigger>> {
        let data = self.triggers.read().await;
        Ok(data.get(&document_id(name)).cloned())
    }
}

/// In-memory implementation of AuthStore for tests and embedded use
#[derive(Debug, Clone, Default)]
pub struct MemoryAuthStore {
    data: Arc<RwLock<HashMap<String, SubjectRecord>>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_subject(&self, record: SubjectRecord) {
        self.data.write().await.insert(record.subject.clone(), record);
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn get_key(&self, subject: &str) -> CoreResult<Option<AuthKey>> {
        let data = self.data.read().await;
        Ok(data.get(subject).map(|record| record.authkey.clone()))
    }

    async fn lookup_uuid(&self, uuid: &str) -> CoreResult<Option<SubjectRecord>> {
        let data = self.data.read().await;
        Ok(data.values().find(|record| record.authkey.uuid == uuid).cloned())
    }
}

/// In-memory implementation of ActivationStore for tests and embedded use
#[derive(Debug, Clone, Default)]
pub struct MemoryActivationStore {
    data: Arc<RwLock<HashMap<String, TriggerActivation>>>,
}

impl MemoryActivationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, activation_id: &str) -> Option<TriggerActivation> {
        self.data.read().await.get(activation_id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.data.read().await.len()
    }
}

#[async_trait]
impl ActivationStore for MemoryActivationStore {
    async fn put(&self, activation: &TriggerActivation) -> CoreResult<()> {
        let mut data = self.data.write().await;
        data.insert(activation.activation_id.clone(), activation.clone());
        Ok(())
    }
}
