//! Seed manifest loading
//!
//! The embedded deployment keeps its entities in memory; a manifest file
//! provides the initial subjects, packages, actions and triggers.

use metagate_core::{Action, Package, SubjectRecord, Trigger};
use metagate_store::{MemoryAuthStore, MemoryEntityStore};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub subjects: Vec<SubjectRecord>,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
}

impl Manifest {
    pub fn from_path(path: &str) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn seed(self, entities: &MemoryEntityStore, auths: &MemoryAuthStore) {
        for subject in self.subjects {
            auths.put_subject(subject).await;
        }
        for package in self.packages {
            entities.put_package(package).await;
        }
        for action in self.actions {
            entities.put_action(action).await;
        }
        for trigger in self.triggers {
            entities.put_trigger(trigger).await;
        }
    }
}
