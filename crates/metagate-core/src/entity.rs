use crate::types::{EntityName, Parameters};
use serde::{Deserialize, Serialize};

/// Package entity.
///
/// A package opts into URL routing by carrying the annotation `meta=true`
/// plus at least one per-verb annotation (`get`/`post`/`delete`) whose value
/// names an action local to the system namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub annotations: Parameters,
    #[serde(default)]
    pub publish: bool,
}

impl Package {
    /// `namespace/name`, as logged and as embedded in backend payloads.
    pub fn fully_qualified_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

/// Action entity. Meta-routed actions live under the system namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub parameters: Parameters,
    pub exec: Exec,
}

/// Executable payload of an action. Only the descriptor matters here; the
/// code itself runs on the invoker side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exec {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Trigger entity with its rule bindings.
///
/// Rules are kept as an ordered sequence: fan-out outcomes and activation
/// log lines are collected in declaration order, not completion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub annotations: Parameters,
    #[serde(default)]
    pub rules: Vec<TriggerRule>,
}

impl Trigger {
    pub fn active_rules(&self) -> impl Iterator<Item = &TriggerRule> {
        self.rules.iter().filter(|rule| rule.status == RuleStatus::Active)
    }
}

/// One rule binding a trigger to an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRule {
    pub name: String,
    pub action: EntityName,
    pub status: RuleStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "INACTIVE")]
    Inactive,
}
