use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Basic-auth credential pair backing an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthKey {
    pub uuid: String,
    pub key: String,
}

impl AuthKey {
    pub fn new(uuid: impl Into<String>, key: impl Into<String>) -> Self {
        Self { uuid: uuid.into(), key: key.into() }
    }
}

/// Authenticated principal, resolved once per request and immutable after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject: String,
    pub namespace: String,
    pub authkey: AuthKey,
}

/// Subject row as stored in the auth store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub subject: String,
    pub namespace: String,
    pub authkey: AuthKey,
}

impl From<SubjectRecord> for Identity {
    fn from(record: SubjectRecord) -> Self {
        Self { subject: record.subject, namespace: record.namespace, authkey: record.authkey }
    }
}

/// Fully qualified entity name: `namespace[/package]/name`.
///
/// The textual and structured forms round-trip through `Display`/`parse`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityName {
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub name: String,
}

impl EntityName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), package: None, name: name.into() }
    }

    pub fn in_package(
        namespace: impl Into<String>,
        package: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self { namespace: namespace.into(), package: Some(package.into()), name: name.into() }
    }

    /// Parse `namespace[/package]/name`, tolerating one leading slash.
    pub fn parse(path: &str) -> Option<Self> {
        let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        match parts.as_slice() {
            [ns, name] => Some(Self::new(*ns, *name)),
            [ns, pkg, name] => Some(Self::in_package(*ns, *pkg, *name)),
            _ => None,
        }
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.package {
            Some(pkg) => write!(f, "{}/{}/{}", self.namespace, pkg, self.name),
            None => write!(f, "{}/{}", self.namespace, self.name),
        }
    }
}

/// Single key/value pair as used by both parameters and annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub key: String,
    pub value: JsonValue,
}

impl Parameter {
    pub fn new(key: impl Into<String>, value: JsonValue) -> Self {
        Self { key: key.into(), value }
    }
}

/// Ordered parameter sequence serialized as `[{key, value}]`.
///
/// Merge is right-biased on key: a later source overrides an earlier one.
/// The same shape backs annotations, where the typed accessors matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(pub Vec<Parameter>);

impl Parameters {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        // Later entries win, matching merge bias
        self.0.iter().rev().find(|p| p.key == key).map(|p| &p.value)
    }

    /// Annotation accessor: `Some(b)` only for a literal JSON boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(JsonValue::as_bool)
    }

    /// Annotation accessor: `Some(s)` only for a literal JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(JsonValue::as_str)
    }

    pub fn merge(&self, other: &Parameters) -> Parameters {
        let mut merged = self.clone();
        merged.0.extend(other.0.iter().cloned());
        merged
    }

    /// Flatten into a JSON object; for duplicate keys the last entry wins.
    pub fn to_object(&self) -> Map<String, JsonValue> {
        let mut object = Map::new();
        for param in &self.0 {
            object.insert(param.key.clone(), param.value.clone());
        }
        object
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, JsonValue)> for Parameters {
    fn from_iter<T: IntoIterator<Item = (String, JsonValue)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| Parameter::new(k, v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_name_round_trips() {
        for text in ["guest/echo", "system/routing/getApi"] {
            let parsed = EntityName::parse(text).unwrap();
            assert_eq!(parsed.to_string(), text);
            assert_eq!(EntityName::parse(&parsed.to_string()), Some(parsed));
        }
    }

    #[test]
    fn entity_name_tolerates_leading_slash() {
        let parsed = EntityName::parse("/guest/echo").unwrap();
        assert_eq!(parsed, EntityName::new("guest", "echo"));
    }

    #[test]
    fn entity_name_rejects_malformed_paths() {
        assert_eq!(EntityName::parse(""), None);
        assert_eq!(EntityName::parse("guest"), None);
        assert_eq!(EntityName::parse("guest//echo"), None);
        assert_eq!(EntityName::parse("a/b/c/d"), None);
    }

    #[test]
    fn merge_is_right_biased() {
        let left: Parameters =
            [("x".to_string(), json!("X")), ("z".to_string(), json!("z"))].into_iter().collect();
        let right: Parameters =
            [("y".to_string(), json!("Y")), ("z".to_string(), json!("Z"))].into_iter().collect();

        let merged = left.merge(&right).to_object();
        assert_eq!(merged["x"], json!("X"));
        assert_eq!(merged["y"], json!("Y"));
        assert_eq!(merged["z"], json!("Z"));
    }

    #[test]
    fn merge_is_deterministic() {
        let left: Parameters = [("a".to_string(), json!(1))].into_iter().collect();
        let right: Parameters = [("a".to_string(), json!(2)), ("b".to_string(), json!(3))]
            .into_iter()
            .collect();

        let once = serde_json::to_vec(&left.merge(&right).to_object()).unwrap();
        let twice = serde_json::to_vec(&left.merge(&right).to_object()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn typed_annotation_accessors() {
        let annotations: Parameters = [
            ("meta".to_string(), json!(true)),
            ("get".to_string(), json!("getApi")),
            ("count".to_string(), json!(3)),
        ]
        .into_iter()
        .collect();

        assert_eq!(annotations.get_bool("meta"), Some(true));
        assert_eq!(annotations.get_str("get"), Some("getApi"));
        // Wrong-typed lookups stay None rather than coercing
        assert_eq!(annotations.get_str("meta"), None);
        assert_eq!(annotations.get_bool("count"), None);
        assert_eq!(annotations.get_bool("absent"), None);
    }

    #[test]
    fn parameters_serialize_as_key_value_array() {
        let params: Parameters = [("x".to_string(), json!("X"))].into_iter().collect();
        let text = serde_json::to_string(&params).unwrap();
        assert_eq!(text, r#"[{"key":"x","value":"X"}]"#);
        let back: Parameters = serde_json::from_str(&text).unwrap();
        assert_eq!(back, params);
    }
}
