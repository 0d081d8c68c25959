//! Meta package resolution

use metagate_core::{store::EntityStore, CoreError, EntityName, Package};

/// Outcome of resolving a meta package for one verb.
#[derive(Debug, Clone)]
pub struct ResolvedMetaAction {
    pub package: Package,
    /// Action name local to `systemId/<package>`, taken from the verb
    /// annotation.
    pub action_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("package is not meta-routable")]
    NotMeta,

    #[error("verb is not mapped by the meta package")]
    VerbNotMapped,

    #[error("entity store: {0}")]
    Backend(#[from] CoreError),
}

/// Resolve `systemId/<package_name>` for the given verb.
///
/// A package routes only when it carries the boolean annotation `meta=true`
/// and a string annotation keyed by the lower-cased verb. Published meta
/// packages are still served, with a WARN on every request.
pub async fn resolve_meta_package(
    entities: &dyn EntityStore,
    system_namespace: &str,
    package_name: &str,
    verb: &str,
) -> Result<ResolvedMetaAction, ResolveError> {
    let name = EntityName::new(system_namespace, package_name);
    let package = match entities.get_package(&name).await? {
        Some(package) => package,
        None => return Err(ResolveError::NotMeta),
    };

    if package.annotations.get_bool("meta") != Some(true) {
        return Err(ResolveError::NotMeta);
    }

    let verb_key = verb.to_ascii_lowercase();
    let action_name = match package.annotations.get_str(&verb_key) {
        Some(action) => action.to_string(),
        None => return Err(ResolveError::VerbNotMapped),
    };

    if package.publish {
        tracing::warn!(
            package = %package.fully_qualified_name(),
            "meta package {} is public",
            package.fully_qualified_name()
        );
    }

    Ok(ResolvedMetaAction { package, action_name })
}
