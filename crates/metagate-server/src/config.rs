/// Deployment-level configuration of the controller surface.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Base URL of the action backend, e.g. `https://invoker.internal`.
    pub host_base: String,
    /// First URL segment of the API, normally `api`.
    pub api_path: String,
    /// API version segment, normally `v1`.
    pub api_version: String,
    /// Deployment-chosen meta prefix, e.g. `meta` or `experimental`.
    pub meta_prefix: String,
    /// Namespace (and subject) of the privileged system identity.
    pub system_namespace: String,
}

impl ControllerConfig {
    /// `/api/v1` style root shared by all routes.
    pub fn api_root(&self) -> String {
        format!("/{}/{}", self.api_path, self.api_version)
    }

    /// Mount point of the meta routing surface, e.g. `/api/v1/meta`.
    pub fn meta_root(&self) -> String {
        format!("{}/{}", self.api_root(), self.meta_prefix)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host_base: "http://localhost:10001".to_string(),
            api_path: "api".to_string(),
            api_version: "v1".to_string(),
            meta_prefix: "meta".to_string(),
            system_namespace: "system".to_string(),
        }
    }
}
