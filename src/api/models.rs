use serde::{Deserialize, Serialize};

/// Response from `POST /packages`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(rename = "artifactName", default)]
    pub artifact_name: String,
    #[serde(rename = "downloadLocator", default)]
    pub download_locator: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from `GET /packages`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListResponse {
    pub success: bool,
    #[serde(default)]
    pub artifacts: Vec<ArtifactSummary>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from `GET /packages/{storageKey}/download`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolveDownloadResponse {
    pub success: bool,
    #[serde(rename = "downloadUrl", default)]
    pub download_url: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Error envelope the service sends alongside HTTP error statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<String>,
}

/// One produced layer, as the listing endpoint reports it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactSummary {
    #[serde(rename = "storageKey")]
    pub storage_key: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "lastModified", default)]
    pub last_modified: String,
    #[serde(rename = "dependencyCount", default)]
    pub dependency_count: usize,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub platform: String,
    #[serde(rename = "runtimeVersion", default)]
    pub runtime_version: String,
}

/// Base-endpoint configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

/// Substring left in the base URL when deployment never filled it in
pub const PLACEHOLDER_SENTINEL: &str = "your-api-id";

const PLACEHOLDER_BASE_URL: &str =
    "https://your-api-id.execute-api.your-region.amazonaws.com/prod";

impl ApiConfig {
    /// Reads `LAYER_BUILDER_API_URL`, falling back to the placeholder that
    /// [`crate::api::ApiClient`] refuses to talk to.
    pub fn from_env() -> Self {
        let base_url = std::env::var("LAYER_BUILDER_API_URL")
            .unwrap_or_else(|_| PLACEHOLDER_BASE_URL.to_string());
        Self { base_url }
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.contains(PLACEHOLDER_SENTINEL)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: PLACEHOLDER_BASE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_unconfigured() {
        assert!(!ApiConfig::default().is_configured());
    }

    #[test]
    fn test_real_endpoint_is_configured() {
        let config = ApiConfig {
            base_url: "https://abc123.execute-api.eu-west-1.amazonaws.com/prod".to_string(),
        };
        assert!(config.is_configured());
    }

    #[test]
    fn test_artifact_summary_wire_names() {
        let body = r#"{
            "storageKey": "layers/my-layer-20260801-101010.zip",
            "fileName": "my-layer",
            "size": 1048576,
            "lastModified": "2026-08-01T10:10:10",
            "dependencyCount": 2,
            "dependencies": ["requests", "boto3"],
            "platform": "x86_64",
            "runtimeVersion": "python3.12"
        }"#;
        let summary: ArtifactSummary = serde_json::from_str(body).unwrap();
        assert_eq!(summary.storage_key, "layers/my-layer-20260801-101010.zip");
        assert_eq!(summary.file_name, "my-layer");
        assert_eq!(summary.dependency_count, 2);
        assert_eq!(summary.dependencies.len(), 2);
    }
}
