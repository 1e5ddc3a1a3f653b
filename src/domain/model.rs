use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::AppError;
use crate::utils::is_valid_specifier;

/// Python runtimes the build service can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeVersion {
    #[serde(rename = "python3.12")]
    Python312,
    #[serde(rename = "python3.11")]
    Python311,
    #[serde(rename = "python3.10")]
    Python310,
    #[serde(rename = "python3.9")]
    Python39,
    #[serde(rename = "python3.8")]
    Python38,
}

impl RuntimeVersion {
    pub const ALL: [RuntimeVersion; 5] = [
        RuntimeVersion::Python312,
        RuntimeVersion::Python311,
        RuntimeVersion::Python310,
        RuntimeVersion::Python39,
        RuntimeVersion::Python38,
    ];

    /// Bare interpreter version, e.g. "3.12"
    pub fn python_version(&self) -> &'static str {
        match self {
            RuntimeVersion::Python312 => "3.12",
            RuntimeVersion::Python311 => "3.11",
            RuntimeVersion::Python310 => "3.10",
            RuntimeVersion::Python39 => "3.9",
            RuntimeVersion::Python38 => "3.8",
        }
    }
}

impl Default for RuntimeVersion {
    fn default() -> Self {
        RuntimeVersion::Python312
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Python {}", self.python_version())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetPlatform {
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "arm64")]
    Arm64,
}

impl TargetPlatform {
    pub const ALL: [TargetPlatform; 2] = [TargetPlatform::X86_64, TargetPlatform::Arm64];
}

impl Default for TargetPlatform {
    fn default() -> Self {
        TargetPlatform::X86_64
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetPlatform::X86_64 => write!(f, "x86_64 (Intel/AMD)"),
            TargetPlatform::Arm64 => write!(f, "arm64 (ARM/Graviton)"),
        }
    }
}

/// A validated layer build request, serialized verbatim as the submit payload.
#[derive(Debug, Clone, Serialize)]
pub struct BuildRequest {
    pub name: String,
    #[serde(rename = "runtimeVersion")]
    pub runtime: RuntimeVersion,
    #[serde(rename = "targetPlatform")]
    pub platform: TargetPlatform,
    pub dependencies: Vec<String>,
    #[serde(rename = "installDependencies")]
    pub install_dependencies: bool,
    #[serde(rename = "upgradeDependencies")]
    pub upgrade_dependencies: bool,
}

impl BuildRequest {
    /// Submission policy. The transport takes any request; the orchestrator
    /// refuses to dispatch one that fails here.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "Layer name is required".to_string(),
            ));
        }
        if self.dependencies.is_empty() {
            return Err(AppError::InvalidRequest(
                "Add at least one dependency to create a useful layer".to_string(),
            ));
        }
        for (index, dependency) in self.dependencies.iter().enumerate() {
            if !is_valid_specifier(dependency) {
                return Err(AppError::InvalidRequest(format!(
                    "\"{}\" is not a valid package specifier",
                    dependency
                )));
            }
            if self.dependencies[..index].contains(dependency) {
                return Err(AppError::InvalidRequest(format!(
                    "Duplicate dependency \"{}\"",
                    dependency
                )));
            }
        }
        Ok(())
    }
}

/// Successful outcome of a submitted build. The failure half of the service's
/// result envelope surfaces as the `Err` arm of the transport call.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub artifact_name: String,
    pub download_locator: String,
}

/// Where the orchestrator currently is in a request's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Idle,
    Submitting,
    Delivering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// The single transient status message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
    pub created_at: u64,
}

/// Visible state of an in-flight artifact save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryStatus {
    pub in_flight: bool,
    pub file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(dependencies: &[&str]) -> BuildRequest {
        BuildRequest {
            name: "my-layer".to_string(),
            runtime: RuntimeVersion::default(),
            platform: TargetPlatform::default(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            install_dependencies: true,
            upgrade_dependencies: false,
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_request() {
        assert!(request_with(&["requests", "boto3==1.34.0"]).validate().is_ok());
    }

    #[test]
    fn test_validate_requires_name() {
        let mut request = request_with(&["requests"]);
        request.name = "  ".to_string();
        assert!(matches!(
            request.validate(),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_validate_requires_dependencies() {
        assert!(matches!(
            request_with(&[]).validate(),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let err = request_with(&["requests", "requests"]).validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_request_wire_shape() {
        let request = request_with(&["requests"]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["name"], "my-layer");
        assert_eq!(value["runtimeVersion"], "python3.12");
        assert_eq!(value["targetPlatform"], "x86_64");
        assert_eq!(value["installDependencies"], true);
        assert_eq!(value["upgradeDependencies"], false);
        assert_eq!(value["dependencies"][0], "requests");
    }
}
