use thiserror::Error;

use crate::api::{ApiError, ApiOperation};

/// Everything the orchestrator and delivery pipeline can fail with. Each
/// variant maps to exactly one user-facing notification line via
/// [`AppError::user_message`]; raw details stay available for the log.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid download locator: {0}")]
    InvalidLocator(String),

    #[error("all delivery strategies failed: {0}")]
    DeliveryFailed(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    /// Single-line message shown to the user. `dependency_count` is the size
    /// of the submitted request, used to add guidance to timeout failures.
    pub fn user_message(&self, dependency_count: usize) -> String {
        match self {
            AppError::Api(api) => api_message(api, dependency_count),
            AppError::InvalidRequest(detail) => detail.clone(),
            AppError::InvalidLocator(_) => {
                "Invalid download URL received from the server. \
                 Try downloading manually from the Recent Layers list."
                    .to_string()
            }
            AppError::DeliveryFailed(_) => {
                "Download failed - please try downloading manually from the Recent Layers list."
                    .to_string()
            }
            AppError::Io(detail) => format!("File error: {}", detail),
        }
    }
}

fn api_message(error: &ApiError, dependency_count: usize) -> String {
    match error {
        ApiError::NotConfigured => {
            "API not configured. Please run the deployment script to set up the backend."
                .to_string()
        }
        ApiError::Service { status, message } => {
            format!("API error ({}): {}", status, message)
        }
        ApiError::Timeout { operation } => match operation {
            ApiOperation::SubmitBuild if dependency_count > 2 => format!(
                "Creation timed out with {} dependencies. Try creating separate layers \
                 with fewer dependencies, or use only the most essential packages.",
                dependency_count
            ),
            ApiOperation::SubmitBuild => {
                "Layer creation timed out. Try with fewer dependencies or simpler packages."
                    .to_string()
            }
            _ => "Request timed out. The API is taking too long to respond.".to_string(),
        },
        ApiError::Unreachable { base_url } => format!(
            "Cannot reach the API at {}. Check if the backend is deployed and accessible.",
            base_url
        ),
        ApiError::Unexpected { operation, detail } => {
            format!("Unexpected error during {}: {}", operation, detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_recommends_trimming_large_requests() {
        let error = AppError::from(ApiError::Timeout {
            operation: ApiOperation::SubmitBuild,
        });
        let message = error.user_message(5);
        assert!(message.contains("5 dependencies"));
        assert!(message.contains("fewer dependencies"));
    }

    #[test]
    fn test_timeout_message_for_small_requests() {
        let error = AppError::from(ApiError::Timeout {
            operation: ApiOperation::SubmitBuild,
        });
        let message = error.user_message(1);
        assert!(message.contains("timed out"));
        assert!(!message.contains("separate layers"));
    }

    #[test]
    fn test_service_message_includes_status_and_detail() {
        let error = AppError::from(ApiError::Service {
            status: 502,
            message: "installation failed".to_string(),
        });
        assert_eq!(
            error.user_message(0),
            "API error (502): installation failed"
        );
    }

    #[test]
    fn test_unreachable_message_names_endpoint() {
        let error = AppError::from(ApiError::Unreachable {
            base_url: "https://api.example.com/prod".to_string(),
        });
        assert!(error.user_message(0).contains("https://api.example.com/prod"));
    }

    #[test]
    fn test_delivery_failures_direct_to_manual_download() {
        let invalid = AppError::InvalidLocator("s3://bucket/key".to_string());
        let exhausted = AppError::DeliveryFailed("dialog dismissed".to_string());
        assert!(invalid.user_message(0).contains("Recent Layers"));
        assert!(exhausted.user_message(0).contains("Recent Layers"));
    }
}
