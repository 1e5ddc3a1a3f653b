use std::fmt;
use std::time::Duration;

use futures::Stream;
use futures::TryStreamExt;
use reqwest::Client;
use thiserror::Error;

use crate::domain::{BuildRequest, BuildResult};

use super::models::{
    ApiConfig, ArtifactSummary, ErrorEnvelope, ListResponse, ResolveDownloadResponse,
    SubmitResponse,
};

/// Timeout applied to listing and download-URL requests. Build submissions
/// get a per-request timeout computed from their dependency count instead.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    SubmitBuild,
    ListArtifacts,
    ResolveDownload,
    FetchArtifact,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiOperation::SubmitBuild => "layer creation",
            ApiOperation::ListArtifacts => "loading layers",
            ApiOperation::ResolveDownload => "generating the download URL",
            ApiOperation::FetchArtifact => "downloading the artifact",
        };
        f.write_str(name)
    }
}

/// Transport failures, normalized. Carries structure only; user-facing
/// wording is composed at the orchestrator boundary.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("API endpoint is still the deployment placeholder")]
    NotConfigured,

    #[error("service rejected the request ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("no response within the timeout during {operation}")]
    Timeout { operation: ApiOperation },

    #[error("cannot reach {base_url}")]
    Unreachable { base_url: String },

    #[error("unexpected transport failure during {operation}: {detail}")]
    Unexpected {
        operation: ApiOperation,
        detail: String,
    },
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Refuses to touch the network while the endpoint is the placeholder
    /// left by an incomplete deployment.
    fn ensure_configured(&self) -> Result<()> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(ApiError::NotConfigured)
        }
    }

    fn classify(&self, error: reqwest::Error, operation: ApiOperation) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout { operation }
        } else if error.is_connect() {
            ApiError::Unreachable {
                base_url: self.config.base_url.clone(),
            }
        } else {
            ApiError::Unexpected {
                operation,
                detail: error.to_string(),
            }
        }
    }

    /// Turns a non-2xx response into a ServiceError, preferring the
    /// `{success: false, error}` envelope the service sends with it.
    async fn service_error(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let message = response
            .json::<ErrorEnvelope>()
            .await
            .ok()
            .and_then(|envelope| envelope.error)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });
        ApiError::Service {
            status: status.as_u16(),
            message,
        }
    }

    /// Submit a layer build. The caller supplies the timeout, scaled to the
    /// request's dependency count.
    pub async fn submit(&self, request: &BuildRequest, timeout: Duration) -> Result<BuildResult> {
        self.ensure_configured()?;
        let operation = ApiOperation::SubmitBuild;

        let url = format!("{}/packages", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| self.classify(e, operation))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::service_error(response).await);
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| self.classify(e, operation))?;

        if !body.success {
            return Err(ApiError::Service {
                status: status.as_u16(),
                message: body
                    .error
                    .unwrap_or_else(|| "build request rejected".to_string()),
            });
        }

        Ok(BuildResult {
            artifact_name: body.artifact_name,
            download_locator: body.download_locator,
        })
    }

    /// List produced layers, optionally filtered by a search term.
    pub async fn list(&self, search: &str) -> Result<Vec<ArtifactSummary>> {
        self.ensure_configured()?;
        let operation = ApiOperation::ListArtifacts;

        let url = format!("{}/packages", self.config.base_url);
        let mut request = self.http.get(&url).timeout(DEFAULT_TIMEOUT);
        if !search.is_empty() {
            request = request.query(&[("search", search)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.classify(e, operation))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::service_error(response).await);
        }

        let body: ListResponse = response
            .json()
            .await
            .map_err(|e| self.classify(e, operation))?;

        if !body.success {
            return Err(ApiError::Service {
                status: status.as_u16(),
                message: body
                    .error
                    .unwrap_or_else(|| "failed to load layers".to_string()),
            });
        }

        Ok(body.artifacts)
    }

    /// Exchange an opaque storage key for a time-limited download URL.
    pub async fn resolve_download(&self, storage_key: &str) -> Result<String> {
        self.ensure_configured()?;
        let operation = ApiOperation::ResolveDownload;

        let url = format!(
            "{}/packages/{}/download",
            self.config.base_url,
            urlencoding::encode(storage_key)
        );

        let response = self
            .http
            .get(&url)
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await
            .map_err(|e| self.classify(e, operation))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::service_error(response).await);
        }

        let body: ResolveDownloadResponse = response
            .json()
            .await
            .map_err(|e| self.classify(e, operation))?;

        if !body.success || body.download_url.is_empty() {
            return Err(ApiError::Service {
                status: status.as_u16(),
                message: body
                    .error
                    .unwrap_or_else(|| "no download URL in response".to_string()),
            });
        }

        Ok(body.download_url)
    }

    /// Fetch the artifact bytes from an already-resolved URL.
    /// Returns (total_size, stream)
    pub async fn fetch_artifact(
        &self,
        url: &str,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let operation = ApiOperation::FetchArtifact;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e, operation))?;

        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(move |e| ApiError::Unexpected {
            operation,
            detail: e.to_string(),
        });

        Ok((total_size, stream))
    }
}
