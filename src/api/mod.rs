pub mod client;
pub mod models;

pub use client::{ApiClient, ApiError, ApiOperation};
pub use models::{ApiConfig, ArtifactSummary};
