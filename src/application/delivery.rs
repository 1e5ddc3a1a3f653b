use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::api::ApiClient;
use crate::domain::AppError;

/// Grace period before the in-flight indicator clears after the primary save
pub const PRIMARY_SETTLE: Duration = Duration::from_millis(3000);
/// Shorter grace period for the fallback path
pub const FALLBACK_SETTLE: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub enum DeliveryEvent {
    /// A save strategy is about to run; show the in-flight indicator.
    Dispatched { file_name: String },
    /// A strategy accepted the save; the artifact is on its way to disk.
    Delivered { file_name: String },
    /// Settle delay elapsed; hide the in-flight indicator.
    IndicatorCleared,
    /// Resolution failed or every strategy raised.
    Failed(AppError),
}

/// Platform save affordance. A successful `trigger` means the save was
/// dispatched; the transfer itself may still be running detached.
#[async_trait]
pub trait SaveAction: Send + Sync {
    async fn trigger(&self, url: &Url, file_name: &str) -> Result<(), AppError>;
}

/// Primary strategy: save silently into the platform downloads directory.
pub struct DirectSave {
    client: ApiClient,
}

impl DirectSave {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SaveAction for DirectSave {
    async fn trigger(&self, url: &Url, file_name: &str) -> Result<(), AppError> {
        let directory = dirs::download_dir()
            .ok_or_else(|| AppError::Io("no downloads directory on this system".to_string()))?;
        let path = directory.join(file_name);
        let file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| AppError::Io(format!("failed to create {}: {}", path.display(), e)))?;

        spawn_transfer(self.client.clone(), url.clone(), file, path);
        Ok(())
    }
}

/// Fallback strategy: let the user pick the location in a native save dialog.
pub struct DialogSave {
    client: ApiClient,
}

impl DialogSave {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SaveAction for DialogSave {
    async fn trigger(&self, url: &Url, file_name: &str) -> Result<(), AppError> {
        let handle = rfd::AsyncFileDialog::new()
            .set_file_name(file_name)
            .save_file()
            .await
            .ok_or_else(|| AppError::Io("save dialog dismissed".to_string()))?;

        let path = handle.path().to_path_buf();
        let file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| AppError::Io(format!("failed to create {}: {}", path.display(), e)))?;

        spawn_transfer(self.client.clone(), url.clone(), file, path);
        Ok(())
    }
}

/// Once the target file exists the save counts as dispatched and runs
/// detached; it cannot be retracted, and failures only reach the log.
fn spawn_transfer(client: ApiClient, url: Url, file: tokio::fs::File, path: PathBuf) {
    tokio::spawn(async move {
        match transfer(client, url, file).await {
            Ok(()) => tracing::info!("artifact saved to {}", path.display()),
            Err(error) => {
                tracing::warn!("artifact transfer to {} failed: {}", path.display(), error)
            }
        }
    });
}

async fn transfer(client: ApiClient, url: Url, mut file: tokio::fs::File) -> Result<(), AppError> {
    let (_total_size, stream) = client.fetch_artifact(url.as_str()).await?;
    let mut stream = stream.boxed();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::Io(format!("write error: {}", e)))?;
    }

    file.sync_all()
        .await
        .map_err(|e| AppError::Io(format!("failed to sync file: {}", e)))?;
    Ok(())
}

/// Resolves a download locator and drives the ordered strategy chain,
/// reporting progress as an event stream.
#[derive(Clone)]
pub struct DeliveryPipeline {
    client: ApiClient,
    primary: Arc<dyn SaveAction>,
    fallback: Arc<dyn SaveAction>,
}

enum DeliveryState {
    Resolve {
        pipeline: DeliveryPipeline,
        locator: String,
        file_name: String,
    },
    Attempt {
        pipeline: DeliveryPipeline,
        url: Url,
        file_name: String,
    },
    Settle {
        delay: Duration,
    },
    Fail {
        error: AppError,
    },
    Finished,
}

impl DeliveryPipeline {
    pub fn new(client: ApiClient) -> Self {
        let primary = Arc::new(DirectSave::new(client.clone()));
        let fallback = Arc::new(DialogSave::new(client.clone()));
        Self {
            client,
            primary,
            fallback,
        }
    }

    /// Substitute the platform strategies (tests use recording fakes).
    pub fn with_strategies(
        client: ApiClient,
        primary: Arc<dyn SaveAction>,
        fallback: Arc<dyn SaveAction>,
    ) -> Self {
        Self {
            client,
            primary,
            fallback,
        }
    }

    /// A locator carrying a scheme is used as-is; anything else is a storage
    /// key exchanged for a URL first. Either way the result must be http(s),
    /// checked before any strategy runs.
    async fn resolve_locator(&self, locator: &str) -> Result<Url, AppError> {
        let resolved = if locator.contains("://") {
            locator.to_string()
        } else {
            self.client.resolve_download(locator).await?
        };

        if !resolved.starts_with("http") {
            return Err(AppError::InvalidLocator(resolved));
        }
        let url = Url::parse(&resolved).map_err(|_| AppError::InvalidLocator(resolved.clone()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(AppError::InvalidLocator(resolved)),
        }
    }

    /// Event order:
    /// - primary accepted:  Dispatched, Delivered, (3000 ms) IndicatorCleared
    /// - fallback accepted: Dispatched, Delivered, (2000 ms) IndicatorCleared
    /// - both raised:       Dispatched, IndicatorCleared, Failed
    /// - bad locator:       Failed
    /// The indicator is never left set on any path.
    pub fn deliver_stream(
        &self,
        locator: String,
        file_name: String,
    ) -> BoxStream<'static, DeliveryEvent> {
        futures::stream::unfold(
            DeliveryState::Resolve {
                pipeline: self.clone(),
                locator,
                file_name,
            },
            |state| async move {
                match state {
                    DeliveryState::Resolve {
                        pipeline,
                        locator,
                        file_name,
                    } => match pipeline.resolve_locator(&locator).await {
                        Ok(url) => Some((
                            DeliveryEvent::Dispatched {
                                file_name: file_name.clone(),
                            },
                            DeliveryState::Attempt {
                                pipeline,
                                url,
                                file_name,
                            },
                        )),
                        Err(error) => {
                            Some((DeliveryEvent::Failed(error), DeliveryState::Finished))
                        }
                    },
                    DeliveryState::Attempt {
                        pipeline,
                        url,
                        file_name,
                    } => match pipeline.primary.trigger(&url, &file_name).await {
                        Ok(()) => Some((
                            DeliveryEvent::Delivered { file_name },
                            DeliveryState::Settle {
                                delay: PRIMARY_SETTLE,
                            },
                        )),
                        Err(primary_error) => {
                            tracing::warn!("primary save strategy failed: {}", primary_error);
                            match pipeline.fallback.trigger(&url, &file_name).await {
                                Ok(()) => Some((
                                    DeliveryEvent::Delivered { file_name },
                                    DeliveryState::Settle {
                                        delay: FALLBACK_SETTLE,
                                    },
                                )),
                                Err(fallback_error) => {
                                    tracing::warn!(
                                        "fallback save strategy failed: {}",
                                        fallback_error
                                    );
                                    Some((
                                        DeliveryEvent::IndicatorCleared,
                                        DeliveryState::Fail {
                                            error: AppError::DeliveryFailed(
                                                fallback_error.to_string(),
                                            ),
                                        },
                                    ))
                                }
                            }
                        }
                    },
                    DeliveryState::Settle { delay } => {
                        tokio::time::sleep(delay).await;
                        Some((DeliveryEvent::IndicatorCleared, DeliveryState::Finished))
                    }
                    DeliveryState::Fail { error } => {
                        Some((DeliveryEvent::Failed(error), DeliveryState::Finished))
                    }
                    DeliveryState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;
    use std::sync::Mutex;

    struct RecordingAction {
        calls: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl RecordingAction {
        fn accepting() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn raising() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail: true,
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SaveAction for RecordingAction {
        async fn trigger(&self, url: &Url, file_name: &str) -> Result<(), AppError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), file_name.to_string()));
            if self.fail {
                Err(AppError::Io("strategy refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn pipeline_with(
        primary: Arc<RecordingAction>,
        fallback: Arc<RecordingAction>,
    ) -> DeliveryPipeline {
        let client = ApiClient::new(ApiConfig::default());
        DeliveryPipeline::with_strategies(client, primary, fallback)
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_success_event_order_and_settle() {
        let primary = RecordingAction::accepting();
        let fallback = RecordingAction::accepting();
        let pipeline = pipeline_with(primary.clone(), fallback.clone());

        let started = tokio::time::Instant::now();
        let events = pipeline
            .deliver_stream(
                "https://cdn.example/k1".to_string(),
                "my-layer.zip".to_string(),
            )
            .collect::<Vec<_>>()
            .await;

        assert!(matches!(
            events[0],
            DeliveryEvent::Dispatched { ref file_name } if file_name == "my-layer.zip"
        ));
        assert!(matches!(events[1], DeliveryEvent::Delivered { .. }));
        assert!(matches!(events[2], DeliveryEvent::IndicatorCleared));
        assert_eq!(events.len(), 3);

        assert!(started.elapsed() >= PRIMARY_SETTLE);
        assert_eq!(primary.call_count(), 1);
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_engaged_when_primary_raises() {
        let primary = RecordingAction::raising();
        let fallback = RecordingAction::accepting();
        let pipeline = pipeline_with(primary.clone(), fallback.clone());

        let started = tokio::time::Instant::now();
        let events = pipeline
            .deliver_stream(
                "https://cdn.example/k1".to_string(),
                "my-layer.zip".to_string(),
            )
            .collect::<Vec<_>>()
            .await;

        assert!(matches!(events[0], DeliveryEvent::Dispatched { .. }));
        assert!(matches!(events[1], DeliveryEvent::Delivered { .. }));
        assert!(matches!(events[2], DeliveryEvent::IndicatorCleared));

        let elapsed = started.elapsed();
        assert!(elapsed >= FALLBACK_SETTLE && elapsed < PRIMARY_SETTLE);
        assert_eq!(primary.call_count(), 1);
        assert_eq!(fallback.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_failure_clears_indicator_before_failing() {
        let primary = RecordingAction::raising();
        let fallback = RecordingAction::raising();
        let pipeline = pipeline_with(primary.clone(), fallback.clone());

        let events = pipeline
            .deliver_stream(
                "https://cdn.example/k1".to_string(),
                "my-layer.zip".to_string(),
            )
            .collect::<Vec<_>>()
            .await;

        assert!(matches!(events[0], DeliveryEvent::Dispatched { .. }));
        assert!(matches!(events[1], DeliveryEvent::IndicatorCleared));
        assert!(matches!(
            events[2],
            DeliveryEvent::Failed(AppError::DeliveryFailed(_))
        ));
        assert_eq!(primary.call_count(), 1);
        assert_eq!(fallback.call_count(), 1);
    }

    #[tokio::test]
    async fn test_non_http_locator_fails_before_any_strategy() {
        let primary = RecordingAction::accepting();
        let fallback = RecordingAction::accepting();
        let pipeline = pipeline_with(primary.clone(), fallback.clone());

        let events = pipeline
            .deliver_stream("ftp://cdn.example/k1".to_string(), "my-layer.zip".to_string())
            .collect::<Vec<_>>()
            .await;

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            DeliveryEvent::Failed(AppError::InvalidLocator(_))
        ));
        assert_eq!(primary.call_count(), 0);
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test]
    async fn test_storage_key_resolves_before_dispatch() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/packages/k1/download")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "downloadUrl": "https://cdn.example/k1"}"#)
            .create_async()
            .await;

        let primary = RecordingAction::accepting();
        let fallback = RecordingAction::accepting();
        let client = ApiClient::new(ApiConfig {
            base_url: server.url(),
        });
        let pipeline =
            DeliveryPipeline::with_strategies(client, primary.clone(), fallback.clone());

        let mut stream =
            pipeline.deliver_stream("k1".to_string(), "my-layer.zip".to_string());

        assert!(matches!(
            stream.next().await,
            Some(DeliveryEvent::Dispatched { .. })
        ));
        assert!(matches!(
            stream.next().await,
            Some(DeliveryEvent::Delivered { .. })
        ));

        let calls = primary.calls.lock().unwrap();
        assert_eq!(calls[0].0, "https://cdn.example/k1");
        assert_eq!(calls[0].1, "my-layer.zip");
    }

    #[tokio::test]
    async fn test_key_resolving_to_non_http_url_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/packages/k1/download")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "downloadUrl": "s3://bucket/k1"}"#)
            .create_async()
            .await;

        let primary = RecordingAction::accepting();
        let fallback = RecordingAction::accepting();
        let client = ApiClient::new(ApiConfig {
            base_url: server.url(),
        });
        let pipeline =
            DeliveryPipeline::with_strategies(client, primary.clone(), fallback.clone());

        let events = pipeline
            .deliver_stream("k1".to_string(), "my-layer.zip".to_string())
            .collect::<Vec<_>>()
            .await;

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            DeliveryEvent::Failed(AppError::InvalidLocator(_))
        ));
        assert_eq!(primary.call_count(), 0);
        assert_eq!(fallback.call_count(), 0);
    }
}
