use std::time::Duration;

use futures::StreamExt;
use iced::{
    widget::{column, row, text, Space},
    Length, Task,
};

use crate::api::{ApiClient, ApiConfig, ArtifactSummary};
use crate::application::{
    compute_timeout, DeliveryEvent, DeliveryPipeline, NotificationBroadcaster, NOTIFICATION_TTL,
};
use crate::domain::{
    AppError, BuildPhase, BuildResult, DeliveryStatus, NotificationKind,
};
use crate::ui::{self, FormMessage, LayerForm, ListMessage};
use crate::utils::sanitize_filename;

/// Delay between a successful build and the background listing refresh
const LISTING_REFRESH_DELAY: Duration = Duration::from_millis(1000);

pub struct LayerBuilderApp {
    form: LayerForm,
    api_client: ApiClient,
    pipeline: DeliveryPipeline,
    notifier: NotificationBroadcaster,
    phase: BuildPhase,
    delivery: DeliveryStatus,
    artifacts: Vec<ArtifactSummary>,
    search_query: String,
    // Dependency count of the in-flight submission, for timeout guidance
    submitted_dependency_count: usize,
    // Name of the layer whose post-build delivery is running
    current_artifact_name: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Message {
    Form(FormMessage),
    List(ListMessage),
    ArtifactsLoaded {
        result: Result<Vec<ArtifactSummary>, AppError>,
        background: bool,
    },
    BuildFinished(Result<BuildResult, AppError>),
    Delivery(DeliveryEvent),
    RefreshListing,
    AlertExpired(u64),
    DismissDelivery,
}

impl LayerBuilderApp {
    pub fn new() -> Self {
        let api_client = ApiClient::new(ApiConfig::from_env());
        let pipeline = DeliveryPipeline::new(api_client.clone());

        Self {
            form: LayerForm::default(),
            api_client,
            pipeline,
            notifier: NotificationBroadcaster::default(),
            phase: BuildPhase::Idle,
            delivery: DeliveryStatus::default(),
            artifacts: Vec::new(),
            search_query: String::new(),
            submitted_dependency_count: 0,
            current_artifact_name: None,
        }
    }

    pub fn boot() -> (Self, Task<Message>) {
        let app = Self::new();
        let initial_load = load_artifacts(app.api_client.clone(), String::new(), false);
        (app, initial_load)
    }

    /// Replace the visible notification and arm its expiry timer.
    fn notify(&mut self, kind: NotificationKind, text: impl Into<String>) -> Task<Message> {
        let generation = self.notifier.notify(kind, text);
        Task::perform(
            async move {
                tokio::time::sleep(NOTIFICATION_TTL).await;
                generation
            },
            Message::AlertExpired,
        )
    }
}

impl Default for LayerBuilderApp {
    fn default() -> Self {
        Self::new()
    }
}

fn load_artifacts(client: ApiClient, search: String, background: bool) -> Task<Message> {
    Task::perform(
        async move { client.list(&search).await.map_err(AppError::from) },
        move |result| Message::ArtifactsLoaded { result, background },
    )
}

pub fn update(app: &mut LayerBuilderApp, message: Message) -> Task<Message> {
    match message {
        Message::Form(form_message) => {
            let submit = matches!(form_message, FormMessage::SubmitPressed);
            app.form.update(form_message);
            if submit {
                begin_submission(app)
            } else {
                Task::none()
            }
        }
        Message::List(list_message) => match list_message {
            ListMessage::SearchChanged(query) => {
                app.search_query = query.clone();
                load_artifacts(app.api_client.clone(), query, false)
            }
            ListMessage::ClearSearch => {
                app.search_query.clear();
                load_artifacts(app.api_client.clone(), String::new(), false)
            }
            ListMessage::RefreshPressed => {
                load_artifacts(app.api_client.clone(), app.search_query.clone(), false)
            }
            ListMessage::DownloadPressed(index) => begin_manual_download(app, index),
        },
        Message::ArtifactsLoaded { result, background } => match result {
            Ok(artifacts) => {
                app.artifacts = artifacts;
                Task::none()
            }
            Err(error) if background => {
                // Non-critical background work; never masks the build result.
                tracing::warn!("background layer list refresh failed: {}", error);
                Task::none()
            }
            Err(error) => {
                tracing::error!("failed to load layers: {}", error);
                app.notify(
                    NotificationKind::Error,
                    "Failed to load layers. Please check your API configuration.",
                )
            }
        },
        Message::BuildFinished(result) => build_finished(app, result),
        Message::Delivery(event) => handle_delivery_event(app, event),
        Message::RefreshListing => {
            load_artifacts(app.api_client.clone(), app.search_query.clone(), true)
        }
        Message::AlertExpired(generation) => {
            app.notifier.expire(generation);
            Task::none()
        }
        Message::DismissDelivery => {
            app.delivery = DeliveryStatus::default();
            Task::none()
        }
    }
}

fn begin_submission(app: &mut LayerBuilderApp) -> Task<Message> {
    // Only one build in flight system-wide.
    if app.phase == BuildPhase::Submitting {
        return Task::none();
    }

    let request = app.form.build_request();
    if let Err(error) = request.validate() {
        return app.notify(NotificationKind::Error, error.user_message(0));
    }

    let dependency_count = request.dependencies.len();
    app.submitted_dependency_count = dependency_count;

    let notice = if dependency_count > 2 {
        format!(
            "Creating layer with {} dependencies. This may take several minutes...",
            dependency_count
        )
    } else {
        format!("Creating layer with {} dependencies...", dependency_count)
    };
    let alert = app.notify(NotificationKind::Info, notice);

    app.phase = BuildPhase::Submitting;

    let client = app.api_client.clone();
    let timeout = compute_timeout(dependency_count);
    let submit = Task::perform(
        async move { client.submit(&request, timeout).await.map_err(AppError::from) },
        Message::BuildFinished,
    );

    Task::batch([alert, submit])
}

fn build_finished(
    app: &mut LayerBuilderApp,
    result: Result<BuildResult, AppError>,
) -> Task<Message> {
    match result {
        Ok(result) => {
            let file_name = format!(
                "{}.zip",
                sanitize_filename(&result.artifact_name).trim_matches(|c| c == '.' || c == ' ')
            );
            let alert = app.notify(
                NotificationKind::Success,
                format!(
                    "Layer \"{}\" created successfully! Download starting...",
                    result.artifact_name
                ),
            );

            app.phase = BuildPhase::Delivering;
            app.current_artifact_name = Some(result.artifact_name.clone());
            app.form.reset();

            let delivery = Task::stream(
                app.pipeline
                    .deliver_stream(result.download_locator, file_name)
                    .map(Message::Delivery),
            );
            let refresh = Task::perform(
                async { tokio::time::sleep(LISTING_REFRESH_DELAY).await },
                |_| Message::RefreshListing,
            );

            Task::batch([alert, delivery, refresh])
        }
        Err(error) => {
            app.phase = BuildPhase::Idle;
            let message = error.user_message(app.submitted_dependency_count);
            app.notify(NotificationKind::Error, message)
        }
    }
}

fn begin_manual_download(app: &mut LayerBuilderApp, index: usize) -> Task<Message> {
    let Some(artifact) = app.artifacts.get(index) else {
        return Task::none();
    };

    let file_name = if artifact.file_name.ends_with(".zip") {
        artifact.file_name.clone()
    } else {
        format!("{}.zip", artifact.file_name)
    };

    app.current_artifact_name = None;
    Task::stream(
        app.pipeline
            .deliver_stream(artifact.storage_key.clone(), file_name)
            .map(Message::Delivery),
    )
}

fn handle_delivery_event(app: &mut LayerBuilderApp, event: DeliveryEvent) -> Task<Message> {
    match event {
        DeliveryEvent::Dispatched { file_name } => {
            app.delivery = DeliveryStatus {
                in_flight: true,
                file_name,
            };
            Task::none()
        }
        DeliveryEvent::Delivered { file_name } => {
            let after_build = app.phase == BuildPhase::Delivering;
            if after_build {
                app.phase = BuildPhase::Idle;
            }
            let text = match app.current_artifact_name.take() {
                Some(artifact_name) if after_build => format!(
                    "Layer \"{}\" created and downloaded successfully!",
                    artifact_name
                ),
                _ => format!("Layer \"{}\" downloaded successfully!", file_name),
            };
            app.notify(NotificationKind::Success, text)
        }
        DeliveryEvent::IndicatorCleared => {
            app.delivery = DeliveryStatus::default();
            Task::none()
        }
        DeliveryEvent::Failed(error) => {
            let after_build = app.phase == BuildPhase::Delivering;
            if after_build {
                app.phase = BuildPhase::Idle;
            }
            app.current_artifact_name = None;
            let text = if after_build {
                format!(
                    "Layer created but download failed: {}",
                    error.user_message(0)
                )
            } else {
                format!("Failed to download layer: {}", error.user_message(0))
            };
            app.notify(NotificationKind::Error, text)
        }
    }
}

pub fn view(app: &LayerBuilderApp) -> iced::Element<'_, Message> {
    let mut content = column![
        text("Lambda Layer Builder").size(32),
        text("Create and download AWS Lambda Layers with platform-specific dependencies")
            .size(14),
        Space::new().height(Length::Fixed(10.0)),
    ]
    .padding(20)
    .spacing(10);

    if let Some(notification) = app.notifier.current() {
        content = content.push(ui::alert(notification));
    }

    content = content.push(
        row![
            app.form
                .view(app.phase == BuildPhase::Submitting)
                .map(Message::Form),
            ui::list::view(&app.artifacts, &app.search_query).map(Message::List),
        ]
        .spacing(30),
    );

    if app.delivery.in_flight {
        content = content.push(ui::delivery_indicator(&app.delivery, Message::DismissDelivery));
    }

    content.into()
}
