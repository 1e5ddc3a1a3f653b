mod api;
mod app;
mod application;
mod domain;
mod ui;
mod utils;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    iced::application(app::LayerBuilderApp::boot, app::update, app::view)
        .title("Lambda Layer Builder")
        .run()
}
