pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{
    BuildPhase, BuildRequest, BuildResult, DeliveryStatus, Notification, NotificationKind,
    RuntimeVersion, TargetPlatform,
};
