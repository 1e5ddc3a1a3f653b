pub mod delivery;
pub mod notifier;
pub mod timeout;

pub use delivery::{DeliveryEvent, DeliveryPipeline};
pub use notifier::{NotificationBroadcaster, NOTIFICATION_TTL};
pub use timeout::compute_timeout;
