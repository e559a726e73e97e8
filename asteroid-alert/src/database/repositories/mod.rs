//! Database repositories.

pub mod alert_topic;
pub mod notification;
pub mod user;

pub use alert_topic::{ALERT_TOPIC, AlertTopicOps, TopicEntry};
pub use notification::{NotificationRepository, SqlxNotificationRepository};
pub use user::{SqlxUserRepository, UserRepository};
