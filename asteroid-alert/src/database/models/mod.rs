//! Database models.

pub mod notification;
pub mod user;

pub use notification::NotificationDbModel;
pub use user::UserDbModel;
