pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{NotificationEvent, NotificationSettings};
pub use services::dispatcher::NotificationDispatcher;
pub use services::preferences::NotificationPreferencesService;
