use log::info;

/// Fire-and-forget notification emission. The core never awaits or retries
/// delivery; implementations must not block the calling trade.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, user_id: &str, category: &str, title: &str, body: &str);
}

/// Default sink that records the emission in the application log
#[derive(Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn notify(&self, user_id: &str, category: &str, title: &str, body: &str) {
        info!(
            "Notification [{}] for user {}: {} - {}",
            category, user_id, title, body
        );
    }
}
