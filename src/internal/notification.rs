use std::time::{Duration, Instant};

use crate::internal::feed::FetchFailure;

/// Severity of a toast shown over the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    Info,
    Warning,
    Error,
}

impl NotificationType {
    fn timeout(&self) -> Duration {
        match self {
            NotificationType::Info => Duration::from_secs(3),
            NotificationType::Warning => Duration::from_secs(5),
            NotificationType::Error => Duration::from_secs(8),
        }
    }
}

/// A toast message that dismisses itself after its type's timeout.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub notification_type: NotificationType,
    pub timestamp: Instant,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Error)
    }

    /// Error toast naming the action that failed and how to retry it.
    pub fn fetch_failed(failure: &FetchFailure) -> Self {
        Self::error(format!(
            "{} failed: {} (press r to retry)",
            failure.trigger, failure.error
        ))
    }

    fn new(message: impl Into<String>, notification_type: NotificationType) -> Self {
        Self {
            message: message.into(),
            notification_type,
            timestamp: Instant::now(),
        }
    }

    pub fn should_dismiss(&self) -> bool {
        self.timestamp.elapsed() > self.notification_type.timeout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchError;
    use crate::api::query::RequestParams;
    use crate::internal::feed::{FetchRequest, MergeMode, Trigger};

    #[test]
    fn test_fresh_notification_is_visible() {
        let notification = Notification::info("Loaded 25 images");
        assert_eq!(notification.notification_type, NotificationType::Info);
        assert!(!notification.should_dismiss());
    }

    #[test]
    fn test_expired_notification_is_dismissed() {
        let mut notification = Notification::warning("No API key");
        notification.timestamp = Instant::now() - Duration::from_secs(6);
        assert!(notification.should_dismiss());
    }

    #[test]
    fn test_fetch_failed_message() {
        let failure = FetchFailure {
            error: FetchError::HttpStatus(400),
            trigger: Trigger::LoadMore,
            request: FetchRequest {
                seq: 4,
                generation: 1,
                params: RequestParams::page(2),
                mode: MergeMode::Append,
                trigger: Trigger::LoadMore,
            },
        };

        let notification = Notification::fetch_failed(&failure);
        assert_eq!(notification.notification_type, NotificationType::Error);
        assert_eq!(
            notification.message,
            "Load more failed: HTTP error: status 400 (press r to retry)"
        );
    }
}
