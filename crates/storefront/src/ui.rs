//! Seams to the presentation layer.
//!
//! State holders never print or navigate themselves. They report through a
//! [`Notifier`] and ask a [`Navigator`] to move the shopper, so the same
//! logic drives the CLI, a GUI shell or a test harness.

use std::sync::Mutex;

use tracing::{info, warn};

/// Well-known routes.
pub mod routes {
    /// Storefront home, target of the redirect after logout.
    pub const HOME: &str = "/";

    /// Login page, target of the redirect after a 401.
    pub const LOGIN: &str = "/login";
}

/// Moves the shopper to another screen.
pub trait Navigator: Send + Sync {
    /// Navigate to `route`.
    fn redirect(&self, route: &str);
}

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

/// A transient message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

/// Shows transient messages to the shopper.
pub trait Notifier: Send + Sync {
    /// Show `notification`.
    fn notify(&self, notification: Notification);
}

// =============================================================================
// Tracing-backed implementations
// =============================================================================

/// Navigator that only logs redirects. Useful for headless processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn redirect(&self, route: &str) {
        info!(route, "Redirect requested");
    }
}

/// Notifier that logs notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Success => info!(message = %notification.message, "Notification"),
            Level::Error => warn!(message = %notification.message, "Notification"),
        }
    }
}

// =============================================================================
// Recording implementations
// =============================================================================

/// Navigator that remembers every redirect.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Redirects requested so far, oldest first.
    #[must_use]
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, route: &str) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.to_owned());
        }
    }
}

/// Notifier that buffers notifications until drained.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|mut n| std::mem::take(&mut *n))
            .unwrap_or_default()
    }

    /// Messages recorded so far, without draining.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.notifications
            .lock()
            .map(|n| n.iter().map(|n| n.message.clone()).collect())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_drains() {
        let notifier = RecordingNotifier::default();
        notifier.notify(Notification::success("Item added to cart!"));
        notifier.notify(Notification::error("Insufficient stock"));

        assert_eq!(notifier.messages(), vec!["Item added to cart!", "Insufficient stock"]);
        let drained = notifier.take();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].level, Level::Error);
        assert!(notifier.take().is_empty());
    }

    #[test]
    fn test_recording_navigator() {
        let navigator = RecordingNavigator::default();
        navigator.redirect(routes::LOGIN);
        assert_eq!(navigator.routes(), vec!["/login"]);
    }
}
