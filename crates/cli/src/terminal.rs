//! Terminal implementations of the presentation seams.

use std::sync::atomic::{AtomicBool, Ordering};

use vastraverse_storefront::ui::{Level, Navigator, Notification, Notifier, routes};

/// Prints notifications to stdout.
#[derive(Debug, Default)]
pub struct TerminalNotifier {
    shown_error: AtomicBool,
}

impl TerminalNotifier {
    /// Whether an error has already been shown to the shopper.
    #[must_use]
    pub fn has_shown_error(&self) -> bool {
        self.shown_error.load(Ordering::SeqCst)
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Success => println!("✓ {}", notification.message),
            Level::Error => {
                self.shown_error.store(true, Ordering::SeqCst);
                println!("✗ {}", notification.message);
            }
        }
    }
}

/// A terminal has no screens; redirects become hints.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, route: &str) {
        if route == routes::LOGIN {
            println!("Your session has ended. Run `vastraverse login` to sign in again.");
        }
    }
}
