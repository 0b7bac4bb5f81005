//! Collaborators told about session expiry.
//!
//! When a rejected access token cannot be refreshed the client clears the
//! stored credentials, then notifies the host application once through a
//! [`Notifier`] and asks its [`Navigator`] to return to [`LOGIN_ROUTE`].
//! Both calls are fire-and-forget.

use tracing::{error, info, warn};

/// Route the navigator is sent to after the session expires.
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// User-facing message raised by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn session_expired() -> Self {
        Self {
            kind: NotificationKind::Error,
            title: "Session expired".to_string(),
            message: "Your session has expired. Please log in again.".to_string(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub trait Navigator: Send + Sync {
    /// Replaces the current route, discarding navigation history.
    fn replace_route(&self, route: &str);
}

/// Writes notifications to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Error => {
                error!(title = %notification.title, "{}", notification.message)
            }
            NotificationKind::Info => {
                info!(title = %notification.title, "{}", notification.message)
            }
        }
    }
}

/// Navigator for hosts without routes; the request only gets logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn replace_route(&self, route: &str) {
        warn!(route, "Navigation requested but no navigator is attached");
    }
}
