//! User-facing notifications and the toast shown for them

use std::time::{Duration, Instant};

/// Default time a toast stays on screen
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Error => "Error",
            Self::Info => "Info",
        }
    }
}

/// A fire-and-forget message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Error)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Info)
    }
}

/// Receiver for notifications emitted by session operations
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// The toast currently on screen; a newer notification replaces it
#[derive(Debug, Clone)]
pub struct ToastState {
    current: Option<(Notification, Instant)>,
    duration: Duration,
}

impl Default for ToastState {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl ToastState {
    pub fn new(duration: Duration) -> Self {
        Self {
            current: None,
            duration,
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref().map(|(notification, _)| notification)
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Drop the toast once it has been visible for the configured duration
    pub fn expire(&mut self, now: Instant) {
        if let Some((_, shown_at)) = &self.current {
            if now.saturating_duration_since(*shown_at) >= self.duration {
                self.current = None;
            }
        }
    }

    fn show_at(&mut self, notification: Notification, now: Instant) {
        match notification.kind {
            NotificationKind::Error => tracing::warn!("{}", notification.message),
            NotificationKind::Success | NotificationKind::Info => {
                tracing::info!("{}", notification.message)
            }
        }
        self.current = Some((notification, now));
    }
}

impl NotificationSink for ToastState {
    fn notify(&mut self, notification: Notification) {
        self.show_at(notification, Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toast_is_hidden() {
        let toasts = ToastState::default();
        assert!(!toasts.is_visible());
        assert!(toasts.current().is_none());
    }

    #[test]
    fn test_newest_notification_replaces_current() {
        let mut toasts = ToastState::default();
        toasts.notify(Notification::info("first"));
        toasts.notify(Notification::error("second"));
        assert_eq!(toasts.current(), Some(&Notification::error("second")));
    }

    #[test]
    fn test_dismiss_hides_toast() {
        let mut toasts = ToastState::default();
        toasts.notify(Notification::success("done"));
        toasts.dismiss();
        assert!(!toasts.is_visible());
    }

    #[test]
    fn test_expire_after_duration() {
        let mut toasts = ToastState::new(Duration::from_millis(500));
        let shown = Instant::now();
        toasts.show_at(Notification::success("saved"), shown);

        toasts.expire(shown + Duration::from_millis(499));
        assert!(toasts.is_visible());

        toasts.expire(shown + Duration::from_millis(500));
        assert!(!toasts.is_visible());
    }

    #[test]
    fn test_vec_sink_collects_in_order() {
        let mut sink: Vec<Notification> = Vec::new();
        sink.notify(Notification::info("a"));
        sink.notify(Notification::success("b"));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].kind, NotificationKind::Success);
        assert_eq!(sink[0].kind.label(), "Info");
    }
}
