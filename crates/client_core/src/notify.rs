use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::{
    sync::{broadcast, Mutex},
    time::Instant,
};
use tracing::{info, warn};

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

struct ActiveToast {
    notification: Notification,
    expires_at: Instant,
}

/// Single-slot toast with a fixed lifetime, plus a broadcast of every
/// notification shown.
pub struct Notifier {
    duration: Duration,
    active: Mutex<Option<ActiveToast>>,
    events: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            duration,
            active: Mutex::new(None),
            events,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Replaces whatever toast is showing and restarts the dismiss timer.
    pub async fn show(&self, kind: NotificationKind, message: impl Into<String>) {
        let notification = Notification {
            kind,
            message: message.into(),
        };
        match kind {
            NotificationKind::Success => info!(message = %notification.message, "notification"),
            NotificationKind::Error => warn!(message = %notification.message, "notification"),
        }

        *self.active.lock().await = Some(ActiveToast {
            notification: notification.clone(),
            expires_at: Instant::now() + self.duration,
        });
        let _ = self.events.send(notification);
    }

    pub async fn success(&self, message: impl Into<String>) {
        self.show(NotificationKind::Success, message).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.show(NotificationKind::Error, message).await;
    }

    pub async fn active(&self) -> Option<Notification> {
        let mut guard = self.active.lock().await;
        if guard
            .as_ref()
            .is_some_and(|toast| Instant::now() >= toast.expires_at)
        {
            *guard = None;
        }
        guard.as_ref().map(|toast| toast.notification.clone())
    }

    pub async fn dismiss(&self) {
        *self.active.lock().await = None;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }
}
