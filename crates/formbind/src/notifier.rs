//! User-facing notifications
//!
//! Components that want to tell the user something take a `&dyn Notifier`
//! (or an `Arc<dyn Notifier>`); there is no global instance.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyOptions {
    pub kind: NotificationKind,
    pub description: Option<String>,
    /// How long the notification stays visible; `None` leaves it to the sink
    pub duration: Option<Duration>,
}

impl NotifyOptions {
    pub fn new(kind: NotificationKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn success() -> Self {
        Self::new(NotificationKind::Success)
    }

    pub fn warning() -> Self {
        Self::new(NotificationKind::Warning)
    }

    pub fn error() -> Self {
        Self::new(NotificationKind::Error)
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, options: &NotifyOptions);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, message: &str, options: &NotifyOptions) {
        (**self).notify(message, options)
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, message: &str, options: &NotifyOptions) {
        (**self).notify(message, options)
    }
}

/// Writes notifications to the `tracing` log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, options: &NotifyOptions) {
        let description = options.description.as_deref().unwrap_or("");
        match options.kind {
            NotificationKind::Info | NotificationKind::Success => {
                tracing::info!(kind = ?options.kind, description, "{}", message)
            }
            NotificationKind::Warning => tracing::warn!(description, "{}", message),
            NotificationKind::Error => tracing::error!(description, "{}", message),
        }
    }
}
