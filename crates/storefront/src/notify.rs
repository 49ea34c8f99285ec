//! User-visible notifications ("toasts").
//!
//! Containers report the outcome of user actions through a [`Notifier`].
//! Delivery is fire-and-forget: there is no return value and no guarantee
//! anything is shown.

use std::sync::{Arc, Mutex};

use serde::Serialize;

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for toasts.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Shared handle to a notifier.
pub type SharedNotifier = Arc<dyn Notifier>;

/// Emits every toast as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Success | ToastLevel::Info => {
                tracing::info!(level = ?toast.level, "{}", toast.message);
            }
            ToastLevel::Error => tracing::warn!("{}", toast.message),
        }
    }
}

/// Buffers toasts until they are drained.
///
/// The CLI drains it after each command to print the messages; tests use it
/// to assert on what the user would have seen.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every buffered toast, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .map(|mut toasts| std::mem::take(&mut *toasts))
            .unwrap_or_default()
    }

    /// Messages of the buffered toasts, without draining.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.toasts
            .lock()
            .map(|toasts| toasts.iter().map(|t| t.message.clone()).collect())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        tracing::debug!(level = ?toast.level, message = %toast.message, "Toast");
        // Poisoned buffer: drop the toast.
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(toast);
        }
    }
}
