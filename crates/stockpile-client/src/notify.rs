//! Transient notifications for failures the views recover from.
//!
//! A failed fetch does not abort a refresh: the view falls back to an empty
//! collection and the failure is handed to a [`Notifier`]. The CLI uses
//! [`TracingNotifier`]; tests use [`NoOpNotifier`] or a collecting one.

use crate::error::ClientError;

// =============================================================================
// Notifier Trait
// =============================================================================

/// Receiver of transient, non-fatal notifications.
pub trait Notifier: Send + Sync {
    /// A fetch of `source` failed and an empty fallback was used.
    fn fetch_failed(&self, source: &str, error: &ClientError);

    /// Something the user should know about that is not an error.
    fn info(&self, message: &str);
}

/// No-op notifier for testing.
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn fetch_failed(&self, _source: &str, _error: &ClientError) {}
    fn info(&self, _message: &str) {}
}

/// Emits notifications as tracing events.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn fetch_failed(&self, source: &str, error: &ClientError) {
        tracing::warn!(
            source,
            retryable = error.is_retryable(),
            error = %error,
            "Failed to load {source}, showing empty data"
        );
    }

    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }
}
