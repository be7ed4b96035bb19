//! User-visible error notifications.
//!
//! Store operations return typed results. A UI hands those results to
//! [`report`], which shows exactly one message through a
//! [`NotificationSink`] when the operation failed.

use std::sync::{Mutex, PoisonError};

use crate::error::CartError;

/// Something that can show a one-line error message to the user.
pub trait NotificationSink: Send + Sync {
    fn error(&self, message: &str);
}

/// Logs notifications at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn error(&self, message: &str) {
        tracing::warn!(notification = %message, "Cart notification");
    }
}

/// Keeps every message it receives, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take and clear the received messages.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl NotificationSink for RecordingSink {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

/// Show the error's user message on `sink` if `result` failed.
pub fn report<T>(sink: &dyn NotificationSink, result: Result<T, CartError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "Cart operation failed");
            sink.error(e.user_message());
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rocketshoes_core::ProductId;

    use super::*;
    use crate::error::REMOVE_FAILED;

    #[test]
    fn test_report_success_is_silent() {
        let sink = RecordingSink::new();
        assert_eq!(report(&sink, Ok(5)), Some(5));
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_report_failure_notifies_once() {
        let sink = RecordingSink::new();
        let result: Result<(), CartError> = Err(CartError::NotInCart(ProductId::new(99)));
        assert_eq!(report(&sink, result), None);
        assert_eq!(sink.messages(), vec![REMOVE_FAILED.to_string()]);
    }

    #[test]
    fn test_drain_clears() {
        let sink = RecordingSink::new();
        sink.error("a");
        sink.error("b");
        assert_eq!(sink.drain(), vec!["a".to_string(), "b".to_string()]);
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_poisoned_sink_still_records() {
        let sink = RecordingSink::new();
        sink.error("before");
        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = sink.messages.lock().unwrap();
            panic!("poison");
        }));
        assert!(poisoned.is_err());

        sink.error("after");
        assert_eq!(sink.messages(), vec!["before".to_string(), "after".to_string()]);
    }
}
