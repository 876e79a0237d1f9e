//! User-facing notices raised by session operations.

use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A short message meant for the person using the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Success!".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error!".to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.title, self.message)
    }
}

/// Sink for notices; front ends decide how to present them.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Records every notice in order.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears the recorded notices.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.lock())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notice>> {
        self.notices
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        self.lock().push(notice);
    }
}

/// Emits notices as log events only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!(title = %notice.title, "{}", notice.message),
            NoticeLevel::Error => tracing::warn!(title = %notice.title, "{}", notice.message),
        }
    }
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_notice_display_includes_title() {
        assert_eq!(
            Notice::error("Incorrect password.").to_string(),
            "Error! Incorrect password."
        );
        assert_eq!(Notice::success("Done").title, "Success!");
    }

    #[test]
    fn test_collecting_notifier_keeps_order_and_drains() {
        let notifier = Arc::new(CollectingNotifier::new());
        let sinks: Vec<Box<dyn Notifier>> =
            vec![Box::new(Arc::clone(&notifier)), Box::new(TracingNotifier)];

        for sink in &sinks {
            sink.notify(Notice::success("first"));
            sink.notify(Notice::error("second"));
        }

        let messages: Vec<_> = notifier.drain().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, ["first", "second"]);
        assert!(notifier.notices().is_empty());
    }
}
