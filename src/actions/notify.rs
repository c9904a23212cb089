use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
    Success,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub variant: ToastVariant,
}

impl Toast {
    pub fn info(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            variant: ToastVariant::Default,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            variant: ToastVariant::Success,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            variant: ToastVariant::Destructive,
        }
    }
}

/// Fire-and-forget notification surface.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Writes toasts to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        let description = toast.description.as_deref().unwrap_or("");
        match toast.variant {
            ToastVariant::Destructive => warn!(title = %toast.title, description, "toast"),
            _ => info!(title = %toast.title, description, "toast"),
        }
    }
}

/// Keeps every toast in memory. Cloning shares the log.
#[derive(Debug, Clone, Default)]
pub struct ToastLog {
    entries: Arc<Mutex<Vec<Toast>>>,
}

impl ToastLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Toast> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<Toast> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Notifier for ToastLog {
    fn notify(&self, toast: Toast) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(toast);
    }
}
