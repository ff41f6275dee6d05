//! Toast notifications. The store and guards emit toasts through a [`Notifier`];
//! the UI decides how to show them.

use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub title: String,
    pub detail: Option<String>,
    /// Sticky toasts stay until dismissed.
    pub sticky: bool,
}

impl Toast {
    pub fn new(level: ToastLevel, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            detail: None,
            sticky: false,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }

    #[must_use]
    pub fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }
}

pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, toast: Toast);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, toast: Toast) {
        (**self).notify(toast);
    }
}

/// Emits toasts as tracing events. Used by the CLI.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        let detail = toast.detail.as_deref().unwrap_or_default();
        match toast.level {
            ToastLevel::Success | ToastLevel::Info => info!(title = %toast.title, detail, "toast"),
            ToastLevel::Warning => warn!(title = %toast.title, detail, "toast"),
            ToastLevel::Danger => error!(title = %toast.title, detail, "toast"),
        }
    }
}

/// Buffers toasts until a UI drains them.
#[derive(Clone, Debug, Default)]
pub struct ToastQueue {
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every pending toast in arrival order.
    pub fn drain(&self) -> Vec<Toast> {
        let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *toasts)
    }

    /// Copies the pending toasts without removing them.
    pub fn pending(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, toast: Toast) {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(toast);
    }
}
