//! Notification host.
//!
//! Anything may raise a toast through a cloned [`Toasts`] handle; the single
//! [`Toaster`] owned by the shell drains the channel and renders them.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Screen corner toasts are stacked in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

/// Handle for raising toasts.
#[derive(Debug, Clone)]
pub struct Toasts {
    tx: mpsc::UnboundedSender<Toast>,
}

impl Toasts {
    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastKind::Error, message.into());
    }

    fn push(&self, kind: ToastKind, message: String) {
        // the host only goes away during teardown
        let _ = self.tx.send(Toast { kind, message });
    }
}

/// Renders queued toasts and keeps what it has shown.
#[derive(Debug)]
pub struct Toaster {
    position: Position,
    rx: mpsc::UnboundedReceiver<Toast>,
    shown: Vec<Toast>,
}

/// Create a toast handle and the host rendering its toasts.
pub fn channel(position: Position) -> (Toasts, Toaster) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        Toasts { tx },
        Toaster {
            position,
            rx,
            shown: Vec::new(),
        },
    )
}

impl Toaster {
    /// Render every queued toast. Returns how many were shown.
    pub fn flush(&mut self) -> usize {
        let mut count = 0;
        while let Ok(toast) = self.rx.try_recv() {
            match toast.kind {
                ToastKind::Success => info!(position = %self.position, "✔ {}", toast.message),
                ToastKind::Error => error!(position = %self.position, "✖ {}", toast.message),
            }
            self.shown.push(toast);
            count += 1;
        }
        count
    }

    /// Toasts rendered so far.
    pub fn shown(&self) -> &[Toast] {
        &self.shown
    }

    pub const fn position(&self) -> Position {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_renders_in_order() {
        let (toasts, mut toaster) = channel(Position::default());

        toasts.error("first");
        toasts.clone().success("second");

        assert_eq!(toaster.flush(), 2);
        assert_eq!(toaster.shown()[0].kind, ToastKind::Error);
        assert_eq!(toaster.shown()[1].message, "second");
        assert_eq!(toaster.flush(), 0);
    }

    #[test]
    fn test_position_serde() {
        let position: Position = serde_json::from_str("\"top-left\"").unwrap();
        assert_eq!(position, Position::TopLeft);
        assert_eq!(Position::BottomRight.to_string(), "bottom-right");
    }
}
