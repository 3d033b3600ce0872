//! Presentation collaborators
//!
//! Requests sent through these traits are fire-and-forget: the core never
//! waits on them and never renders anything itself.

use crate::api::CommentId;

/// Something the user has to confirm before it happens
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfirmAction {
    DeleteComment(CommentId),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OverlayRequest {
    /// Ask the user to sign in
    Authentication,

    Confirmation {
        heading: String,
        text: String,
        confirm_label: String,
        action: ConfirmAction,
    },
}

pub trait Overlay: Send + Sync {
    fn show(&self, req: OverlayRequest);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlertIcon {
    Share,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alert {
    pub icon: AlertIcon,
    pub text: String,
}

pub trait Alerts: Send + Sync {
    fn show_alert(&self, alert: Alert);
}

pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> anyhow::Result<()>;
}
