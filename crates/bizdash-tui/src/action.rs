//! All UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;

use bizdash_core::{
    LoginOutcome, Notice, NoticeLevel, Outcome, RecordId, Resource, StoreSnapshot, UserSession,
};

use crate::screen::ScreenId;

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NoticeLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NoticeLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NoticeLevel::Error,
        }
    }
}

impl From<Notice> for Notification {
    fn from(notice: Notice) -> Self {
        Self {
            message: notice.message,
            level: notice.level,
        }
    }
}

/// Pending confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteRecord {
        resource: Resource,
        id: RecordId,
        name: String,
    },
    Logout,
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteRecord { resource, name, .. } => {
                write!(f, "Delete {} {name}?", resource.singular())
            }
            Self::Logout => f.write_str("Log out?"),
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),

    // ── Session ───────────────────────────────────────────────────
    LoginFinished(LoginOutcome),
    SessionChanged(Option<UserSession>),

    // ── Data (from store subscriptions) ───────────────────────────
    StoreUpdated(Resource, StoreSnapshot),

    // ── Record mutations ──────────────────────────────────────────
    SubmitFinished(Resource, Outcome),
    RemoveFinished(Resource, Outcome),

    // ── Confirm dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Overlays ──────────────────────────────────────────────────
    ToggleHelp,
    Notify(Notification),
}
