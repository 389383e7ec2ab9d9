//! Transient notification banner.

/// Hint for how long a front end keeps a banner visible.
pub const NOTIFICATION_AUTO_HIDE_MS: u32 = 6_000;

pub const MSG_PERSON_ADDED: &str = "Person added successfully";
pub const MSG_PERSON_UPDATED: &str = "Person updated successfully";
pub const MSG_PERSON_DELETED: &str = "Person deleted successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// One banner message. A newer notification replaces the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub auto_hide_ms: u32,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            auto_hide_ms: NOTIFICATION_AUTO_HIDE_MS,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
            auto_hide_ms: NOTIFICATION_AUTO_HIDE_MS,
        }
    }
}
