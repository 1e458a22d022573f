//! Notification records

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::context::UserId;

/// Unique notification identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub Cow<'static, str>);

impl NotificationId {
    /// Creates a notification ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// Generates a new unique notification ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Cow::Owned(format!("ntf-{}", uuid::Uuid::new_v4())))
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// Order placed or updated.
    Order,
    /// Marketing message.
    Promotion,
    /// Store announcement.
    #[default]
    System,
    /// Account event.
    Account,
}

/// In-app message for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification ID.
    pub id:         NotificationId,
    /// Recipient.
    pub user_id:    UserId,
    /// Short title.
    pub title:      String,
    /// Body text.
    pub message:    String,
    /// Kind.
    pub kind:       NotificationKind,
    /// Whether the recipient has read it.
    pub read:       bool,
    /// Storefront path to open.
    pub link:       Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unread notification.
    #[must_use]
    pub fn new(
        user_id: UserId, kind: NotificationKind, title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: NotificationId::generate(),
            user_id,
            title: title.into(),
            message: message.into(),
            kind,
            read: false,
            link: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the link.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}
