//! Notification service

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tracing::debug;

use super::types::{Notification, NotificationId};
use crate::{errors::CommerceError, types::context::RequestContext};

/// Stores in-app notifications.
#[derive(Debug)]
pub struct NotificationService {
    /// Notifications indexed by ID.
    notifications: Arc<Mutex<HashMap<NotificationId, Notification>>>,
}

impl NotificationService {
    /// Creates an empty service.
    #[must_use]
    pub fn new() -> Self {
        Self { notifications: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// The caller's notifications, newest first.
    pub fn list_for(&self, ctx: &RequestContext) -> Result<Vec<Notification>, CommerceError> {
        let user = ctx.require_user()?;
        let notifications = self.notifications.lock().map_err(|_| CommerceError::LockError)?;
        let mut mine: Vec<Notification> =
            notifications.values().filter(|n| n.user_id == user.id).cloned().collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    /// Creates a notification on behalf of an admin.
    pub fn create(
        &self, ctx: &RequestContext, notification: Notification,
    ) -> Result<Notification, CommerceError> {
        ctx.require_admin()?;
        if notification.title.trim().is_empty() || notification.message.trim().is_empty() {
            return Err(CommerceError::ValidationError(
                "title and message are required".to_string(),
            ));
        }
        self.notify(notification)
    }

    /// Stores a system-generated notification.
    pub fn notify(&self, notification: Notification) -> Result<Notification, CommerceError> {
        let mut notifications = self.notifications.lock().map_err(|_| CommerceError::LockError)?;
        debug!(user = %notification.user_id, kind = ?notification.kind, "notification stored");
        notifications.insert(notification.id.clone(), notification.clone());
        Ok(notification)
    }

    /// Marks one of the caller's notifications as read.
    ///
    /// Another user's notification reads as not found.
    pub fn mark_read(
        &self, ctx: &RequestContext, id: &NotificationId,
    ) -> Result<Notification, CommerceError> {
        let user = ctx.require_user()?;
        let mut notifications = self.notifications.lock().map_err(|_| CommerceError::LockError)?;
        let notification = notifications
            .get_mut(id)
            .filter(|n| n.user_id == user.id)
            .ok_or_else(|| CommerceError::NotificationNotFound(id.to_string()))?;
        notification.read = true;
        Ok(notification.clone())
    }

    /// Marks all of the caller's notifications as read; returns how many changed.
    pub fn mark_all_read(&self, ctx: &RequestContext) -> Result<usize, CommerceError> {
        let user = ctx.require_user()?;
        let mut notifications = self.notifications.lock().map_err(|_| CommerceError::LockError)?;
        let mut changed = 0;
        for notification in notifications.values_mut().filter(|n| n.user_id == user.id && !n.read) {
            notification.read = true;
            changed += 1;
        }
        Ok(changed)
    }

    /// Number of unread notifications for the caller.
    pub fn unread_count(&self, ctx: &RequestContext) -> Result<usize, CommerceError> {
        let user = ctx.require_user()?;
        let notifications = self.notifications.lock().map_err(|_| CommerceError::LockError)?;
        Ok(notifications.values().filter(|n| n.user_id == user.id && !n.read).count())
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}
