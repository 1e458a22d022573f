//! Request-scoped identity passed into every handler.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::errors::CommerceError;

/// User identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub Cow<'static, str>);

impl UserId {
    /// Creates a new user ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// Creates a user ID from a static string slice (zero-copy).
    #[must_use]
    pub fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular shopper.
    #[default]
    Customer,
    /// Back-office administrator.
    Admin,
}

/// Authenticated user attached to a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    /// User ID.
    pub id:    UserId,
    /// Account e-mail.
    pub email: String,
    /// Display name.
    pub name:  String,
    /// Role.
    pub role:  Role,
}

/// Per-request context carrying the authenticated user, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    /// Signed-in user, `None` for guests.
    pub user: Option<SessionUser>,
}

impl RequestContext {
    /// Context for an anonymous visitor.
    #[must_use]
    pub fn guest() -> Self {
        Self { user: None }
    }

    /// Context for a signed-in customer.
    #[must_use]
    pub fn customer(id: UserId, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user: Some(SessionUser {
                id,
                email: email.into(),
                name: name.into(),
                role: Role::Customer,
            }),
        }
    }

    /// Context for an administrator.
    #[must_use]
    pub fn admin(id: UserId, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user: Some(SessionUser {
                id,
                email: email.into(),
                name: name.into(),
                role: Role::Admin,
            }),
        }
    }

    /// Returns the signed-in user or `NotAuthenticated`.
    pub fn require_user(&self) -> Result<&SessionUser, CommerceError> {
        self.user.as_ref().ok_or(CommerceError::NotAuthenticated)
    }

    /// Returns the signed-in admin, `NotAuthenticated` or `NotAuthorized`.
    pub fn require_admin(&self) -> Result<&SessionUser, CommerceError> {
        let user = self.require_user()?;
        if user.role != Role::Admin {
            return Err(CommerceError::NotAuthorized);
        }
        Ok(user)
    }

    /// Whether the request is made by an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == Role::Admin)
    }

    /// ID of the signed-in user, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|u| &u.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_is_not_authenticated() {
        let ctx = RequestContext::guest();
        assert_eq!(ctx.require_user(), Err(CommerceError::NotAuthenticated));
        assert_eq!(ctx.require_admin(), Err(CommerceError::NotAuthenticated));
    }

    #[test]
    fn test_customer_is_not_admin() {
        let ctx = RequestContext::customer(UserId::new("u1"), "a@b.c", "Ana");
        assert!(ctx.require_user().is_ok());
        assert_eq!(ctx.require_admin(), Err(CommerceError::NotAuthorized));
        assert!(!ctx.is_admin());
    }

    #[test]
    fn test_admin_passes_both_checks() {
        let ctx = RequestContext::admin(UserId::new("root"), "admin@b.c", "Root");
        assert!(ctx.require_admin().is_ok());
        assert_eq!(ctx.user_id(), Some(&UserId::new("root")));
    }
}
