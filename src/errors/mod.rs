//! Error types for the storefront.

use serde::Serialize;

use crate::implementation::discounts::InactiveReason;

/// Commerce-specific errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommerceError {
    /// Lock acquisition failed.
    #[error("Failed to acquire lock")]
    LockError,
    /// No authenticated user on the request.
    #[error("Not authenticated")]
    NotAuthenticated,
    /// The authenticated user may not perform the operation.
    #[error("Not authorized")]
    NotAuthorized,
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    /// Product slug already exists.
    #[error("Product slug already exists: {0}")]
    ProductSlugTaken(String),
    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    /// Category slug already exists.
    #[error("Category slug already exists: {0}")]
    CategorySlugTaken(String),
    /// Category still referenced by products or child categories.
    #[error("Category is in use: {0}")]
    CategoryInUse(String),
    /// Collection not found.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    /// Collection slug already exists.
    #[error("Collection slug already exists: {0}")]
    CollectionSlugTaken(String),
    /// Cart is empty.
    #[error("Cart is empty")]
    CartEmpty,
    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),
    /// Invalid quantity.
    #[error("Invalid quantity")]
    InvalidQuantity,
    /// Product not available for purchase.
    #[error("Product not available: {0}")]
    ProductNotAvailable(String),
    /// Insufficient inventory.
    #[error("Insufficient inventory for {product_id}: available {available}, requested {requested}")]
    InsufficientInventory {
        /// Product ID.
        product_id: String,
        /// Available quantity.
        available:  u32,
        /// Requested quantity.
        requested:  u32,
    },
    /// Discount code does not exist.
    #[error("Discount not found: {0}")]
    DiscountNotFound(String),
    /// Discount code already exists.
    #[error("Discount code already exists: {0}")]
    DiscountCodeTaken(String),
    /// Discount exists but cannot be applied.
    #[error("Discount {code} is not applicable: {reason}")]
    DiscountInactive {
        /// Discount code.
        code:   String,
        /// Why the discount was rejected.
        reason: InactiveReason,
    },
    /// Destination country not covered by any shipping zone.
    #[error("No shipping zone covers country: {0}")]
    NoZoneMatch(String),
    /// International shipping is switched off.
    #[error("International shipping is not available")]
    InternationalShippingDisabled,
    /// Address not found.
    #[error("Address not found: {0}")]
    AddressNotFound(String),
    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),
    /// Status change not permitted from the current state.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to:   String,
    },
    /// Order cannot be cancelled.
    #[error("Order cannot be cancelled: {0}")]
    OrderNotCancellable(String),
    /// Card payment requested without a gateway.
    #[error("Payment gateway not configured for {0}")]
    PaymentGatewayNotConfigured(String),
    /// Gateway declined or failed.
    #[error("Payment failed: {0}")]
    PaymentFailed(String),
    /// Notification not found.
    #[error("Notification not found: {0}")]
    NotificationNotFound(String),
    /// Rejected upload.
    #[error("Upload rejected: {0}")]
    UploadRejected(String),
    /// Blob storage failure.
    #[error("Storage error: {0}")]
    StorageError(String),
    /// E-mail delivery failure.
    #[error("Email delivery failed: {0}")]
    EmailError(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Internal error.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl CommerceError {
    /// Stable machine-readable code for the error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "unauthenticated",
            Self::NotAuthorized => "unauthorized",
            Self::ProductNotFound(_)
            | Self::CategoryNotFound(_)
            | Self::CollectionNotFound(_)
            | Self::ItemNotInCart(_)
            | Self::DiscountNotFound(_)
            | Self::AddressNotFound(_)
            | Self::OrderNotFound(_)
            | Self::NotificationNotFound(_) => "not_found",
            Self::ProductSlugTaken(_)
            | Self::CategorySlugTaken(_)
            | Self::CollectionSlugTaken(_)
            | Self::DiscountCodeTaken(_)
            | Self::CategoryInUse(_) => "conflict",
            Self::DiscountInactive { .. } => "discount_inactive",
            Self::CartEmpty
            | Self::InvalidQuantity
            | Self::ProductNotAvailable(_)
            | Self::InsufficientInventory { .. } => "cart",
            Self::NoZoneMatch(_) | Self::InternationalShippingDisabled => "shipping",
            Self::InvalidStatusTransition { .. } | Self::OrderNotCancellable(_) => {
                "invalid_transition"
            },
            Self::PaymentGatewayNotConfigured(_) | Self::PaymentFailed(_) => "payment",
            Self::UploadRejected(_) | Self::ValidationError(_) => "validation",
            Self::ConfigError(_) => "config",
            Self::LockError
            | Self::StorageError(_)
            | Self::EmailError(_)
            | Self::InternalError(_) => "internal",
        }
    }

    /// Whether the message is safe to show to an end user as-is.
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        !matches!(self.code(), "internal" | "config")
    }
}

/// Result type for commerce operations.
pub type CommerceResult<T> = Result<T, CommerceError>;

/// `{ success, data?, error? }` envelope returned to the outer surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResponse<T> {
    /// Whether the action succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data:    Option<T>,
    /// Message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error:   Option<String>,
    /// Error kind on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code:    Option<&'static str>,
}

impl<T> ActionResponse<T> {
    /// Successful response.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None, code: None }
    }

    /// Failed response with the given message and code.
    #[must_use]
    pub fn failure(error: impl Into<String>, code: &'static str) -> Self {
        Self { success: false, data: None, error: Some(error.into()), code: Some(code) }
    }
}

impl<T: Serialize> ActionResponse<T> {
    /// Serializes the envelope as JSON for the outer surface.
    pub fn to_json(&self) -> Result<String, CommerceError> {
        serde_json::to_string(self).map_err(|e| CommerceError::InternalError(e.to_string()))
    }
}

/// Runs an action and folds its outcome into an [`ActionResponse`].
///
/// Failures are logged; internal errors are replaced by a generic
/// "Failed to {action}" message.
pub fn run_action<T>(
    action: &str, f: impl FnOnce() -> CommerceResult<T>,
) -> ActionResponse<T> {
    match f() {
        Ok(data) => ActionResponse::ok(data),
        Err(err) => {
            if err.is_user_facing() {
                tracing::warn!(action, code = err.code(), error = %err, "action rejected");
                ActionResponse::failure(err.to_string(), err.code())
            } else {
                tracing::error!(action, error = %err, "action failed");
                ActionResponse::failure(format!("Failed to {}", action), err.code())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_action_success() {
        let response = run_action("get products", || Ok(3));
        assert!(response.success);
        assert_eq!(response.data, Some(3));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_run_action_hides_internal_errors() {
        let response: ActionResponse<()> =
            run_action("get products", || Err(CommerceError::LockError));
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Failed to get products"));
        assert_eq!(response.code, Some("internal"));
    }

    #[test]
    fn test_run_action_keeps_user_facing_message() {
        let response: ActionResponse<()> =
            run_action("checkout", || Err(CommerceError::CartEmpty));
        assert_eq!(response.error.as_deref(), Some("Cart is empty"));
        assert_eq!(response.code, Some("cart"));
    }

    #[test]
    fn test_envelope_serialization_skips_empty_fields() {
        let json = serde_json::to_value(ActionResponse::ok("x")).expect("serialize");
        assert_eq!(json, serde_json::json!({ "success": true, "data": "x" }));
    }

    #[test]
    fn test_failure_to_json() {
        let response: ActionResponse<u32> = ActionResponse::failure("Not authorized", "unauthorized");
        let json = response.to_json().expect("json");
        assert_eq!(json, r#"{"success":false,"error":"Not authorized","code":"unauthorized"}"#);
    }
}
