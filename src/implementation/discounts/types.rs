//! Discount records

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CommerceError;

/// Discount identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscountId(pub Cow<'static, str>);

impl DiscountId {
    /// Creates a new discount ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// Generates a new unique discount ID.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(format!("disc-{}", uuid::Uuid::new_v4()))
    }
}

impl std::fmt::Display for DiscountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type of discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// `value` percent off the subtotal.
    Percentage,
    /// `value` off the subtotal.
    Fixed,
}

/// Why an existing discount could not be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InactiveReason {
    /// Switched off by an admin.
    Disabled,
    /// Start date is in the future.
    NotStarted,
    /// End date has passed.
    Expired,
    /// Subtotal is below the minimum order amount.
    BelowMinimum {
        /// Required subtotal.
        minimum: u64,
    },
    /// Usage limit reached.
    UsageExhausted,
}

impl std::fmt::Display for InactiveReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "discount is disabled"),
            Self::NotStarted => write!(f, "discount is not active yet"),
            Self::Expired => write!(f, "discount has expired"),
            Self::BelowMinimum { minimum } => {
                write!(f, "order must be at least {}", minimum)
            },
            Self::UsageExhausted => write!(f, "discount usage limit reached"),
        }
    }
}

/// Discount code record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    /// Discount ID.
    pub id:            DiscountId,
    /// Code entered at checkout, stored upper-case.
    pub code:          String,
    /// Admin-facing description.
    pub description:   String,
    /// Type of discount.
    pub discount_type: DiscountType,
    /// Percentage (1..=100) or fixed amount.
    pub value:         u64,
    /// Minimum subtotal required.
    pub min_amount:    Option<u64>,
    /// Cap on the reduction of a percentage discount.
    pub max_amount:    Option<u64>,
    /// Start of the validity window.
    pub starts_at:     DateTime<Utc>,
    /// End of the validity window, open-ended when unset.
    pub ends_at:       Option<DateTime<Utc>>,
    /// Whether the code is switched on.
    pub is_active:     bool,
    /// Maximum number of orders that may use the code.
    pub usage_limit:   Option<u32>,
    /// Orders that used the code so far.
    pub usage_count:   u32,
}

impl Discount {
    /// Creates an active, open-ended percentage discount.
    #[must_use]
    pub fn percentage(code: impl Into<String>, percent: u64, starts_at: DateTime<Utc>) -> Self {
        Self::build(code.into(), DiscountType::Percentage, percent, starts_at)
    }

    /// Creates an active, open-ended fixed-amount discount.
    #[must_use]
    pub fn fixed(code: impl Into<String>, amount: u64, starts_at: DateTime<Utc>) -> Self {
        Self::build(code.into(), DiscountType::Fixed, amount, starts_at)
    }

    fn build(
        code: String, discount_type: DiscountType, value: u64, starts_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DiscountId::generate(),
            code: normalize_code(&code),
            description: String::new(),
            discount_type,
            value,
            min_amount: None,
            max_amount: None,
            starts_at,
            ends_at: None,
            is_active: true,
            usage_limit: None,
            usage_count: 0,
        }
    }

    /// Sets the minimum subtotal.
    #[must_use]
    pub fn with_min_amount(mut self, min_amount: u64) -> Self {
        self.min_amount = Some(min_amount);
        self
    }

    /// Sets the reduction cap.
    #[must_use]
    pub fn with_max_amount(mut self, max_amount: u64) -> Self {
        self.max_amount = Some(max_amount);
        self
    }

    /// Sets the end of the validity window.
    #[must_use]
    pub fn ending_at(mut self, ends_at: DateTime<Utc>) -> Self {
        self.ends_at = Some(ends_at);
        self
    }

    /// Sets the usage limit.
    #[must_use]
    pub fn with_usage_limit(mut self, limit: u32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Checks the record before it is written.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.code.is_empty() {
            return Err(CommerceError::ValidationError("discount code is required".to_string()));
        }
        if self.value == 0 {
            return Err(CommerceError::ValidationError("discount value must be positive".to_string()));
        }
        if self.discount_type == DiscountType::Percentage && self.value > 100 {
            return Err(CommerceError::ValidationError(
                "percentage discount cannot exceed 100".to_string(),
            ));
        }
        if self.ends_at.is_some_and(|end| end < self.starts_at) {
            return Err(CommerceError::ValidationError(
                "discount ends before it starts".to_string(),
            ));
        }
        Ok(())
    }
}

/// Upper-cases and trims a code for lookup.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
