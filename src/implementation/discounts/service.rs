//! Discount code management service

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use tracing::info;

use super::{
    evaluator::evaluate_discount,
    types::{normalize_code, Discount, DiscountId, InactiveReason},
};
use crate::{errors::CommerceError, types::context::RequestContext};

/// Discount code management service.
#[derive(Debug)]
pub struct DiscountService {
    /// Discounts indexed by normalized code.
    discounts: Arc<Mutex<HashMap<String, Discount>>>,
}

impl DiscountService {
    /// Creates a new discount service.
    #[must_use]
    pub fn new() -> Self {
        Self { discounts: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Creates a discount code.
    pub fn create_discount(
        &self, ctx: &RequestContext, discount: Discount,
    ) -> Result<Discount, CommerceError> {
        ctx.require_admin()?;
        let mut discount = discount;
        discount.code = normalize_code(&discount.code);
        discount.validate()?;

        let mut discounts = self.discounts.lock().map_err(|_| CommerceError::LockError)?;
        if discounts.contains_key(&discount.code) {
            return Err(CommerceError::DiscountCodeTaken(discount.code));
        }
        discounts.insert(discount.code.clone(), discount.clone());
        info!(code = %discount.code, "discount created");
        Ok(discount)
    }

    /// Replaces a discount, identified by ID. The code may change.
    pub fn update_discount(
        &self, ctx: &RequestContext, discount: Discount,
    ) -> Result<Discount, CommerceError> {
        ctx.require_admin()?;
        let mut discount = discount;
        discount.code = normalize_code(&discount.code);
        discount.validate()?;

        let mut discounts = self.discounts.lock().map_err(|_| CommerceError::LockError)?;
        let old_code = discounts
            .values()
            .find(|d| d.id == discount.id)
            .map(|d| d.code.clone())
            .ok_or_else(|| CommerceError::DiscountNotFound(discount.id.to_string()))?;

        if old_code != discount.code && discounts.contains_key(&discount.code) {
            return Err(CommerceError::DiscountCodeTaken(discount.code));
        }

        let previous = discounts.remove(&old_code);
        discount.usage_count = previous.map_or(discount.usage_count, |p| p.usage_count);
        discounts.insert(discount.code.clone(), discount.clone());
        Ok(discount)
    }

    /// Removes a discount.
    pub fn remove_discount(
        &self, ctx: &RequestContext, id: &DiscountId,
    ) -> Result<Discount, CommerceError> {
        ctx.require_admin()?;
        let mut discounts = self.discounts.lock().map_err(|_| CommerceError::LockError)?;
        let code = discounts
            .values()
            .find(|d| &d.id == id)
            .map(|d| d.code.clone())
            .ok_or_else(|| CommerceError::DiscountNotFound(id.to_string()))?;
        discounts.remove(&code).ok_or_else(|| CommerceError::DiscountNotFound(id.to_string()))
    }

    /// All discounts, sorted by code.
    pub fn list_discounts(&self, ctx: &RequestContext) -> Result<Vec<Discount>, CommerceError> {
        ctx.require_admin()?;
        let discounts = self.discounts.lock().map_err(|_| CommerceError::LockError)?;
        let mut all: Vec<Discount> = discounts.values().cloned().collect();
        all.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(all)
    }

    /// Gets a discount by code.
    pub fn get_discount(&self, code: &str) -> Result<Discount, CommerceError> {
        let discounts = self.discounts.lock().map_err(|_| CommerceError::LockError)?;
        let code = normalize_code(code);
        discounts.get(&code).cloned().ok_or(CommerceError::DiscountNotFound(code))
    }

    /// Looks up a code and evaluates it against `subtotal`.
    ///
    /// Returns the normalized code and the reduction.
    pub fn apply_code(
        &self, code: &str, subtotal: u64, now: DateTime<Utc>,
    ) -> Result<(String, u64), CommerceError> {
        let discount = self.get_discount(code)?;
        let reduction = evaluate_discount(&discount, subtotal, now)?;
        Ok((discount.code, reduction))
    }

    /// Evaluates a code and counts one use of it under a single lock.
    ///
    /// Returns the normalized code and the reduction.
    ///
    /// # Errors
    /// `DiscountNotFound` for unknown codes, `DiscountInactive` when the code
    /// cannot be applied, including when its last use was just taken.
    pub fn redeem(
        &self, code: &str, subtotal: u64, now: DateTime<Utc>,
    ) -> Result<(String, u64), CommerceError> {
        let mut discounts = self.discounts.lock().map_err(|_| CommerceError::LockError)?;
        let code = normalize_code(code);
        let discount =
            discounts.get_mut(&code).ok_or_else(|| CommerceError::DiscountNotFound(code.clone()))?;
        let reduction = evaluate_discount(discount, subtotal, now)?;
        discount.usage_count = discount.usage_count.saturating_add(1);
        Ok((code, reduction))
    }

    /// Counts one use of a code against its limit.
    ///
    /// # Errors
    /// `DiscountInactive` with `UsageExhausted` once the limit is reached.
    pub fn record_usage(&self, code: &str) -> Result<(), CommerceError> {
        let mut discounts = self.discounts.lock().map_err(|_| CommerceError::LockError)?;
        let code = normalize_code(code);
        let discount =
            discounts.get_mut(&code).ok_or_else(|| CommerceError::DiscountNotFound(code.clone()))?;
        if discount.usage_limit.is_some_and(|limit| discount.usage_count >= limit) {
            return Err(CommerceError::DiscountInactive {
                code,
                reason: InactiveReason::UsageExhausted,
            });
        }
        discount.usage_count = discount.usage_count.saturating_add(1);
        Ok(())
    }

    /// Gives back a use taken by [`Self::redeem`] for an order that was not placed.
    pub fn release_usage(&self, code: &str) -> Result<(), CommerceError> {
        let mut discounts = self.discounts.lock().map_err(|_| CommerceError::LockError)?;
        let code = normalize_code(code);
        let discount =
            discounts.get_mut(&code).ok_or_else(|| CommerceError::DiscountNotFound(code.clone()))?;
        discount.usage_count = discount.usage_count.saturating_sub(1);
        Ok(())
    }
}

impl Default for DiscountService {
    fn default() -> Self {
        Self::new()
    }
}
