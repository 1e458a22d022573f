//! Pure discount evaluation.

use chrono::{DateTime, Utc};

use super::types::{Discount, DiscountType, InactiveReason};
use crate::errors::CommerceError;

/// Computes the reduction a discount grants on `subtotal` at `now`.
///
/// The reduction never exceeds the subtotal. Percentage reductions are
/// capped by `max_amount` when set.
///
/// # Errors
/// `DiscountInactive` when the code is disabled, outside its window, below
/// its minimum order amount or out of uses.
pub fn evaluate_discount(
    discount: &Discount, subtotal: u64, now: DateTime<Utc>,
) -> Result<u64, CommerceError> {
    let reject =
        |reason: InactiveReason| CommerceError::DiscountInactive { code: discount.code.clone(), reason };

    if !discount.is_active {
        return Err(reject(InactiveReason::Disabled));
    }
    if now < discount.starts_at {
        return Err(reject(InactiveReason::NotStarted));
    }
    if discount.ends_at.is_some_and(|end| now > end) {
        return Err(reject(InactiveReason::Expired));
    }
    if let Some(minimum) = discount.min_amount {
        if subtotal < minimum {
            return Err(reject(InactiveReason::BelowMinimum { minimum }));
        }
    }
    if discount.usage_limit.is_some_and(|limit| discount.usage_count >= limit) {
        return Err(reject(InactiveReason::UsageExhausted));
    }

    let reduction = match discount.discount_type {
        DiscountType::Fixed => discount.value,
        DiscountType::Percentage => {
            let raw = subtotal.saturating_mul(discount.value) / 100;
            discount.max_amount.map_or(raw, |cap| raw.min(cap))
        },
    };

    Ok(reduction.min(subtotal))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn start() -> DateTime<Utc> {
        Utc::now() - Duration::days(1)
    }

    #[test]
    fn test_percentage_reduction() {
        let discount = Discount::percentage("save10", 10, start());
        assert_eq!(evaluate_discount(&discount, 1800, Utc::now()), Ok(180));
    }

    #[test]
    fn test_fixed_reduction() {
        let discount = Discount::fixed("FLAT200", 200, start());
        assert_eq!(evaluate_discount(&discount, 1800, Utc::now()), Ok(200));
    }

    #[test]
    fn test_fixed_reduction_capped_at_subtotal() {
        let discount = Discount::fixed("FLAT500", 500, start());
        assert_eq!(evaluate_discount(&discount, 300, Utc::now()), Ok(300));
    }

    #[test]
    fn test_percentage_capped_by_max_amount() {
        let discount = Discount::percentage("BIG50", 50, start()).with_max_amount(400);
        assert_eq!(evaluate_discount(&discount, 2000, Utc::now()), Ok(400));
    }

    #[test]
    fn test_expired_code_fails() {
        let now = Utc::now();
        let discount = Discount::percentage("OLD", 10, now - Duration::days(10))
            .ending_at(now - Duration::days(1));

        let result = evaluate_discount(&discount, 1000, now);
        assert!(matches!(
            result,
            Err(CommerceError::DiscountInactive { reason: InactiveReason::Expired, .. })
        ));
    }

    #[test]
    fn test_not_yet_active_code_fails() {
        let now = Utc::now();
        let discount = Discount::percentage("SOON", 10, now + Duration::days(2));

        let result = evaluate_discount(&discount, 1000, now);
        assert!(matches!(
            result,
            Err(CommerceError::DiscountInactive { reason: InactiveReason::NotStarted, .. })
        ));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let now = Utc::now();
        let discount = Discount::percentage("EDGE", 10, now).ending_at(now);
        assert_eq!(evaluate_discount(&discount, 1000, now), Ok(100));
    }

    #[test]
    fn test_disabled_code_fails() {
        let mut discount = Discount::percentage("OFF", 10, start());
        discount.is_active = false;

        let result = evaluate_discount(&discount, 1000, Utc::now());
        assert!(matches!(
            result,
            Err(CommerceError::DiscountInactive { reason: InactiveReason::Disabled, .. })
        ));
    }

    #[test]
    fn test_below_minimum_fails() {
        let discount = Discount::percentage("MIN1000", 10, start()).with_min_amount(1000);

        let result = evaluate_discount(&discount, 999, Utc::now());
        assert!(matches!(
            result,
            Err(CommerceError::DiscountInactive {
                reason: InactiveReason::BelowMinimum { minimum: 1000 },
                ..
            })
        ));
        assert_eq!(evaluate_discount(&discount, 1000, Utc::now()), Ok(100));
    }

    #[test]
    fn test_usage_limit_enforced() {
        let mut discount = Discount::fixed("ONCE", 50, start()).with_usage_limit(1);
        assert!(evaluate_discount(&discount, 500, Utc::now()).is_ok());

        discount.usage_count = 1;
        let result = evaluate_discount(&discount, 500, Utc::now());
        assert!(matches!(
            result,
            Err(CommerceError::DiscountInactive { reason: InactiveReason::UsageExhausted, .. })
        ));
    }
}
