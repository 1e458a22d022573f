//! Payment gateway seam.

use serde::{Deserialize, Serialize};

use crate::errors::CommerceError;

/// Charge request sent to a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Order number the charge belongs to.
    pub order_number:   String,
    /// Amount in the smallest currency unit.
    pub amount:         u64,
    /// Currency code.
    pub currency:       String,
    /// Payer e-mail.
    pub customer_email: String,
}

/// Gateway answer to an authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentOutcome {
    /// Charge accepted.
    Approved {
        /// Gateway transaction reference.
        reference: String,
    },
    /// Charge refused.
    Declined {
        /// Gateway reason.
        reason: String,
    },
}

/// Card payment provider.
pub trait PaymentGateway: Send + Sync {
    /// Gateway name, for logs.
    fn name(&self) -> &str;

    /// Authorizes a charge.
    ///
    /// A refused card is `Ok(Declined)`; `Err` means the gateway itself
    /// could not be reached.
    fn authorize(&self, request: &PaymentRequest) -> Result<PaymentOutcome, CommerceError>;
}
