//! E-mail templates rendered from order snapshots.

use std::fmt::Write as _;

use super::mailer::OutboundEmail;
use crate::{implementation::order_management::Order, types::StoreConfig};

/// Formats an amount with the store currency.
#[must_use]
pub fn format_money(amount: u64, currency: &str) -> String {
    format!("{currency} {amount}")
}

/// Order confirmation sent after checkout.
#[must_use]
pub fn order_confirmation(order: &Order, config: &StoreConfig) -> OutboundEmail {
    let currency = config.currency.as_str();
    let mut body = format!(
        "Thank you for your order from {}.\n\nOrder number: {}\n\n",
        config.store_name, order.order_number
    );

    for item in &order.items {
        let _ = writeln!(
            body,
            "{} x {} @ {} = {}",
            item.quantity,
            item.name,
            format_money(item.unit_price, currency),
            format_money(item.line_total, currency)
        );
    }

    let _ = writeln!(body, "\nSubtotal: {}", format_money(order.subtotal, currency));
    if order.discount > 0 {
        let code = order.discount_code.as_deref().unwrap_or("discount");
        let _ = writeln!(body, "Discount ({code}): -{}", format_money(order.discount, currency));
    }
    let _ = writeln!(body, "Shipping: {}", format_money(order.shipping, currency));
    let _ = writeln!(body, "Total: {}", format_money(order.total, currency));
    let _ = writeln!(body, "Payment: {}", order.payment_method.display_name());
    let _ = writeln!(body, "\nShipping to: {}", order.shipping_address.one_line());

    OutboundEmail {
        from:      config.sender_email.clone(),
        to:        order.customer_email.clone(),
        subject:   format!("Order confirmation {}", order.order_number),
        text_body: body,
    }
}

/// Status change notice sent after an admin update.
#[must_use]
pub fn status_update(order: &Order, config: &StoreConfig) -> OutboundEmail {
    let body = format!(
        "Your order {} from {} is now {}.\nPayment status: {}.\nTotal: {}\n",
        order.order_number,
        config.store_name,
        order.status.display_name(),
        order.payment_status.display_name(),
        format_money(order.total, &config.currency)
    );

    OutboundEmail {
        from:      config.sender_email.clone(),
        to:        order.customer_email.clone(),
        subject:   format!("Order {} is {}", order.order_number, order.status.display_name()),
        text_body: body,
    }
}
