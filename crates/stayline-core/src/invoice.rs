//! # Invoice Derivation
//!
//! Pure derivation of an invoice from a booking and its items.
//!
//! ## Contract
//! ```text
//! Booking + items ──► InvoiceDraft
//!
//! total = Σ item.price          (NULL prices count as zero)
//! tax   = policy rate × total   (round half up)
//! code  = "INV-" + booking.code
//! one snapshot line per booking item
//! ```
//!
//! Idempotency and persistence are NOT handled here: the orchestrator
//! re-checks for an existing invoice inside the transaction that creates
//! one, backed by the UNIQUE(booking_id) constraint.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::{Booking, BookingItem, TaxRate};

/// One derived invoice line, snapshotting a booking item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLine {
    /// The booking item this line was derived from.
    pub booking_item_id: String,
    pub description: String,
    pub amount_cents: i64,
}

/// A fully computed invoice, not yet persisted and without generated ids.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub code: String,
    pub booking_id: String,
    pub total: Money,
    pub tax: Money,
    pub currency: String,
    pub issued_at: DateTime<Utc>,
    pub lines: Vec<InvoiceLine>,
}

/// Sums the booking's item prices, reading NULL as zero.
///
/// A partially-priced booking is still invoiceable under current policy;
/// callers that care can surface the unpriced items via [`unpriced_items`].
pub fn booking_total(items: &[BookingItem]) -> Money {
    items
        .iter()
        .fold(Money::zero(), |acc, item| acc + item.price_or_zero())
}

/// Ids of items with no price set. Used for observability only - an
/// unpriced item changes nothing about the derivation.
pub fn unpriced_items(items: &[BookingItem]) -> Vec<&str> {
    items
        .iter()
        .filter(|item| item.price_cents.is_none())
        .map(|item| item.id.as_str())
        .collect()
}

/// The invoice business code for a booking.
#[inline]
pub fn invoice_code(booking_code: &str) -> String {
    format!("INV-{}", booking_code)
}

/// Derives the invoice for `booking`.
///
/// Pure: the issue timestamp is a parameter, not a clock read.
pub fn derive(
    booking: &Booking,
    items: &[BookingItem],
    tax_rate: TaxRate,
    currency: &str,
    issued_at: DateTime<Utc>,
) -> InvoiceDraft {
    let total = booking_total(items);

    let lines = items
        .iter()
        .map(|item| {
            let description = match &item.occupant_name {
                Some(name) => format!(
                    "Room stay {} to {} ({})",
                    booking.check_in, booking.check_out, name
                ),
                None => format!("Room stay {} to {}", booking.check_in, booking.check_out),
            };
            InvoiceLine {
                booking_item_id: item.id.clone(),
                description,
                amount_cents: item.price_or_zero().cents(),
            }
        })
        .collect();

    InvoiceDraft {
        code: invoice_code(&booking.code),
        booking_id: booking.id.clone(),
        total,
        tax: total.calculate_tax(tax_rate),
        currency: currency.to_string(),
        issued_at,
        lines,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
