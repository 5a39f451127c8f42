//! # Invoice Derivation & Reads
//!
//! Derives an invoice from a booking at a lifecycle boundary and serves
//! invoice reads under the per-actor view.
//!
//! ## Idempotency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │            ensure_invoice (inside the caller's transaction)            │
//! │                                                                         │
//! │  1. SELECT invoice WHERE booking_id  ──► found? return it              │
//! │  2. derive totals in stayline-core (NULL prices read as zero)          │
//! │  3. INSERT invoice                                                     │
//! │        │                                                                │
//! │        ├── ok ──► INSERT lines, return                                 │
//! │        │                                                                │
//! │        └── UNIQUE(booking_id) violation                                │
//! │              └──► a concurrent derivation won: re-fetch the winner     │
//! │                                                                         │
//! │  Two concurrent derivations can race past step 1; the constraint in    │
//! │  step 3 makes exactly one of them insert.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, info, warn};
use uuid::Uuid;

use stayline_core::invoice::{derive, unpriced_items};
use stayline_core::{
    Actor, Booking, BookingEvent, BookingItem, BookingStatus, CoreError, Invoice, InvoiceItem,
    InvoiceStatus, Payment, TaxRate, CURRENCY, TAX_RATE_BPS,
};
use stayline_db::{Database, DbError};

use crate::error::{ServiceError, ServiceResult};
use crate::identity::{require_actor, require_staff};

/// An invoice with its lines and payments, for read responses.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InvoiceDetails {
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
    pub payments: Vec<Payment>,
}

/// Derives (or returns the existing) invoice for `booking`, inside the
/// caller's transaction.
///
/// Does not mutate the booking's own status. The booking's items are read
/// by the caller before the transaction opens; no in-scope operation
/// mutates prices concurrently.
pub(crate) async fn ensure_invoice(
    db: &Database,
    conn: &mut SqliteConnection,
    booking: &Booking,
    items: &[BookingItem],
    now: DateTime<Utc>,
) -> ServiceResult<Invoice> {
    if let Some(existing) = db.invoices().find_by_booking(conn, &booking.id).await? {
        debug!(booking_id = %booking.id, invoice_id = %existing.id, "Invoice already derived");
        return Ok(existing);
    }

    let unpriced = unpriced_items(items);
    if !unpriced.is_empty() {
        // Preserved behavior: an unpriced item bills as zero. Logged so a
        // provisionally priced booking is visible in the audit trail.
        warn!(booking_id = %booking.id, items = ?unpriced, "Deriving invoice with unpriced items");
    }

    let draft = derive(booking, items, TaxRate::from_bps(TAX_RATE_BPS), CURRENCY, now);

    let invoice = Invoice {
        id: Uuid::new_v4().to_string(),
        code: draft.code,
        booking_id: draft.booking_id,
        status: InvoiceStatus::Issued,
        total_cents: draft.total.cents(),
        tax_cents: draft.tax.cents(),
        currency: draft.currency,
        issued_at: draft.issued_at,
        created_at: now,
    };

    match db.invoices().insert_invoice(conn, &invoice).await {
        Ok(()) => {}
        Err(err) if err.is_unique_violation_on("booking_id") => {
            // Lost the derivation race: the winner's invoice is the invoice.
            let winner = db
                .invoices()
                .find_by_booking(conn, &booking.id)
                .await?
                .ok_or(ServiceError::Storage(err))?;
            debug!(booking_id = %booking.id, invoice_id = %winner.id, "Concurrent derivation won");
            return Ok(winner);
        }
        Err(err) => return Err(err.into()),
    }

    for line in &draft.lines {
        let item = InvoiceItem {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice.id.clone(),
            booking_item_id: Some(line.booking_item_id.clone()),
            description: line.description.clone(),
            amount_cents: line.amount_cents,
            created_at: now,
        };
        db.invoices().insert_item(conn, &item).await?;
    }

    info!(
        booking_id = %booking.id,
        invoice_id = %invoice.id,
        total = %invoice.total(),
        tax = %invoice.tax(),
        "Invoice issued"
    );

    Ok(invoice)
}

/// Invoice operations under the per-actor view.
#[derive(Debug, Clone)]
pub struct InvoiceService {
    db: Database,
}

impl InvoiceService {
    pub(crate) fn new(db: Database) -> Self {
        InvoiceService { db }
    }

    /// Staff: derive the invoice of a billed booking, or return the one
    /// that already exists. Safe to call repeatedly.
    ///
    /// Derivation is only meaningful once the stay is billable; other
    /// states fail with a Status error rather than issuing early.
    pub async fn ensure_for_booking(
        &self,
        actor: Option<&Actor>,
        booking_id: &str,
    ) -> ServiceResult<Invoice> {
        require_staff(actor)?;

        let booking = self
            .db
            .bookings()
            .get_by_id(booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking", booking_id))?;

        if !matches!(
            booking.status,
            BookingStatus::CheckedIn | BookingStatus::CheckedOut
        ) {
            return Err(CoreError::Status {
                current: booking.status,
                event: BookingEvent::CheckOut.name(),
            }
            .into());
        }

        let items = self.db.bookings().get_items(booking_id).await?;

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        let invoice = ensure_invoice(&self.db, &mut tx, &booking, &items, Utc::now()).await?;
        tx.commit().await.map_err(DbError::from)?;

        Ok(invoice)
    }

    /// Gets an invoice with lines and payments.
    ///
    /// Customers resolve only invoices whose booking they own; a foreign
    /// invoice reads as absent, leaking nothing.
    pub async fn get(&self, actor: Option<&Actor>, invoice_id: &str) -> ServiceResult<InvoiceDetails> {
        let actor = require_actor(actor)?;

        let invoice = self
            .db
            .invoices()
            .get_by_id(invoice_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", invoice_id))?;

        if !actor.is_staff() {
            let owner = self.db.invoices().owner_user_id(invoice_id).await?;
            if owner.as_deref() != Some(actor.user_id.as_str()) {
                return Err(ServiceError::not_found("Invoice", invoice_id));
            }
        }

        let items = self.db.invoices().get_items(invoice_id).await?;
        let payments = self.db.invoices().get_payments(invoice_id).await?;

        Ok(InvoiceDetails {
            invoice,
            items,
            payments,
        })
    }

    /// Gets the invoice of a booking under the same per-actor view.
    pub async fn for_booking(
        &self,
        actor: Option<&Actor>,
        booking_id: &str,
    ) -> ServiceResult<Invoice> {
        let actor = require_actor(actor)?;

        let invoice = self
            .db
            .invoices()
            .get_by_booking(booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", booking_id))?;

        if !actor.is_staff() {
            let owner = self.db.invoices().owner_user_id(&invoice.id).await?;
            if owner.as_deref() != Some(actor.user_id.as_str()) {
                return Err(ServiceError::not_found("Invoice", booking_id));
            }
        }

        Ok(invoice)
    }
}
