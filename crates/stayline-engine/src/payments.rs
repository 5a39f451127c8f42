//! # Payment Application
//!
//! Applies a customer's payment against an invoice.
//!
//! ## Guard Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      pay(actor, invoice, amount)                        │
//! │                                                                         │
//! │  1. actor resolvable?            ── no ──► NotAuthenticated            │
//! │  2. amount > 0?                  ── no ──► Validation                  │
//! │  3. invoice exists?              ── no ──► NotFound                    │
//! │  4. actor owns the booking       ── no ──► Forbidden                   │
//! │     (Invoice → Booking → Customer walk, BEFORE any mutation)           │
//! │  5. invoice open?                ── no ──► InvoiceClosed               │
//! │  6. amount == total?             ── no ──► Validation (AmountMismatch) │
//! │  7. BEGIN: append payment, CAS ISSUED → PAID, COMMIT                   │
//! │     CAS lost ──► rollback, re-read, InvoiceClosed                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Payment application is NOT idempotent from the caller's perspective: a
//! caller retrying a timed-out payment must re-check the invoice status
//! first, not blindly resubmit. The CAS in step 7 is what makes the blind
//! resubmit fail safely with `InvoiceClosed` instead of double-charging.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use stayline_core::{validation, Actor, CoreError, Payment, PaymentMethod, ValidationError};
use stayline_db::{Database, DbError};

use crate::error::{ServiceError, ServiceResult};
use crate::identity::require_actor;

/// Payment operations.
#[derive(Debug, Clone)]
pub struct PaymentService {
    db: Database,
}

impl PaymentService {
    pub(crate) fn new(db: Database) -> Self {
        PaymentService { db }
    }

    /// Applies a full settlement payment against an invoice.
    ///
    /// Current policy is single full settlement: the amount must equal the
    /// invoice total exactly, and the first successful payment flips the
    /// invoice to PAID. Partial accumulation does not exist and is not to
    /// be introduced implicitly.
    pub async fn pay(
        &self,
        actor: Option<&Actor>,
        invoice_id: &str,
        amount_cents: i64,
        method: PaymentMethod,
    ) -> ServiceResult<Payment> {
        let actor = require_actor(actor)?;

        validation::validate_payment_amount(amount_cents)?;

        let invoice = self
            .db
            .invoices()
            .get_by_id(invoice_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", invoice_id))?;

        // Ownership before any mutation: the invoice's booking's customer
        // must be the caller. This is the primary anti-IDOR control.
        let owner = self.db.invoices().owner_user_id(invoice_id).await?;
        if owner.as_deref() != Some(actor.user_id.as_str()) {
            return Err(ServiceError::Forbidden);
        }

        if invoice.status.is_closed() {
            return Err(CoreError::InvoiceClosed {
                invoice_id: invoice.id,
                status: invoice.status,
            }
            .into());
        }

        if amount_cents != invoice.total_cents {
            return Err(ValidationError::AmountMismatch {
                expected_cents: invoice.total_cents,
                actual_cents: amount_cents,
            }
            .into());
        }

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice.id.clone(),
            method,
            amount_cents,
            created_at: Utc::now(),
        };

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        self.db.invoices().add_payment(&mut tx, &payment).await?;

        let settled = self.db.invoices().settle(&mut tx, invoice_id).await?;
        if !settled {
            // A concurrent payment won the CAS; roll the append back and
            // report the invoice as closed with the state that won.
            drop(tx);
            let current = self
                .db
                .invoices()
                .get_by_id(invoice_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Invoice", invoice_id))?;
            return Err(CoreError::InvoiceClosed {
                invoice_id: current.id,
                status: current.status,
            }
            .into());
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            invoice_id = %invoice_id,
            payment_id = %payment.id,
            amount = %payment.amount(),
            method = ?method,
            "Invoice settled"
        );

        Ok(payment)
    }
}
