//! # Invoice Repository
//!
//! Database operations for invoices, invoice items, and payments.
//!
//! Two invariants are enforced HERE rather than in application reads:
//!
//! - **One invoice per booking**: `invoices.booking_id` is UNIQUE. A lost
//!   race surfaces as `DbError::UniqueViolation`, which the service layer
//!   re-classifies into an idempotent re-fetch of the winner's invoice.
//! - **Single settlement**: `settle()` is a compare-and-set on the ISSUED
//!   status, so two concurrent payments can never both flip an invoice
//!   to PAID.
//!
//! Payments are append-only: no update or delete exists on purpose.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stayline_core::{Invoice, InvoiceItem, Payment};

const INVOICE_COLUMNS: &str = "id, code, booking_id, status, total_cents, tax_cents, \
                               currency, issued_at, created_at";
const INVOICE_ITEM_COLUMNS: &str =
    "id, invoice_id, booking_item_id, description, amount_cents, created_at";
const PAYMENT_COLUMNS: &str = "id, invoice_id, method, amount_cents, created_at";

/// Repository for invoice and payment operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an invoice by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Gets the invoice of a booking, if one has been derived.
    pub async fn get_by_booking(&self, booking_id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE booking_id = ?1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Transactional variant of [`get_by_booking`], for the idempotency
    /// re-check inside the transaction that derives an invoice.
    ///
    /// [`get_by_booking`]: InvoiceRepository::get_by_booking
    pub async fn find_by_booking(
        &self,
        conn: &mut SqliteConnection,
        booking_id: &str,
    ) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE booking_id = ?1"
        ))
        .bind(booking_id)
        .fetch_optional(conn)
        .await?;

        Ok(invoice)
    }

    /// Gets all lines of an invoice.
    pub async fn get_items(&self, invoice_id: &str) -> DbResult<Vec<InvoiceItem>> {
        let items = sqlx::query_as::<_, InvoiceItem>(&format!(
            "SELECT {INVOICE_ITEM_COLUMNS} FROM invoice_items \
             WHERE invoice_id = ?1 ORDER BY created_at"
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Resolves the identity-provider user id of the customer who owns the
    /// booking behind an invoice (Invoice → Booking → Customer walk).
    ///
    /// This is the anti-IDOR lookup for payment authorization.
    pub async fn owner_user_id(&self, invoice_id: &str) -> DbResult<Option<String>> {
        let user_id: Option<String> = sqlx::query_scalar(
            r#"
            SELECT c.user_id
            FROM invoices i
            JOIN bookings b ON b.id = i.booking_id
            JOIN customers c ON c.id = b.customer_id
            WHERE i.id = ?1
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id)
    }

    /// Gets all payments against an invoice.
    pub async fn get_payments(&self, invoice_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments \
             WHERE invoice_id = ?1 ORDER BY created_at"
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    // =========================================================================
    // Transactional writes
    // =========================================================================

    /// Inserts an invoice row.
    ///
    /// A `UniqueViolation` on `invoices.booking_id` means a concurrent
    /// derivation won; callers re-fetch instead of failing.
    pub async fn insert_invoice(
        &self,
        conn: &mut SqliteConnection,
        invoice: &Invoice,
    ) -> DbResult<()> {
        debug!(id = %invoice.id, code = %invoice.code, booking_id = %invoice.booking_id, "Inserting invoice");

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, code, booking_id, status, total_cents,
                tax_cents, currency, issued_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.code)
        .bind(&invoice.booking_id)
        .bind(invoice.status)
        .bind(invoice.total_cents)
        .bind(invoice.tax_cents)
        .bind(&invoice.currency)
        .bind(invoice.issued_at)
        .bind(invoice.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts an invoice line.
    pub async fn insert_item(
        &self,
        conn: &mut SqliteConnection,
        item: &InvoiceItem,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO invoice_items (
                id, invoice_id, booking_item_id, description, amount_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.invoice_id)
        .bind(&item.booking_item_id)
        .bind(&item.description)
        .bind(item.amount_cents)
        .bind(item.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Records a payment against an invoice.
    pub async fn add_payment(
        &self,
        conn: &mut SqliteConnection,
        payment: &Payment,
    ) -> DbResult<()> {
        debug!(invoice_id = %payment.invoice_id, amount = %payment.amount_cents, "Recording payment");

        sqlx::query(
            r#"
            INSERT INTO payments (id, invoice_id, method, amount_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.invoice_id)
        .bind(payment.method)
        .bind(payment.amount_cents)
        .bind(payment.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Flips an ISSUED invoice to PAID. Compare-and-set: returns false
    /// when the invoice was not in ISSUED (already settled or cancelled).
    pub async fn settle(&self, conn: &mut SqliteConnection, invoice_id: &str) -> DbResult<bool> {
        let result =
            sqlx::query("UPDATE invoices SET status = 'paid' WHERE id = ?1 AND status = 'issued'")
                .bind(invoice_id)
                .execute(conn)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Cancels any DRAFT invoice of a booking. Returns the number of
    /// invoices cancelled (0 or 1 given the UNIQUE constraint).
    pub async fn cancel_drafts(
        &self,
        conn: &mut SqliteConnection,
        booking_id: &str,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE invoices SET status = 'cancelled' WHERE booking_id = ?1 AND status = 'draft'",
        )
        .bind(booking_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::{NaiveDate, Utc};
    use stayline_core::{
        Booking, BookingStatus, Customer, Invoice, InvoiceStatus, Payment, PaymentMethod,
    };

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.customers()
            .insert(&Customer {
                id: "c-1".into(),
                user_id: "u-1".into(),
                full_name: "Alice Moran".into(),
                email: "alice@example.com".into(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let booking = Booking {
            id: "b-1".into(),
            code: "BKG-20250601-abcd1234".into(),
            customer_id: "c-1".into(),
            check_in: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
            guest_count: 2,
            status: BookingStatus::CheckedIn,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut tx = db.pool().begin().await.unwrap();
        db.bookings().insert_booking(&mut tx, &booking).await.unwrap();
        tx.commit().await.unwrap();

        db
    }

    fn invoice(id: &str, status: InvoiceStatus) -> Invoice {
        Invoice {
            id: id.into(),
            code: format!("INV-BKG-20250601-{id}"),
            booking_id: "b-1".into(),
            status,
            total_cents: 30000,
            tax_cents: 4500,
            currency: "USD".into(),
            issued_at: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_second_invoice_for_booking_is_unique_violation() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        db.invoices()
            .insert_invoice(&mut conn, &invoice("inv-1", InvoiceStatus::Issued))
            .await
            .unwrap();

        let err = db
            .invoices()
            .insert_invoice(&mut conn, &invoice("inv-2", InvoiceStatus::Issued))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert!(err.is_unique_violation_on("booking_id"));
    }

    #[tokio::test]
    async fn test_settle_is_compare_and_set() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        db.invoices()
            .insert_invoice(&mut conn, &invoice("inv-1", InvoiceStatus::Issued))
            .await
            .unwrap();

        assert!(db.invoices().settle(&mut conn, "inv-1").await.unwrap());
        // Second settlement loses the CAS
        assert!(!db.invoices().settle(&mut conn, "inv-1").await.unwrap());

        // Release the single pooled connection before the verification read
        drop(conn);
        let settled = db.invoices().get_by_id("inv-1").await.unwrap().unwrap();
        assert_eq!(settled.status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn test_cancel_drafts_only_touches_drafts() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        db.invoices()
            .insert_invoice(&mut conn, &invoice("inv-1", InvoiceStatus::Draft))
            .await
            .unwrap();

        assert_eq!(db.invoices().cancel_drafts(&mut conn, "b-1").await.unwrap(), 1);

        // Already cancelled: nothing further to do
        assert_eq!(db.invoices().cancel_drafts(&mut conn, "b-1").await.unwrap(), 0);

        drop(conn);
        let cancelled = db.invoices().get_by_id("inv-1").await.unwrap().unwrap();
        assert_eq!(cancelled.status, InvoiceStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_owner_walk_and_payments() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        db.invoices()
            .insert_invoice(&mut conn, &invoice("inv-1", InvoiceStatus::Issued))
            .await
            .unwrap();

        db.invoices()
            .add_payment(
                &mut conn,
                &Payment {
                    id: "pay-1".into(),
                    invoice_id: "inv-1".into(),
                    method: PaymentMethod::CreditCard,
                    amount_cents: 30000,
                    created_at: Utc::now(),
                },
            )
            .await
            .unwrap();

        // Release the single pooled connection before the verification reads
        drop(conn);

        let owner = db.invoices().owner_user_id("inv-1").await.unwrap();
        assert_eq!(owner.as_deref(), Some("u-1"));
        assert_eq!(db.invoices().owner_user_id("inv-missing").await.unwrap(), None);

        let payments = db.invoices().get_payments("inv-1").await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount_cents, 30000);
    }
}
