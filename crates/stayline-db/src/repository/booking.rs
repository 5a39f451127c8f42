//! # Booking Repository
//!
//! Database operations for bookings and booking items.
//!
//! ## Booking Lifecycle (persistence view)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Booking Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert_booking() + insert_item()×N, one transaction            │
//! │                                                                         │
//! │  2. LIFECYCLE WRITES (one transaction per transition)                  │
//! │     └── transition_status() - compare-and-set on the expected state    │
//! │     └── claim_room()        - atomic conditional room assignment       │
//! │     └── cancel()            - compare-and-set over non-terminal states │
//! │                                                                         │
//! │  Every write is guarded by the state it expects: zero rows affected    │
//! │  means someone else moved first, and the caller re-reads to classify.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use stayline_core::{Booking, BookingItem, BookingStatus};

const BOOKING_COLUMNS: &str = "id, code, customer_id, check_in, check_out, guest_count, \
                               status, notes, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, booking_id, room_type_id, room_id, price_cents, \
                            occupant_name, created_at";

/// Repository for booking database operations.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a booking by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    /// Gets a booking by ID, visible only to its owning customer.
    ///
    /// The ownership filter is part of the query, not applied post-fetch:
    /// a non-owned id returns no rows, indistinguishable from a missing one.
    pub async fn get_by_id_for_owner(
        &self,
        id: &str,
        customer_id: &str,
    ) -> DbResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1 AND customer_id = ?2"
        ))
        .bind(id)
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    /// Lists a customer's bookings, newest first.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE customer_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Lists recent bookings across all customers (staff view).
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Gets all items for a booking.
    pub async fn get_items(&self, booking_id: &str) -> DbResult<Vec<BookingItem>> {
        let items = sqlx::query_as::<_, BookingItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM booking_items \
             WHERE booking_id = ?1 ORDER BY created_at"
        ))
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets one booking item by id.
    pub async fn get_item(&self, item_id: &str) -> DbResult<Option<BookingItem>> {
        let item = sqlx::query_as::<_, BookingItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM booking_items WHERE id = ?1"
        ))
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    // =========================================================================
    // Transactional writes
    // =========================================================================

    /// Inserts a booking row.
    pub async fn insert_booking(
        &self,
        conn: &mut SqliteConnection,
        booking: &Booking,
    ) -> DbResult<()> {
        debug!(id = %booking.id, code = %booking.code, "Inserting booking");

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, code, customer_id, check_in, check_out,
                guest_count, status, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&booking.id)
        .bind(&booking.code)
        .bind(&booking.customer_id)
        .bind(booking.check_in)
        .bind(booking.check_out)
        .bind(booking.guest_count)
        .bind(booking.status)
        .bind(&booking.notes)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts a booking item row.
    pub async fn insert_item(
        &self,
        conn: &mut SqliteConnection,
        item: &BookingItem,
    ) -> DbResult<()> {
        debug!(booking_id = %item.booking_id, room_type_id = %item.room_type_id, "Inserting booking item");

        sqlx::query(
            r#"
            INSERT INTO booking_items (
                id, booking_id, room_type_id, room_id,
                price_cents, occupant_name, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.id)
        .bind(&item.booking_id)
        .bind(&item.room_type_id)
        .bind(&item.room_id)
        .bind(item.price_cents)
        .bind(&item.occupant_name)
        .bind(item.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Compare-and-set status transition.
    ///
    /// Returns false when the booking is no longer in `expected` - someone
    /// else transitioned it first. The caller re-reads the row to report
    /// the actual state.
    pub async fn transition_status(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        expected: BookingStatus,
        next: BookingStatus,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET status = ?1, updated_at = ?2
            WHERE id = ?3 AND status = ?4
            "#,
        )
        .bind(next)
        .bind(now)
        .bind(id)
        .bind(expected)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Cancels a booking from any non-terminal state.
    ///
    /// Returns false when the booking is already terminal (or absent).
    pub async fn cancel(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET status = 'cancelled', updated_at = ?1
            WHERE id = ?2 AND status IN
                ('pending_approval', 'pending_payment', 'confirmed', 'checked_in')
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomically claims `room_id` for `item_id`.
    ///
    /// This is the anti-double-booking guard. The UPDATE only lands when:
    /// - the item's booking is still CONFIRMED, and
    /// - the room is not the live assignment of any other item whose
    ///   booking is CONFIRMED or CHECKED_IN.
    ///
    /// SQLite executes the statement atomically under its single writer, so
    /// two concurrent claims for the same room can never both see "no live
    /// conflict". Zero rows affected means the claim lost; the caller
    /// re-reads to classify (booking moved vs. room taken).
    pub async fn claim_room(
        &self,
        conn: &mut SqliteConnection,
        item_id: &str,
        room_id: &str,
    ) -> DbResult<bool> {
        debug!(item_id = %item_id, room_id = %room_id, "Claiming room");

        let result = sqlx::query(
            r#"
            UPDATE booking_items SET room_id = ?1
            WHERE id = ?2
              AND EXISTS (
                  SELECT 1 FROM bookings b
                  WHERE b.id = booking_items.booking_id AND b.status = 'confirmed'
              )
              AND NOT EXISTS (
                  SELECT 1 FROM booking_items other
                  JOIN bookings ob ON ob.id = other.booking_id
                  WHERE other.room_id = ?1
                    AND other.id <> ?2
                    AND ob.status IN ('confirmed', 'checked_in')
              )
            "#,
        )
        .bind(room_id)
        .bind(item_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Merge-patch update: absent fields are left untouched.
    ///
    /// Returns false when the booking does not exist.
    pub async fn apply_patch(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        guest_count: Option<i64>,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                guest_count = COALESCE(?1, guest_count),
                notes = COALESCE(?2, notes),
                updated_at = ?3
            WHERE id = ?4
            "#,
        )
        .bind(guest_count)
        .bind(notes)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Generates a booking business code: BKG-YYYYMMDD-xxxxxxxx
///
/// The date makes codes roughly sortable at the front desk; the uuid
/// segment makes them unique. The UNIQUE constraint on bookings.code is
/// the backstop.
pub fn generate_booking_code() -> String {
    let date_part = Utc::now().format("%Y%m%d");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("BKG-{}-{}", date_part, &suffix[..8])
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use stayline_core::{Customer, Room, RoomStatus, RoomType};

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

        db.rooms()
            .insert_room_type(&RoomType {
                id: "rt-double".into(),
                name: "Double".into(),
                nightly_rate_cents: 10000,
                max_capacity: 2,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        db.rooms()
            .insert_room(&Room {
                id: "room-5".into(),
                room_type_id: "rt-double".into(),
                number: "105".into(),
                status: RoomStatus::Available,
                is_deleted: false,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        db
    }

    fn booking(id: &str, status: BookingStatus) -> Booking {
        Booking {
            id: id.into(),
            code: format!("BKG-20250601-{id}"),
            customer_id: "c-1".into(),
            check_in: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
            guest_count: 2,
            status,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(id: &str, booking_id: &str) -> BookingItem {
        BookingItem {
            id: id.into(),
            booking_id: booking_id.into(),
            room_type_id: "rt-double".into(),
            room_id: None,
            price_cents: Some(30000),
            occupant_name: None,
            created_at: Utc::now(),
        }
    }

    async fn insert(db: &Database, b: &Booking, i: &BookingItem) {
        let mut tx = db.pool().begin().await.unwrap();
        db.bookings().insert_booking(&mut tx, b).await.unwrap();
        db.bookings().insert_item(&mut tx, i).await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_transition_status_compare_and_set() {
        let db = test_db().await;
        insert(&db, &booking("b-1", BookingStatus::PendingApproval), &item("i-1", "b-1")).await;

        let mut conn = db.pool().acquire().await.unwrap();

        // Legal CAS lands
        let moved = db
            .bookings()
            .transition_status(
                &mut conn,
                "b-1",
                BookingStatus::PendingApproval,
                BookingStatus::PendingPayment,
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(moved);

        // CAS against the stale state loses
        let moved_again = db
            .bookings()
            .transition_status(
                &mut conn,
                "b-1",
                BookingStatus::PendingApproval,
                BookingStatus::Confirmed,
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(!moved_again);

        // Release the single pooled connection before the verification read
        drop(conn);
        let current = db.bookings().get_by_id("b-1").await.unwrap().unwrap();
        assert_eq!(current.status, BookingStatus::PendingPayment);
    }

    #[tokio::test]
    async fn test_claim_room_guard_refuses_live_conflict() {
        let db = test_db().await;
        insert(&db, &booking("b-1", BookingStatus::Confirmed), &item("i-1", "b-1")).await;
        insert(&db, &booking("b-2", BookingStatus::Confirmed), &item("i-2", "b-2")).await;

        let mut conn = db.pool().acquire().await.unwrap();

        // First claim wins
        assert!(db.bookings().claim_room(&mut conn, "i-1", "room-5").await.unwrap());

        // Second claim for the same room loses: b-1 holds it live
        assert!(!db.bookings().claim_room(&mut conn, "i-2", "room-5").await.unwrap());

        drop(conn);
        let i1 = db.bookings().get_item("i-1").await.unwrap().unwrap();
        let i2 = db.bookings().get_item("i-2").await.unwrap().unwrap();
        assert_eq!(i1.room_id.as_deref(), Some("room-5"));
        assert_eq!(i2.room_id, None);
    }

    #[tokio::test]
    async fn test_claim_room_succeeds_after_holder_cancelled() {
        let db = test_db().await;
        insert(&db, &booking("b-1", BookingStatus::Confirmed), &item("i-1", "b-1")).await;
        insert(&db, &booking("b-2", BookingStatus::Confirmed), &item("i-2", "b-2")).await;

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(db.bookings().claim_room(&mut conn, "i-1", "room-5").await.unwrap());

        // Holder cancels; the room is no longer live
        assert!(db.bookings().cancel(&mut conn, "b-1", Utc::now()).await.unwrap());

        assert!(db.bookings().claim_room(&mut conn, "i-2", "room-5").await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_room_requires_confirmed_booking() {
        let db = test_db().await;
        insert(&db, &booking("b-1", BookingStatus::PendingApproval), &item("i-1", "b-1")).await;

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(!db.bookings().claim_room(&mut conn, "i-1", "room-5").await.unwrap());
    }

    #[tokio::test]
    async fn test_cancel_only_from_non_terminal() {
        let db = test_db().await;
        insert(&db, &booking("b-1", BookingStatus::CheckedOut), &item("i-1", "b-1")).await;

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(!db.bookings().cancel(&mut conn, "b-1", Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_ownership_filter_in_query() {
        let db = test_db().await;
        insert(&db, &booking("b-1", BookingStatus::PendingApproval), &item("i-1", "b-1")).await;

        let owned = db
            .bookings()
            .get_by_id_for_owner("b-1", "c-1")
            .await
            .unwrap();
        assert!(owned.is_some());

        let foreign = db
            .bookings()
            .get_by_id_for_owner("b-1", "c-other")
            .await
            .unwrap();
        assert!(foreign.is_none());
    }

    #[tokio::test]
    async fn test_apply_patch_ignores_absent_fields() {
        let db = test_db().await;
        let mut b = booking("b-1", BookingStatus::PendingApproval);
        b.notes = Some("late arrival".into());
        insert(&db, &b, &item("i-1", "b-1")).await;

        let mut conn = db.pool().acquire().await.unwrap();
        db.bookings()
            .apply_patch(&mut conn, "b-1", Some(3), None, Utc::now())
            .await
            .unwrap();

        drop(conn);
        let patched = db.bookings().get_by_id("b-1").await.unwrap().unwrap();
        assert_eq!(patched.guest_count, 3);
        // Absent notes field left the stored value untouched
        assert_eq!(patched.notes.as_deref(), Some("late arrival"));
    }

    #[test]
    fn test_generate_booking_code_shape() {
        let code = generate_booking_code();
        assert!(code.starts_with("BKG-"));
        assert_eq!(code.len(), "BKG-".len() + 8 + 1 + 8);
    }
}
