//! # Booking Orchestrator
//!
//! The façade composing pricing, lifecycle rules, room assignment, and
//! invoice derivation under a per-actor view.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 One transaction per lifecycle transition               │
//! │                                                                         │
//! │  1. Gate the actor (require_actor / require_staff)                     │
//! │  2. Read + validate against stayline-core rules (pool reads)           │
//! │  3. BEGIN                                                              │
//! │  4.   compare-and-set write guarded by the state step 2 saw            │
//! │  5.   side effects of the transition (invoice, draft cancellation)     │
//! │  6. COMMIT                                                             │
//! │  7. Fire-and-forget notification (creation only), after commit        │
//! │                                                                         │
//! │  A lost compare-and-set rolls back and re-reads to report the state    │
//! │  that actually won - a guard failure never leaves partial writes.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use stayline_core::state::ensure_room_assigned;
use stayline_core::{
    assignment, pricing, transition, validation, Actor, ApprovalTarget, Booking, BookingEvent,
    BookingItem, BookingStatus, CoreError, Customer, Invoice,
};
use stayline_db::{generate_booking_code, Database, DbError};

use crate::error::{ServiceError, ServiceResult};
use crate::identity::{require_actor, require_staff};
use crate::invoices::ensure_invoice;
use crate::notify::NotificationSender;

// =============================================================================
// Operation DTOs
// =============================================================================

/// One requested room-type line.
///
/// There is deliberately no price, status, or room field here: prices come
/// from the room type's current rate, the initial status is forced by the
/// operation, and rooms are assigned by staff later. Client-supplied values
/// for those cannot exist, let alone be trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBookingItem {
    pub room_type_id: String,
    pub occupant_name: Option<String>,
}

/// A booking creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_count: i64,
    pub notes: Option<String>,
    pub items: Vec<NewBookingItem>,
}

/// Initial state of a staff walk-in booking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkInPolicy {
    /// Guest will settle later; booking waits in PENDING_PAYMENT.
    PendingPayment,
    /// Guest is at the desk; booking is confirmed immediately.
    #[default]
    Confirmed,
}

impl WalkInPolicy {
    const fn status(self) -> BookingStatus {
        match self {
            WalkInPolicy::PendingPayment => BookingStatus::PendingPayment,
            WalkInPolicy::Confirmed => BookingStatus::Confirmed,
        }
    }
}

/// Merge-patch for staff booking updates: absent fields stay untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingPatch {
    pub guest_count: Option<i64>,
    pub notes: Option<String>,
}

/// A booking with its items, for read responses.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    pub booking: Booking,
    pub items: Vec<BookingItem>,
}

// =============================================================================
// Booking Service
// =============================================================================

/// Booking operations under the per-actor view.
#[derive(Clone)]
pub struct BookingService {
    db: Database,
    notifier: Arc<dyn NotificationSender>,
}

impl BookingService {
    pub(crate) fn new(db: Database, notifier: Arc<dyn NotificationSender>) -> Self {
        BookingService { db, notifier }
    }

    // =========================================================================
    // Customer view
    // =========================================================================

    /// Creates a booking for the calling customer.
    ///
    /// Dates are validated, every item is priced from its room type's
    /// current rate, and the initial state is forced to PENDING_APPROVAL.
    pub async fn create_booking(
        &self,
        actor: Option<&Actor>,
        request: NewBooking,
    ) -> ServiceResult<BookingDetails> {
        let actor = require_actor(actor)?;
        let customer = self.resolve_customer(actor).await?;

        self.insert_booking(&customer, request, BookingStatus::PendingApproval)
            .await
    }

    /// Staff: creates a walk-in booking for a known customer, starting in
    /// the policy-selected state.
    pub async fn create_walk_in(
        &self,
        actor: Option<&Actor>,
        customer_id: &str,
        request: NewBooking,
        policy: WalkInPolicy,
    ) -> ServiceResult<BookingDetails> {
        require_staff(actor)?;

        let customer = self
            .db
            .customers()
            .find_by_id(customer_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer", customer_id))?;

        self.insert_booking(&customer, request, policy.status()).await
    }

    /// Lists the calling customer's bookings, newest first.
    ///
    /// The ownership filter is part of the query; other customers' records
    /// are invisible, not filtered post-fetch.
    pub async fn my_bookings(&self, actor: Option<&Actor>) -> ServiceResult<Vec<Booking>> {
        let actor = require_actor(actor)?;
        let customer = self.resolve_customer(actor).await?;

        Ok(self.db.bookings().list_for_customer(&customer.id).await?)
    }

    /// Gets one of the calling customer's bookings with its items.
    /// A foreign booking reads as absent.
    pub async fn my_booking(
        &self,
        actor: Option<&Actor>,
        booking_id: &str,
    ) -> ServiceResult<BookingDetails> {
        let actor = require_actor(actor)?;
        let customer = self.resolve_customer(actor).await?;

        let booking = self
            .db
            .bookings()
            .get_by_id_for_owner(booking_id, &customer.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking", booking_id))?;

        let items = self.db.bookings().get_items(booking_id).await?;
        Ok(BookingDetails { booking, items })
    }

    // =========================================================================
    // Staff view: reads
    // =========================================================================

    /// Staff: gets any booking with its items.
    pub async fn get_booking(
        &self,
        actor: Option<&Actor>,
        booking_id: &str,
    ) -> ServiceResult<BookingDetails> {
        require_staff(actor)?;

        let booking = self.fetch_booking(booking_id).await?;
        let items = self.db.bookings().get_items(booking_id).await?;
        Ok(BookingDetails { booking, items })
    }

    /// Staff: lists recent bookings across all customers.
    pub async fn list_recent(
        &self,
        actor: Option<&Actor>,
        limit: i64,
    ) -> ServiceResult<Vec<Booking>> {
        require_staff(actor)?;
        Ok(self.db.bookings().list_recent(limit).await?)
    }

    // =========================================================================
    // Staff view: lifecycle transitions
    // =========================================================================

    /// Staff: approves a pending booking into the target state.
    pub async fn approve(
        &self,
        actor: Option<&Actor>,
        booking_id: &str,
        target: ApprovalTarget,
    ) -> ServiceResult<Booking> {
        require_staff(actor)?;
        self.apply_event(booking_id, BookingEvent::Approve { target })
            .await
    }

    /// Staff: acknowledges payment, confirming an approved booking.
    pub async fn confirm(&self, actor: Option<&Actor>, booking_id: &str) -> ServiceResult<Booking> {
        require_staff(actor)?;
        self.apply_event(booking_id, BookingEvent::Confirm).await
    }

    /// Staff: checks a confirmed booking in. Requires an assigned room.
    pub async fn check_in(
        &self,
        actor: Option<&Actor>,
        booking_id: &str,
    ) -> ServiceResult<Booking> {
        require_staff(actor)?;

        let booking = self.fetch_booking(booking_id).await?;
        transition(booking.status, BookingEvent::CheckIn)?;

        let items = self.db.bookings().get_items(booking_id).await?;
        ensure_room_assigned(booking_id, &items)?;

        self.apply_event(booking_id, BookingEvent::CheckIn).await
    }

    /// Staff: checks a booking out and derives its invoice (idempotently)
    /// in the same transaction.
    pub async fn check_out(
        &self,
        actor: Option<&Actor>,
        booking_id: &str,
    ) -> ServiceResult<(Booking, Invoice)> {
        require_staff(actor)?;

        let booking = self.fetch_booking(booking_id).await?;
        let step = transition(booking.status, BookingEvent::CheckOut)?;
        let items = self.db.bookings().get_items(booking_id).await?;

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let moved = self
            .db
            .bookings()
            .transition_status(&mut tx, booking_id, booking.status, step.next, now)
            .await?;
        if !moved {
            drop(tx);
            return Err(self.status_conflict(booking_id, BookingEvent::CheckOut).await);
        }

        let invoice = ensure_invoice(&self.db, &mut tx, &booking, &items, now).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(booking_id = %booking_id, invoice_id = %invoice.id, "Booking checked out");

        let booking = self.fetch_booking(booking_id).await?;
        Ok((booking, invoice))
    }

    /// Staff: cancels a booking from any non-terminal state. An existing
    /// DRAFT invoice is cancelled with it; no new invoice is created.
    pub async fn cancel(&self, actor: Option<&Actor>, booking_id: &str) -> ServiceResult<Booking> {
        require_staff(actor)?;

        let booking = self.fetch_booking(booking_id).await?;
        transition(booking.status, BookingEvent::Cancel)?;

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let moved = self.db.bookings().cancel(&mut tx, booking_id, now).await?;
        if !moved {
            drop(tx);
            return Err(self.status_conflict(booking_id, BookingEvent::Cancel).await);
        }

        let drafts = self.db.invoices().cancel_drafts(&mut tx, booking_id).await?;
        if drafts > 0 {
            info!(booking_id = %booking_id, "Draft invoice cancelled with booking");
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(booking_id = %booking_id, "Booking cancelled");
        self.fetch_booking(booking_id).await
    }

    /// Staff: assigns a physical room to one of the booking's items.
    ///
    /// The type-compatibility rules run in stayline-core; the liveness
    /// check is the atomic claim in the persistence layer, whose zero-row
    /// result is re-classified here.
    pub async fn assign_room(
        &self,
        actor: Option<&Actor>,
        booking_id: &str,
        item_id: &str,
        room_id: &str,
    ) -> ServiceResult<BookingItem> {
        require_staff(actor)?;

        let booking = self.fetch_booking(booking_id).await?;

        let item = self
            .db
            .bookings()
            .get_item(item_id)
            .await?
            .filter(|item| item.booking_id == booking_id)
            .ok_or_else(|| ServiceError::not_found("BookingItem", item_id))?;

        let room = self
            .db
            .rooms()
            .find_room(room_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Room", room_id))?;

        assignment::validate_room_for_item(&booking, &item, &room)?;

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let claimed = self.db.bookings().claim_room(&mut tx, item_id, room_id).await?;
        if !claimed {
            drop(tx);
            // The claim refuses for one of two reasons; re-read to tell
            // them apart and report the one that actually happened.
            let current = self.fetch_booking(booking_id).await?;
            if current.status != BookingStatus::Confirmed {
                return Err(CoreError::Status {
                    current: current.status,
                    event: BookingEvent::AssignRoom.name(),
                }
                .into());
            }
            return Err(CoreError::RoomUnavailable {
                room_id: room_id.to_string(),
            }
            .into());
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(booking_id = %booking_id, item_id = %item_id, room_id = %room_id, "Room assigned");

        self.db
            .bookings()
            .get_item(item_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("BookingItem", item_id))
    }

    /// Staff: merge-patch update of a booking's mutable fields.
    /// Absent fields are left untouched.
    pub async fn update_booking(
        &self,
        actor: Option<&Actor>,
        booking_id: &str,
        patch: BookingPatch,
    ) -> ServiceResult<Booking> {
        require_staff(actor)?;

        if let Some(guest_count) = patch.guest_count {
            validation::validate_guest_count(guest_count)?;
        }
        if let Some(notes) = &patch.notes {
            validation::validate_notes(notes)?;
        }

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        let updated = self
            .db
            .bookings()
            .apply_patch(
                &mut tx,
                booking_id,
                patch.guest_count,
                patch.notes.as_deref(),
                Utc::now(),
            )
            .await?;
        if !updated {
            drop(tx);
            return Err(ServiceError::not_found("Booking", booking_id));
        }
        tx.commit().await.map_err(DbError::from)?;

        self.fetch_booking(booking_id).await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Shared creation path: validate, price every item, persist in one
    /// transaction, notify after commit.
    async fn insert_booking(
        &self,
        customer: &Customer,
        request: NewBooking,
        initial: BookingStatus,
    ) -> ServiceResult<BookingDetails> {
        validation::validate_guest_count(request.guest_count)?;
        validation::validate_booking_items(request.items.len())?;
        if let Some(notes) = &request.notes {
            validation::validate_notes(notes)?;
        }
        for item in &request.items {
            if let Some(name) = &item.occupant_name {
                validation::validate_occupant_name(name)?;
            }
        }

        // Date range is rejected here, before anything is priced or written
        pricing::nights(request.check_in, request.check_out)?;

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            code: generate_booking_code(),
            customer_id: customer.id.clone(),
            check_in: request.check_in,
            check_out: request.check_out,
            guest_count: request.guest_count,
            status: initial,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        let mut items = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let room_type = self
                .db
                .rooms()
                .find_room_type(&line.room_type_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("RoomType", line.room_type_id.as_str()))?;

            let price =
                pricing::stay_price(request.check_in, request.check_out, room_type.nightly_rate())?;

            items.push(BookingItem {
                id: Uuid::new_v4().to_string(),
                booking_id: booking.id.clone(),
                room_type_id: room_type.id,
                room_id: None,
                price_cents: Some(price.cents()),
                occupant_name: line.occupant_name.clone(),
                created_at: now,
            });
        }

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        self.db.bookings().insert_booking(&mut tx, &booking).await?;
        for item in &items {
            self.db.bookings().insert_item(&mut tx, item).await?;
        }
        tx.commit().await.map_err(DbError::from)?;

        info!(
            booking_id = %booking.id,
            code = %booking.code,
            customer_id = %customer.id,
            status = ?booking.status,
            items = items.len(),
            "Booking created"
        );

        // Fire-and-forget: a failed send never unwinds the committed booking
        if let Err(err) = self.notifier.booking_created(customer, &booking) {
            warn!(booking_id = %booking.id, error = %err, "Booking notification failed");
        }

        Ok(BookingDetails { booking, items })
    }

    /// Applies a simple lifecycle event: core table lookup, then a
    /// compare-and-set guarded by the state the lookup saw.
    async fn apply_event(&self, booking_id: &str, event: BookingEvent) -> ServiceResult<Booking> {
        let booking = self.fetch_booking(booking_id).await?;
        let step = transition(booking.status, event)?;

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        let moved = self
            .db
            .bookings()
            .transition_status(&mut tx, booking_id, booking.status, step.next, Utc::now())
            .await?;
        if !moved {
            drop(tx);
            return Err(self.status_conflict(booking_id, event).await);
        }
        tx.commit().await.map_err(DbError::from)?;

        info!(booking_id = %booking_id, event = event.name(), status = ?step.next, "Booking transitioned");

        self.fetch_booking(booking_id).await
    }

    /// A compare-and-set lost: report the state that actually won.
    async fn status_conflict(&self, booking_id: &str, event: BookingEvent) -> ServiceError {
        match self.db.bookings().get_by_id(booking_id).await {
            Ok(Some(current)) => CoreError::Status {
                current: current.status,
                event: event.name(),
            }
            .into(),
            Ok(None) => ServiceError::not_found("Booking", booking_id),
            Err(err) => err.into(),
        }
    }

    async fn fetch_booking(&self, booking_id: &str) -> ServiceResult<Booking> {
        self.db
            .bookings()
            .get_by_id(booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking", booking_id))
    }

    /// Resolves the calling actor to a customer record.
    pub(crate) async fn resolve_customer(&self, actor: &Actor) -> ServiceResult<Customer> {
        self.db
            .customers()
            .find_by_user_id(&actor.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer", actor.user_id.as_str()))
    }
}
