//! # Domain Types
//!
//! Core domain types used throughout Stayline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Booking      │   │    Invoice      │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  code (BKG-..)  │   │  code (INV-..)  │   │  invoice_id(FK) │       │
//! │  │  status         │   │  booking_id(FK) │   │  method         │       │
//! │  │  check_in/out   │   │  total_cents    │   │  amount_cents   │       │
//! │  └───────┬─────────┘   └─────────────────┘   └─────────────────┘       │
//! │          │ owns                                                        │
//! │  ┌───────▼─────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  BookingItem    │   │      Room       │   │    RoomType     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  room_type (FK) │──►│  number         │──►│  nightly rate   │       │
//! │  │  room (FK, opt) │   │  status         │   │  max capacity   │       │
//! │  │  price (opt)    │   │  is_deleted     │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Billing-relevant entities have:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business code: (`BKG-...`, `INV-...`) - human-readable, printed on documents
//!
//! ## Back-References
//! Child records carry the owning id (`booking_id`, `invoice_id`) and are
//! looked up by it; no live object graphs with bidirectional pointers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1500 bps = 15% (the flat settlement policy rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Roles & Actors
// =============================================================================

/// A caller's role. CLIENT is restricted to its own records;
/// EMPLOYEE and ADMIN are elevated (staff).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Employee,
    Admin,
}

impl Role {
    /// Staff roles may perform lifecycle operations on any booking.
    #[inline]
    pub const fn is_elevated(&self) -> bool {
        matches!(self, Role::Employee | Role::Admin)
    }
}

/// The resolved identity of a caller.
///
/// Always passed explicitly to every operation - there is no ambient
/// security context to read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Stable identifier from the identity provider.
    pub user_id: String,
    /// Roles granted to this caller.
    pub roles: Vec<Role>,
}

impl Actor {
    /// Creates an actor with the given id and roles.
    pub fn new(user_id: impl Into<String>, roles: Vec<Role>) -> Self {
        Actor {
            user_id: user_id.into(),
            roles,
        }
    }

    /// True if any granted role is elevated (EMPLOYEE or ADMIN).
    pub fn is_staff(&self) -> bool {
        self.roles.iter().any(Role::is_elevated)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer directory record, resolved from an actor's stable identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stable identifier from the identity provider.
    pub user_id: String,

    /// Display name.
    pub full_name: String,

    /// Contact email (notification collaborator target).
    pub email: String,

    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Room Type & Room
// =============================================================================

/// A bookable category of rooms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RoomType {
    pub id: String,

    /// Display name shown to customers ("Double Deluxe").
    pub name: String,

    /// Nightly base rate in cents.
    pub nightly_rate_cents: i64,

    /// Maximum occupancy of a room of this type.
    pub max_capacity: i64,

    pub created_at: DateTime<Utc>,
}

impl RoomType {
    /// Returns the nightly rate as a Money type.
    #[inline]
    pub fn nightly_rate(&self) -> Money {
        Money::from_cents(self.nightly_rate_cents)
    }
}

/// Housekeeping status of a physical room.
///
/// Deliberately NOT consulted when pre-assigning a room to a booking:
/// a MAINTENANCE or DIRTY room may be assigned ahead of arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Dirty,
    Maintenance,
    Unavailable,
}

impl Default for RoomStatus {
    fn default() -> Self {
        RoomStatus::Available
    }
}

/// A physical unit of a RoomType.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Room {
    pub id: String,
    pub room_type_id: String,

    /// Door number ("204").
    pub number: String,

    pub status: RoomStatus,

    /// Soft delete: tombstoned rooms read as absent on every query path.
    pub is_deleted: bool,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Booking Status
// =============================================================================

/// The lifecycle status of a booking.
///
/// ```text
/// PENDING_APPROVAL → PENDING_PAYMENT → CONFIRMED → CHECKED_IN → CHECKED_OUT
///        │                  │              │            │
///        └──────────────────┴──────────────┴────────────┴──► CANCELLED
/// ```
///
/// The legal moves between these states live in [`crate::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created by a customer, awaiting staff approval.
    PendingApproval,
    /// Approved, awaiting payment acknowledgement.
    PendingPayment,
    /// Confirmed stay; rooms may be assigned.
    Confirmed,
    /// Guest has arrived.
    CheckedIn,
    /// Stay complete; invoice derivation has run.
    CheckedOut,
    /// Cancelled before completion. Terminal.
    Cancelled,
}

impl BookingStatus {
    /// Terminal states accept no further lifecycle events.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::CheckedOut | BookingStatus::Cancelled)
    }

    /// States in which an assigned room is "live" (counts against
    /// double-assignment of the physical room).
    #[inline]
    pub const fn holds_room(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::CheckedIn)
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::PendingApproval
    }
}

// =============================================================================
// Booking & BookingItem
// =============================================================================

/// A reservation by one customer for one or more room-type stays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Booking {
    pub id: String,

    /// Business code (BKG-YYYYMMDD-xxxxxxxx).
    pub code: String,

    pub customer_id: String,

    pub check_in: NaiveDate,
    pub check_out: NaiveDate,

    /// Number of guests (>= 1).
    pub guest_count: i64,

    pub status: BookingStatus,

    /// Free-text notes / special requests.
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One room-type line within a booking.
///
/// The price is frozen at creation time from the room type's current
/// nightly rate; later rate changes never reprice an existing booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BookingItem {
    pub id: String,
    pub booking_id: String,
    pub room_type_id: String,

    /// Physical room, NULL until staff assigns one.
    pub room_id: Option<String>,

    /// Line price in cents. NULL means provisionally unpriced;
    /// totals treat it as zero.
    pub price_cents: Option<i64>,

    /// Who sleeps in this room (optional).
    pub occupant_name: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl BookingItem {
    /// Returns the line price as Money, with NULL read as zero.
    #[inline]
    pub fn price_or_zero(&self) -> Money {
        Money::from_cents(self.price_cents.unwrap_or(0))
    }
}

// =============================================================================
// Invoice & InvoiceItem
// =============================================================================

/// The settlement status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    /// PAID and CANCELLED invoices accept no further payments.
    #[inline]
    pub const fn is_closed(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }
}

/// A billing document derived from exactly one booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: String,

    /// Business code, derived as "INV-" + the booking's code.
    pub code: String,

    pub booking_id: String,

    pub status: InvoiceStatus,

    /// Sum of the booking's item prices.
    pub total_cents: i64,

    /// Policy rate × total, rounded half up.
    pub tax_cents: i64,

    /// ISO 4217 code ("USD").
    pub currency: String,

    pub issued_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the tax amount as Money.
    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }
}

/// One line on an invoice, snapshotting a booking item at derivation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: String,
    pub invoice_id: String,

    /// The booking item this line was derived from, for traceability.
    pub booking_item_id: Option<String>,

    pub description: String,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    Cash,
    Paypal,
    BankTransfer,
}

/// A settlement record against one invoice. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub invoice_id: String,
    pub method: PaymentMethod,

    /// Amount paid in cents (> 0).
    pub amount_cents: i64,

    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Hotel Services & Service Requests
// =============================================================================

/// Reference data for ancillary services (spa, laundry, airport pickup).
/// CRUD for these lives outside the engine; requests must still refuse
/// tombstoned services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct HotelService {
    pub id: String,
    pub name: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of a service request, independent of the booking's status.
///
/// OPEN → IN_PROGRESS → COMPLETED | REJECTED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ServiceRequestStatus {
    Open,
    InProgress,
    Completed,
    Rejected,
}

impl ServiceRequestStatus {
    /// Legal moves of the request lifecycle. Rejection is allowed before
    /// work starts as well as during it.
    pub const fn can_advance_to(&self, next: ServiceRequestStatus) -> bool {
        matches!(
            (self, next),
            (ServiceRequestStatus::Open, ServiceRequestStatus::InProgress)
                | (ServiceRequestStatus::Open, ServiceRequestStatus::Rejected)
                | (ServiceRequestStatus::InProgress, ServiceRequestStatus::Completed)
                | (ServiceRequestStatus::InProgress, ServiceRequestStatus::Rejected)
        )
    }
}

impl Default for ServiceRequestStatus {
    fn default() -> Self {
        ServiceRequestStatus::Open
    }
}

/// An ancillary request tied to a booking and a hotel service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ServiceRequest {
    pub id: String,
    pub booking_id: String,
    pub service_id: String,
    pub status: ServiceRequestStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1500);
        assert_eq!(rate.bps(), 1500);
        assert!((rate.percentage() - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_booking_status_default() {
        assert_eq!(BookingStatus::default(), BookingStatus::PendingApproval);
    }

    #[test]
    fn test_terminal_states() {
        assert!(BookingStatus::CheckedOut.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Confirmed.is_terminal());
        assert!(!BookingStatus::PendingApproval.is_terminal());
    }

    #[test]
    fn test_holds_room_states() {
        assert!(BookingStatus::Confirmed.holds_room());
        assert!(BookingStatus::CheckedIn.holds_room());
        assert!(!BookingStatus::PendingPayment.holds_room());
        assert!(!BookingStatus::CheckedOut.holds_room());
    }

    #[test]
    fn test_actor_staff_detection() {
        let client = Actor::new("u-1", vec![Role::Client]);
        assert!(!client.is_staff());

        let employee = Actor::new("u-2", vec![Role::Employee]);
        assert!(employee.is_staff());

        let admin = Actor::new("u-3", vec![Role::Client, Role::Admin]);
        assert!(admin.is_staff());
    }

    #[test]
    fn test_invoice_closed_states() {
        assert!(InvoiceStatus::Paid.is_closed());
        assert!(InvoiceStatus::Cancelled.is_closed());
        assert!(!InvoiceStatus::Issued.is_closed());
        assert!(!InvoiceStatus::Draft.is_closed());
    }

    #[test]
    fn test_service_request_moves() {
        use ServiceRequestStatus::*;
        assert!(Open.can_advance_to(InProgress));
        assert!(Open.can_advance_to(Rejected));
        assert!(InProgress.can_advance_to(Completed));
        assert!(InProgress.can_advance_to(Rejected));

        assert!(!Open.can_advance_to(Completed));
        assert!(!Completed.can_advance_to(Rejected));
        assert!(!Rejected.can_advance_to(Open));
    }

    #[test]
    fn test_item_price_or_zero() {
        let item = BookingItem {
            id: "i-1".into(),
            booking_id: "b-1".into(),
            room_type_id: "rt-1".into(),
            room_id: None,
            price_cents: None,
            occupant_name: None,
            created_at: Utc::now(),
        };
        assert_eq!(item.price_or_zero().cents(), 0);
    }
}
