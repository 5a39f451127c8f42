//! # stayline-engine: Booking Lifecycle & Settlement Services
//!
//! The orchestration layer of Stayline. Request handlers hand every
//! operation a caller identity plus typed request data, and get back a
//! success payload or a classified failure.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Request handlers (out of scope)                     │
//! └─────────────────────────────┬───────────────────────────────────────────┘
//! ┌─────────────────────────────▼───────────────────────────────────────────┐
//! │                  stayline-engine (THIS CRATE)                           │
//! │                                                                         │
//! │   Engine                                                                │
//! │   ├── bookings()          create / approve / assign / check-in|out     │
//! │   ├── invoices()          derivation + per-actor reads                 │
//! │   ├── payments()          settlement with ownership checks             │
//! │   └── service_requests()  ancillary request lifecycle                  │
//! │                                                                         │
//! │   Every lifecycle transition: one transaction, compare-and-set          │
//! │   writes, typed re-classification of lost races.                       │
//! └───────────┬─────────────────────────────────────┬───────────────────────┘
//!             ▼                                     ▼
//!       stayline-core                         stayline-db
//!    (pure lifecycle rules)              (SQLite, repositories)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stayline_db::{Database, DbConfig};
//! use stayline_engine::Engine;
//!
//! let db = Database::new(DbConfig::new("./stayline.db")).await?;
//! let engine = Engine::new(db);
//!
//! let details = engine
//!     .bookings()
//!     .create_booking(Some(&actor), request)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bookings;
pub mod error;
pub mod identity;
pub mod invoices;
pub mod notify;
pub mod payments;
pub mod service_requests;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use bookings::{
    BookingDetails, BookingPatch, BookingService, NewBooking, NewBookingItem, WalkInPolicy,
};
pub use error::{ServiceError, ServiceResult};
pub use invoices::{InvoiceDetails, InvoiceService};
pub use notify::{LogNotifier, NotificationSender, NotifyError};
pub use payments::PaymentService;
pub use service_requests::ServiceRequestService;

// The identity vocabulary callers need to build requests
pub use stayline_core::{Actor, ApprovalTarget, PaymentMethod, Role};

use std::sync::Arc;

use stayline_db::Database;

/// The engine façade: one handle per process, cheap to clone.
#[derive(Clone)]
pub struct Engine {
    db: Database,
    notifier: Arc<dyn NotificationSender>,
}

impl Engine {
    /// Creates an engine with the default log-only notifier.
    pub fn new(db: Database) -> Self {
        Engine {
            db,
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Creates an engine with a custom notification backend.
    pub fn with_notifier(db: Database, notifier: Arc<dyn NotificationSender>) -> Self {
        Engine { db, notifier }
    }

    /// Booking operations (customer + staff views).
    pub fn bookings(&self) -> BookingService {
        BookingService::new(self.db.clone(), self.notifier.clone())
    }

    /// Invoice derivation and reads.
    pub fn invoices(&self) -> InvoiceService {
        InvoiceService::new(self.db.clone())
    }

    /// Payment application.
    pub fn payments(&self) -> PaymentService {
        PaymentService::new(self.db.clone())
    }

    /// Ancillary service requests.
    pub fn service_requests(&self) -> ServiceRequestService {
        ServiceRequestService::new(self.db.clone())
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}
