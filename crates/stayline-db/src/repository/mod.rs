//! # Repository Module
//!
//! Database repository implementations for Stayline.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Service operation                                                     │
//! │       │                                                                 │
//! │       │  db.bookings().get_by_id(&id)                                  │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  BookingRepository                                                     │
//! │  ├── get_by_id(&self, id)                  ← pool reads                │
//! │  ├── transition_status(&self, conn, ...)   ← transactional writes      │
//! │  └── claim_room(&self, conn, ...)          ← concurrency guard         │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Convention
//! Plain reads take `&self` and use the pool. Anything that participates in
//! a read-validate-write sequence takes `conn: &mut SqliteConnection`, so
//! the service layer can hold one transaction across the whole sequence
//! (`&mut *tx` of a `sqlx::Transaction` derefs to the connection).
//!
//! ## Available Repositories
//!
//! - [`booking::BookingRepository`] - Bookings, items, lifecycle writes
//! - [`room::RoomRepository`] - Rooms and room types
//! - [`customer::CustomerRepository`] - Customer directory
//! - [`invoice::InvoiceRepository`] - Invoices, invoice items, payments
//! - [`service_request::ServiceRequestRepository`] - Ancillary requests

pub mod booking;
pub mod customer;
pub mod invoice;
pub mod room;
pub mod service_request;
