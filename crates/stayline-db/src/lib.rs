//! # stayline-db: Database Layer for Stayline
//!
//! This crate provides database access for the Stayline booking engine.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stayline Data Flow                               │
//! │                                                                         │
//! │  Service operation (approve, assign_room, pay_invoice, ...)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     stayline-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (booking.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ BookingRepo   │    │ 001_init.sql │  │   │
//! │  │   │ Transactions  │    │ InvoiceRepo   │    │ ...          │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                     SQLite Database (WAL mode)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (booking, invoice, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stayline_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/stayline.db")).await?;
//!
//! // Pool-backed reads
//! let booking = db.bookings().get_by_id(&id).await?;
//!
//! // One transaction per lifecycle transition
//! let mut tx = db.pool().begin().await?;
//! db.bookings().transition_status(&mut tx, &id, expected, next, now).await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::booking::{generate_booking_code, BookingRepository};
pub use repository::customer::CustomerRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::room::RoomRepository;
pub use repository::service_request::ServiceRequestRepository;
