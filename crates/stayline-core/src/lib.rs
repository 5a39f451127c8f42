//! # stayline-core: Pure Business Logic for Stayline
//!
//! This crate is the **heart** of the Stayline booking engine. It contains
//! the booking lifecycle and settlement rules as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stayline Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Request Handlers (out of scope)                    │   │
//! │  │    customer booking API ──► staff desk API ──► billing API     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stayline-engine                              │   │
//! │  │    orchestration, authorization, transactions, notifications   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stayline-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   state   │  │  pricing  │  │  invoice  │  │assignment │  │   │
//! │  │   │ lifecycle │  │  nights × │  │  totals,  │  │ type match│  │   │
//! │  │   │   table   │  │    rate   │  │    tax    │  │  status   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stayline-db (Database Layer)                 │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Booking, Invoice, Payment, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Stay pricing (nights × nightly rate)
//! - [`state`] - Booking lifecycle transition table
//! - [`assignment`] - Room/item compatibility rules
//! - [`invoice`] - Invoice derivation math
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - time is a parameter
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod assignment;
pub mod error;
pub mod invoice;
pub mod money;
pub mod pricing;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use stayline_core::Money` instead of
// `use stayline_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use state::{transition, ApprovalTarget, BookingEvent, SideEffect, Transition};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Settlement tax rate in basis points (15%).
///
/// A flat policy rate; jurisdiction-specific tax rules are out of scope.
pub const TAX_RATE_BPS: u32 = 1500;

/// Currency for all settlement documents.
///
/// Multi-currency conversion is out of scope; the code is stored on every
/// invoice so documents stay self-describing if that ever changes.
pub const CURRENCY: &str = "USD";

/// Maximum room-type lines in a single booking.
///
/// Prevents runaway bookings and keeps settlement documents reviewable.
pub const MAX_BOOKING_ITEMS: usize = 10;

/// Maximum guests on a single booking.
///
/// Fat-finger protection (typing 1000 instead of 10); group blocks go
/// through a different channel than this engine.
pub const MAX_GUEST_COUNT: i64 = 99;
