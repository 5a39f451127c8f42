//! # Error Types
//!
//! Domain-specific error types for stayline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stayline-core errors (this file)                                      │
//! │  ├── CoreError        - Business-rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stayline-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  stayline-engine errors (separate crate)                               │
//! │  └── ServiceError     - What request handlers see (classified)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → Handler            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, states, amounts)
//! 3. Errors are enum variants, never String
//! 4. A rule violation is detected as early as possible and never coerced
//!    (a sub-1-night stay is rejected, not billed as one night)

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{BookingStatus, InvoiceStatus};

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule errors.
///
/// These errors represent violations of the booking lifecycle and settlement
/// rules. They are surfaced to callers as typed failures, never coerced.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A lifecycle event was attempted from a state that does not allow it.
    ///
    /// ## When This Occurs
    /// - Approving a booking that is not PENDING_APPROVAL
    /// - Assigning a room outside CONFIRMED
    /// - Checking out a booking that was never checked in
    /// - Cancelling a terminal (CHECKED_OUT / CANCELLED) booking
    #[error("booking is {current:?}, cannot {event}")]
    Status {
        current: BookingStatus,
        event: &'static str,
    },

    /// Check-out date is not strictly after check-in date.
    ///
    /// Same-day and inverted ranges are rejected at the boundary, never
    /// silently coerced to a one-night stay.
    #[error("invalid date range: check-out {check_out} must be after check-in {check_in}")]
    InvalidDateRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    /// The candidate room's type differs from the booking item's type.
    #[error("room {room_id} has room type {actual}, item requires {expected}")]
    RoomTypeMismatch {
        room_id: String,
        expected: String,
        actual: String,
    },

    /// The room is the live assignment of another CONFIRMED/CHECKED_IN item.
    ///
    /// This is the anti-double-booking invariant. The check is enforced
    /// transactionally in the persistence layer; this variant is also the
    /// re-classification target for the claim guard's zero-row result.
    #[error("room {room_id} is already assigned to an active stay")]
    RoomUnavailable { room_id: String },

    /// Check-in requires at least one item with an assigned room.
    #[error("booking {booking_id} has no room assigned, cannot check in")]
    RoomRequired { booking_id: String },

    /// The invoice is PAID or CANCELLED and accepts no further payments.
    #[error("invoice {invoice_id} is {status:?}, no further payments accepted")]
    InvoiceClosed {
        invoice_id: String,
        status: InvoiceStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A payment must settle the invoice total exactly.
    /// Partial payments are not modeled; rejecting the mismatch here keeps
    /// them from being introduced implicitly.
    #[error("payment amount {actual_cents} does not match invoice total {expected_cents}")]
    AmountMismatch {
        expected_cents: i64,
        actual_cents: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::Status {
            current: BookingStatus::PendingApproval,
            event: "check_in",
        };
        assert_eq!(err.to_string(), "booking is PendingApproval, cannot check_in");

        let err = CoreError::RoomUnavailable {
            room_id: "room-7".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "room room-7 is already assigned to an active stay"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "guest_count".to_string(),
        };
        assert_eq!(err.to_string(), "guest_count is required");

        let err = ValidationError::AmountMismatch {
            expected_cents: 30000,
            actual_cents: 20000,
        };
        assert_eq!(
            err.to_string(),
            "payment amount 20000 does not match invoice total 30000"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "guest_count".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
