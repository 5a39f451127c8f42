//! # Validation Module
//!
//! Input validation utilities for Stayline.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request handler (out of scope)                               │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Immediate caller feedback                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_BOOKING_ITEMS, MAX_GUEST_COUNT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a booking's guest count.
///
/// ## Rules
/// - Must be positive (>= 1)
/// - Must not exceed MAX_GUEST_COUNT (99)
pub fn validate_guest_count(count: i64) -> ValidationResult<()> {
    if count <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "guest_count".to_string(),
        });
    }

    if count > MAX_GUEST_COUNT {
        return Err(ValidationError::OutOfRange {
            field: "guest_count".to_string(),
            min: 1,
            max: MAX_GUEST_COUNT,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (complimentary stays)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a payment amount in cents.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Exact-total matching is checked separately against the invoice
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the item lines of a new booking.
///
/// ## Rules
/// - At least one item (an empty booking is meaningless)
/// - Must not exceed MAX_BOOKING_ITEMS
pub fn validate_booking_items(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if count > MAX_BOOKING_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_BOOKING_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates free-text notes / special requests.
///
/// ## Rules
/// - Optional, but at most 1000 characters when present
pub fn validate_notes(notes: &str) -> ValidationResult<()> {
    if notes.len() > 1000 {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: 1000,
        });
    }

    Ok(())
}

/// Validates an occupant name on a booking item.
pub fn validate_occupant_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "occupant_name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "occupant_name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a 3-letter ISO 4217 currency code.
pub fn validate_currency(code: &str) -> ValidationResult<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a 3-letter uppercase ISO 4217 code".to_string(),
        });
    }

    Ok(())
}

/// Validates a UUID string format.
///
/// ## Rules
/// - Must be a valid UUID format
/// - 36 characters with hyphens: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_guest_count() {
        assert!(validate_guest_count(1).is_ok());
        assert!(validate_guest_count(4).is_ok());
        assert!(validate_guest_count(99).is_ok());

        assert!(validate_guest_count(0).is_err());
        assert!(validate_guest_count(-2).is_err());
        assert!(validate_guest_count(100).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(10000).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(30000).is_ok());
        assert!(validate_payment_amount(0).is_err());
        assert!(validate_payment_amount(-500).is_err());
    }

    #[test]
    fn test_validate_booking_items() {
        assert!(validate_booking_items(1).is_ok());
        assert!(validate_booking_items(MAX_BOOKING_ITEMS).is_ok());

        assert!(validate_booking_items(0).is_err());
        assert!(validate_booking_items(MAX_BOOKING_ITEMS + 1).is_err());
    }

    #[test]
    fn test_validate_notes() {
        assert!(validate_notes("late arrival, please keep the key at the desk").is_ok());
        assert!(validate_notes(&"x".repeat(1001)).is_err());
    }

    #[test]
    fn test_validate_occupant_name() {
        assert!(validate_occupant_name("Alice Moran").is_ok());
        assert!(validate_occupant_name("").is_err());
        assert!(validate_occupant_name("   ").is_err());
        assert!(validate_occupant_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_currency() {
        assert!(validate_currency("USD").is_ok());
        assert!(validate_currency("EUR").is_ok());

        assert!(validate_currency("usd").is_err());
        assert!(validate_currency("US").is_err());
        assert!(validate_currency("DOLLARS").is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
