//! # Room Assignment Rules
//!
//! Pure compatibility checks for assigning a physical room to a booking item.
//!
//! Two of the three assignment guards live here; the third is transactional:
//!
//! 1. The booking must be CONFIRMED (checked here).
//! 2. The room's type must match the item's type (checked here).
//! 3. The room must not be the live assignment of another CONFIRMED or
//!    CHECKED_IN item. That check races under concurrency, so it is NOT a
//!    read in this module - it is the conditional-UPDATE claim guard in
//!    `stayline-db` (`BookingRepository::claim_room`), whose zero-row result
//!    re-classifies to `CoreError::RoomUnavailable`.
//!
//! Room.status (DIRTY / MAINTENANCE / ...) is deliberately not consulted:
//! such rooms may be pre-assigned ahead of arrival. Tombstoned rooms never
//! reach this function; the repository reads them as absent.

use crate::error::{CoreError, CoreResult};
use crate::state::{transition, BookingEvent};
use crate::types::{Booking, BookingItem, Room};

/// Validates that `room` may be assigned to `item` on `booking`.
///
/// ## Errors
/// - `Status` when the booking is not CONFIRMED
/// - `RoomTypeMismatch` when the room's type differs from the item's
pub fn validate_room_for_item(
    booking: &Booking,
    item: &BookingItem,
    room: &Room,
) -> CoreResult<()> {
    // Status gate first: assignment outside CONFIRMED is a lifecycle error,
    // not a room problem.
    transition(booking.status, BookingEvent::AssignRoom)?;

    if room.room_type_id != item.room_type_id {
        return Err(CoreError::RoomTypeMismatch {
            room_id: room.id.clone(),
            expected: item.room_type_id.clone(),
            actual: room.room_type_id.clone(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BookingStatus, RoomStatus};
    use chrono::{NaiveDate, Utc};

    fn booking(status: BookingStatus) -> Booking {
        Booking {
            id: "b-1".into(),
            code: "BKG-20250601-abcd1234".into(),
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

    fn item(room_type_id: &str) -> BookingItem {
        BookingItem {
            id: "i-1".into(),
            booking_id: "b-1".into(),
            room_type_id: room_type_id.into(),
            room_id: None,
            price_cents: Some(30000),
            occupant_name: None,
            created_at: Utc::now(),
        }
    }

    fn room(id: &str, room_type_id: &str, status: RoomStatus) -> Room {
        Room {
            id: id.into(),
            room_type_id: room_type_id.into(),
            number: "204".into(),
            status,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_assignment_on_confirmed_booking() {
        let result = validate_room_for_item(
            &booking(BookingStatus::Confirmed),
            &item("rt-double"),
            &room("room-5", "rt-double", RoomStatus::Available),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_assignment_outside_confirmed_fails() {
        for status in [
            BookingStatus::PendingApproval,
            BookingStatus::PendingPayment,
            BookingStatus::CheckedIn,
            BookingStatus::CheckedOut,
            BookingStatus::Cancelled,
        ] {
            let err = validate_room_for_item(
                &booking(status),
                &item("rt-double"),
                &room("room-5", "rt-double", RoomStatus::Available),
            )
            .unwrap_err();
            assert!(matches!(err, CoreError::Status { current, .. } if current == status));
        }
    }

    #[test]
    fn test_room_type_mismatch() {
        let err = validate_room_for_item(
            &booking(BookingStatus::Confirmed),
            &item("rt-double"),
            &room("room-9", "rt-single", RoomStatus::Available),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::RoomTypeMismatch { room_id, expected, actual }
                if room_id == "room-9" && expected == "rt-double" && actual == "rt-single"
        ));
    }

    /// A MAINTENANCE or DIRTY room may still be pre-assigned.
    #[test]
    fn test_room_status_is_not_consulted() {
        for status in [RoomStatus::Maintenance, RoomStatus::Dirty, RoomStatus::Occupied] {
            let result = validate_room_for_item(
                &booking(BookingStatus::Confirmed),
                &item("rt-double"),
                &room("room-5", "rt-double", status),
            );
            assert!(result.is_ok());
        }
    }
}
