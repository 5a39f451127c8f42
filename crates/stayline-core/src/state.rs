//! # Booking State Machine
//!
//! Pure lifecycle rules for a booking. Computes the next state and the side
//! effect a transition requires; the orchestrator performs the actual save,
//! inside one transaction per transition, so a guard failure never leaves
//! partial writes.
//!
//! ## Transition Table
//! ```text
//! ┌──────────────────┬─────────────┬──────────────────────────┬──────────────────┐
//! │ From             │ Event       │ To                       │ Side effect      │
//! ├──────────────────┼─────────────┼──────────────────────────┼──────────────────┤
//! │ PENDING_APPROVAL │ approve     │ PENDING_PAYMENT or       │ none             │
//! │                  │             │ CONFIRMED (policy)       │                  │
//! │ PENDING_PAYMENT  │ confirm     │ CONFIRMED                │ none             │
//! │ CONFIRMED        │ assign_room │ CONFIRMED                │ set item's room  │
//! │ CONFIRMED        │ check_in    │ CHECKED_IN               │ none             │
//! │ CHECKED_IN       │ check_out   │ CHECKED_OUT              │ derive invoice   │
//! │ any non-terminal │ cancel      │ CANCELLED                │ cancel draft inv │
//! └──────────────────┴─────────────┴──────────────────────────┴──────────────────┘
//! ```
//!
//! Anything not in the table fails with `CoreError::Status` carrying the
//! current state and the attempted event. Data-dependent guards (check-in
//! requires an assigned room; the room claim itself) are enforced by the
//! orchestrator with [`ensure_room_assigned`] and the persistence-level
//! claim guard.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{BookingItem, BookingStatus};

// =============================================================================
// Events
// =============================================================================

/// Where an approval lands. The two-step path goes through PENDING_PAYMENT;
/// the short path confirms immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalTarget {
    PendingPayment,
    Confirmed,
}

impl ApprovalTarget {
    /// The booking status this target maps to.
    #[inline]
    pub const fn status(&self) -> BookingStatus {
        match self {
            ApprovalTarget::PendingPayment => BookingStatus::PendingPayment,
            ApprovalTarget::Confirmed => BookingStatus::Confirmed,
        }
    }
}

/// A lifecycle event applied to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingEvent {
    /// Staff approves a pending booking.
    Approve { target: ApprovalTarget },
    /// Staff acknowledges payment for an approved booking.
    Confirm,
    /// Staff assigns a physical room to one of the booking's items.
    AssignRoom,
    /// Guest arrives.
    CheckIn,
    /// Guest leaves; billing follows.
    CheckOut,
    /// Booking is abandoned before completion.
    Cancel,
}

impl BookingEvent {
    /// Event name used in error reporting and logs.
    pub const fn name(&self) -> &'static str {
        match self {
            BookingEvent::Approve { .. } => "approve",
            BookingEvent::Confirm => "confirm",
            BookingEvent::AssignRoom => "assign_room",
            BookingEvent::CheckIn => "check_in",
            BookingEvent::CheckOut => "check_out",
            BookingEvent::Cancel => "cancel",
        }
    }
}

// =============================================================================
// Transitions
// =============================================================================

/// The side effect a transition requires the orchestrator to perform
/// within the same transaction (or, for notifications, after it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// No side effect beyond the status write.
    None,
    /// Set the assigned room on the targeted item (via the claim guard).
    AssignRoom,
    /// Derive the booking's invoice if none exists yet.
    DeriveInvoice,
    /// Cancel an existing DRAFT invoice, if any. No new invoice is created.
    CancelDraftInvoice,
}

/// The outcome of a legal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: BookingStatus,
    pub effect: SideEffect,
}

/// Computes the transition for `event` from `current`.
///
/// ## Errors
/// `CoreError::Status` for any (state, event) pair outside the table.
///
/// ## Example
/// ```rust
/// use stayline_core::state::{transition, ApprovalTarget, BookingEvent};
/// use stayline_core::types::BookingStatus;
///
/// let t = transition(
///     BookingStatus::PendingApproval,
///     BookingEvent::Approve { target: ApprovalTarget::PendingPayment },
/// )
/// .unwrap();
/// assert_eq!(t.next, BookingStatus::PendingPayment);
/// ```
pub fn transition(current: BookingStatus, event: BookingEvent) -> CoreResult<Transition> {
    use BookingStatus::*;

    let transition = match (current, event) {
        (PendingApproval, BookingEvent::Approve { target }) => Transition {
            next: target.status(),
            effect: SideEffect::None,
        },
        (PendingPayment, BookingEvent::Confirm) => Transition {
            next: Confirmed,
            effect: SideEffect::None,
        },
        (Confirmed, BookingEvent::AssignRoom) => Transition {
            next: Confirmed,
            effect: SideEffect::AssignRoom,
        },
        (Confirmed, BookingEvent::CheckIn) => Transition {
            next: CheckedIn,
            effect: SideEffect::None,
        },
        (CheckedIn, BookingEvent::CheckOut) => Transition {
            next: CheckedOut,
            effect: SideEffect::DeriveInvoice,
        },
        (current, BookingEvent::Cancel) if !current.is_terminal() => Transition {
            next: Cancelled,
            effect: SideEffect::CancelDraftInvoice,
        },
        (current, event) => {
            return Err(CoreError::Status {
                current,
                event: event.name(),
            })
        }
    };

    Ok(transition)
}

/// Check-in guard: at least one item must have an assigned room.
pub fn ensure_room_assigned(booking_id: &str, items: &[BookingItem]) -> CoreResult<()> {
    if items.iter().any(|item| item.room_id.is_some()) {
        Ok(())
    } else {
        Err(CoreError::RoomRequired {
            booking_id: booking_id.to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const ALL_STATES: [BookingStatus; 6] = [
        BookingStatus::PendingApproval,
        BookingStatus::PendingPayment,
        BookingStatus::Confirmed,
        BookingStatus::CheckedIn,
        BookingStatus::CheckedOut,
        BookingStatus::Cancelled,
    ];

    fn assert_status_error(current: BookingStatus, event: BookingEvent) {
        match transition(current, event) {
            Err(CoreError::Status {
                current: reported, ..
            }) => assert_eq!(reported, current),
            other => panic!("expected Status error from {current:?}/{event:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_approve_to_pending_payment() {
        let t = transition(
            BookingStatus::PendingApproval,
            BookingEvent::Approve {
                target: ApprovalTarget::PendingPayment,
            },
        )
        .unwrap();
        assert_eq!(t.next, BookingStatus::PendingPayment);
        assert_eq!(t.effect, SideEffect::None);
    }

    #[test]
    fn test_approve_straight_to_confirmed() {
        let t = transition(
            BookingStatus::PendingApproval,
            BookingEvent::Approve {
                target: ApprovalTarget::Confirmed,
            },
        )
        .unwrap();
        assert_eq!(t.next, BookingStatus::Confirmed);
    }

    #[test]
    fn test_confirm_after_payment() {
        let t = transition(BookingStatus::PendingPayment, BookingEvent::Confirm).unwrap();
        assert_eq!(t.next, BookingStatus::Confirmed);
    }

    #[test]
    fn test_assign_room_keeps_confirmed() {
        let t = transition(BookingStatus::Confirmed, BookingEvent::AssignRoom).unwrap();
        assert_eq!(t.next, BookingStatus::Confirmed);
        assert_eq!(t.effect, SideEffect::AssignRoom);
    }

    #[test]
    fn test_check_in_and_out() {
        let t = transition(BookingStatus::Confirmed, BookingEvent::CheckIn).unwrap();
        assert_eq!(t.next, BookingStatus::CheckedIn);
        assert_eq!(t.effect, SideEffect::None);

        let t = transition(BookingStatus::CheckedIn, BookingEvent::CheckOut).unwrap();
        assert_eq!(t.next, BookingStatus::CheckedOut);
        assert_eq!(t.effect, SideEffect::DeriveInvoice);
    }

    #[test]
    fn test_cancel_from_every_non_terminal_state() {
        for state in ALL_STATES.iter().filter(|s| !s.is_terminal()) {
            let t = transition(*state, BookingEvent::Cancel).unwrap();
            assert_eq!(t.next, BookingStatus::Cancelled);
            assert_eq!(t.effect, SideEffect::CancelDraftInvoice);
        }
    }

    #[test]
    fn test_cancel_from_terminal_states_fails() {
        assert_status_error(BookingStatus::CheckedOut, BookingEvent::Cancel);
        assert_status_error(BookingStatus::Cancelled, BookingEvent::Cancel);
    }

    /// Every (state, event) pair outside the table must fail with Status.
    #[test]
    fn test_illegal_transitions_exhaustive() {
        let approve = BookingEvent::Approve {
            target: ApprovalTarget::Confirmed,
        };
        let events = [
            approve,
            BookingEvent::Confirm,
            BookingEvent::AssignRoom,
            BookingEvent::CheckIn,
            BookingEvent::CheckOut,
        ];

        for state in ALL_STATES {
            for event in events {
                let legal = matches!(
                    (state, event),
                    (BookingStatus::PendingApproval, BookingEvent::Approve { .. })
                        | (BookingStatus::PendingPayment, BookingEvent::Confirm)
                        | (BookingStatus::Confirmed, BookingEvent::AssignRoom)
                        | (BookingStatus::Confirmed, BookingEvent::CheckIn)
                        | (BookingStatus::CheckedIn, BookingEvent::CheckOut)
                );
                if legal {
                    assert!(transition(state, event).is_ok());
                } else {
                    assert_status_error(state, event);
                }
            }
        }
    }

    #[test]
    fn test_room_required_guard() {
        let unassigned = BookingItem {
            id: "i-1".into(),
            booking_id: "b-1".into(),
            room_type_id: "rt-1".into(),
            room_id: None,
            price_cents: Some(10000),
            occupant_name: None,
            created_at: Utc::now(),
        };

        let err = ensure_room_assigned("b-1", &[unassigned.clone()]).unwrap_err();
        assert!(matches!(err, CoreError::RoomRequired { booking_id } if booking_id == "b-1"));

        let assigned = BookingItem {
            room_id: Some("room-5".into()),
            ..unassigned
        };
        assert!(ensure_room_assigned("b-1", &[assigned]).is_ok());
    }
}
