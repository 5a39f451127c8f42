//! # Service Error Type
//!
//! The classified failure surface of the engine.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stayline                               │
//! │                                                                         │
//! │  Request handler (out of scope)                                        │
//! │         ▲                                                               │
//! │         │ ServiceError (THIS MODULE)                                   │
//! │  ┌──────┴───────────────────────────────────────────────────────────┐  │
//! │  │  Service operation                                               │  │
//! │  │         ▲                   ▲                                    │  │
//! │  │         │ CoreError         │ DbError                            │  │
//! │  │    rule checks         persistence                               │  │
//! │  │                                                                  │  │
//! │  │  Constraint violations from the concurrency guards are           │  │
//! │  │  re-classified at the call site (RoomUnavailable, idempotent     │  │
//! │  │  invoice re-fetch), never leaked as generic database errors.     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The distinct kinds are deliberately not conflated: `NotAuthenticated`
//! (no resolvable actor) vs `Forbidden` (authenticated but not permitted)
//! vs `NotFound` (referenced entity absent, including entities hidden by
//! ownership filters).

use thiserror::Error;

use stayline_core::{CoreError, ServiceRequestStatus, ValidationError};
use stayline_db::DbError;

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No actor identity was resolvable from the request.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The actor is authenticated but not permitted to perform this
    /// operation (wrong role, or not the owner of the record).
    #[error("forbidden")]
    Forbidden,

    /// A referenced entity is absent. Ownership filters surface foreign
    /// records through this same kind, never through partial data.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A service request cannot move to the attempted status.
    #[error("service request is {current:?}, cannot move to {attempted:?}")]
    RequestStatus {
        current: ServiceRequestStatus,
        attempted: ServiceRequestStatus,
    },

    /// A business rule violation from stayline-core
    /// (Status, InvalidDateRange, RoomUnavailable, InvoiceClosed, ...).
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// A persistence failure that has no business re-classification.
    #[error("storage error: {0}")]
    Storage(#[source] DbError),
}

impl ServiceError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Converts database errors to service errors.
///
/// `DbError::NotFound` carries over; everything else is a storage failure
/// unless a call site re-classifies it first (the invoice UNIQUE race and
/// the room claim guard are handled where they occur).
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            other => ServiceError::Storage(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Domain(CoreError::Validation(err))
    }
}

/// Result type for engine operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_carries_over() {
        let err: ServiceError = DbError::not_found("Booking", "b-1").into();
        assert!(matches!(
            err,
            ServiceError::NotFound { entity, id } if entity == "Booking" && id == "b-1"
        ));
    }

    #[test]
    fn test_other_db_errors_become_storage() {
        let err: ServiceError = DbError::PoolExhausted.into();
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    #[test]
    fn test_validation_becomes_domain() {
        let err: ServiceError = ValidationError::MustBePositive {
            field: "guest_count".into(),
        }
        .into();
        assert!(matches!(
            err,
            ServiceError::Domain(CoreError::Validation(_))
        ));
    }
}
