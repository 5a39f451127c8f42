//! # Actor Gates
//!
//! Authorization helpers applied at the top of every operation.
//!
//! The identity resolver (request context → actor) is an external
//! collaborator; the engine receives an `Option<&Actor>` and gates on it
//! explicitly. There is no ambient security context - every operation
//! takes its caller as a parameter.
//!
//! These checks run inside the engine regardless of any perimeter
//! authorization layer. Defense in depth: the perimeter is out of scope
//! and cannot be relied on.

use stayline_core::Actor;

use crate::error::{ServiceError, ServiceResult};

/// Requires a resolvable actor identity.
pub fn require_actor(actor: Option<&Actor>) -> ServiceResult<&Actor> {
    actor.ok_or(ServiceError::NotAuthenticated)
}

/// Requires an actor with an elevated role (EMPLOYEE or ADMIN).
///
/// Non-elevated callers get `Forbidden`, never a silent pass-through.
pub fn require_staff(actor: Option<&Actor>) -> ServiceResult<&Actor> {
    let actor = require_actor(actor)?;
    if actor.is_staff() {
        Ok(actor)
    } else {
        Err(ServiceError::Forbidden)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stayline_core::Role;

    #[test]
    fn test_missing_actor_is_not_authenticated() {
        assert!(matches!(
            require_actor(None),
            Err(ServiceError::NotAuthenticated)
        ));
        assert!(matches!(
            require_staff(None),
            Err(ServiceError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_client_is_not_staff() {
        let client = Actor::new("u-1", vec![Role::Client]);
        assert!(require_actor(Some(&client)).is_ok());
        assert!(matches!(
            require_staff(Some(&client)),
            Err(ServiceError::Forbidden)
        ));
    }

    #[test]
    fn test_employee_and_admin_are_staff() {
        let employee = Actor::new("u-2", vec![Role::Employee]);
        assert!(require_staff(Some(&employee)).is_ok());

        let admin = Actor::new("u-3", vec![Role::Admin]);
        assert!(require_staff(Some(&admin)).is_ok());
    }
}
