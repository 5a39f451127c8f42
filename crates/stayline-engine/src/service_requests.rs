//! # Service Request Operations
//!
//! Ancillary requests (spa, laundry, ...) tied to a booking, with their own
//! OPEN → IN_PROGRESS → COMPLETED | REJECTED lifecycle, independent of the
//! booking's status.
//!
//! Customers may raise requests against their own bookings only; staff
//! advance the lifecycle. A tombstoned hotel service is refused at
//! creation because the repository reads it as absent.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use stayline_core::{validation, Actor, ServiceRequest, ServiceRequestStatus};
use stayline_db::Database;

use crate::error::{ServiceError, ServiceResult};
use crate::identity::{require_actor, require_staff};

/// Service request operations under the per-actor view.
#[derive(Debug, Clone)]
pub struct ServiceRequestService {
    db: Database,
}

impl ServiceRequestService {
    pub(crate) fn new(db: Database) -> Self {
        ServiceRequestService { db }
    }

    /// Raises a request against a booking the caller can see.
    ///
    /// Customers resolve only their own bookings; staff any booking.
    pub async fn request(
        &self,
        actor: Option<&Actor>,
        booking_id: &str,
        service_id: &str,
        notes: Option<String>,
    ) -> ServiceResult<ServiceRequest> {
        let actor = require_actor(actor)?;

        if let Some(notes) = &notes {
            validation::validate_notes(notes)?;
        }

        let visible = if actor.is_staff() {
            self.db.bookings().get_by_id(booking_id).await?
        } else {
            let customer = self
                .db
                .customers()
                .find_by_user_id(&actor.user_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Customer", actor.user_id.as_str()))?;
            self.db
                .bookings()
                .get_by_id_for_owner(booking_id, &customer.id)
                .await?
        };
        let booking = visible.ok_or_else(|| ServiceError::not_found("Booking", booking_id))?;

        let service = self
            .db
            .service_requests()
            .find_service(service_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("HotelService", service_id))?;

        let now = Utc::now();
        let request = ServiceRequest {
            id: Uuid::new_v4().to_string(),
            booking_id: booking.id.clone(),
            service_id: service.id.clone(),
            status: ServiceRequestStatus::Open,
            notes,
            created_at: now,
            updated_at: now,
        };

        self.db.service_requests().insert_request(&request).await?;

        info!(
            request_id = %request.id,
            booking_id = %booking.id,
            service = %service.name,
            "Service request opened"
        );

        Ok(request)
    }

    /// Lists the requests of a booking the caller can see.
    pub async fn list_for_booking(
        &self,
        actor: Option<&Actor>,
        booking_id: &str,
    ) -> ServiceResult<Vec<ServiceRequest>> {
        let actor = require_actor(actor)?;

        if !actor.is_staff() {
            let customer = self
                .db
                .customers()
                .find_by_user_id(&actor.user_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Customer", actor.user_id.as_str()))?;
            self.db
                .bookings()
                .get_by_id_for_owner(booking_id, &customer.id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Booking", booking_id))?;
        }

        Ok(self.db.service_requests().list_for_booking(booking_id).await?)
    }

    /// Staff: advances a request's lifecycle.
    pub async fn advance(
        &self,
        actor: Option<&Actor>,
        request_id: &str,
        next: ServiceRequestStatus,
    ) -> ServiceResult<ServiceRequest> {
        require_staff(actor)?;

        let request = self
            .db
            .service_requests()
            .get_by_id(request_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("ServiceRequest", request_id))?;

        if !request.status.can_advance_to(next) {
            return Err(ServiceError::RequestStatus {
                current: request.status,
                attempted: next,
            });
        }

        let moved = self
            .db
            .service_requests()
            .advance_status(request_id, request.status, next, Utc::now())
            .await?;
        if !moved {
            // Compare-and-set lost: report the state that won
            let current = self
                .db
                .service_requests()
                .get_by_id(request_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("ServiceRequest", request_id))?;
            return Err(ServiceError::RequestStatus {
                current: current.status,
                attempted: next,
            });
        }

        info!(request_id = %request_id, status = ?next, "Service request advanced");

        self.db
            .service_requests()
            .get_by_id(request_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("ServiceRequest", request_id))
    }
}
