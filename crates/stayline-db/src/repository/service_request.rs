//! # Service Request Repository
//!
//! Database operations for hotel services (reference data) and service
//! requests. The request lifecycle (OPEN → IN_PROGRESS → COMPLETED |
//! REJECTED) advances through a compare-and-set update, independent of the
//! owning booking's status.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stayline_core::{HotelService, ServiceRequest, ServiceRequestStatus};

const SERVICE_COLUMNS: &str = "id, name, is_deleted, created_at";
const REQUEST_COLUMNS: &str = "id, booking_id, service_id, status, notes, created_at, updated_at";

/// Repository for hotel services and service requests.
#[derive(Debug, Clone)]
pub struct ServiceRequestRepository {
    pool: SqlitePool,
}

impl ServiceRequestRepository {
    /// Creates a new ServiceRequestRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ServiceRequestRepository { pool }
    }

    // =========================================================================
    // Hotel Services (reference data)
    // =========================================================================

    /// Gets a hotel service by id. Tombstoned services read as absent.
    pub async fn find_service(&self, id: &str) -> DbResult<Option<HotelService>> {
        let service = sqlx::query_as::<_, HotelService>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM hotel_services WHERE id = ?1 AND is_deleted = 0"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(service)
    }

    /// Inserts a hotel service (seeding and tests).
    pub async fn insert_service(&self, service: &HotelService) -> DbResult<()> {
        debug!(id = %service.id, name = %service.name, "Inserting hotel service");

        sqlx::query(
            r#"
            INSERT INTO hotel_services (id, name, is_deleted, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&service.id)
        .bind(&service.name)
        .bind(service.is_deleted)
        .bind(service.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Service Requests
    // =========================================================================

    /// Inserts a service request.
    pub async fn insert_request(&self, request: &ServiceRequest) -> DbResult<()> {
        debug!(id = %request.id, booking_id = %request.booking_id, "Inserting service request");

        sqlx::query(
            r#"
            INSERT INTO service_requests (
                id, booking_id, service_id, status, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&request.id)
        .bind(&request.booking_id)
        .bind(&request.service_id)
        .bind(request.status)
        .bind(&request.notes)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a service request by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ServiceRequest>> {
        let request = sqlx::query_as::<_, ServiceRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM service_requests WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Lists all requests of a booking.
    pub async fn list_for_booking(&self, booking_id: &str) -> DbResult<Vec<ServiceRequest>> {
        let requests = sqlx::query_as::<_, ServiceRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM service_requests \
             WHERE booking_id = ?1 ORDER BY created_at"
        ))
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Compare-and-set status advance. Returns false when the request was
    /// not in `expected` (someone else moved it first, or it is absent).
    pub async fn advance_status(
        &self,
        id: &str,
        expected: ServiceRequestStatus,
        next: ServiceRequestStatus,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE service_requests SET status = ?1, updated_at = ?2
            WHERE id = ?3 AND status = ?4
            "#,
        )
        .bind(next)
        .bind(now)
        .bind(id)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use stayline_core::{Booking, BookingStatus, Customer};

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.customers()
            .insert(&Customer {
                id: "c-1".into(),
                user_id: "u-1".into(),
                full_name: "Alice Moran".into(),
                email: "alice@example.com".into(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let booking = Booking {
            id: "b-1".into(),
            code: "BKG-20250601-abcd1234".into(),
            customer_id: "c-1".into(),
            check_in: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
            guest_count: 2,
            status: BookingStatus::Confirmed,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut tx = db.pool().begin().await.unwrap();
        db.bookings().insert_booking(&mut tx, &booking).await.unwrap();
        tx.commit().await.unwrap();

        db.service_requests()
            .insert_service(&HotelService {
                id: "svc-spa".into(),
                name: "Spa".into(),
                is_deleted: false,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        db
    }

    #[tokio::test]
    async fn test_tombstoned_service_reads_as_absent() {
        let db = test_db().await;

        db.service_requests()
            .insert_service(&HotelService {
                id: "svc-gone".into(),
                name: "Discontinued".into(),
                is_deleted: true,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        assert!(db.service_requests().find_service("svc-spa").await.unwrap().is_some());
        assert!(db.service_requests().find_service("svc-gone").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_request_lifecycle_compare_and_set() {
        let db = test_db().await;
        let repo = db.service_requests();

        repo.insert_request(&ServiceRequest {
            id: "req-1".into(),
            booking_id: "b-1".into(),
            service_id: "svc-spa".into(),
            status: ServiceRequestStatus::Open,
            notes: Some("afternoon slot".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .await
        .unwrap();

        assert!(repo
            .advance_status(
                "req-1",
                ServiceRequestStatus::Open,
                ServiceRequestStatus::InProgress,
                Utc::now()
            )
            .await
            .unwrap());

        // Stale expectation loses
        assert!(!repo
            .advance_status(
                "req-1",
                ServiceRequestStatus::Open,
                ServiceRequestStatus::Rejected,
                Utc::now()
            )
            .await
            .unwrap());

        let current = repo.get_by_id("req-1").await.unwrap().unwrap();
        assert_eq!(current.status, ServiceRequestStatus::InProgress);
    }
}
