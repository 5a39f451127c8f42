//! # Customer Repository
//!
//! Directory lookups resolving an actor's stable identifier to a customer
//! record. Creation happens out of band (identity federation is an external
//! collaborator); the insert exists for seeding and tests.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stayline_core::Customer;

const CUSTOMER_COLUMNS: &str = "id, user_id, full_name, email, created_at";

/// Repository for customer directory operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Resolves an identity-provider user id to a customer record.
    pub async fn find_by_user_id(&self, user_id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE user_id = ?1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by primary key.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Inserts a customer record (seeding and tests).
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, user_id = %customer.user_id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, user_id, full_name, email, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.user_id)
        .bind(&customer.full_name)
        .bind(&customer.email)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
