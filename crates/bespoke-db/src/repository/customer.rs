//! # Customer Repository
//!
//! Database operations for customers. Customers carry no uniqueness rule.

use bespoke_core::validation::validate_customer;
use bespoke_core::{Customer, CustomerFields, CustomerId};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

const ENTITY: &str = "Customer";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists every customer, ascending id.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, first_name, last_name, address, phone, start_date
            FROM customers
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Gets a customer by id.
    pub async fn get_by_id(&self, id: CustomerId) -> DbResult<Option<Customer>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_by_id(&mut conn, id).await
    }

    /// Gets a customer by id, failing with `NotFound` if absent.
    pub async fn get(&self, id: CustomerId) -> DbResult<Customer> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))
    }

    /// Inserts a new customer.
    pub async fn create(&self, fields: CustomerFields) -> DbResult<Customer> {
        validate_customer(&fields)?;

        let result = sqlx::query(
            r#"
            INSERT INTO customers (first_name, last_name, address, phone, start_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.address)
        .bind(&fields.phone)
        .bind(fields.start_date)
        .execute(&self.pool)
        .await?;

        let customer = Customer::from_fields(CustomerId::new(result.last_insert_rowid()), fields);
        info!(id = %customer.id, "Created customer");
        Ok(customer)
    }

    /// Replaces every field of an existing customer.
    pub async fn update(&self, id: CustomerId, fields: CustomerFields) -> DbResult<Customer> {
        validate_customer(&fields)?;
        debug!(id = %id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                first_name = ?2,
                last_name = ?3,
                address = ?4,
                phone = ?5,
                start_date = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.address)
        .bind(&fields.phone)
        .bind(fields.start_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        Ok(Customer::from_fields(id, fields))
    }

    /// Deletes a customer. Fails while any sale references them.
    pub async fn delete(&self, id: CustomerId) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        Ok(())
    }

    /// Fetches a customer on an existing connection or transaction.
    pub async fn fetch_by_id(
        conn: &mut SqliteConnection,
        id: CustomerId,
    ) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, first_name, last_name, address, phone, start_date
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;

    fn fields(first: &str) -> CustomerFields {
        CustomerFields {
            first_name: first.to_string(),
            last_name: "anderson".to_string(),
            address: "789 pine rd".to_string(),
            phone: "555-8765".to_string(),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        // duplicates are fine for customers
        let tom = repo.create(fields("tom")).await.unwrap();
        let twin = repo.create(fields("tom")).await.unwrap();
        assert_ne!(tom.id, twin.id);

        let renamed = repo.update(twin.id, fields("tim")).await.unwrap();
        assert_eq!(repo.get(twin.id).await.unwrap(), renamed);

        repo.delete(tom.id).await.unwrap();
        let remaining = repo.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].first_name, "tim");

        let err = repo.update(tom.id, fields("tom")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
