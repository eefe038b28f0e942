//! # Salesperson Repository
//!
//! Database operations for sales staff.
//!
//! A salesperson is identified by `(first_name, last_name, phone)`; a
//! second record with the same triple is a conflict.

use bespoke_core::validation::validate_salesperson;
use bespoke_core::{CoreError, Salesperson, SalespersonFields, SalespersonId};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::pool::begin_write;

const ENTITY: &str = "Salesperson";

/// Repository for salesperson database operations.
#[derive(Debug, Clone)]
pub struct SalespersonRepository {
    pool: SqlitePool,
}

impl SalespersonRepository {
    /// Creates a new SalespersonRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SalespersonRepository { pool }
    }

    /// Lists every salesperson, ascending id.
    pub async fn list(&self) -> DbResult<Vec<Salesperson>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_all(&mut conn).await
    }

    /// Gets a salesperson by id.
    pub async fn get_by_id(&self, id: SalespersonId) -> DbResult<Option<Salesperson>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_by_id(&mut conn, id).await
    }

    /// Gets a salesperson by id, failing with `NotFound` if absent.
    pub async fn get(&self, id: SalespersonId) -> DbResult<Salesperson> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))
    }

    /// Looks a salesperson up by identity triple.
    pub async fn find_by_identity(
        &self,
        first_name: &str,
        last_name: &str,
        phone: &str,
    ) -> DbResult<Option<Salesperson>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_by_identity(&mut conn, first_name, last_name, phone).await
    }

    /// Inserts a new salesperson.
    ///
    /// ## Returns
    /// * `Err(Domain(Conflict))` - Same first name, last name and phone exists
    pub async fn create(&self, fields: SalespersonFields) -> DbResult<Salesperson> {
        validate_salesperson(&fields)?;

        let mut tx = begin_write(&self.pool).await?;

        let existing =
            Self::fetch_by_identity(&mut tx, &fields.first_name, &fields.last_name, &fields.phone)
                .await?;
        if existing.is_some() {
            return Err(CoreError::conflict(ENTITY, identity(&fields)).into());
        }

        let result = sqlx::query(
            r#"
            INSERT INTO salespersons (
                first_name, last_name, address, phone,
                start_date, termination_date, manager
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.address)
        .bind(&fields.phone)
        .bind(fields.start_date)
        .bind(fields.termination_date)
        .bind(&fields.manager)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let salesperson =
            Salesperson::from_fields(SalespersonId::new(result.last_insert_rowid()), fields);
        info!(id = %salesperson.id, name = %salesperson.full_name(), "Created salesperson");
        Ok(salesperson)
    }

    /// Replaces every field of an existing salesperson.
    pub async fn update(
        &self,
        id: SalespersonId,
        fields: SalespersonFields,
    ) -> DbResult<Salesperson> {
        validate_salesperson(&fields)?;
        debug!(id = %id, "Updating salesperson");

        let mut tx = begin_write(&self.pool).await?;

        let existing =
            Self::fetch_by_identity(&mut tx, &fields.first_name, &fields.last_name, &fields.phone)
                .await?;
        if existing.is_some_and(|other| other.id != id) {
            return Err(CoreError::conflict(ENTITY, identity(&fields)).into());
        }

        let result = sqlx::query(
            r#"
            UPDATE salespersons SET
                first_name = ?2,
                last_name = ?3,
                address = ?4,
                phone = ?5,
                start_date = ?6,
                termination_date = ?7,
                manager = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.address)
        .bind(&fields.phone)
        .bind(fields.start_date)
        .bind(fields.termination_date)
        .bind(&fields.manager)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        tx.commit().await?;
        Ok(Salesperson::from_fields(id, fields))
    }

    /// Deletes a salesperson. Fails while any sale references them.
    pub async fn delete(&self, id: SalespersonId) -> DbResult<()> {
        debug!(id = %id, "Deleting salesperson");

        let result = sqlx::query("DELETE FROM salespersons WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        info!(id = %id, "Deleted salesperson");
        Ok(())
    }

    // =========================================================================
    // Connection-scoped operations
    // =========================================================================

    /// Lists every salesperson on an existing connection, ascending id.
    pub async fn fetch_all(conn: &mut SqliteConnection) -> DbResult<Vec<Salesperson>> {
        let salespersons = sqlx::query_as::<_, Salesperson>(
            r#"
            SELECT id, first_name, last_name, address, phone,
                   start_date, termination_date, manager
            FROM salespersons
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(salespersons)
    }

    /// Fetches a salesperson on an existing connection or transaction.
    pub async fn fetch_by_id(
        conn: &mut SqliteConnection,
        id: SalespersonId,
    ) -> DbResult<Option<Salesperson>> {
        let salesperson = sqlx::query_as::<_, Salesperson>(
            r#"
            SELECT id, first_name, last_name, address, phone,
                   start_date, termination_date, manager
            FROM salespersons
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(salesperson)
    }

    async fn fetch_by_identity(
        conn: &mut SqliteConnection,
        first_name: &str,
        last_name: &str,
        phone: &str,
    ) -> DbResult<Option<Salesperson>> {
        let salesperson = sqlx::query_as::<_, Salesperson>(
            r#"
            SELECT id, first_name, last_name, address, phone,
                   start_date, termination_date, manager
            FROM salespersons
            WHERE first_name = ?1 AND last_name = ?2 AND phone = ?3
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(salesperson)
    }
}

fn identity(fields: &SalespersonFields) -> String {
    format!(
        "{} {} ({})",
        fields.first_name, fields.last_name, fields.phone
    )
}
