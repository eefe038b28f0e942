//! # Discount Repository
//!
//! Database operations for product discounts, and the store side of the
//! discount resolver.
//!
//! Overlapping ranges on one product are allowed. [`DiscountRepository::resolve`]
//! picks one deterministically via `bespoke_core::resolve_discount`.

use bespoke_core::validation::validate_discount;
use bespoke_core::{resolve_discount, Discount, DiscountFields, DiscountId, ProductId};
use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::pool::begin_write;
use crate::repository::product::ProductRepository;

const ENTITY: &str = "Discount";

/// Repository for discount database operations.
#[derive(Debug, Clone)]
pub struct DiscountRepository {
    pool: SqlitePool,
}

impl DiscountRepository {
    /// Creates a new DiscountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DiscountRepository { pool }
    }

    /// Lists every discount, ascending id.
    pub async fn list(&self) -> DbResult<Vec<Discount>> {
        let discounts = sqlx::query_as::<_, Discount>(
            r#"
            SELECT id, product_id, begin_date, end_date, discount_percentage
            FROM discounts
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(discounts)
    }

    /// Gets a discount by id.
    pub async fn get_by_id(&self, id: DiscountId) -> DbResult<Option<Discount>> {
        let discount = sqlx::query_as::<_, Discount>(
            r#"
            SELECT id, product_id, begin_date, end_date, discount_percentage
            FROM discounts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(discount)
    }

    /// Gets a discount by id, failing with `NotFound` if absent.
    pub async fn get(&self, id: DiscountId) -> DbResult<Discount> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))
    }

    /// Every discount defined for a product, ascending id.
    pub async fn list_for_product(&self, product_id: ProductId) -> DbResult<Vec<Discount>> {
        let discounts = sqlx::query_as::<_, Discount>(
            r#"
            SELECT id, product_id, begin_date, end_date, discount_percentage
            FROM discounts
            WHERE product_id = ?1
            ORDER BY id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(discounts)
    }

    /// Discounts of a product whose range contains `date`, ascending id.
    pub async fn list_active_on(
        &self,
        product_id: ProductId,
        date: NaiveDate,
    ) -> DbResult<Vec<Discount>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_active_on(&mut conn, product_id, date).await
    }

    /// The discount in effect for a product on a day, if any.
    pub async fn resolve(
        &self,
        product_id: ProductId,
        date: NaiveDate,
    ) -> DbResult<Option<Discount>> {
        let active = self.list_active_on(product_id, date).await?;
        Ok(resolve_discount(&active, product_id, date).cloned())
    }

    /// Inserts a new discount.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(Domain(Validation))` - Bad percentage or inverted range
    pub async fn create(&self, fields: DiscountFields) -> DbResult<Discount> {
        validate_discount(&fields)?;

        let mut tx = begin_write(&self.pool).await?;
        require_product(&mut tx, fields.product_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO discounts (product_id, begin_date, end_date, discount_percentage)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(fields.product_id)
        .bind(fields.begin_date)
        .bind(fields.end_date)
        .bind(fields.discount_percentage)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let discount = Discount::from_fields(DiscountId::new(result.last_insert_rowid()), fields);
        info!(
            id = %discount.id,
            product_id = %discount.product_id,
            pct = %discount.discount_percentage,
            "Created discount"
        );
        Ok(discount)
    }

    /// Replaces every field of an existing discount.
    pub async fn update(&self, id: DiscountId, fields: DiscountFields) -> DbResult<Discount> {
        validate_discount(&fields)?;
        debug!(id = %id, "Updating discount");

        let mut tx = begin_write(&self.pool).await?;
        require_product(&mut tx, fields.product_id).await?;

        let result = sqlx::query(
            r#"
            UPDATE discounts SET
                product_id = ?2,
                begin_date = ?3,
                end_date = ?4,
                discount_percentage = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(fields.product_id)
        .bind(fields.begin_date)
        .bind(fields.end_date)
        .bind(fields.discount_percentage)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        tx.commit().await?;
        Ok(Discount::from_fields(id, fields))
    }

    /// Deletes a discount.
    pub async fn delete(&self, id: DiscountId) -> DbResult<()> {
        debug!(id = %id, "Deleting discount");

        let result = sqlx::query("DELETE FROM discounts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        Ok(())
    }

    /// Discounts of a product active on `date`, on an existing connection.
    pub async fn fetch_active_on(
        conn: &mut SqliteConnection,
        product_id: ProductId,
        date: NaiveDate,
    ) -> DbResult<Vec<Discount>> {
        let discounts = sqlx::query_as::<_, Discount>(
            r#"
            SELECT id, product_id, begin_date, end_date, discount_percentage
            FROM discounts
            WHERE product_id = ?1
              AND begin_date <= ?2
              AND end_date >= ?2
            ORDER BY id
            "#,
        )
        .bind(product_id)
        .bind(date)
        .fetch_all(&mut *conn)
        .await?;

        Ok(discounts)
    }
}

async fn require_product(conn: &mut SqliteConnection, id: ProductId) -> DbResult<()> {
    ProductRepository::fetch_by_id(conn, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| DbError::not_found("Product", id))
}
