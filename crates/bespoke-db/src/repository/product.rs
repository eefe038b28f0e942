//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with name uniqueness
//! - Stock movements for the inventory ledger
//!
//! ## Guarded Stock Update
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How a Take Cannot Oversell                           │
//! │                                                                         │
//! │  ❌ WRONG: read, check, write                                          │
//! │     SELECT qty_on_hand ... → 1                                         │
//! │     (another sale commits here, qty is now 0)                          │
//! │     UPDATE products SET qty_on_hand = 0   ← two sales, one bike        │
//! │                                                                         │
//! │  ✅ CORRECT: check inside the write                                    │
//! │     UPDATE products SET qty_on_hand = qty_on_hand + :delta             │
//! │     WHERE id = :id AND qty_on_hand + :delta >= 0                       │
//! │                                                                         │
//! │     rows_affected = 0 → product missing (NotFound) or empty            │
//! │                         (OutOfStock), decided after the fact           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bespoke_core::validation::validate_product;
use bespoke_core::{CoreError, Product, ProductFields, ProductId, StockMovement};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::pool::begin_write;

const ENTITY: &str = "Product";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let speedster = repo.get_by_name("speedster 3000").await?;
/// let all = repo.list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product, ascending id.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, manufacturer, style, purchase_price, sale_price,
                   qty_on_hand, commission_percentage
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: ProductId) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_by_id(&mut conn, id).await
    }

    /// Gets a product by its id, failing with `NotFound` if absent.
    pub async fn get(&self, id: ProductId) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))
    }

    /// Gets a product by its (unique) name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_by_name(&mut conn, name).await
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with its assigned id
    /// * `Err(Domain(Validation))` - Field rules violated
    /// * `Err(Domain(Conflict))` - Name already taken
    pub async fn create(&self, fields: ProductFields) -> DbResult<Product> {
        validate_product(&fields)?;

        let mut tx = begin_write(&self.pool).await?;

        if Self::fetch_by_name(&mut tx, &fields.name).await?.is_some() {
            return Err(CoreError::conflict(ENTITY, format!("name '{}'", fields.name)).into());
        }

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, manufacturer, style, purchase_price, sale_price,
                qty_on_hand, commission_percentage
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.manufacturer)
        .bind(&fields.style)
        .bind(fields.purchase_price)
        .bind(fields.sale_price)
        .bind(fields.qty_on_hand)
        .bind(fields.commission_percentage)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let product = Product::from_fields(ProductId::new(result.last_insert_rowid()), fields);
        info!(id = %product.id, name = %product.name, "Created product");
        Ok(product)
    }

    /// Replaces every field of an existing product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(Domain(Conflict))` - Name belongs to another product
    pub async fn update(&self, id: ProductId, fields: ProductFields) -> DbResult<Product> {
        validate_product(&fields)?;
        debug!(id = %id, "Updating product");

        let mut tx = begin_write(&self.pool).await?;

        if let Some(existing) = Self::fetch_by_name(&mut tx, &fields.name).await? {
            if existing.id != id {
                return Err(
                    CoreError::conflict(ENTITY, format!("name '{}'", fields.name)).into(),
                );
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                manufacturer = ?3,
                style = ?4,
                purchase_price = ?5,
                sale_price = ?6,
                qty_on_hand = ?7,
                commission_percentage = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.manufacturer)
        .bind(&fields.style)
        .bind(fields.purchase_price)
        .bind(fields.sale_price)
        .bind(fields.qty_on_hand)
        .bind(fields.commission_percentage)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        tx.commit().await?;
        Ok(Product::from_fields(id, fields))
    }

    /// Deletes a product.
    ///
    /// Fails with `ForeignKeyViolation` while any sale or discount still
    /// references it.
    pub async fn delete(&self, id: ProductId) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        info!(id = %id, "Deleted product");
        Ok(())
    }

    // =========================================================================
    // Connection-scoped operations (run inside a caller's transaction)
    // =========================================================================

    /// Fetches a product on an existing connection or transaction.
    pub async fn fetch_by_id(
        conn: &mut SqliteConnection,
        id: ProductId,
    ) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, manufacturer, style, purchase_price, sale_price,
                   qty_on_hand, commission_percentage
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(product)
    }

    async fn fetch_by_name(conn: &mut SqliteConnection, name: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, manufacturer, style, purchase_price, sale_price,
                   qty_on_hand, commission_percentage
            FROM products
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(product)
    }

    /// Applies a ledger movement to a product's stock.
    ///
    /// The non-negative check runs inside the UPDATE itself, so a take
    /// either happens atomically or not at all.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(Domain(OutOfStock))` - Take against zero stock, nothing changed
    pub async fn apply_movement(
        conn: &mut SqliteConnection,
        movement: StockMovement,
    ) -> DbResult<()> {
        let Some(id) = movement.product_id() else {
            return Ok(());
        };
        let delta = movement.delta();

        debug!(id = %id, delta, "Moving stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET qty_on_hand = qty_on_hand + ?2
            WHERE id = ?1 AND qty_on_hand + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Nothing matched: tell a missing product apart from an empty one.
        let product = Self::fetch_by_id(conn, id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))?;
        movement.apply_to(product.qty_on_hand)?;

        Err(DbError::TransactionFailed(format!(
            "stock of product {} changed during update",
            id
        )))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
