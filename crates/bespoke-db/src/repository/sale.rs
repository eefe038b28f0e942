//! # Sale Repository
//!
//! Database operations for sales.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create() → InventoryLedger::record_sale()                      │
//! │         └── product stock − 1, references checked, row inserted        │
//! │                                                                         │
//! │  2. (OPTIONAL) AMEND                                                   │
//! │     └── update() → InventoryLedger::amend_sale()                       │
//! │         └── fields replaced, references checked, stock untouched       │
//! │                                                                         │
//! │  3. (OPTIONAL) DELETE                                                  │
//! │     └── delete() → InventoryLedger::remove_sale()                      │
//! │         └── product stock + 1, row deleted                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The row-level statements below (`insert`, `overwrite`, `remove`) do not
//! touch stock. Outside the ledger and the seed loader, go through
//! `create`/`update`/`delete`.

use bespoke_core::{DateWindow, Sale, SaleFields, SaleId, SalespersonId};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::ledger::InventoryLedger;

const ENTITY: &str = "Sale";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Lists every sale, ascending id.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, product_id, salesperson_id, customer_id, sales_date
            FROM sales
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Gets a sale by id.
    pub async fn get_by_id(&self, id: SaleId) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_by_id(&mut conn, id).await
    }

    /// Gets a sale by id, failing with `NotFound` if absent.
    pub async fn get(&self, id: SaleId) -> DbResult<Sale> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))
    }

    /// Records a sale and takes one unit of its product off the shelf.
    pub async fn create(&self, fields: SaleFields) -> DbResult<Sale> {
        InventoryLedger::new(self.pool.clone())
            .record_sale(fields)
            .await
    }

    /// Replaces every field of a sale. Stock is not moved.
    pub async fn update(&self, id: SaleId, fields: SaleFields) -> DbResult<Sale> {
        InventoryLedger::new(self.pool.clone())
            .amend_sale(id, fields)
            .await
    }

    /// Deletes a sale and returns its unit to stock.
    pub async fn delete(&self, id: SaleId) -> DbResult<()> {
        InventoryLedger::new(self.pool.clone())
            .remove_sale(id)
            .await
            .map(|_| ())
    }

    /// Lists a salesperson's sales, optionally within an inclusive window.
    pub async fn list_for_salesperson(
        &self,
        salesperson_id: SalespersonId,
        window: Option<DateWindow>,
    ) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_for_salesperson(&mut conn, salesperson_id, window).await
    }

    // =========================================================================
    // Connection-scoped operations
    // =========================================================================

    /// Fetches a sale on an existing connection or transaction.
    pub async fn fetch_by_id(conn: &mut SqliteConnection, id: SaleId) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, product_id, salesperson_id, customer_id, sales_date
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(sale)
    }

    /// Sales of one salesperson, ascending id. `None` means every date.
    pub async fn fetch_for_salesperson(
        conn: &mut SqliteConnection,
        salesperson_id: SalespersonId,
        window: Option<DateWindow>,
    ) -> DbResult<Vec<Sale>> {
        debug!(salesperson_id = %salesperson_id, ?window, "Fetching sales for salesperson");

        let sales = match window {
            Some(window) => {
                sqlx::query_as::<_, Sale>(
                    r#"
                    SELECT id, product_id, salesperson_id, customer_id, sales_date
                    FROM sales
                    WHERE salesperson_id = ?1
                      AND sales_date >= ?2
                      AND sales_date <= ?3
                    ORDER BY id
                    "#,
                )
                .bind(salesperson_id)
                .bind(window.start)
                .bind(window.end)
                .fetch_all(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_as::<_, Sale>(
                    r#"
                    SELECT id, product_id, salesperson_id, customer_id, sales_date
                    FROM sales
                    WHERE salesperson_id = ?1
                    ORDER BY id
                    "#,
                )
                .bind(salesperson_id)
                .fetch_all(&mut *conn)
                .await?
            }
        };

        Ok(sales)
    }

    /// Inserts a sale row. Does not move stock or check references.
    pub async fn insert(conn: &mut SqliteConnection, fields: SaleFields) -> DbResult<Sale> {
        let result = sqlx::query(
            r#"
            INSERT INTO sales (product_id, salesperson_id, customer_id, sales_date)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(fields.product_id)
        .bind(fields.salesperson_id)
        .bind(fields.customer_id)
        .bind(fields.sales_date)
        .execute(&mut *conn)
        .await?;

        Ok(Sale::from_fields(
            SaleId::new(result.last_insert_rowid()),
            fields,
        ))
    }

    /// Overwrites a sale row. Does not move stock.
    pub async fn overwrite(
        conn: &mut SqliteConnection,
        id: SaleId,
        fields: SaleFields,
    ) -> DbResult<Sale> {
        let result = sqlx::query(
            r#"
            UPDATE sales SET
                product_id = ?2,
                salesperson_id = ?3,
                customer_id = ?4,
                sales_date = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(fields.product_id)
        .bind(fields.salesperson_id)
        .bind(fields.customer_id)
        .bind(fields.sales_date)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        Ok(Sale::from_fields(id, fields))
    }

    /// Deletes a sale row. Does not move stock.
    pub async fn remove(conn: &mut SqliteConnection, id: SaleId) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::pool::{Database, DbConfig};
    use crate::seed::seed_sample_data;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_list_for_salesperson_window_is_inclusive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let seeded = seed_sample_data(&db).await.unwrap();
        let john = seeded.salespersons[0];
        let repo = db.sales();

        assert_eq!(repo.list_for_salesperson(john, None).await.unwrap().len(), 3);

        // john's sales: 2024-01-15, 2024-04-10, 2024-07-20
        let edges = DateWindow {
            start: date(2024, 1, 15),
            end: date(2024, 4, 10),
        };
        let sales = repo.list_for_salesperson(john, Some(edges)).await.unwrap();
        assert_eq!(sales.len(), 2);
        assert!(sales[0].id < sales[1].id);

        let empty = DateWindow {
            start: date(2023, 1, 1),
            end: date(2023, 12, 31),
        };
        assert!(repo
            .list_for_salesperson(john, Some(empty))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_row_statements_leave_stock_alone() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let seeded = seed_sample_data(&db).await.unwrap();
        let product = seeded.products[0];
        let before = db.products().get(product).await.unwrap().qty_on_hand;

        let mut conn = db.pool().acquire().await.unwrap();
        let fields = SaleFields {
            product_id: product,
            salesperson_id: seeded.salespersons[1],
            customer_id: seeded.customers[2],
            sales_date: date(2024, 8, 1),
        };
        let sale = SaleRepository::insert(&mut conn, fields).await.unwrap();
        let moved = SaleRepository::overwrite(
            &mut conn,
            sale.id,
            SaleFields {
                sales_date: date(2024, 8, 2),
                ..fields
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.sales_date, date(2024, 8, 2));
        SaleRepository::remove(&mut conn, sale.id).await.unwrap();

        let err = SaleRepository::remove(&mut conn, sale.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        drop(conn);

        assert_eq!(db.products().get(product).await.unwrap().qty_on_hand, before);
        assert_eq!(db.sales().get(sale.id).await.unwrap_err().code(), ErrorCode::NotFound);
    }
}
