//! # Inventory Ledger
//!
//! Keeps `products.qty_on_hand` in step with the sales that reference
//! each product. Every sale event is one SQLite transaction.
//!
//! ## Recording a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN IMMEDIATE                                                        │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  UPDATE products SET qty_on_hand = qty_on_hand - 1                     │
//! │   WHERE id = ? AND qty_on_hand - 1 >= 0                                │
//! │    │                                                                    │
//! │    ├── 0 rows, product missing ─────────► NotFound    ┐                │
//! │    ├── 0 rows, qty_on_hand = 0 ─────────► OutOfStock  │                │
//! │    ▼                                                  │  ROLLBACK      │
//! │  salesperson exists? customer exists? ──► NotFound    │  (tx dropped)  │
//! │    │                                                  ┘                │
//! │    ▼                                                                    │
//! │  INSERT INTO sales ...                                                 │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every ledger transaction opens with `BEGIN IMMEDIATE`, so sale events
//! queue on SQLite's write lock rather than failing when they overlap.
//! Two concurrent sales of the last unit serialize: one commits, the other
//! sees zero
//! and fails with `OutOfStock`.
//!
//! Amending a sale never moves stock, even when its product changes.
//! See `bespoke_core::ledger`.

use bespoke_core::{CoreError, Sale, SaleFields, SaleId, StockMovement};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::begin_write;
use crate::repository::customer::CustomerRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::salesperson::SalespersonRepository;

/// Transactional sale lifecycle with stock bookkeeping.
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    pool: SqlitePool,
}

impl InventoryLedger {
    /// Creates a new InventoryLedger.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryLedger { pool }
    }

    /// Records a sale, taking one unit of its product.
    ///
    /// ## Returns
    /// * `Ok(Sale)` - Sale stored, stock decremented
    /// * `Err(NotFound)` - Product, salesperson or customer missing
    /// * `Err(Domain(OutOfStock))` - Nothing on hand
    ///
    /// On any error nothing is written.
    pub async fn record_sale(&self, fields: SaleFields) -> DbResult<Sale> {
        let mut tx = begin_write(&self.pool).await?;

        match Self::record_in(&mut tx, fields).await {
            Ok(sale) => {
                tx.commit().await?;
                info!(
                    sale_id = %sale.id,
                    product_id = %sale.product_id,
                    salesperson_id = %sale.salesperson_id,
                    date = %sale.sales_date,
                    "Recorded sale"
                );
                Ok(sale)
            }
            Err(err) => {
                warn!(product_id = %fields.product_id, error = %err, "Sale rejected");
                Err(err)
            }
        }
    }

    /// Deletes a sale, returning its unit to stock.
    ///
    /// ## Returns
    /// * `Ok(Sale)` - The removed sale
    /// * `Err(NotFound)` - No such sale
    pub async fn remove_sale(&self, id: SaleId) -> DbResult<Sale> {
        let mut tx = begin_write(&self.pool).await?;

        let sale = SaleRepository::fetch_by_id(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        ProductRepository::apply_movement(&mut tx, StockMovement::for_removed_sale(&sale))
            .await?;
        SaleRepository::remove(&mut tx, id).await?;

        tx.commit().await?;

        info!(sale_id = %id, product_id = %sale.product_id, "Removed sale");
        Ok(sale)
    }

    /// Replaces every field of a sale without moving stock.
    ///
    /// All three references must exist. Changing `product_id` leaves both
    /// the old and the new product's `qty_on_hand` as they were.
    pub async fn amend_sale(&self, id: SaleId, fields: SaleFields) -> DbResult<Sale> {
        let mut tx = begin_write(&self.pool).await?;

        let before = SaleRepository::fetch_by_id(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        if ProductRepository::fetch_by_id(&mut tx, fields.product_id)
            .await?
            .is_none()
        {
            return Err(DbError::not_found("Product", fields.product_id));
        }
        ensure_parties(&mut tx, &fields).await?;

        let movement = StockMovement::for_amended_sale(&before, &fields);
        ProductRepository::apply_movement(&mut tx, movement).await?;

        let sale = SaleRepository::overwrite(&mut tx, id, fields).await?;
        tx.commit().await?;

        if before.product_id != sale.product_id {
            info!(
                sale_id = %id,
                from = %before.product_id,
                to = %sale.product_id,
                "Sale moved to another product, stock unchanged"
            );
        }
        Ok(sale)
    }

    async fn record_in(conn: &mut SqliteConnection, fields: SaleFields) -> DbResult<Sale> {
        ProductRepository::apply_movement(conn, StockMovement::for_new_sale(&fields)).await?;
        ensure_parties(conn, &fields).await?;
        SaleRepository::insert(conn, fields).await
    }
}

/// Salesperson and customer of a sale must both exist.
async fn ensure_parties(conn: &mut SqliteConnection, fields: &SaleFields) -> DbResult<()> {
    if SalespersonRepository::fetch_by_id(conn, fields.salesperson_id)
        .await?
        .is_none()
    {
        return Err(CoreError::not_found("Salesperson", fields.salesperson_id).into());
    }
    if CustomerRepository::fetch_by_id(conn, fields.customer_id)
        .await?
        .is_none()
    {
        return Err(CoreError::not_found("Customer", fields.customer_id).into());
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::pool::{Database, DbConfig};
    use bespoke_core::{
        CustomerFields, CustomerId, Money, Percentage, ProductFields, ProductId,
        SalespersonFields, SalespersonId,
    };
    use chrono::NaiveDate;
    use tempfile::TempDir;

    struct Shop {
        db: Database,
        _dir: Option<TempDir>,
        product: ProductId,
        other_product: ProductId,
        salesperson: SalespersonId,
        customer: CustomerId,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn product(name: &str, qty: i64) -> ProductFields {
        ProductFields {
            name: name.to_string(),
            manufacturer: "cyclepro".to_string(),
            style: "road".to_string(),
            purchase_price: Money::from_cents(50_000),
            sale_price: Money::from_cents(75_000),
            qty_on_hand: qty,
            commission_percentage: Percentage::from_bps(1000),
        }
    }

    async fn shop(qty: i64) -> Shop {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        stock_shop(db, None, qty).await
    }

    /// A WAL file store with several connections, so writers really race.
    async fn file_shop(qty: i64) -> Shop {
        let dir = TempDir::new().unwrap();
        let config = DbConfig::new(dir.path().join("shop.db")).max_connections(8);
        let db = Database::new(config).await.unwrap();
        stock_shop(db, Some(dir), qty).await
    }

    async fn stock_shop(db: Database, dir: Option<TempDir>, qty: i64) -> Shop {
        let product_id = db.products().create(product("speedster 3000", qty)).await.unwrap().id;
        let other = db.products().create(product("city cruiser", 8)).await.unwrap().id;
        let salesperson = db
            .salespersons()
            .create(SalespersonFields {
                first_name: "john".to_string(),
                last_name: "doe".to_string(),
                address: "123 main st".to_string(),
                phone: "555-1234".to_string(),
                start_date: date(2020, 5, 1),
                termination_date: None,
                manager: "jane smith".to_string(),
            })
            .await
            .unwrap()
            .id;
        let customer = db
            .customers()
            .create(CustomerFields {
                first_name: "tom".to_string(),
                last_name: "anderson".to_string(),
                address: "789 pine rd".to_string(),
                phone: "555-8765".to_string(),
                start_date: date(2023, 1, 10),
            })
            .await
            .unwrap()
            .id;
        Shop {
            db,
            _dir: dir,
            product: product_id,
            other_product: other,
            salesperson,
            customer,
        }
    }

    impl Shop {
        fn sale(&self, product: ProductId) -> SaleFields {
            SaleFields {
                product_id: product,
                salesperson_id: self.salesperson,
                customer_id: self.customer,
                sales_date: date(2024, 1, 15),
            }
        }

        async fn qty(&self, product: ProductId) -> i64 {
            self.db.products().get(product).await.unwrap().qty_on_hand
        }
    }

    #[tokio::test]
    async fn test_record_takes_and_remove_returns() {
        let shop = shop(2).await;
        let ledger = shop.db.ledger();

        let sale = ledger.record_sale(shop.sale(shop.product)).await.unwrap();
        assert_eq!(shop.qty(shop.product).await, 1);
        assert_eq!(shop.db.sales().get(sale.id).await.unwrap(), sale);

        let removed = ledger.remove_sale(sale.id).await.unwrap();
        assert_eq!(removed.id, sale.id);
        assert_eq!(shop.qty(shop.product).await, 2);
        assert!(shop.db.sales().list().await.unwrap().is_empty());

        let err = ledger.remove_sale(sale.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_out_of_stock_leaves_no_trace() {
        let shop = shop(1).await;
        let ledger = shop.db.ledger();

        ledger.record_sale(shop.sale(shop.product)).await.unwrap();
        let err = ledger.record_sale(shop.sale(shop.product)).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::OutOfStock);
        assert_eq!(shop.qty(shop.product).await, 0);
        assert_eq!(shop.db.sales().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_references_are_rejected_and_rolled_back() {
        let shop = shop(3).await;
        let ledger = shop.db.ledger();

        let err = ledger
            .record_sale(shop.sale(ProductId::new(404)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);

        // stock was taken before the customer check failed; the rollback
        // must put it back
        let mut orphan = shop.sale(shop.product);
        orphan.customer_id = CustomerId::new(404);
        let err = ledger.record_sale(orphan).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);

        let mut orphan = shop.sale(shop.product);
        orphan.salesperson_id = SalespersonId::new(404);
        let err = ledger.record_sale(orphan).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);

        assert_eq!(shop.qty(shop.product).await, 3);
        assert!(shop.db.sales().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_amend_does_not_rebalance_stock() {
        let shop = shop(2).await;
        let ledger = shop.db.ledger();

        let sale = ledger.record_sale(shop.sale(shop.product)).await.unwrap();
        assert_eq!(shop.qty(shop.product).await, 1);
        assert_eq!(shop.qty(shop.other_product).await, 8);

        let moved = ledger
            .amend_sale(sale.id, shop.sale(shop.other_product))
            .await
            .unwrap();
        assert_eq!(moved.product_id, shop.other_product);

        // neither product moves
        assert_eq!(shop.qty(shop.product).await, 1);
        assert_eq!(shop.qty(shop.other_product).await, 8);

        // removal follows the sale's current product
        ledger.remove_sale(sale.id).await.unwrap();
        assert_eq!(shop.qty(shop.product).await, 1);
        assert_eq!(shop.qty(shop.other_product).await, 9);
    }

    #[tokio::test]
    async fn test_amend_checks_references() {
        let shop = shop(2).await;
        let ledger = shop.db.ledger();
        let sale = ledger.record_sale(shop.sale(shop.product)).await.unwrap();

        let err = ledger
            .amend_sale(sale.id, shop.sale(ProductId::new(404)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);

        let err = ledger
            .amend_sale(SaleId::new(404), shop.sale(shop.product))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);

        assert_eq!(shop.db.sales().get(sale.id).await.unwrap(), sale);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sales_of_last_unit() {
        let shop = file_shop(1).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = shop.db.ledger();
                let fields = shop.sale(shop.product);
                tokio::spawn(async move { ledger.record_sale(fields).await })
            })
            .collect();

        let mut won = 0;
        let mut out_of_stock = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(e) if e.code() == ErrorCode::OutOfStock => out_of_stock += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(won, 1);
        assert_eq!(out_of_stock, 7);
        assert_eq!(shop.qty(shop.product).await, 0);
        assert_eq!(shop.db.sales().list().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_removals_and_sales_all_succeed() {
        let shop = file_shop(40).await;
        let ledger = shop.db.ledger();

        let mut existing = Vec::new();
        for _ in 0..20 {
            existing.push(ledger.record_sale(shop.sale(shop.product)).await.unwrap().id);
        }
        assert_eq!(shop.qty(shop.product).await, 20);

        let mut handles = Vec::new();
        for id in existing {
            let ledger = shop.db.ledger();
            handles.push(tokio::spawn(async move {
                ledger.remove_sale(id).await.map(|_| ())
            }));
        }
        for _ in 0..20 {
            let ledger = shop.db.ledger();
            let fields = shop.sale(shop.product);
            handles.push(tokio::spawn(async move {
                ledger.record_sale(fields).await.map(|_| ())
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await.unwrap() {
                panic!("overlapping sale events must not fail: {e}");
            }
        }

        // 20 returned, 20 taken
        assert_eq!(shop.qty(shop.product).await, 20);
        assert_eq!(shop.db.sales().list().await.unwrap().len(), 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_amendments_and_catalog_writes() {
        let shop = file_shop(10).await;
        let ledger = shop.db.ledger();

        let mut sales = Vec::new();
        for _ in 0..5 {
            sales.push(ledger.record_sale(shop.sale(shop.product)).await.unwrap().id);
        }

        let mut handles = Vec::new();
        for (i, id) in sales.into_iter().enumerate() {
            let ledger = shop.db.ledger();
            let mut fields = shop.sale(shop.other_product);
            fields.sales_date = date(2024, 2, i as u32 + 1);
            handles.push(tokio::spawn(async move {
                ledger.amend_sale(id, fields).await.map(|_| ())
            }));
        }
        for i in 0..5 {
            let products = shop.db.products();
            handles.push(tokio::spawn(async move {
                products
                    .create(product(&format!("tandem {i}"), 1))
                    .await
                    .map(|_| ())
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await.unwrap() {
                panic!("overlapping writes must not fail: {e}");
            }
        }

        assert_eq!(shop.qty(shop.product).await, 5);
        assert_eq!(shop.db.products().list().await.unwrap().len(), 7);
        let moved = shop.db.sales().list().await.unwrap();
        assert!(moved.iter().all(|s| s.product_id == shop.other_product));
    }

    #[tokio::test]
    async fn test_referenced_product_cannot_be_deleted() {
        let shop = shop(2).await;
        let sale = shop.db.sales().create(shop.sale(shop.product)).await.unwrap();

        let err = shop.db.products().delete(shop.product).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);
        let err = shop.db.customers().delete(shop.customer).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);

        shop.db.sales().delete(sale.id).await.unwrap();
        shop.db.products().delete(shop.product).await.unwrap();
    }

    #[tokio::test]
    async fn test_stock_tracks_creations_minus_removals() {
        let shop = shop(5).await;
        let ledger = shop.db.ledger();

        let mut live = Vec::new();
        for _ in 0..4 {
            live.push(ledger.record_sale(shop.sale(shop.product)).await.unwrap().id);
        }
        ledger.remove_sale(live[1]).await.unwrap();
        ledger.remove_sale(live[3]).await.unwrap();

        // 5 − 4 + 2
        assert_eq!(shop.qty(shop.product).await, 3);
    }
}
