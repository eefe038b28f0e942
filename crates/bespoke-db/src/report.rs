//! # Commission Report Reader
//!
//! Reads a consistent snapshot of salespersons, sales, products and
//! discounts, and turns it into one `SalespersonCommission` row per
//! salesperson.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  generate(year, quarter)                                                │
//! │    │  ReportPeriod::from_selector → window (or unbounded)              │
//! │    ▼                                                                    │
//! │  BEGIN (read)                                                           │
//! │    │                                                                    │
//! │    ├── salespersons, ascending id                                      │
//! │    │     └── sales in window, ascending id                             │
//! │    │           ├── product (cached per report)                         │
//! │    │           └── active discounts → resolve_discount                 │
//! │    │                 └── CommissionTally::record                       │
//! │    │     └── CommissionTally::finish → row                             │
//! │    ▼                                                                    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every salesperson gets a row, including those with no sales in the
//! window. Nothing is written.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use bespoke_core::{
    resolve_discount, CommissionTally, DateWindow, Product, ProductId, ReportPeriod,
    SalespersonCommission,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::discount::DiscountRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::salesperson::SalespersonRepository;

/// Commission report generation over the store.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Report for a `(year, quarter)` selector where 0 means "all".
    ///
    /// ## Errors
    /// `Domain(Validation)` for quarter > 4, a quarter without a year, or
    /// a year outside 0..=9999. Validation happens before any read.
    pub async fn generate(&self, year: i32, quarter: u32) -> DbResult<Vec<SalespersonCommission>> {
        let period = ReportPeriod::from_selector(year, quarter)?;
        self.for_period(period).await
    }

    /// Report for one quarter; both fields are required (quarter 1..=4).
    pub async fn quarterly(&self, year: i32, quarter: u32) -> DbResult<Vec<SalespersonCommission>> {
        let period = ReportPeriod::quarter(year, quarter)?;
        self.for_period(period).await
    }

    /// Report for an already-built period.
    pub async fn for_period(&self, period: ReportPeriod) -> DbResult<Vec<SalespersonCommission>> {
        let window = period.window()?;
        debug!(%period, ?window, "Generating commission report");

        let mut tx = self.pool.begin().await?;
        let rows = compile(&mut tx, window).await?;
        tx.commit().await?;

        info!(
            %period,
            salespersons = rows.len(),
            sales = rows.iter().map(|r| r.num_sales as u64).sum::<u64>(),
            "Commission report generated"
        );
        Ok(rows)
    }
}

async fn compile(
    conn: &mut SqliteConnection,
    window: Option<DateWindow>,
) -> DbResult<Vec<SalespersonCommission>> {
    let salespersons = SalespersonRepository::fetch_all(conn).await?;
    let mut products: HashMap<ProductId, Product> = HashMap::new();
    let mut rows = Vec::with_capacity(salespersons.len());

    for salesperson in &salespersons {
        let sales = SaleRepository::fetch_for_salesperson(conn, salesperson.id, window).await?;
        let mut tally = CommissionTally::new();

        for sale in &sales {
            let product = match products.entry(sale.product_id) {
                Entry::Occupied(cached) => cached.into_mut(),
                Entry::Vacant(slot) => {
                    let product = ProductRepository::fetch_by_id(conn, sale.product_id)
                        .await?
                        .ok_or_else(|| DbError::not_found("Product", sale.product_id))?;
                    slot.insert(product)
                }
            };

            let active =
                DiscountRepository::fetch_active_on(conn, product.id, sale.sales_date).await?;
            let discount = resolve_discount(&active, product.id, sale.sales_date);

            tally.record(product, discount);
        }

        rows.push(tally.finish(salesperson));
    }

    Ok(rows)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::pool::{Database, DbConfig};
    use crate::seed::seed_sample_data;
    use bespoke_core::{Money, SalespersonFields, SalespersonId};
    use chrono::NaiveDate;

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_sample_data(&db).await.unwrap();
        db
    }

    fn row<'a>(rows: &'a [SalespersonCommission], first_name: &str) -> &'a SalespersonCommission {
        rows.iter().find(|r| r.first_name == first_name).unwrap()
    }

    #[tokio::test]
    async fn test_john_q1_2024() {
        let db = seeded().await;
        let rows = db.reports().generate(2024, 1).await.unwrap();

        let john = row(&rows, "john");
        assert_eq!(john.last_name, "doe");
        assert_eq!(john.num_sales, 1);
        assert_eq!(john.total_sales_amount, Money::from_cents(63_750));
        assert_eq!(john.total_commission, Money::from_cents(6_375));

        let quarterly = db.reports().quarterly(2024, 1).await.unwrap();
        assert_eq!(quarterly, rows);
    }

    #[tokio::test]
    async fn test_rows_in_salesperson_order_including_idle() {
        let db = seeded().await;

        // nobody sold anything in 2023
        let rows = db.reports().generate(2023, 0).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.windows(2).all(|w| w[0].salesperson_id < w[1].salesperson_id));
        for r in &rows {
            assert_eq!(r.num_sales, 0);
            assert!(r.total_sales_amount.is_zero());
            assert!(r.total_commission.is_zero());
        }
    }

    #[tokio::test]
    async fn test_quarter_4_includes_december_31() {
        let db = seeded().await;
        let mike = db
            .salespersons()
            .find_by_identity("mike", "carter", "555-9876")
            .await
            .unwrap()
            .unwrap();
        let products = db.products().list().await.unwrap();
        let customers = db.customers().list().await.unwrap();

        let before = row(&db.reports().generate(2024, 4).await.unwrap(), "mike").num_sales;
        db.sales()
            .create(bespoke_core::SaleFields {
                product_id: products[2].id,
                salesperson_id: mike.id,
                customer_id: customers[0].id,
                sales_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            })
            .await
            .unwrap();

        let after = row(&db.reports().generate(2024, 4).await.unwrap(), "mike").num_sales;
        assert_eq!(after, before + 1);

        let next_year = row(&db.reports().generate(2025, 1).await.unwrap(), "mike").num_sales;
        assert_eq!(next_year, 0);
    }

    #[tokio::test]
    async fn test_all_time_equals_sum_of_quarters() {
        let db = seeded().await;
        let all_time = db.reports().generate(0, 0).await.unwrap();
        let year = db.reports().generate(2024, 0).await.unwrap();

        for (i, total) in all_time.iter().enumerate() {
            let mut sales = 0;
            let mut amount = Money::zero();
            let mut commission = Money::zero();
            for q in 1..=4 {
                let rows = db.reports().generate(2024, q).await.unwrap();
                sales += rows[i].num_sales;
                amount += rows[i].total_sales_amount;
                commission += rows[i].total_commission;
            }
            // every sample sale prices to whole cents, so per-quarter
            // rounding cannot drift
            assert_eq!(total.num_sales, sales);
            assert_eq!(total.total_sales_amount, amount);
            assert_eq!(total.total_commission, commission);
            assert_eq!(year[i], *total);
        }
        assert_eq!(all_time.iter().map(|r| r.num_sales).sum::<u32>(), 9);
    }

    #[tokio::test]
    async fn test_new_salesperson_does_not_change_others() {
        let db = seeded().await;
        let before = db.reports().generate(2024, 0).await.unwrap();

        let newbie = db
            .salespersons()
            .create(SalespersonFields {
                first_name: "nora".to_string(),
                last_name: "new".to_string(),
                address: "1 first st".to_string(),
                phone: "555-0001".to_string(),
                start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                termination_date: None,
                manager: "jane smith".to_string(),
            })
            .await
            .unwrap();

        let after = db.reports().generate(2024, 0).await.unwrap();
        assert_eq!(&after[..before.len()], &before[..]);
        let last = after.last().unwrap();
        assert_eq!(last.salesperson_id, newbie.id);
        assert_eq!(last.num_sales, 0);
        assert_ne!(last.salesperson_id, SalespersonId::new(0));
    }

    #[tokio::test]
    async fn test_bad_selectors() {
        let db = seeded().await;
        let reports = db.reports();

        for (year, quarter) in [(2024, 5), (0, 2), (-1, 0)] {
            let err = reports.generate(year, quarter).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::ValidationError, "{year} {quarter}");
        }
        let err = reports.quarterly(2024, 0).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }
}
