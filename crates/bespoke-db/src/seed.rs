//! # Sample Data
//!
//! Loads the shop's sample data set: 5 bikes, 3 salespersons, 3
//! customers, 9 sales across 2024 and 5 discounts.
//!
//! ## Loading Rules
//! - Existing rows in every table are cleared first (dependents first).
//! - Products, staff, customers and discounts go through their
//!   repositories, so the usual validation applies.
//! - Sales are inserted as plain records. They describe history, so stock
//!   is left at the listed quantities.

use bespoke_core::{
    CustomerFields, CustomerId, DiscountFields, DiscountId, Money, Percentage, ProductFields,
    ProductId, SaleFields, SaleId, SalespersonFields, SalespersonId,
};
use chrono::NaiveDate;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::sale::SaleRepository;

/// Ids assigned while seeding, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SeedSummary {
    pub products: Vec<ProductId>,
    pub salespersons: Vec<SalespersonId>,
    pub customers: Vec<CustomerId>,
    pub sales: Vec<SaleId>,
    pub discounts: Vec<DiscountId>,
}

// name, manufacturer, style, purchase $, sale $, qty, commission %
const PRODUCTS: &[(&str, &str, &str, i64, i64, i64, f64)] = &[
    ("speedster 3000", "cyclepro", "road", 500, 750, 2, 10.0),
    ("mountain king", "trailblazer", "mountain", 600, 900, 5, 12.5),
    ("city cruiser", "urbanrider", "hybrid", 300, 500, 8, 8.0),
    ("gravel master", "allterrain", "gravel", 550, 800, 4, 11.0),
    ("kids fun rider", "tinybikes", "kids", 200, 350, 7, 9.0),
];

// first, last, address, phone, start
const SALESPERSONS: &[(&str, &str, &str, &str, (i32, u32, u32))] = &[
    ("john", "doe", "123 main st", "555-1234", (2020, 5, 1)),
    ("alice", "johnson", "456 oak ave", "555-5678", (2019, 3, 15)),
    ("mike", "carter", "789 elm st", "555-9876", (2021, 7, 10)),
];

const MANAGER: &str = "jane smith";

const CUSTOMERS: &[(&str, &str, &str, &str, (i32, u32, u32))] = &[
    ("tom", "anderson", "789 pine rd", "555-8765", (2023, 1, 10)),
    ("sara", "miller", "321 maple ln", "555-4321", (2023, 2, 20)),
    ("david", "lee", "555 cedar blvd", "555-6543", (2023, 3, 5)),
];

// product, salesperson, customer (1-based positions), date
const SALES: &[(usize, usize, usize, (i32, u32, u32))] = &[
    (1, 1, 1, (2024, 1, 15)),
    (2, 1, 2, (2024, 4, 10)),
    (3, 1, 3, (2024, 7, 20)),
    (4, 2, 2, (2024, 3, 22)),
    (1, 2, 3, (2024, 6, 18)),
    (2, 2, 1, (2024, 9, 5)),
    (3, 3, 3, (2024, 2, 14)),
    (4, 3, 1, (2024, 5, 30)),
    (2, 3, 2, (2024, 10, 8)),
];

// product (1-based position), begin, end, discount %
const DISCOUNTS: &[(usize, (i32, u32, u32), (i32, u32, u32), f64)] = &[
    (1, (2024, 1, 1), (2024, 1, 31), 15.0),
    (2, (2024, 9, 1), (2024, 9, 30), 20.0),
    (4, (2024, 5, 15), (2024, 6, 15), 10.0),
    (5, (2024, 7, 1), (2024, 7, 31), 25.0),
    (5, (2024, 11, 1), (2024, 11, 30), 12.5),
];

/// Replaces the store's contents with the sample data set.
pub async fn seed_sample_data(db: &Database) -> DbResult<SeedSummary> {
    clear_all(db).await?;

    let mut summary = SeedSummary::default();

    for &(name, manufacturer, style, purchase, sale, qty, commission) in PRODUCTS {
        let product = db
            .products()
            .create(ProductFields {
                name: name.to_string(),
                manufacturer: manufacturer.to_string(),
                style: style.to_string(),
                purchase_price: Money::from_major_minor(purchase, 0),
                sale_price: Money::from_major_minor(sale, 0),
                qty_on_hand: qty,
                commission_percentage: Percentage::from_percentage(commission),
            })
            .await?;
        summary.products.push(product.id);
    }

    for &(first, last, address, phone, start) in SALESPERSONS {
        let salesperson = db
            .salespersons()
            .create(SalespersonFields {
                first_name: first.to_string(),
                last_name: last.to_string(),
                address: address.to_string(),
                phone: phone.to_string(),
                start_date: ymd(start)?,
                termination_date: None,
                manager: MANAGER.to_string(),
            })
            .await?;
        summary.salespersons.push(salesperson.id);
    }

    for &(first, last, address, phone, start) in CUSTOMERS {
        let customer = db
            .customers()
            .create(CustomerFields {
                first_name: first.to_string(),
                last_name: last.to_string(),
                address: address.to_string(),
                phone: phone.to_string(),
                start_date: ymd(start)?,
            })
            .await?;
        summary.customers.push(customer.id);
    }

    let mut tx = db.pool().begin().await?;
    for &(product, salesperson, customer, date) in SALES {
        let fields = SaleFields {
            product_id: pick(&summary.products, product)?,
            salesperson_id: pick(&summary.salespersons, salesperson)?,
            customer_id: pick(&summary.customers, customer)?,
            sales_date: ymd(date)?,
        };
        let sale = SaleRepository::insert(&mut tx, fields).await?;
        summary.sales.push(sale.id);
    }
    tx.commit().await?;

    for &(product, begin, end, pct) in DISCOUNTS {
        let discount = db
            .discounts()
            .create(DiscountFields {
                product_id: pick(&summary.products, product)?,
                begin_date: ymd(begin)?,
                end_date: ymd(end)?,
                discount_percentage: Percentage::from_percentage(pct),
            })
            .await?;
        summary.discounts.push(discount.id);
    }

    info!(
        products = summary.products.len(),
        salespersons = summary.salespersons.len(),
        customers = summary.customers.len(),
        sales = summary.sales.len(),
        discounts = summary.discounts.len(),
        "Sample data loaded"
    );
    Ok(summary)
}

async fn clear_all(db: &Database) -> DbResult<()> {
    let mut tx = db.pool().begin().await?;
    for table in ["sales", "discounts", "customers", "salespersons", "products"] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

fn ymd((year, month, day): (i32, u32, u32)) -> DbResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DbError::Internal(format!("bad sample date {year}-{month}-{day}")))
}

fn pick<T: Copy>(ids: &[T], position: usize) -> DbResult<T> {
    position
        .checked_sub(1)
        .and_then(|i| ids.get(i))
        .copied()
        .ok_or_else(|| DbError::Internal(format!("no sample row at position {position}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;

    #[tokio::test]
    async fn test_seed_loads_sample_data() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let summary = seed_sample_data(&db).await.unwrap();

        assert_eq!(summary.products.len(), 5);
        assert_eq!(summary.salespersons.len(), 3);
        assert_eq!(summary.customers.len(), 3);
        assert_eq!(summary.sales.len(), 9);
        assert_eq!(summary.discounts.len(), 5);

        // history does not consume stock
        let speedster = db.products().get(summary.products[0]).await.unwrap();
        assert_eq!(speedster.qty_on_hand, 2);
        assert_eq!(speedster.commission_percentage.bps(), 1000);
        assert_eq!(speedster.sale_price.cents(), 75_000);

        let kids = db.products().get(summary.products[4]).await.unwrap();
        assert_eq!(
            db.discounts().list_for_product(kids.id).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_seed_is_repeatable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_sample_data(&db).await.unwrap();
        let again = seed_sample_data(&db).await.unwrap();

        assert_eq!(db.products().list().await.unwrap().len(), 5);
        assert_eq!(db.sales().list().await.unwrap().len(), 9);
        assert_eq!(again.products[0], ProductId::new(1));
    }
}
