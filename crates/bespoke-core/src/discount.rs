//! # Discount Resolver
//!
//! Picks the discount in effect for a product on a given day.
//!
//! ## Resolution
//! ```text
//! candidates ──► same product? ──► begin ≤ date ≤ end? ──► smallest id
//!                     no → skip          no → skip           (or None)
//! ```
//!
//! Discount ranges on one product may overlap. When several match, the
//! one with the smallest `DiscountId` wins, i.e. the discount that was
//! created first. Finding nothing is not an error.

use chrono::NaiveDate;

use crate::types::{Discount, ProductId};

impl Discount {
    /// Checks whether the discount covers `date`. Both ends are inclusive.
    ///
    /// ```rust
    /// use bespoke_core::types::{Discount, DiscountFields, DiscountId, Percentage, ProductId};
    /// use chrono::NaiveDate;
    ///
    /// let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    /// let discount = Discount::from_fields(DiscountId::new(1), DiscountFields {
    ///     product_id: ProductId::new(1),
    ///     begin_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    ///     end_date: d,
    ///     discount_percentage: Percentage::from_bps(1500),
    /// });
    /// assert!(discount.is_active_on(d));
    /// assert!(!discount.is_active_on(d.succ_opt().unwrap()));
    /// ```
    #[inline]
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.begin_date <= date && date <= self.end_date
    }

    /// Checks whether the discount applies to `product_id` on `date`.
    #[inline]
    pub fn applies_to(&self, product_id: ProductId, date: NaiveDate) -> bool {
        self.product_id == product_id && self.is_active_on(date)
    }
}

/// Resolves the discount for `product_id` on `date` out of `candidates`.
///
/// The candidates may be a prefiltered store query or every discount in
/// the shop; non-matching entries are ignored either way.
pub fn resolve_discount<'a, I>(
    candidates: I,
    product_id: ProductId,
    date: NaiveDate,
) -> Option<&'a Discount>
where
    I: IntoIterator<Item = &'a Discount>,
{
    candidates
        .into_iter()
        .filter(|d| d.applies_to(product_id, date))
        .min_by_key(|d| d.id)
}
