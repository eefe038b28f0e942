//! # Domain Types
//!
//! Core domain types used throughout BeSpoked Bikes.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │   Salesperson   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  product_id     │──►│  id             │       │
//! │  │  name (unique)  │   │  salesperson_id │   │  first/last     │       │
//! │  │  sale_price     │   │  customer_id ───┼─┐ │  phone          │       │
//! │  │  qty_on_hand    │   │  sales_date     │ │ └─────────────────┘       │
//! │  │  commission %   │   └─────────────────┘ │ ┌─────────────────┐       │
//! │  └────────▲────────┘                       └►│    Customer     │       │
//! │           │                                  └─────────────────┘       │
//! │  ┌────────┴────────┐                                                    │
//! │  │    Discount     │   begin_date ..= end_date, discount %             │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Ids are store-assigned integers wrapped in one newtype per entity, so a
//! `CustomerId` can never be passed where a `ProductId` is expected.
//! Relationships are held as ids only and resolved through the store at
//! the point of use.
//!
//! ## Field Structs
//! Every entity has a `*Fields` struct holding all of its mutable fields
//! and no id. Create and update both take the full struct.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
        #[cfg_attr(feature = "sqlx", sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw store-assigned id.
            #[inline]
            pub const fn new(raw: i64) -> Self {
                $name(raw)
            }

            /// Returns the raw id.
            #[inline]
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Product`].
    ProductId
);
entity_id!(
    /// Identifier of a [`Salesperson`].
    SalespersonId
);
entity_id!(
    /// Identifier of a [`Customer`].
    CustomerId
);
entity_id!(
    /// Identifier of a [`Sale`].
    SaleId
);
entity_id!(
    /// Identifier of a [`Discount`].
    DiscountId
);

// =============================================================================
// Percentage
// =============================================================================

/// Number of basis points in 100%.
pub const BPS_PER_WHOLE: u32 = 10_000;

/// A percentage in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%. Commission rates like 12.5% and discounts like
/// 15% are stored exactly (1250 and 1500) so commission math stays in
/// integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
pub struct Percentage(u32);

impl Percentage {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Creates a percentage from a human value (e.g. `12.5` for 12.5%).
    ///
    /// Negative input clamps to zero; range checks belong to validation.
    pub fn from_percentage(pct: f64) -> Self {
        Percentage((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the value in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the value as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Basis points left after taking this percentage off a whole.
    ///
    /// 15% off leaves 8500 bps of the price.
    #[inline]
    pub const fn remainder_bps(&self) -> u32 {
        BPS_PER_WHOLE.saturating_sub(self.0)
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    /// Checks if within 0%..=100%.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 <= BPS_PER_WHOLE
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage::zero()
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A bicycle model the shop stocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: ProductId,
    /// Unique across products.
    pub name: String,
    pub manufacturer: String,
    pub style: String,
    pub purchase_price: Money,
    pub sale_price: Money,
    /// Units on hand; never negative.
    pub qty_on_hand: i64,
    /// Share of the (discounted) sale price paid to the salesperson.
    pub commission_percentage: Percentage,
}

impl Product {
    /// Builds a product from a store-assigned id and its fields.
    pub fn from_fields(id: ProductId, fields: ProductFields) -> Self {
        Product {
            id,
            name: fields.name,
            manufacturer: fields.manufacturer,
            style: fields.style,
            purchase_price: fields.purchase_price,
            sale_price: fields.sale_price,
            qty_on_hand: fields.qty_on_hand,
            commission_percentage: fields.commission_percentage,
        }
    }

    /// Checks whether at least one unit can be sold.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.qty_on_hand > 0
    }
}

/// Mutable fields of a [`Product`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    pub manufacturer: String,
    pub style: String,
    pub purchase_price: Money,
    pub sale_price: Money,
    pub qty_on_hand: i64,
    pub commission_percentage: Percentage,
}

// =============================================================================
// Salesperson
// =============================================================================

/// A member of the sales staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Salesperson {
    pub id: SalespersonId,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone: String,
    pub start_date: NaiveDate,
    pub termination_date: Option<NaiveDate>,
    pub manager: String,
}

impl Salesperson {
    /// Builds a salesperson from a store-assigned id and its fields.
    pub fn from_fields(id: SalespersonId, fields: SalespersonFields) -> Self {
        Salesperson {
            id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            address: fields.address,
            phone: fields.phone,
            start_date: fields.start_date,
            termination_date: fields.termination_date,
            manager: fields.manager,
        }
    }

    /// "first last", for display.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Mutable fields of a [`Salesperson`].
///
/// `(first_name, last_name, phone)` identifies a salesperson for
/// duplicate detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalespersonFields {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub termination_date: Option<NaiveDate>,
    pub manager: String,
}

// =============================================================================
// Customer
// =============================================================================

/// A shop customer. No uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone: String,
    pub start_date: NaiveDate,
}

impl Customer {
    /// Builds a customer from a store-assigned id and its fields.
    pub fn from_fields(id: CustomerId, fields: CustomerFields) -> Self {
        Customer {
            id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            address: fields.address,
            phone: fields.phone,
            start_date: fields.start_date,
        }
    }
}

/// Mutable fields of a [`Customer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerFields {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone: String,
    pub start_date: NaiveDate,
}

// =============================================================================
// Sale
// =============================================================================

/// One bicycle sold by a salesperson to a customer.
///
/// `sales_date` is the pricing anchor: the discount active on that day
/// applies when the commission report is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: SaleId,
    pub product_id: ProductId,
    pub salesperson_id: SalespersonId,
    pub customer_id: CustomerId,
    pub sales_date: NaiveDate,
}

impl Sale {
    /// Builds a sale from a store-assigned id and its fields.
    pub fn from_fields(id: SaleId, fields: SaleFields) -> Self {
        Sale {
            id,
            product_id: fields.product_id,
            salesperson_id: fields.salesperson_id,
            customer_id: fields.customer_id,
            sales_date: fields.sales_date,
        }
    }
}

/// Mutable fields of a [`Sale`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaleFields {
    pub product_id: ProductId,
    pub salesperson_id: SalespersonId,
    pub customer_id: CustomerId,
    pub sales_date: NaiveDate,
}

// =============================================================================
// Discount
// =============================================================================

/// A percentage off a product's sale price over an inclusive date range.
///
/// Ranges on the same product may overlap; see
/// [`crate::discount::resolve_discount`] for how one is chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Discount {
    pub id: DiscountId,
    pub product_id: ProductId,
    pub begin_date: NaiveDate,
    pub end_date: NaiveDate,
    pub discount_percentage: Percentage,
}

impl Discount {
    /// Builds a discount from a store-assigned id and its fields.
    pub fn from_fields(id: DiscountId, fields: DiscountFields) -> Self {
        Discount {
            id,
            product_id: fields.product_id,
            begin_date: fields.begin_date,
            end_date: fields.end_date,
            discount_percentage: fields.discount_percentage,
        }
    }
}

/// Mutable fields of a [`Discount`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountFields {
    pub product_id: ProductId,
    pub begin_date: NaiveDate,
    pub end_date: NaiveDate,
    pub discount_percentage: Percentage,
}

// =============================================================================
// Unit Tests
// =============================================================================
