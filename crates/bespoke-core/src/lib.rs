//! # bespoke-core: Pure Business Logic for BeSpoked Bikes
//!
//! Stock rules, discount resolution and commission math for the shop, as
//! pure functions with no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      BeSpoked Bikes Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Callers (bespoke CLI, future API/forms)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              bespoke-db (Entity Store + transactions)           │   │
//! │  │   repositories, InventoryLedger, ReportRepository, seed         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ calls into                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bespoke-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌──────────┐ ┌────────┐ │   │
//! │  │   │  types  │ │  money  │ │  ledger  │ │ discount │ │ report │ │   │
//! │  │   │ Product │ │  Money  │ │  Stock   │ │ resolve_ │ │ Period │ │   │
//! │  │   │  Sale   │ │         │ │ Movement │ │ discount │ │ Tally  │ │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └──────────┘ └────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities, ids and field structs
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Field and selector validation
//! - [`ledger`] - How sale events move stock
//! - [`discount`] - Which discount applies on a day
//! - [`report`] - Report periods and exact commission totals
//!
//! ## Example Usage
//!
//! ```rust
//! use bespoke_core::report::{effective_price, CommissionTally};
//! use bespoke_core::{Money, Percentage, Product, ProductFields, ProductId};
//!
//! let speedster = Product::from_fields(ProductId::new(1), ProductFields {
//!     name: "speedster 3000".into(),
//!     manufacturer: "cyclepro".into(),
//!     style: "road".into(),
//!     purchase_price: Money::from_cents(50_000),
//!     sale_price: Money::from_cents(75_000),
//!     qty_on_hand: 2,
//!     commission_percentage: Percentage::from_bps(1000),
//! });
//!
//! assert_eq!(effective_price(&speedster, None).cents(), 75_000);
//!
//! let mut tally = CommissionTally::new();
//! tally.record(&speedster, None);
//! assert_eq!(tally.num_sales(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod discount;
pub mod error;
pub mod ledger;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use discount::resolve_discount;
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::StockMovement;
pub use money::Money;
pub use report::{CommissionTally, DateWindow, ReportPeriod, SalespersonCommission};
pub use types::*;
