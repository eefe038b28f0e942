//! # bespoke-db: Entity Store for BeSpoked Bikes
//!
//! SQLite storage for products, staff, customers, sales and discounts,
//! plus the two transactional consumers of that storage: the inventory
//! ledger and the commission report reader.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BeSpoked Bikes Data Flow                         │
//! │                                                                         │
//! │  bespoke CLI / callers                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    bespoke-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌────────────────┐  ┌──────────────────┐  │   │
//! │  │   │   Database    │  │  Repositories  │  │ InventoryLedger  │  │   │
//! │  │   │   (pool.rs)   │◄─│ product, sale, │◄─│ ReportRepository │  │   │
//! │  │   │  SqlitePool   │  │ discount, ...  │  │   (one tx each)  │  │   │
//! │  │   └───────────────┘  └────────────────┘  └────────┬─────────┘  │   │
//! │  │                                                    │ rules      │   │
//! │  └────────────────────────────────────────────────────┼────────────┘   │
//! │                                                       ▼                 │
//! │                                          bespoke-core (pure logic)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (./bespoke_bikes.db)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Environment-driven store configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types and caller-facing codes
//! - [`repository`] - CRUD per entity
//! - [`ledger`] - Sale creation/removal with stock bookkeeping
//! - [`report`] - Commission report generation
//! - [`seed`] - Sample data
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bespoke_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./bespoke_bikes.db")).await?;
//!
//! let sale = db.sales().create(fields).await?;        // stock − 1
//! let rows = db.reports().generate(2024, 1).await?;   // Q1 2024
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod report;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, StoreConfig};
pub use error::{DbError, DbResult, ErrorCode, ErrorResponse};
pub use ledger::InventoryLedger;
pub use pool::{Database, DbConfig};
pub use report::ReportRepository;
pub use seed::{seed_sample_data, SeedSummary};

// Repository re-exports for convenience
pub use repository::{
    CustomerRepository, DiscountRepository, ProductRepository, SaleRepository,
    SalespersonRepository,
};
