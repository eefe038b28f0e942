//! # Repository Module
//!
//! The Entity Store: one repository per entity.
//!
//! ## Two Ways In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  db.products().get(id)            pool-level: acquires a connection,   │
//! │  db.sales().list()                one statement or one short tx        │
//! │                                                                         │
//! │  ProductRepository::fetch_by_id(&mut tx, id)                           │
//! │  SaleRepository::insert(&mut tx, fields)                               │
//! │                                   connection-scoped: runs inside a     │
//! │                                   caller's transaction (ledger,        │
//! │                                   report reader, seed loader)          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity supports `list`, `get_by_id`, `get`, `create`, `update`
//! and `delete`. Updates take the full `*Fields` struct.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Products, name uniqueness, stock movements
//! - [`SalespersonRepository`] - Sales staff, identity uniqueness
//! - [`CustomerRepository`] - Customers
//! - [`SaleRepository`] - Sales (create/delete routed through the ledger)
//! - [`DiscountRepository`] - Discounts and their resolution

pub mod customer;
pub mod discount;
pub mod product;
pub mod sale;
pub mod salesperson;

pub use customer::CustomerRepository;
pub use discount::DiscountRepository;
pub use product::ProductRepository;
pub use sale::SaleRepository;
pub use salesperson::SalespersonRepository;
