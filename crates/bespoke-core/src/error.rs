//! # Error Types
//!
//! Domain-specific error types for bespoke-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bespoke-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bespoke-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller (ErrorCode)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure here is a caller-input problem. Nothing is retried and
//! nothing is fatal.

use thiserror::Error;

use crate::types::ProductId;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// A referenced entity does not exist.
    ///
    /// ## When This Occurs
    /// - Lookup by id misses (product, salesperson, customer, sale, discount)
    /// - A sale references a product/salesperson/customer that is gone
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Sale creation against a product with nothing on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Record Sale (product 7)
    ///      │
    ///      ▼
    /// Check stock: qty_on_hand = 0
    ///      │
    ///      ▼
    /// OutOfStock { product_id: 7 }   (no sale row, stock untouched)
    /// ```
    #[error("Cannot create sale: product {product_id} is out of stock")]
    OutOfStock { product_id: ProductId },

    /// Duplicate entity where uniqueness is enforced.
    ///
    /// ## When This Occurs
    /// - Product name already taken
    /// - Salesperson with the same first name, last name and phone
    #[error("{entity} already exists: {detail}")]
    Conflict { entity: String, detail: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error.
    pub fn conflict(entity: impl Into<String>, detail: impl Into<String>) -> Self {
        CoreError::Conflict {
            entity: entity.into(),
            detail: detail.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any state change, carrying the violated constraint.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Two related fields are in the wrong order (e.g. begin after end).
    #[error("{field} is invalid: {reason}")]
    InvalidRange { field: String, reason: String },

    /// A year/month/day combination that is not a calendar date.
    #[error("{field} is not a valid calendar date")]
    InvalidDate { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
