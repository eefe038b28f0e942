//! # Database Error Types
//!
//! Error types for store operations, and their mapping onto the error
//! codes callers see.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        CoreError / ValidationError         │
//! │       │                                    │                            │
//! │       ▼                                    ▼                            │
//! │  DbError (this module) ◄──────── DbError::Domain                       │
//! │       │                                                                 │
//! │       ▼  DbError::code()                                               │
//! │  ErrorCode  ─►  ErrorResponse { code, message }  ─►  caller            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bespoke_core::{CoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Lookup, update or delete of an id that does not exist
    /// - A sale referencing a missing product, salesperson or customer
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Second product with the same name
    /// - Second salesperson with the same first name, last name and phone
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Deleting a product, salesperson or customer that sales or
    ///   discounts still reference
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A business rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Maps the error onto the caller-facing taxonomy.
    ///
    /// ```text
    /// NotFound, Domain(NotFound)                 → NOT_FOUND
    /// Domain(Validation)                         → VALIDATION_ERROR
    /// Domain(OutOfStock)                         → OUT_OF_STOCK
    /// UniqueViolation, ForeignKeyViolation,
    /// Domain(Conflict)                           → CONFLICT
    /// Connection/Migration/Query/Tx/Pool         → DATABASE_ERROR
    /// Internal                                   → INTERNAL
    /// ```
    pub fn code(&self) -> ErrorCode {
        match self {
            DbError::NotFound { .. } => ErrorCode::NotFound,
            DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                ErrorCode::Conflict
            }
            DbError::Domain(core) => match core {
                CoreError::NotFound { .. } => ErrorCode::NotFound,
                CoreError::OutOfStock { .. } => ErrorCode::OutOfStock,
                CoreError::Conflict { .. } => ErrorCode::Conflict,
                CoreError::Validation(_) => ErrorCode::ValidationError,
            },
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::TransactionFailed(_)
            | DbError::PoolExhausted => ErrorCode::DatabaseError,
            DbError::Internal(_) => ErrorCode::Internal,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: products.name"
                // "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Domain(CoreError::Validation(err))
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Caller-facing Error
// =============================================================================

/// Machine-readable error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed input, rejected before any state change
    ValidationError,
    /// Referenced entity does not exist
    NotFound,
    /// Sale against a product with nothing on hand
    OutOfStock,
    /// Duplicate entity, or delete of a still-referenced one
    Conflict,
    /// Store failure unrelated to the input
    DatabaseError,
    Internal,
}

/// What a caller receives when an operation fails.
///
/// ```json
/// { "code": "OUT_OF_STOCK", "message": "Cannot create sale: product 3 is out of stock" }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&DbError> for ErrorResponse {
    fn from(err: &DbError) -> Self {
        let code = err.code();
        let message = match code {
            // store internals stay in the log
            ErrorCode::DatabaseError | ErrorCode::Internal => {
                tracing::error!(error = %err, "store operation failed");
                "Database operation failed".to_string()
            }
            _ => err.to_string(),
        };
        ErrorResponse { code, message }
    }
}
