//! # Validation Module
//!
//! Input validation for entity fields and report selectors.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (API / form / CLI)                                    │
//! │  └── Type validation (deserialization into *Fields)                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rule validation, before any state change                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (product name, salesperson identity)                       │
//! │  ├── CHECK (qty_on_hand >= 0)                                          │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bespoke_core::validation::validate_quarter;
//!
//! assert!(validate_quarter(4).is_ok());
//! assert!(validate_quarter(5).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{
    CustomerFields, DiscountFields, Percentage, ProductFields, SalespersonFields, BPS_PER_WHOLE,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted free-text field.
pub const MAX_TEXT_LEN: usize = 200;

/// Largest year a report can be requested for.
pub const MAX_REPORT_YEAR: i32 = 9999;

// =============================================================================
// Field Validators
// =============================================================================

fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    max_len(field, value)
}

fn max_len(field: &str, value: &str) -> ValidationResult<()> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }
    Ok(())
}

/// Validates a price. Zero is allowed.
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a percentage is within 0%..=100%.
///
/// The error reports the range in percent, the unit callers enter.
pub fn validate_percentage(field: &str, pct: Percentage) -> ValidationResult<()> {
    if !pct.is_valid() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: (BPS_PER_WHOLE / 100) as i64,
        });
    }
    Ok(())
}

/// Validates an on-hand quantity.
pub fn validate_qty_on_hand(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "qty_on_hand".to_string(),
        });
    }
    Ok(())
}

fn validate_date_order(
    field: &str,
    first: NaiveDate,
    second: NaiveDate,
    reason: &str,
) -> ValidationResult<()> {
    if second < first {
        return Err(ValidationError::InvalidRange {
            field: field.to_string(),
            reason: reason.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates product fields before create/update.
///
/// ## Rules
/// - name required, at most 200 characters
/// - prices non-negative
/// - qty_on_hand non-negative
/// - commission 0%..=100%
pub fn validate_product(fields: &ProductFields) -> ValidationResult<()> {
    require("name", &fields.name)?;
    max_len("manufacturer", &fields.manufacturer)?;
    max_len("style", &fields.style)?;
    validate_price("purchase_price", fields.purchase_price)?;
    validate_price("sale_price", fields.sale_price)?;
    validate_qty_on_hand(fields.qty_on_hand)?;
    validate_percentage("commission_percentage", fields.commission_percentage)
}

/// Validates salesperson fields before create/update.
pub fn validate_salesperson(fields: &SalespersonFields) -> ValidationResult<()> {
    require("first_name", &fields.first_name)?;
    require("last_name", &fields.last_name)?;
    require("phone", &fields.phone)?;
    max_len("address", &fields.address)?;
    max_len("manager", &fields.manager)?;
    if let Some(terminated) = fields.termination_date {
        validate_date_order(
            "termination_date",
            fields.start_date,
            terminated,
            "must not be before start_date",
        )?;
    }
    Ok(())
}

/// Validates customer fields before create/update.
pub fn validate_customer(fields: &CustomerFields) -> ValidationResult<()> {
    require("first_name", &fields.first_name)?;
    require("last_name", &fields.last_name)?;
    max_len("address", &fields.address)?;
    max_len("phone", &fields.phone)
}

/// Validates discount fields before create/update.
///
/// An inverted range could never match a sale, so it is rejected.
pub fn validate_discount(fields: &DiscountFields) -> ValidationResult<()> {
    validate_percentage("discount_percentage", fields.discount_percentage)?;
    validate_date_order(
        "end_date",
        fields.begin_date,
        fields.end_date,
        "must not be before begin_date",
    )
}

// =============================================================================
// Report Selector Validators
// =============================================================================

/// Validates a quarter selector (0 = all quarters).
pub fn validate_quarter(quarter: u32) -> ValidationResult<()> {
    if quarter > 4 {
        return Err(ValidationError::OutOfRange {
            field: "quarter".to_string(),
            min: 0,
            max: 4,
        });
    }
    Ok(())
}

/// Validates a year selector (0 = all years).
pub fn validate_year(year: i32) -> ValidationResult<()> {
    if !(0..=MAX_REPORT_YEAR).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: "year".to_string(),
            min: 0,
            max: MAX_REPORT_YEAR as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn product_fields() -> ProductFields {
        ProductFields {
            name: "mountain king".to_string(),
            manufacturer: "trailblazer".to_string(),
            style: "mountain".to_string(),
            purchase_price: Money::from_cents(60_000),
            sale_price: Money::from_cents(90_000),
            qty_on_hand: 5,
            commission_percentage: Percentage::from_bps(1250),
        }
    }

    #[test]
    fn test_validate_product() {
        assert!(validate_product(&product_fields()).is_ok());

        let mut fields = product_fields();
        fields.name = "   ".to_string();
        assert!(matches!(
            validate_product(&fields),
            Err(ValidationError::Required { .. })
        ));

        let mut fields = product_fields();
        fields.qty_on_hand = -1;
        assert!(validate_product(&fields).is_err());

        let mut fields = product_fields();
        fields.commission_percentage = Percentage::from_bps(10_001);
        let err = validate_product(&fields).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
        assert_eq!(
            err.to_string(),
            "commission_percentage must be between 0 and 100"
        );

        let mut fields = product_fields();
        fields.sale_price = Money::from_cents(-1);
        assert!(validate_product(&fields).is_err());
    }

    #[test]
    fn test_validate_salesperson_termination_order() {
        let mut fields = SalespersonFields {
            first_name: "alice".to_string(),
            last_name: "johnson".to_string(),
            address: "456 oak ave".to_string(),
            phone: "555-5678".to_string(),
            start_date: date(2019, 3, 15),
            termination_date: None,
            manager: "jane smith".to_string(),
        };
        assert!(validate_salesperson(&fields).is_ok());

        fields.termination_date = Some(date(2019, 3, 14));
        assert!(matches!(
            validate_salesperson(&fields),
            Err(ValidationError::InvalidRange { .. })
        ));

        fields.termination_date = Some(date(2019, 3, 15));
        assert!(validate_salesperson(&fields).is_ok());
    }

    #[test]
    fn test_validate_discount() {
        let fields = DiscountFields {
            product_id: ProductId::new(1),
            begin_date: date(2024, 1, 1),
            end_date: date(2024, 1, 1),
            discount_percentage: Percentage::from_bps(1500),
        };
        assert!(validate_discount(&fields).is_ok());

        let too_deep = DiscountFields {
            discount_percentage: Percentage::from_bps(12_000),
            ..fields
        };
        assert_eq!(
            validate_discount(&too_deep).unwrap_err().to_string(),
            "discount_percentage must be between 0 and 100"
        );

        let inverted = DiscountFields {
            end_date: date(2023, 12, 31),
            ..fields
        };
        assert!(validate_discount(&inverted).is_err());
    }

    #[test]
    fn test_validate_selectors() {
        for q in 0..=4 {
            assert!(validate_quarter(q).is_ok());
        }
        assert!(validate_quarter(5).is_err());

        assert!(validate_year(0).is_ok());
        assert!(validate_year(2024).is_ok());
        assert!(validate_year(-1).is_err());
        assert!(validate_year(10_000).is_err());
    }
}
