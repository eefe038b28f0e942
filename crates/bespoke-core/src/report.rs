//! # Commission Report
//!
//! The pure half of the Commission Report Engine: period selection, date
//! windows, and exact per-salesperson accumulation. Reading the snapshot
//! out of the store lives in `bespoke-db`.
//!
//! ## Period Selection
//! ```text
//! ┌──────────────┬───────────────┬─────────────────────────────────────────┐
//! │ year         │ quarter       │ window                                  │
//! ├──────────────┼───────────────┼─────────────────────────────────────────┤
//! │ 0            │ 0             │ unbounded (every sale)                  │
//! │ 0            │ 1..=4         │ rejected, a quarter needs a year        │
//! │ Y            │ 0             │ Y-01-01 ..= Y-12-31                     │
//! │ Y            │ q in 1..=4    │ first day of month (q-1)*3+1            │
//! │              │               │   ..= last day of month (q-1)*3+3       │
//! │ any          │ > 4           │ rejected                                │
//! └──────────────┴───────────────┴─────────────────────────────────────────┘
//! ```
//!
//! ## Exact Totals
//! Each sale contributes
//!
//! ```text
//! effective = sale_price × (1 − discount%)         kept in 1/10^4 cent
//! commission = effective × commission%             kept in 1/10^8 cent
//! ```
//!
//! Both are summed as `i128` and rounded half-up to cents once, at the
//! end. Totals therefore do not depend on the order sales are read in.
//!
//! ## Usage
//! ```rust
//! use bespoke_core::report::ReportPeriod;
//! use chrono::NaiveDate;
//!
//! let q4 = ReportPeriod::from_selector(2024, 4).unwrap();
//! let window = q4.window().unwrap().unwrap();
//! assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
//! assert_eq!(window.end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Discount, Percentage, Product, Salesperson, SalespersonId, BPS_PER_WHOLE};
use crate::validation::{validate_quarter, validate_year, ValidationResult, MAX_REPORT_YEAR};

/// Scale of an exact effective price: 1/10^4 cent.
const PRICE_SCALE: i128 = BPS_PER_WHOLE as i128;

/// Scale of an exact commission: 1/10^8 cent.
const COMMISSION_SCALE: i128 = PRICE_SCALE * BPS_PER_WHOLE as i128;

// =============================================================================
// Report Period
// =============================================================================

/// Which sales a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ReportPeriod {
    /// Every sale ever recorded.
    AllTime,
    /// One calendar year.
    Year { year: i32 },
    /// One calendar quarter (1..=4) of a year.
    Quarter { year: i32, quarter: u32 },
}

impl ReportPeriod {
    /// Builds a period from the `(year, quarter)` selector where 0 means
    /// "all" for either field.
    ///
    /// ## Errors
    /// - `OutOfRange` if quarter > 4 or the year is outside 0..=9999
    /// - `InvalidRange` if a quarter is given without a year
    ///
    /// The shop's old report form silently dropped the quarter when the
    /// year was 0 and showed all-time totals. `(0, q)` is rejected here.
    pub fn from_selector(year: i32, quarter: u32) -> ValidationResult<Self> {
        validate_year(year)?;
        validate_quarter(quarter)?;

        match (year, quarter) {
            (0, 0) => Ok(ReportPeriod::AllTime),
            (0, _) => Err(ValidationError::InvalidRange {
                field: "quarter".to_string(),
                reason: "a quarter filter requires a year".to_string(),
            }),
            (year, 0) => Ok(ReportPeriod::Year { year }),
            (year, quarter) => Ok(ReportPeriod::Quarter { year, quarter }),
        }
    }

    /// Builds a quarter period where both fields are mandatory.
    ///
    /// Unlike [`ReportPeriod::from_selector`], 0 is not accepted for
    /// either field.
    pub fn quarter(year: i32, quarter: u32) -> ValidationResult<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(ValidationError::OutOfRange {
                field: "quarter".to_string(),
                min: 1,
                max: 4,
            });
        }
        if !(1..=MAX_REPORT_YEAR).contains(&year) {
            return Err(ValidationError::OutOfRange {
                field: "year".to_string(),
                min: 1,
                max: MAX_REPORT_YEAR as i64,
            });
        }
        Ok(ReportPeriod::Quarter { year, quarter })
    }

    /// Resolves the inclusive date window, or `None` when unbounded.
    ///
    /// Fails only for hand-built periods that name an impossible quarter
    /// or a year chrono cannot represent.
    pub fn window(&self) -> ValidationResult<Option<DateWindow>> {
        match *self {
            ReportPeriod::AllTime => Ok(None),
            ReportPeriod::Year { year } => Ok(Some(DateWindow {
                start: ymd("year", year, 1, 1)?,
                end: ymd("year", year, 12, 31)?,
            })),
            ReportPeriod::Quarter { year, quarter } => {
                validate_quarter(quarter)?;
                if quarter == 0 {
                    return Err(ValidationError::OutOfRange {
                        field: "quarter".to_string(),
                        min: 1,
                        max: 4,
                    });
                }
                let start_month = (quarter - 1) * 3 + 1;
                let start = ymd("quarter", year, start_month, 1)?;
                let end = if quarter == 4 {
                    ymd("quarter", year, 12, 31)?
                } else {
                    ymd("quarter", year, start_month + 3, 1)?
                        .pred_opt()
                        .ok_or_else(|| invalid_date("quarter"))?
                };
                Ok(Some(DateWindow { start, end }))
            }
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportPeriod::AllTime => write!(f, "all time"),
            ReportPeriod::Year { year } => write!(f, "{}", year),
            ReportPeriod::Quarter { year, quarter } => write!(f, "Q{} {}", quarter, year),
        }
    }
}

fn ymd(field: &str, year: i32, month: u32, day: u32) -> ValidationResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| invalid_date(field))
}

fn invalid_date(field: &str) -> ValidationError {
    ValidationError::InvalidDate {
        field: field.to_string(),
    }
}

/// An inclusive `[start, end]` range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Checks whether `date` falls inside the window.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// =============================================================================
// Per-Salesperson Accumulation
// =============================================================================

/// One row of the commission report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalespersonCommission {
    pub salesperson_id: SalespersonId,
    pub first_name: String,
    pub last_name: String,
    pub num_sales: u32,
    pub total_sales_amount: Money,
    pub total_commission: Money,
}

/// Running totals for one salesperson.
///
/// ```rust
/// use bespoke_core::report::CommissionTally;
///
/// let tally = CommissionTally::new();
/// assert_eq!(tally.num_sales(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommissionTally {
    num_sales: u32,
    sales_scaled: i128,
    commission_scaled: i128,
}

impl CommissionTally {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one sale of `product`, priced with `discount` if one applies.
    pub fn record(&mut self, product: &Product, discount: Option<&Discount>) {
        let price = discounted_price_scaled(product, discount);
        self.num_sales += 1;
        self.sales_scaled += price;
        self.commission_scaled += price * product.commission_percentage.bps() as i128;
    }

    /// Number of sales recorded so far.
    pub fn num_sales(&self) -> u32 {
        self.num_sales
    }

    /// Rounds the totals and labels them with the salesperson.
    pub fn finish(self, salesperson: &Salesperson) -> SalespersonCommission {
        SalespersonCommission {
            salesperson_id: salesperson.id,
            first_name: salesperson.first_name.clone(),
            last_name: salesperson.last_name.clone(),
            num_sales: self.num_sales,
            total_sales_amount: Money::round_scaled(self.sales_scaled, PRICE_SCALE),
            total_commission: Money::round_scaled(self.commission_scaled, COMMISSION_SCALE),
        }
    }
}

fn discounted_price_scaled(product: &Product, discount: Option<&Discount>) -> i128 {
    let kept = discount
        .map(|d| d.discount_percentage)
        .unwrap_or_else(Percentage::zero)
        .remainder_bps();
    product.sale_price.cents() as i128 * kept as i128
}

/// Price of a single sale of `product` after `discount`, rounded to cents.
///
/// Report totals do not sum these; they sum the exact values and round
/// once.
pub fn effective_price(product: &Product, discount: Option<&Discount>) -> Money {
    Money::round_scaled(discounted_price_scaled(product, discount), PRICE_SCALE)
}

// =============================================================================
// Unit Tests
// =============================================================================
