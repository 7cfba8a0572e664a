//! Schema checks applied to a calculation record before it is stored.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{NewCalculationRecord, RegimeResult, SECTION_80C_CAP};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("user id is required")]
    MissingUserId,

    #[error("{field} must not be negative (got {amount})")]
    NegativeAmount { field: String, amount: Decimal },

    #[error("{field} exceeds the limit of {cap} (got {amount})")]
    CapExceeded {
        field: String,
        amount: Decimal,
        cap: Decimal,
    },
}

/// Checks a record against the storage schema.
///
/// Returns the first violation found.
pub fn validate_record(record: &NewCalculationRecord) -> Result<(), ValidationError> {
    if record.user_id.is_blank() {
        return Err(ValidationError::MissingUserId);
    }

    for (label, amount) in record.income.entries() {
        check_non_negative(label, amount)?;
    }
    for (label, amount) in record.deductions.entries() {
        check_non_negative(label, amount)?;
    }

    if record.deductions.section_80c > SECTION_80C_CAP {
        return Err(ValidationError::CapExceeded {
            field: "Section 80C".to_string(),
            amount: record.deductions.section_80c,
            cap: SECTION_80C_CAP,
        });
    }

    check_result("Old regime", &record.result.old_regime)?;
    check_result("New regime", &record.result.new_regime)?;
    check_non_negative("Savings", record.result.savings)
}

fn check_result(
    regime: &str,
    result: &RegimeResult,
) -> Result<(), ValidationError> {
    let fields = [
        ("total income", result.total_income),
        ("deductions", result.total_deductions),
        ("taxable income", result.taxable_income),
        ("tax", result.tax),
    ];
    for (name, amount) in fields {
        check_non_negative(&format!("{regime} {name}"), amount)?;
    }
    Ok(())
}

fn check_non_negative(
    field: &str,
    amount: Decimal,
) -> Result<(), ValidationError> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount {
            field: field.to_string(),
            amount,
        });
    }
    Ok(())
}
