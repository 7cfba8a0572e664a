use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AgeGroup, DeductionInputs, IncomeInputs, Regime, TaxComparison};

/// Opaque identity of the user who owns a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: i64,
    pub user_id: UserId,
    pub age_group: AgeGroup,
    pub selected_regime: Regime,

    // Inputs as entered
    pub income: IncomeInputs,
    pub deductions: DeductionInputs,

    // Engine output
    pub result: TaxComparison,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For saving new calculations (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCalculationRecord {
    pub user_id: UserId,
    pub age_group: AgeGroup,
    pub selected_regime: Regime,
    pub income: IncomeInputs,
    pub deductions: DeductionInputs,
    pub result: TaxComparison,
}
