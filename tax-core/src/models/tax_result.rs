use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Regime;

/// Outcome of running one regime over a taxpayer's inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeResult {
    pub total_income: Decimal,
    pub total_deductions: Decimal,
    pub taxable_income: Decimal,
    pub tax: Decimal,
}

/// Both regimes side by side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComparison {
    pub old_regime: RegimeResult,
    pub new_regime: RegimeResult,

    /// Absolute difference between the two taxes.
    pub savings: Decimal,

    /// Regime with the strictly lower tax; the new regime wins a tie.
    pub recommended: Regime,
}

impl TaxComparison {
    pub fn result(&self, regime: Regime) -> &RegimeResult {
        match regime {
            Regime::Old => &self.old_regime,
            Regime::New => &self.new_regime,
        }
    }

    pub fn old_regime_is_cheaper(&self) -> bool {
        self.old_regime.tax < self.new_regime.tax
    }
}
