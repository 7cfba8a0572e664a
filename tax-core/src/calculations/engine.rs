//! Old-versus-new regime income tax engine.
//!
//! # Computation
//!
//! | Step | Old regime | New regime |
//! |------|------------|------------|
//! | Total income | sum of all income categories | same |
//! | Deductions | 50,000 standard (salaried only) + itemized claims | flat 75,000 |
//! | Taxable income | max(0, income - deductions) | same |
//! | Exemption | 250k / 300k / 500k by age group | none |
//! | Slabs | 0 / 5 / 20 / 30 % over income left after the exemption | 0 / 5 / 10 / 15 / 20 / 25 / 30 % |
//! | Rebate | none | tax is zero up to 1,200,000 taxable |
//! | Cess | 4 % | 4 % |
//!
//! Old-regime band widths do not move with the exemption: the exemption is
//! subtracted first and the fixed bands then start again from zero.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::TaxEngine;
//! use tax_core::{AgeGroup, DeductionInputs, IncomeInputs, Regime};
//!
//! let income = IncomeInputs {
//!     salary: dec!(1000000),
//!     ..Default::default()
//! };
//!
//! let comparison = TaxEngine.compare(&income, &DeductionInputs::default(), AgeGroup::Below60);
//!
//! assert_eq!(comparison.old_regime.tax, dec!(54600));
//! assert_eq!(comparison.new_regime.tax, dec!(0));
//! assert_eq!(comparison.savings, dec!(54600));
//! assert_eq!(comparison.recommended, Regime::New);
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, trace};

use crate::calculations::common::{floor_at_zero, round_to_whole};
use crate::calculations::slabs::{NEW_REGIME_SLABS, OLD_REGIME_SLABS, apply_slabs};
use crate::{AgeGroup, DeductionInputs, IncomeInputs, Regime, RegimeResult, TaxComparison};

/// Standard deduction granted to salaried taxpayers under the old regime.
pub const OLD_REGIME_STANDARD_DEDUCTION: Decimal = dec!(50000);

/// Flat deduction under the new regime, which disallows itemized claims.
pub const NEW_REGIME_STANDARD_DEDUCTION: Decimal = dec!(75000);

/// Taxable income at or below which the new-regime tax is fully rebated.
pub const NEW_REGIME_REBATE_LIMIT: Decimal = dec!(1200000);

/// Health and education cess, applied as a multiplier on slab tax.
pub const CESS_MULTIPLIER: Decimal = dec!(1.04);

/// Stateless tax calculator for both regimes.
///
/// Every method is a pure function of its arguments, so a single value can be
/// shared freely between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaxEngine;

impl TaxEngine {
    /// Runs both regimes and compares them.
    ///
    /// Negative inputs are treated as zero and amounts above
    /// [`MAX_AMOUNT`](crate::MAX_AMOUNT) are held to it. Each regime's tax is
    /// rounded to the nearest whole unit before the comparison is made.
    pub fn compare(
        &self,
        income: &IncomeInputs,
        deductions: &DeductionInputs,
        age_group: AgeGroup,
    ) -> TaxComparison {
        let income = income.sanitized();
        let deductions = deductions.sanitized();

        let total_income = self.compute_total_income(&income);

        let old_deductions = self.compute_old_regime_deductions(&deductions, &income);
        let old_taxable = self.taxable_income(total_income, old_deductions);
        let old_tax = round_to_whole(self.compute_old_regime_tax(old_taxable, age_group));

        let new_deductions = self.compute_new_regime_deductions();
        let new_taxable = self.taxable_income(total_income, new_deductions);
        let new_tax = round_to_whole(self.compute_new_regime_tax(new_taxable));

        let savings = (old_tax - new_tax).abs();
        let recommended = if old_tax < new_tax {
            Regime::Old
        } else {
            Regime::New
        };

        debug!(
            %total_income,
            %old_taxable,
            %old_tax,
            %new_taxable,
            %new_tax,
            recommended = recommended.as_str(),
            "compared tax regimes"
        );

        TaxComparison {
            old_regime: RegimeResult {
                total_income,
                total_deductions: old_deductions,
                taxable_income: old_taxable,
                tax: old_tax,
            },
            new_regime: RegimeResult {
                total_income,
                total_deductions: new_deductions,
                taxable_income: new_taxable,
                tax: new_tax,
            },
            savings,
            recommended,
        }
    }

    /// Sums every income category.
    pub fn compute_total_income(
        &self,
        income: &IncomeInputs,
    ) -> Decimal {
        income.entries().iter().map(|(_, amount)| *amount).sum()
    }

    /// Standard deduction (salaried only) plus itemized claims, with
    /// section 80C held to its cap.
    pub fn compute_old_regime_deductions(
        &self,
        deductions: &DeductionInputs,
        income: &IncomeInputs,
    ) -> Decimal {
        let standard = if income.has_salary() {
            OLD_REGIME_STANDARD_DEDUCTION
        } else {
            Decimal::ZERO
        };
        standard + deductions.capped().itemized_total()
    }

    /// The new regime ignores every input and grants a flat amount.
    pub fn compute_new_regime_deductions(&self) -> Decimal {
        NEW_REGIME_STANDARD_DEDUCTION
    }

    pub fn taxable_income(
        &self,
        total_income: Decimal,
        total_deductions: Decimal,
    ) -> Decimal {
        floor_at_zero(total_income - total_deductions)
    }

    /// Old-regime tax including cess, before rounding.
    pub fn compute_old_regime_tax(
        &self,
        taxable_income: Decimal,
        age_group: AgeGroup,
    ) -> Decimal {
        let remaining = floor_at_zero(taxable_income - age_group.old_regime_exemption());
        let slab_tax = apply_slabs(remaining, OLD_REGIME_SLABS);
        trace!(%taxable_income, %remaining, %slab_tax, "old regime slabs");

        slab_tax * CESS_MULTIPLIER
    }

    /// New-regime tax including cess, before rounding.
    pub fn compute_new_regime_tax(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        let slab_tax = apply_slabs(taxable_income, NEW_REGIME_SLABS);
        trace!(%taxable_income, %slab_tax, "new regime slabs");

        if taxable_income <= NEW_REGIME_REBATE_LIMIT {
            return Decimal::ZERO;
        }
        slab_tax * CESS_MULTIPLIER
    }
}
