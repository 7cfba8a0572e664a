//! Plain-text tax calculation report.
//!
//! The report mirrors what a printed summary would carry: the taxpayer's
//! choices, every input figure, the selected regime's result and the
//! side-by-side comparison.

use std::fmt;

use crate::calculations::Advice;
use crate::{AgeGroup, DeductionInputs, IncomeInputs, Regime, TaxComparison};

const RULE: &str = "----------------------------------------";

/// Everything needed to render a report for one calculation.
#[derive(Debug, Clone)]
pub struct TaxReport<'a> {
    pub regime: Regime,
    pub age_group: AgeGroup,
    pub income: &'a IncomeInputs,
    pub deductions: &'a DeductionInputs,
    pub comparison: &'a TaxComparison,
    pub advice: &'a [Advice],
}

impl TaxReport<'_> {
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TaxReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Tax Calculation Report")?;
        writeln!(f, "{RULE}")?;

        section(f, "Basic Information")?;
        writeln!(f, "Tax Regime: {}", self.regime.label())?;
        writeln!(f, "Age Group: {}", self.age_group.label())?;

        section(f, "Income Details")?;
        for (label, amount) in self.income.entries() {
            writeln!(f, "{label}: Rs.{amount}")?;
        }

        if self.regime.allows_itemized_deductions() {
            section(f, "Deductions")?;
            for (label, amount) in self.deductions.entries() {
                writeln!(f, "{label}: Rs.{amount}")?;
            }
        }

        let current = self.comparison.result(self.regime);
        section(f, "Tax Calculation Results")?;
        writeln!(f, "Total Income: Rs.{}", current.total_income)?;
        writeln!(f, "Total Deductions: Rs.{}", current.total_deductions)?;
        writeln!(f, "Taxable Income: Rs.{}", current.taxable_income)?;
        writeln!(f, "Tax Payable: Rs.{}", current.tax)?;

        section(f, "Regime Comparison")?;
        writeln!(f, "Old Regime Tax: Rs.{}", self.comparison.old_regime.tax)?;
        writeln!(f, "New Regime Tax: Rs.{}", self.comparison.new_regime.tax)?;
        writeln!(f, "Savings: Rs.{}", self.comparison.savings)?;
        writeln!(f, "Recommended Regime: {}", self.comparison.recommended.label())?;

        if !self.advice.is_empty() {
            section(f, "Tax-Saving Advice")?;
            for item in self.advice {
                writeln!(f, "- {}", item.message)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "* Includes 4% Health & Education Cess")?;
        writeln!(f, "* This is a computer-generated report")
    }
}

fn section(
    f: &mut fmt::Formatter<'_>,
    title: &str,
) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{title}")
}
