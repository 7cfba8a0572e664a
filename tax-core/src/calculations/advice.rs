//! Tax-saving suggestions derived from a finished comparison.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::{AgeGroup, DeductionInputs, Regime, SECTION_80C_CAP, TaxComparison};

/// Taxable income above which investment suggestions are made.
const INVESTMENT_HINT_THRESHOLD: Decimal = dec!(500000);

/// Section 80D ceiling for a self-and-family policy.
const SECTION_80D_HINT_LIMIT: Decimal = dec!(25000);

/// Section 24(b) ceiling for self-occupied property.
const SECTION_24_HINT_LIMIT: Decimal = dec!(200000);

/// Tips shown regardless of the taxpayer's figures.
pub const GENERAL_TIPS: &[&str] = &[
    "Keep track of all your investments and expenses for tax purposes",
    "Consider consulting a tax professional for personalized advice",
    "Review your tax-saving investments annually",
    "Stay updated with the latest tax rules and regulations",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceKind {
    Regime,
    Income,
    Deductions,
    Age,
    Health,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub kind: AdviceKind,
    pub priority: Priority,
    pub message: String,
}

impl Advice {
    fn new(
        kind: AdviceKind,
        priority: Priority,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            priority,
            message: message.into(),
        }
    }
}

/// Builds the advice list for the regime the taxpayer selected.
///
/// Rules are evaluated in a fixed order and every matching rule contributes
/// one entry.
pub fn advise(
    comparison: &TaxComparison,
    selected: Regime,
    age_group: AgeGroup,
    deductions: &DeductionInputs,
) -> Vec<Advice> {
    let current = comparison.result(selected);
    let mut advice = Vec::new();

    if comparison.old_regime_is_cheaper() {
        advice.push(Advice::new(
            AdviceKind::Regime,
            Priority::High,
            format!(
                "You can save Rs.{} by switching to the Old Regime.",
                comparison.savings
            ),
        ));
    }

    if current.taxable_income > INVESTMENT_HINT_THRESHOLD {
        advice.push(Advice::new(
            AdviceKind::Income,
            Priority::Medium,
            "Consider investing in tax-saving instruments to reduce your taxable income.",
        ));
    }

    if selected == Regime::Old && deductions.section_80c < SECTION_80C_CAP {
        advice.push(Advice::new(
            AdviceKind::Deductions,
            Priority::High,
            "You can claim more deductions under Section 80C (up to Rs.1.5L) to reduce your tax liability.",
        ));
    }

    if age_group == AgeGroup::Below60 && current.taxable_income > INVESTMENT_HINT_THRESHOLD {
        advice.push(Advice::new(
            AdviceKind::Age,
            Priority::Medium,
            "Consider investing in a pension scheme (NPS) for additional tax benefits under Section 80CCD.",
        ));
    }

    if selected == Regime::Old && deductions.section_80d < SECTION_80D_HINT_LIMIT {
        advice.push(Advice::new(
            AdviceKind::Health,
            Priority::Medium,
            "Consider purchasing health insurance to claim deductions under Section 80D (up to Rs.25,000).",
        ));
    }

    if selected == Regime::Old && deductions.section_24 < SECTION_24_HINT_LIMIT {
        advice.push(Advice::new(
            AdviceKind::Home,
            Priority::Medium,
            "If you have a home loan, you can claim up to Rs.2L deduction under Section 24(b).",
        ));
    }

    advice
}
