//! Terminal rendering of comparisons, advice and history.

use std::io::{self, Write};

use tax_core::calculations::{Advice, GENERAL_TIPS, Priority};
use tax_core::{CalculationRecord, Regime, RegimeResult, TaxComparison};

pub fn write_comparison<W: Write>(
    out: &mut W,
    comparison: &TaxComparison,
    selected: Regime,
) -> io::Result<()> {
    for regime in [Regime::Old, Regime::New] {
        let marker = if regime == selected { " (selected)" } else { "" };
        writeln!(out, "{}{}", regime.label(), marker)?;
        write_result(out, comparison.result(regime))?;
    }

    writeln!(out)?;
    if comparison.savings.is_zero() {
        writeln!(
            out,
            "Recommended: {} (both regimes cost the same)",
            comparison.recommended.label()
        )
    } else {
        writeln!(
            out,
            "Recommended: {} (saves Rs.{})",
            comparison.recommended.label(),
            comparison.savings
        )
    }
}

fn write_result<W: Write>(
    out: &mut W,
    result: &RegimeResult,
) -> io::Result<()> {
    writeln!(out, "  {:<18}Rs.{}", "Total Income:", result.total_income)?;
    writeln!(out, "  {:<18}Rs.{}", "Total Deductions:", result.total_deductions)?;
    writeln!(out, "  {:<18}Rs.{}", "Taxable Income:", result.taxable_income)?;
    writeln!(out, "  {:<18}Rs.{}", "Tax Payable:", result.tax)
}

/// Personalized advice first, then the general tips.
pub fn write_advice<W: Write>(
    out: &mut W,
    advice: &[Advice],
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Tax-Saving Advice")?;
    for item in advice {
        let tag = match item.priority {
            Priority::High => "[high]",
            Priority::Medium => "[medium]",
        };
        writeln!(out, "  {:<9}{}", tag, item.message)?;
    }
    for tip in GENERAL_TIPS {
        writeln!(out, "  - {}", tip)?;
    }
    Ok(())
}

pub fn write_history<W: Write>(
    out: &mut W,
    records: &[CalculationRecord],
) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "No saved calculations.");
    }

    writeln!(
        out,
        "{:>6}  {:<16}  {:<14}  {:<10}  {:>12}  {:>12}  {}",
        "ID", "Saved", "Age Group", "Regime", "Old Tax", "New Tax", "Recommended"
    )?;
    for record in records {
        writeln!(
            out,
            "{:>6}  {:<16}  {:<14}  {:<10}  {:>12}  {:>12}  {}",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.age_group.label(),
            record.selected_regime.label(),
            record.result.old_regime.tax,
            record.result.new_regime.tax,
            record.result.recommended.label(),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use tax_core::calculations::{TaxEngine, advise};
    use tax_core::{AgeGroup, DeductionInputs, IncomeInputs, UserId};

    use super::*;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).expect("writing to a Vec cannot fail");
        String::from_utf8(buf).expect("output is UTF-8")
    }

    fn salaried(salary: rust_decimal::Decimal) -> TaxComparison {
        let income = IncomeInputs {
            salary,
            ..Default::default()
        };
        TaxEngine.compare(&income, &DeductionInputs::default(), AgeGroup::Below60)
    }

    #[test]
    fn comparison_marks_selected_regime_and_savings() {
        let text = render(|out| write_comparison(out, &salaried(dec!(1000000)), Regime::Old));

        assert!(text.contains("Old Regime (selected)\n"));
        assert!(text.contains("New Regime\n"));
        assert!(text.contains("  Tax Payable:      Rs.54600\n"));
        assert!(text.contains("Recommended: New Regime (saves Rs.54600)"));
    }

    #[test]
    fn equal_taxes_say_so() {
        let text = render(|out| write_comparison(out, &salaried(dec!(300000)), Regime::New));

        assert!(text.contains("Recommended: New Regime (both regimes cost the same)"));
    }

    #[test]
    fn advice_lists_personal_items_then_tips() {
        let comparison = salaried(dec!(1000000));
        let advice = advise(&comparison, Regime::Old, AgeGroup::Below60, &DeductionInputs::default());

        let text = render(|out| write_advice(out, &advice));

        assert!(text.contains("[high]   You can claim more deductions under Section 80C"));
        assert!(text.ends_with(&format!("  - {}\n", GENERAL_TIPS[GENERAL_TIPS.len() - 1])));
    }

    #[test]
    fn empty_history() {
        let text = render(|out| write_history(out, &[]));

        assert_eq!(text, "No saved calculations.\n");
    }

    #[test]
    fn history_row_shows_both_taxes() {
        let at = Utc.with_ymd_and_hms(2025, 7, 31, 18, 30, 0).unwrap();
        let record = CalculationRecord {
            id: 7,
            user_id: UserId::new("asha"),
            age_group: AgeGroup::Below60,
            selected_regime: Regime::Old,
            income: IncomeInputs::default(),
            deductions: DeductionInputs::default(),
            result: salaried(dec!(1000000)),
            created_at: at,
            updated_at: at,
        };

        let text = render(|out| write_history(out, &[record]));
        let row = text.lines().nth(1).expect("one data row");

        assert!(row.starts_with("     7  2025-07-31 18:30"));
        assert!(row.contains("54600"));
        assert!(row.ends_with("New Regime"));
    }
}
