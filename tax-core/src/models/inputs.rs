use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Statutory ceiling on the section 80C deduction.
pub const SECTION_80C_CAP: Decimal = dec!(150000);

/// Largest amount accepted for any single income or deduction field.
/// Sums of every field at this ceiling stay far inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// Income figures by category. Missing fields deserialize as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeInputs {
    pub salary: Decimal,
    pub interest: Decimal,
    pub rental: Decimal,
    pub capital_gains: Decimal,
    pub other: Decimal,
}

impl IncomeInputs {
    /// Labelled view of every category, in display order.
    pub fn entries(&self) -> [(&'static str, Decimal); 5] {
        [
            ("Salary Income", self.salary),
            ("Interest Income", self.interest),
            ("Rental Income", self.rental),
            ("Capital Gains", self.capital_gains),
            ("Other Income", self.other),
        ]
    }

    /// Copy with every field held between zero and [`MAX_AMOUNT`].
    pub fn sanitized(&self) -> Self {
        Self {
            salary: in_range(self.salary),
            interest: in_range(self.interest),
            rental: in_range(self.rental),
            capital_gains: in_range(self.capital_gains),
            other: in_range(self.other),
        }
    }

    pub fn has_salary(&self) -> bool {
        self.salary > Decimal::ZERO
    }
}

/// Deduction claims by income-tax section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeductionInputs {
    /// Section 80C: provident fund, life insurance, ELSS and similar.
    pub section_80c: Decimal,
    /// Section 80D: medical insurance premiums.
    pub section_80d: Decimal,
    /// Section 24(b): home-loan interest.
    pub section_24: Decimal,
    /// Section 80CCD: pension contributions, employer and employee.
    pub section_80ccd: Decimal,
    /// Section 80G: charitable donations.
    pub section_80g: Decimal,
    /// Section 80E: education-loan interest.
    pub section_80e: Decimal,
    /// Section 80TTA: savings-account interest.
    pub section_80tta: Decimal,
}

impl DeductionInputs {
    pub fn entries(&self) -> [(&'static str, Decimal); 7] {
        [
            ("Section 80C", self.section_80c),
            ("Section 80D", self.section_80d),
            ("Section 24", self.section_24),
            ("Section 80CCD", self.section_80ccd),
            ("Section 80G", self.section_80g),
            ("Section 80E", self.section_80e),
            ("Section 80TTA", self.section_80tta),
        ]
    }

    pub fn sanitized(&self) -> Self {
        Self {
            section_80c: in_range(self.section_80c),
            section_80d: in_range(self.section_80d),
            section_24: in_range(self.section_24),
            section_80ccd: in_range(self.section_80ccd),
            section_80g: in_range(self.section_80g),
            section_80e: in_range(self.section_80e),
            section_80tta: in_range(self.section_80tta),
        }
    }

    /// Copy with section 80C limited to [`SECTION_80C_CAP`].
    pub fn capped(&self) -> Self {
        Self {
            section_80c: self.section_80c.min(SECTION_80C_CAP),
            ..self.clone()
        }
    }

    /// Sum of the itemized claims, without any standard deduction.
    pub fn itemized_total(&self) -> Decimal {
        self.entries().iter().map(|(_, amount)| *amount).sum()
    }
}

fn in_range(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, MAX_AMOUNT)
}
