use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::calculations::normalize_amount_input;
use tax_core::{
    AgeGroup, CalculationRequest, DeductionInputs, IncomeInputs, MAX_AMOUNT, Regime,
    RepositoryError, TaxRepository, UserId,
};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when importing calculations. `row` is the 1-based
/// data row, not counting the header.
#[derive(Debug, Error)]
pub enum CalculationLoaderError {
    #[error("Row {row}: CSV parse error: {message}")]
    CsvParse { row: usize, message: String },

    #[error("Row {row}: unknown age group '{value}' (expected below60, between60and80 or above80)")]
    InvalidAgeGroup { row: usize, value: String },

    #[error("Row {row}: unknown regime '{value}' (expected old or new)")]
    InvalidRegime { row: usize, value: String },

    #[error("Row {row}: {column} must not be negative (got {amount})")]
    NegativeAmount {
        row: usize,
        column: &'static str,
        amount: Decimal,
    },

    #[error("Row {row}: {column} exceeds the largest accepted amount {max} (got {amount})", max = MAX_AMOUNT)]
    AmountTooLarge {
        row: usize,
        column: &'static str,
        amount: Decimal,
    },

    #[error("Row {row}: {source}")]
    Repository {
        row: usize,
        #[source]
        source: RepositoryError,
    },
}

impl CalculationLoaderError {
    pub fn row(&self) -> usize {
        match self {
            Self::CsvParse { row, .. }
            | Self::InvalidAgeGroup { row, .. }
            | Self::InvalidRegime { row, .. }
            | Self::NegativeAmount { row, .. }
            | Self::AmountTooLarge { row, .. }
            | Self::Repository { row, .. } => *row,
        }
    }
}

/// A single row of the calculations CSV file.
///
/// Columns:
/// - `age_group`: `below60`, `between60and80` or `above80`
/// - `selected_regime`: `old` or `new`
/// - `salary`, `interest`, `rental`, `capital_gains`, `other`: income amounts
/// - `section_80c` .. `section_80tta`: deduction amounts
///
/// Amount cells may be empty (read as zero) and may use digit separators,
/// e.g. `1_50_000`, or `"1,50,000"` when quoted.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CalculationRow {
    pub age_group: String,
    pub selected_regime: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub salary: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub interest: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub rental: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub capital_gains: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub other: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub section_80c: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub section_80d: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub section_24: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub section_80ccd: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub section_80g: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub section_80e: Decimal,
    #[serde(deserialize_with = "deserialize_amount")]
    pub section_80tta: Decimal,
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    let cleaned = normalize_amount_input(&s.unwrap_or_default());
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }
    cleaned.parse::<Decimal>().map_err(serde::de::Error::custom)
}

impl CalculationRow {
    /// Validates the row and turns it into an engine request.
    pub fn to_request(
        &self,
        row: usize,
    ) -> Result<CalculationRequest, CalculationLoaderError> {
        let age_group =
            AgeGroup::parse(&self.age_group).ok_or_else(|| CalculationLoaderError::InvalidAgeGroup {
                row,
                value: self.age_group.clone(),
            })?;
        let selected_regime = Regime::parse(&self.selected_regime).ok_or_else(|| {
            CalculationLoaderError::InvalidRegime {
                row,
                value: self.selected_regime.clone(),
            }
        })?;

        let income = IncomeInputs {
            salary: self.salary,
            interest: self.interest,
            rental: self.rental,
            capital_gains: self.capital_gains,
            other: self.other,
        };
        let deductions = DeductionInputs {
            section_80c: self.section_80c,
            section_80d: self.section_80d,
            section_24: self.section_24,
            section_80ccd: self.section_80ccd,
            section_80g: self.section_80g,
            section_80e: self.section_80e,
            section_80tta: self.section_80tta,
        };

        for (column, amount) in income.entries().into_iter().chain(deductions.entries()) {
            if amount < Decimal::ZERO {
                return Err(CalculationLoaderError::NegativeAmount { row, column, amount });
            }
            if amount > MAX_AMOUNT {
                return Err(CalculationLoaderError::AmountTooLarge { row, column, amount });
            }
        }

        Ok(CalculationRequest {
            age_group,
            selected_regime,
            income,
            deductions,
        })
    }
}

/// Imports taxpayer figures from CSV, computes both regimes for each row
/// and saves the results for one user through any [`TaxRepository`].
pub struct CalculationLoader;

impl CalculationLoader {
    /// Parse calculation rows from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a byte slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<CalculationRow>, CalculationLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        csv_reader
            .deserialize()
            .enumerate()
            .map(|(index, result)| {
                result.map_err(|e| CalculationLoaderError::CsvParse {
                    row: index + 1,
                    message: e.to_string(),
                })
            })
            .collect()
    }

    /// Compute and save every row for `user`, in file order.
    ///
    /// Every row is validated before anything is saved, so an invalid row
    /// leaves the store untouched. Saves are not transactional: if the
    /// repository fails on row N, rows 1..N-1 stay saved and the error names
    /// row N. Returns the number of calculations saved.
    pub async fn load<R: TaxRepository + ?Sized>(
        repo: &R,
        user: &UserId,
        rows: &[CalculationRow],
    ) -> Result<usize, CalculationLoaderError> {
        let requests = rows
            .iter()
            .enumerate()
            .map(|(index, row)| row.to_request(index + 1))
            .collect::<Result<Vec<_>, _>>()?;

        let mut saved = 0;
        for (index, request) in requests.iter().enumerate() {
            let record = request.to_record(user.clone(), request.compare());
            let stored = repo
                .save_calculation(record)
                .await
                .map_err(|source| CalculationLoaderError::Repository {
                    row: index + 1,
                    source,
                })?;
            debug!(row = index + 1, id = stored.id, "imported calculation");
            saved += 1;
        }

        Ok(saved)
    }
}
