mod age_group;
mod calculation_record;
mod inputs;
mod regime;
mod tax_result;

pub use age_group::AgeGroup;
pub use calculation_record::{CalculationRecord, NewCalculationRecord, UserId};
pub use inputs::{DeductionInputs, IncomeInputs, MAX_AMOUNT, SECTION_80C_CAP};
pub use regime::Regime;
pub use tax_result::{RegimeResult, TaxComparison};
