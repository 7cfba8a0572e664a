//! CSV import of taxpayer figures into calculation history.

pub mod loader;

pub use loader::{CalculationLoader, CalculationLoaderError, CalculationRow};
