pub mod calculations;
pub mod db;
pub mod models;
pub mod report;
pub mod service;
pub mod validation;

pub use db::{DbConfig, RepositoryError, RepositoryFactory, RepositoryRegistry, TaxRepository};
pub use models::*;
pub use report::TaxReport;
pub use service::{CalculationOutcome, CalculationRequest, CalculationService, ServiceError};
pub use validation::{ValidationError, validate_record};
