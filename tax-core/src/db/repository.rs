use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CalculationRecord, NewCalculationRecord, UserId};
use crate::validation::ValidationError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for calculation history.
///
/// Implementations must run [`crate::validate_record`] in
/// `save_calculation` and refuse invalid records with
/// [`RepositoryError::Validation`].
#[async_trait]
pub trait TaxRepository: Send + Sync {
    async fn save_calculation(
        &self,
        record: NewCalculationRecord,
    ) -> Result<CalculationRecord, RepositoryError>;

    async fn get_calculation(
        &self,
        id: i64,
    ) -> Result<CalculationRecord, RepositoryError>;

    /// All calculations owned by `user_id`, newest first. Empty when the
    /// user has none.
    async fn fetch_history(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CalculationRecord>, RepositoryError>;

    async fn delete_calculation(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;
}
