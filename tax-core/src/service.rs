//! Compute-then-persist flow shared by the CLI and the CSV importer.
//!
//! The comparison is always computed first and handed back to the caller,
//! whether or not it could be stored.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::calculations::TaxEngine;
use crate::db::{RepositoryError, TaxRepository};
use crate::{
    AgeGroup, CalculationRecord, DeductionInputs, IncomeInputs, NewCalculationRecord, Regime,
    TaxComparison, UserId,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Please sign in to save calculations")]
    Authentication,

    #[error("Invalid calculation data: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to save calculation: {0}")]
    Storage(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(e) => ServiceError::Validation(e.to_string()),
            RepositoryError::Connection(msg) => ServiceError::Network(msg),
            other => ServiceError::Storage(other.to_string()),
        }
    }
}

/// One taxpayer's figures and choices, as collected from the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationRequest {
    pub age_group: AgeGroup,
    pub selected_regime: Regime,
    pub income: IncomeInputs,
    pub deductions: DeductionInputs,
}

impl CalculationRequest {
    pub fn compare(&self) -> TaxComparison {
        TaxEngine.compare(&self.income, &self.deductions, self.age_group)
    }

    /// Record as it is stored: inputs sanitized, 80C at most the cap.
    pub fn to_record(
        &self,
        user_id: UserId,
        result: TaxComparison,
    ) -> NewCalculationRecord {
        NewCalculationRecord {
            user_id,
            age_group: self.age_group,
            selected_regime: self.selected_regime,
            income: self.income.sanitized(),
            deductions: self.deductions.sanitized().capped(),
            result,
        }
    }
}

#[derive(Debug)]
pub struct CalculationOutcome {
    pub comparison: TaxComparison,
    pub saved: Result<CalculationRecord, ServiceError>,
}

pub struct CalculationService {
    repository: Arc<dyn TaxRepository>,
}

impl CalculationService {
    pub fn new(repository: Arc<dyn TaxRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<dyn TaxRepository> {
        &self.repository
    }

    /// Computes the comparison and then tries to save it for `user`.
    ///
    /// A failed save is reported in [`CalculationOutcome::saved`]; the
    /// comparison is returned unchanged either way.
    pub async fn calculate(
        &self,
        user: Option<&UserId>,
        request: &CalculationRequest,
    ) -> CalculationOutcome {
        let comparison = request.compare();

        let saved = match signed_in(user) {
            Ok(user_id) => {
                let record = request.to_record(user_id.clone(), comparison.clone());
                self.repository
                    .save_calculation(record)
                    .await
                    .map_err(ServiceError::from)
            }
            Err(e) => Err(e),
        };

        match &saved {
            Ok(record) => info!(id = record.id, user = %record.user_id, "calculation saved"),
            Err(e) => warn!(error = %e, "calculation not saved"),
        }

        CalculationOutcome { comparison, saved }
    }

    /// Saved calculations for `user`, newest first.
    pub async fn history(
        &self,
        user: Option<&UserId>,
    ) -> Result<Vec<CalculationRecord>, ServiceError> {
        let user_id = signed_in(user)?;
        Ok(self.repository.fetch_history(user_id).await?)
    }
}

fn signed_in(user: Option<&UserId>) -> Result<&UserId, ServiceError> {
    match user {
        Some(id) if !id.is_blank() => Ok(id),
        _ => Err(ServiceError::Authentication),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::validate_record;

    // ==========================================================================
    // Test doubles
    // ==========================================================================

    /// Vec-backed repository that assigns ids and timestamps in order.
    #[derive(Default)]
    struct MemoryRepository {
        rows: Mutex<Vec<CalculationRecord>>,
    }

    #[async_trait]
    impl TaxRepository for MemoryRepository {
        async fn save_calculation(
            &self,
            record: NewCalculationRecord,
        ) -> Result<CalculationRecord, RepositoryError> {
            validate_record(&record)?;
            let mut rows = self.rows.lock().unwrap();
            let id = rows.len() as i64 + 1;
            let at = Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap() + Duration::minutes(id);
            let saved = CalculationRecord {
                id,
                user_id: record.user_id,
                age_group: record.age_group,
                selected_regime: record.selected_regime,
                income: record.income,
                deductions: record.deductions,
                result: record.result,
                created_at: at,
                updated_at: at,
            };
            rows.push(saved.clone());
            Ok(saved)
        }

        async fn get_calculation(
            &self,
            id: i64,
        ) -> Result<CalculationRecord, RepositoryError> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or(RepositoryError::NotFound)
        }

        async fn fetch_history(
            &self,
            user_id: &UserId,
        ) -> Result<Vec<CalculationRecord>, RepositoryError> {
            let mut found: Vec<_> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| &r.user_id == user_id)
                .cloned()
                .collect();
            found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(found)
        }

        async fn delete_calculation(
            &self,
            id: i64,
        ) -> Result<(), RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != id);
            if rows.len() == before {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        }
    }

    /// Repository whose every call fails with the configured error.
    struct BrokenRepository(RepositoryError);

    #[async_trait]
    impl TaxRepository for BrokenRepository {
        async fn save_calculation(
            &self,
            _record: NewCalculationRecord,
        ) -> Result<CalculationRecord, RepositoryError> {
            Err(self.0.clone())
        }
        async fn get_calculation(
            &self,
            _id: i64,
        ) -> Result<CalculationRecord, RepositoryError> {
            Err(self.0.clone())
        }
        async fn fetch_history(
            &self,
            _user_id: &UserId,
        ) -> Result<Vec<CalculationRecord>, RepositoryError> {
            Err(self.0.clone())
        }
        async fn delete_calculation(
            &self,
            _id: i64,
        ) -> Result<(), RepositoryError> {
            Err(self.0.clone())
        }
    }

    fn salaried_request() -> CalculationRequest {
        CalculationRequest {
            age_group: AgeGroup::Below60,
            selected_regime: Regime::Old,
            income: IncomeInputs {
                salary: dec!(1000000),
                ..Default::default()
            },
            deductions: DeductionInputs::default(),
        }
    }

    fn service_with(repo: impl TaxRepository + 'static) -> CalculationService {
        CalculationService::new(Arc::new(repo))
    }

    // ==========================================================================
    // calculate
    // ==========================================================================

    #[tokio::test]
    async fn calculate_saves_for_signed_in_user() {
        let service = service_with(MemoryRepository::default());
        let user = UserId::new("asha");

        let outcome = service.calculate(Some(&user), &salaried_request()).await;

        assert_eq!(outcome.comparison.old_regime.tax, dec!(54600));
        assert_eq!(outcome.comparison.new_regime.tax, dec!(0));
        let saved = outcome.saved.unwrap();
        assert_eq!(saved.id, 1);
        assert_eq!(saved.user_id, user);
        assert_eq!(saved.result, outcome.comparison);
    }

    #[tokio::test]
    async fn calculate_without_user_still_returns_comparison() {
        let service = service_with(MemoryRepository::default());

        let outcome = service.calculate(None, &salaried_request()).await;

        assert_eq!(outcome.comparison.old_regime.tax, dec!(54600));
        assert_eq!(outcome.saved.unwrap_err(), ServiceError::Authentication);
    }

    #[tokio::test]
    async fn blank_user_is_not_signed_in() {
        let service = service_with(MemoryRepository::default());
        let user = UserId::new("   ");

        let outcome = service.calculate(Some(&user), &salaried_request()).await;

        assert_eq!(outcome.saved.unwrap_err(), ServiceError::Authentication);
    }

    #[tokio::test]
    async fn stored_80c_is_capped() {
        let service = service_with(MemoryRepository::default());
        let mut request = salaried_request();
        request.deductions.section_80c = dec!(200000);

        let outcome = service.calculate(Some(&UserId::new("asha")), &request).await;

        assert_eq!(outcome.saved.unwrap().deductions.section_80c, dec!(150000));
    }

    #[tokio::test]
    async fn connection_failure_maps_to_network() {
        let service = service_with(BrokenRepository(RepositoryError::Connection(
            "database is locked".to_string(),
        )));

        let outcome = service
            .calculate(Some(&UserId::new("asha")), &salaried_request())
            .await;

        assert_eq!(outcome.comparison.old_regime.tax, dec!(54600));
        assert_eq!(
            outcome.saved.unwrap_err(),
            ServiceError::Network("database is locked".to_string())
        );
    }

    #[tokio::test]
    async fn database_failure_maps_to_storage() {
        let service = service_with(BrokenRepository(RepositoryError::Database(
            "disk full".to_string(),
        )));

        let outcome = service
            .calculate(Some(&UserId::new("asha")), &salaried_request())
            .await;

        assert!(matches!(outcome.saved, Err(ServiceError::Storage(msg)) if msg.contains("disk full")));
    }

    #[test]
    fn validation_failure_maps_to_validation() {
        let err = ServiceError::from(RepositoryError::Validation(
            crate::ValidationError::MissingUserId,
        ));

        assert_eq!(err, ServiceError::Validation("user id is required".to_string()));
    }

    // ==========================================================================
    // history
    // ==========================================================================

    #[tokio::test]
    async fn history_requires_user() {
        let service = service_with(MemoryRepository::default());

        assert_eq!(service.history(None).await.unwrap_err(), ServiceError::Authentication);
    }

    #[tokio::test]
    async fn history_is_per_user_and_newest_first() {
        let service = service_with(MemoryRepository::default());
        let asha = UserId::new("asha");
        let ravi = UserId::new("ravi");

        let mut second = salaried_request();
        second.income.salary = dec!(1500000);

        service.calculate(Some(&asha), &salaried_request()).await.saved.unwrap();
        service.calculate(Some(&ravi), &salaried_request()).await.saved.unwrap();
        service.calculate(Some(&asha), &second).await.saved.unwrap();

        let history = service.history(Some(&asha)).await.unwrap();

        let salaries: Vec<_> = history.iter().map(|r| r.income.salary).collect();
        assert_eq!(salaries, vec![dec!(1500000), dec!(1000000)]);
    }

    #[tokio::test]
    async fn history_for_new_user_is_empty() {
        let service = service_with(MemoryRepository::default());

        let history = service.history(Some(&UserId::new("nobody"))).await.unwrap();

        assert!(history.is_empty());
    }
}
