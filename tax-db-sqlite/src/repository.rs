use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tax_core::{
    AgeGroup, CalculationRecord, DeductionInputs, IncomeInputs, NewCalculationRecord, Regime,
    RegimeResult, RepositoryError, TaxComparison, TaxRepository, UserId, validate_record,
};
use tracing::debug;

use crate::decimal::{decimal_to_f64, get_decimal, get_text};

const SELECT_CALCULATION: &str = "SELECT id, user_id, age_group, selected_regime,
        salary, interest, rental, capital_gains, other,
        section_80c, section_80d, section_24, section_80ccd, section_80g, section_80e, section_80tta,
        old_total_income, old_total_deductions, old_taxable_income, old_tax,
        new_total_income, new_total_deductions, new_taxable_income, new_tax,
        savings, recommended_regime, created_at, updated_at
    FROM tax_calculation";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect to `database_url`, creating the database file if needed.
    ///
    /// Accepts a bare path (`taxease.db`), a sqlx URL (`sqlite://taxease.db`)
    /// or `:memory:`.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database location: {}", database_url))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Pool exhaustion and I/O failures mean the store could not be reached;
/// everything else is a failed statement.
fn db_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            RepositoryError::Connection(e.to_string())
        }
        other => RepositoryError::Database(other.to_string()),
    }
}

fn get_regime(
    row: &SqliteRow,
    column: &str,
) -> Result<Regime, RepositoryError> {
    let value = get_text(row, column)?;
    Regime::parse(&value)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid regime in {}: {}", column, value)))
}

fn row_to_regime_result(
    row: &SqliteRow,
    prefix: &str,
) -> Result<RegimeResult, RepositoryError> {
    Ok(RegimeResult {
        total_income: get_decimal(row, &format!("{prefix}_total_income"))?,
        total_deductions: get_decimal(row, &format!("{prefix}_total_deductions"))?,
        taxable_income: get_decimal(row, &format!("{prefix}_taxable_income"))?,
        tax: get_decimal(row, &format!("{prefix}_tax"))?,
    })
}

fn row_to_calculation(row: &SqliteRow) -> Result<CalculationRecord, RepositoryError> {
    let age_group = get_text(row, "age_group")?;
    let age_group = AgeGroup::parse(&age_group)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid age group: {}", age_group)))?;

    Ok(CalculationRecord {
        id: row
            .try_get("id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        user_id: UserId::new(get_text(row, "user_id")?),
        age_group,
        selected_regime: get_regime(row, "selected_regime")?,
        income: IncomeInputs {
            salary: get_decimal(row, "salary")?,
            interest: get_decimal(row, "interest")?,
            rental: get_decimal(row, "rental")?,
            capital_gains: get_decimal(row, "capital_gains")?,
            other: get_decimal(row, "other")?,
        },
        deductions: DeductionInputs {
            section_80c: get_decimal(row, "section_80c")?,
            section_80d: get_decimal(row, "section_80d")?,
            section_24: get_decimal(row, "section_24")?,
            section_80ccd: get_decimal(row, "section_80ccd")?,
            section_80g: get_decimal(row, "section_80g")?,
            section_80e: get_decimal(row, "section_80e")?,
            section_80tta: get_decimal(row, "section_80tta")?,
        },
        result: TaxComparison {
            old_regime: row_to_regime_result(row, "old")?,
            new_regime: row_to_regime_result(row, "new")?,
            savings: get_decimal(row, "savings")?,
            recommended: get_regime(row, "recommended_regime")?,
        },
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

#[async_trait]
impl TaxRepository for SqliteRepository {
    async fn save_calculation(
        &self,
        record: NewCalculationRecord,
    ) -> Result<CalculationRecord, RepositoryError> {
        validate_record(&record)?;

        let now = Utc::now();
        let income = &record.income;
        let deductions = &record.deductions;
        let old = &record.result.old_regime;
        let new = &record.result.new_regime;

        let result = sqlx::query(
            "INSERT INTO tax_calculation (
                user_id, age_group, selected_regime,
                salary, interest, rental, capital_gains, other,
                section_80c, section_80d, section_24, section_80ccd,
                section_80g, section_80e, section_80tta,
                old_total_income, old_total_deductions, old_taxable_income, old_tax,
                new_total_income, new_total_deductions, new_taxable_income, new_tax,
                savings, recommended_regime, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.user_id.as_str())
        .bind(record.age_group.as_str())
        .bind(record.selected_regime.as_str())
        .bind(decimal_to_f64(income.salary))
        .bind(decimal_to_f64(income.interest))
        .bind(decimal_to_f64(income.rental))
        .bind(decimal_to_f64(income.capital_gains))
        .bind(decimal_to_f64(income.other))
        .bind(decimal_to_f64(deductions.section_80c))
        .bind(decimal_to_f64(deductions.section_80d))
        .bind(decimal_to_f64(deductions.section_24))
        .bind(decimal_to_f64(deductions.section_80ccd))
        .bind(decimal_to_f64(deductions.section_80g))
        .bind(decimal_to_f64(deductions.section_80e))
        .bind(decimal_to_f64(deductions.section_80tta))
        .bind(decimal_to_f64(old.total_income))
        .bind(decimal_to_f64(old.total_deductions))
        .bind(decimal_to_f64(old.taxable_income))
        .bind(decimal_to_f64(old.tax))
        .bind(decimal_to_f64(new.total_income))
        .bind(decimal_to_f64(new.total_deductions))
        .bind(decimal_to_f64(new.taxable_income))
        .bind(decimal_to_f64(new.tax))
        .bind(decimal_to_f64(record.result.savings))
        .bind(record.result.recommended.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let id = result.last_insert_rowid();
        debug!(id, user = %record.user_id, "inserted tax_calculation row");
        self.get_calculation(id).await
    }

    async fn get_calculation(
        &self,
        id: i64,
    ) -> Result<CalculationRecord, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_CALCULATION))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_calculation(&row)
    }

    async fn fetch_history(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CalculationRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{} WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            SELECT_CALCULATION
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_calculation).collect()
    }

    async fn delete_calculation(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tax_calculation WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::ValidationError;
    use tax_core::calculations::TaxEngine;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let repo = SqliteRepository::new_with_pool(pool).await;
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn create_test_record(user: &str) -> NewCalculationRecord {
        let income = IncomeInputs {
            salary: dec!(1200000),
            interest: dec!(15000.50),
            rental: dec!(60000),
            ..Default::default()
        };
        let deductions = DeductionInputs {
            section_80c: dec!(150000),
            section_80d: dec!(25000),
            section_24: dec!(200000),
            section_80tta: dec!(10000),
            ..Default::default()
        };
        let result = TaxEngine.compare(&income, &deductions, AgeGroup::Between60And80);

        NewCalculationRecord {
            user_id: UserId::new(user),
            age_group: AgeGroup::Between60And80,
            selected_regime: Regime::Old,
            income,
            deductions,
            result,
        }
    }

    fn create_minimal_test_record(user: &str) -> NewCalculationRecord {
        let income = IncomeInputs {
            salary: dec!(1000000),
            ..Default::default()
        };
        let deductions = DeductionInputs::default();
        let result = TaxEngine.compare(&income, &deductions, AgeGroup::Below60);

        NewCalculationRecord {
            user_id: UserId::new(user),
            age_group: AgeGroup::Below60,
            selected_regime: Regime::New,
            income,
            deductions,
            result,
        }
    }

    async fn count_rows(repo: &SqliteRepository) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM tax_calculation")
            .fetch_one(repo.pool())
            .await
            .expect("Failed to count rows")
    }

    // ==========================================================================
    // save / get
    // ==========================================================================

    #[tokio::test]
    async fn test_save_and_get_calculation() {
        let repo = setup_test_db().await;
        let new_record = create_test_record("asha");

        let saved = repo
            .save_calculation(new_record.clone())
            .await
            .expect("Should save calculation");

        assert!(saved.id > 0);
        assert_eq!(saved.user_id, UserId::new("asha"));
        assert_eq!(saved.age_group, AgeGroup::Between60And80);
        assert_eq!(saved.selected_regime, Regime::Old);
        assert_eq!(saved.income, new_record.income);
        assert_eq!(saved.deductions, new_record.deductions);
        assert_eq!(saved.result, new_record.result);
        assert_eq!(saved.created_at, saved.updated_at);

        let fetched = repo
            .get_calculation(saved.id)
            .await
            .expect("Should fetch calculation");
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn test_saved_result_matches_engine_figures() {
        let repo = setup_test_db().await;

        let saved = repo
            .save_calculation(create_minimal_test_record("asha"))
            .await
            .expect("Should save calculation");

        assert_eq!(saved.result.old_regime.taxable_income, dec!(950000));
        assert_eq!(saved.result.old_regime.tax, dec!(54600));
        assert_eq!(saved.result.new_regime.tax, dec!(0));
        assert_eq!(saved.result.savings, dec!(54600));
        assert_eq!(saved.result.recommended, Regime::New);
    }

    #[tokio::test]
    async fn test_get_calculation_not_found() {
        let repo = setup_test_db().await;

        let result = repo.get_calculation(99999).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_save_rejects_blank_user() {
        let repo = setup_test_db().await;

        let result = repo.save_calculation(create_test_record(" ")).await;

        assert_eq!(
            result,
            Err(RepositoryError::Validation(ValidationError::MissingUserId))
        );
        assert_eq!(count_rows(&repo).await, 0);
    }

    #[tokio::test]
    async fn test_save_rejects_80c_above_cap() {
        let repo = setup_test_db().await;
        let mut record = create_test_record("asha");
        record.deductions.section_80c = dec!(175000);

        let result = repo.save_calculation(record).await;

        assert!(matches!(
            result,
            Err(RepositoryError::Validation(ValidationError::CapExceeded { .. }))
        ));
        assert_eq!(count_rows(&repo).await, 0);
    }

    #[tokio::test]
    async fn test_save_rejects_negative_amount() {
        let repo = setup_test_db().await;
        let mut record = create_test_record("asha");
        record.income.other = dec!(-500);

        let result = repo.save_calculation(record).await;

        assert!(matches!(
            result,
            Err(RepositoryError::Validation(ValidationError::NegativeAmount { .. }))
        ));
    }

    #[tokio::test]
    async fn test_schema_rejects_out_of_range_rows() {
        let repo = setup_test_db().await;

        let result = sqlx::query(
            "INSERT INTO tax_calculation (
                user_id, age_group, selected_regime,
                old_total_income, old_total_deductions, old_taxable_income, old_tax,
                new_total_income, new_total_deductions, new_taxable_income, new_tax,
                savings, recommended_regime, created_at, updated_at
            ) VALUES ('asha', 'teen', 'old', 0, 0, 0, 0, 0, 0, 0, 0, 0, 'new', '', '')",
        )
        .execute(repo.pool())
        .await;

        assert!(result.is_err());
    }

    // ==========================================================================
    // history
    // ==========================================================================

    #[tokio::test]
    async fn test_fetch_history_newest_first() {
        let repo = setup_test_db().await;

        let first = repo
            .save_calculation(create_minimal_test_record("asha"))
            .await
            .expect("Should save first");
        let second = repo
            .save_calculation(create_test_record("asha"))
            .await
            .expect("Should save second");

        let history = repo
            .fetch_history(&UserId::new("asha"))
            .await
            .expect("Should fetch history");

        let ids: Vec<_> = history.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_fetch_history_is_scoped_to_user() {
        let repo = setup_test_db().await;
        repo.save_calculation(create_test_record("asha"))
            .await
            .expect("Should save");
        repo.save_calculation(create_minimal_test_record("ravi"))
            .await
            .expect("Should save");

        let history = repo
            .fetch_history(&UserId::new("ravi"))
            .await
            .expect("Should fetch history");

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_id, UserId::new("ravi"));
    }

    #[tokio::test]
    async fn test_fetch_history_empty() {
        let repo = setup_test_db().await;

        let history = repo
            .fetch_history(&UserId::new("nobody"))
            .await
            .expect("Should fetch history");

        assert!(history.is_empty());
    }

    // ==========================================================================
    // delete
    // ==========================================================================

    #[tokio::test]
    async fn test_delete_calculation() {
        let repo = setup_test_db().await;
        let saved = repo
            .save_calculation(create_minimal_test_record("asha"))
            .await
            .expect("Should save");

        repo.delete_calculation(saved.id)
            .await
            .expect("Should delete calculation");

        assert_eq!(
            repo.get_calculation(saved.id).await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_delete_calculation_not_found() {
        let repo = setup_test_db().await;

        let result = repo.delete_calculation(99999).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    // ==========================================================================
    // connection
    // ==========================================================================

    #[tokio::test]
    async fn test_new_accepts_memory_location() {
        let repo = SqliteRepository::new(":memory:")
            .await
            .expect("Should open in-memory database");
        repo.run_migrations()
            .await
            .expect("Should migrate");

        assert_eq!(count_rows(&repo).await, 0);
    }

    #[tokio::test]
    async fn test_closed_pool_is_connection_error() {
        let repo = setup_test_db().await;
        repo.pool().close().await;

        let result = repo.fetch_history(&UserId::new("asha")).await;

        assert!(matches!(result, Err(RepositoryError::Connection(_))));
    }
}
