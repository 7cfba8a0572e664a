use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};
use tax_core::RepositoryError;

/// Read a money column. Amounts are written as REAL, but INTEGER and TEXT
/// cells (hand-edited rows) are accepted too. NULL reads as zero.
pub fn get_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(Decimal::ZERO);
    }

    let type_name = value_ref.type_info().name().to_string();
    match type_name.as_str() {
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| column_error(column, &type_name, e))?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| column_error(column, &type_name, e))?;
            Decimal::try_from(val).map(|d| d.normalize()).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        "TEXT" => {
            let val: String = row.try_get(column).map_err(|e| column_error(column, &type_name, e))?;
            Decimal::from_str(val.trim()).map_err(|_| {
                RepositoryError::Database(format!("Column '{}' holds non-numeric text '{}'", column, val))
            })
        }
        other => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            other, column
        ))),
    }
}

/// Read a TEXT column.
pub fn get_text(
    row: &SqliteRow,
    column: &str,
) -> Result<String, RepositoryError> {
    row.try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", column, e)))
}

/// Convert a Decimal to f64 for SQLite storage.
pub fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

fn column_error(
    column: &str,
    type_name: &str,
    e: sqlx::Error,
) -> RepositoryError {
    RepositoryError::Database(format!("Failed to get {} from '{}': {}", type_name, column, e))
}
