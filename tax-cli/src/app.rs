use std::sync::Arc;

use anyhow::{Context, Result};
use tax_core::{CalculationService, DbConfig, RepositoryRegistry};
use tax_db_sqlite::SqliteRepositoryFactory;
use tracing::debug;

/// Registry with every storage backend this binary ships with.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Open the configured store and wrap it in a [`CalculationService`].
pub async fn open_service(config: &DbConfig) -> Result<CalculationService> {
    debug!(backend = %config.backend, "connecting");
    let repo = build_registry()
        .create(config)
        .await
        .with_context(|| format!("Failed to open {} database '{}'", config.backend, config.connection_string))?;
    Ok(CalculationService::new(Arc::from(repo)))
}
