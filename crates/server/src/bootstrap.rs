use std::sync::Arc;

use freightwatch_agent::{AgentError, OpenAiClient, QueryAssistant};
use freightwatch_core::config::{AppConfig, ConfigError, DirectoryBackend, LoadOptions};
use freightwatch_db::{
    connect_with_settings, migrations, DbPool, InMemoryShipmentDirectory, ShipmentDirectory,
    SqlShipmentDirectory,
};
use thiserror::Error;
use tracing::info;

/// Constructed-once application state, threaded by reference into the
/// request handlers instead of living in process-wide statics.
pub struct Application {
    pub config: AppConfig,
    pub db_pool: Option<DbPool>,
    pub assistant: Arc<QueryAssistant>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("llm client initialization failed: {0}")]
    Llm(#[source] AgentError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let (directory, db_pool): (Arc<dyn ShipmentDirectory>, Option<DbPool>) =
        match config.directory.backend {
            DirectoryBackend::Memory => {
                info!(
                    event_name = "system.bootstrap.directory_ready",
                    backend = "memory",
                    "using in-memory demo directory"
                );
                (Arc::new(InMemoryShipmentDirectory::with_demo_data()), None)
            }
            DirectoryBackend::Database => {
                let pool = connect_with_settings(
                    &config.database.url,
                    config.database.max_connections,
                    config.database.timeout_secs,
                )
                .await
                .map_err(BootstrapError::DatabaseConnect)?;
                info!(
                    event_name = "system.bootstrap.database_connected",
                    "database connection established"
                );

                migrations::run_pending(&pool).await.map_err(BootstrapError::Migration)?;
                info!(
                    event_name = "system.bootstrap.migrations_applied",
                    "database migrations applied"
                );

                (Arc::new(SqlShipmentDirectory::with_pool(pool.clone())), Some(pool))
            }
        };

    let llm = Arc::new(OpenAiClient::from_config(&config.llm).map_err(BootstrapError::Llm)?);
    let assistant = Arc::new(QueryAssistant::with_directory(llm, directory));

    Ok(Application { config, db_pool, assistant })
}
