//! CLI subcommands.

pub mod migrate;
pub mod report;
pub mod store;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use storeroom_admin::db::{self, RepositoryError};
use storeroom_admin::validation::ValidationError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Argument failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No store with that ID.
    #[error("Store not found: {0}")]
    StoreNotFound(storeroom_core::StoreId),

    /// Report could not be rendered.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Database URL from `STOREROOM_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var("STOREROOM_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("STOREROOM_DATABASE_URL"))
}

/// Connect to the database named by the environment.
async fn connect() -> Result<PgPool, CommandError> {
    let url = database_url()?;
    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&url).await?)
}
