use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::info;

use super::memory::MemoryStore;
use super::postgres::PgDocumentStore;
use super::store::DocumentStore;
use crate::config::{StoreBackend, StoreConfig};
use crate::filter::FilterError;

/// Errors from the document store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Construct the configured store. For Postgres this also ensures the
/// `documents` table exists.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let store = connect_postgres(config).await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
    }
}

pub async fn connect_postgres(config: &StoreConfig) -> Result<PgDocumentStore, DatabaseError> {
    let url = config
        .database_url
        .as_deref()
        .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
    let target = describe_target(url)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
        .connect(url)
        .await?;

    info!("Created database pool for {} (max {} connections)", target, config.max_connections);
    Ok(PgDocumentStore::new(pool))
}

/// `host:port/database` without credentials, for logging
fn describe_target(database_url: &str) -> Result<String, DatabaseError> {
    let url = url::Url::parse(database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    let host = url.host_str().unwrap_or("localhost");
    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    Ok(format!("{}{}{}", host, port, url.path()))
}
