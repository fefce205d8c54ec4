use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::{DocumentStore, Repository};
use crate::mail::Mailer;
use crate::middleware::VisitorInspector;

/// Shared, immutable state handed to every handler through axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub store: Arc<dyn DocumentStore>,
    pub mailer: Arc<dyn Mailer>,
    pub visitors: Arc<VisitorInspector>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        tokens: TokenService,
        store: Arc<dyn DocumentStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            store,
            mailer,
            visitors: Arc::new(VisitorInspector::default()),
        }
    }

    /// Typed access to one collection, bounded by the configured store timeout.
    pub fn repo<T>(&self, collection: &'static str) -> Repository<T>
    where
        T: Serialize + DeserializeOwned + Send,
    {
        Repository::new(
            collection,
            self.store.clone(),
            Duration::from_secs(self.config.store.operation_timeout_secs),
        )
    }
}
