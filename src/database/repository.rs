use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::manager::DatabaseError;
use super::store::{DeleteResult, Document, DocumentStore, Update, UpdateResult};
use crate::filter::Filter;

/// Typed view of one collection. Every call is bounded by `timeout`.
pub struct Repository<T> {
    collection: &'static str,
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
    _phantom: PhantomData<T>,
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned + Send,
{
    pub fn new(collection: &'static str, store: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self {
            collection,
            store,
            timeout,
            _phantom: PhantomData,
        }
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    pub async fn insert(&self, record: &T) -> Result<(), DatabaseError> {
        let doc = match serde_json::to_value(record)? {
            Value::Object(map) => map,
            other => {
                return Err(DatabaseError::InvalidDocument(format!(
                    "{} records must serialize to objects, got {}",
                    self.collection, other
                )))
            }
        };
        self.timed("insert", self.store.insert_one(self.collection, doc)).await
    }

    pub async fn select_any(&self, filter: Filter) -> Result<Vec<T>, DatabaseError> {
        let docs = self.timed("find", self.store.find(self.collection, &filter)).await?;
        docs.into_iter().map(decode).collect()
    }

    pub async fn select_one(&self, filter: Filter) -> Result<Option<T>, DatabaseError> {
        let doc = self.timed("find_one", self.store.find_one(self.collection, &filter)).await?;
        doc.map(decode).transpose()
    }

    /// Like `select_one`, but a miss becomes `DatabaseError::NotFound(message)`.
    pub async fn select_404(&self, filter: Filter, message: &str) -> Result<T, DatabaseError> {
        self.select_one(filter)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(message.to_string()))
    }

    pub async fn update_one(&self, filter: Filter, update: Update) -> Result<UpdateResult, DatabaseError> {
        self.timed("update_one", self.store.update_one(self.collection, &filter, &update))
            .await
    }

    pub async fn delete_one(&self, filter: Filter) -> Result<DeleteResult, DatabaseError> {
        self.timed("delete_one", self.store.delete_one(self.collection, &filter))
            .await
    }

    pub async fn count(&self, filter: Filter) -> Result<u64, DatabaseError> {
        self.timed("count", self.store.count(self.collection, &filter)).await
    }

    async fn timed<R, F>(&self, operation: &str, fut: F) -> Result<R, DatabaseError>
    where
        F: Future<Output = Result<R, DatabaseError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(DatabaseError::Timeout {
                operation: format!("{}.{}", self.collection, operation),
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, DatabaseError> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}
