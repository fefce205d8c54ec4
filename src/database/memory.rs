use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::store::{check_collection, DeleteResult, Document, DocumentStore, Update, UpdateResult};
use crate::filter::Filter;

/// Process-local store used by tests and `--store memory`.
///
/// Collections keep insertion order. Each update runs under the write lock,
/// which gives increments the same atomicity as the Postgres backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<(), DatabaseError> {
        check_collection(collection)?;
        let id = doc
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| DatabaseError::InvalidDocument("missing _id".to_string()))?
            .to_string();

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| d.get("_id").and_then(Value::as_str) == Some(id.as_str())) {
            return Err(DatabaseError::InvalidDocument(format!("duplicate _id {}", id)));
        }
        docs.push(doc);
        Ok(())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        check_collection(collection)?;
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(vec![]);
        };

        let mut found = Vec::new();
        for doc in docs {
            if filter.matches(doc)? {
                found.push(doc.clone());
            }
        }
        Ok(found)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        check_collection(collection)?;
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(None);
        };

        for doc in docs {
            if filter.matches(doc)? {
                return Ok(Some(doc.clone()));
            }
        }
        Ok(None)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult, DatabaseError> {
        check_collection(collection)?;
        update.validate()?;

        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(UpdateResult { matched: 0 });
        };

        let mut target = None;
        for (index, doc) in docs.iter().enumerate() {
            if filter.matches(doc)? {
                target = Some(index);
                break;
            }
        }
        let Some(index) = target else {
            return Ok(UpdateResult { matched: 0 });
        };

        // Apply to a copy so a failed increment leaves the document untouched
        let mut updated = docs[index].clone();
        for (field, value) in &update.set {
            set_path(&mut updated, field, value.clone());
        }
        for (field, by) in &update.inc {
            increment_path(&mut updated, field, *by)?;
        }
        docs[index] = updated;

        Ok(UpdateResult { matched: 1 })
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<DeleteResult, DatabaseError> {
        check_collection(collection)?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(DeleteResult { deleted: 0 });
        };

        let mut target = None;
        for (index, doc) in docs.iter().enumerate() {
            if filter.matches(doc)? {
                target = Some(index);
                break;
            }
        }
        match target {
            Some(index) => {
                docs.remove(index);
                Ok(DeleteResult { deleted: 1 })
            }
            None => Ok(DeleteResult { deleted: 0 }),
        }
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        Ok(self.find(collection, filter).await?.len() as u64)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Set a dotted path, creating intermediate objects as needed.
fn set_path(doc: &mut Document, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').collect();
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return,
    };

    let mut current = doc;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }
    current.insert(last.to_string(), value);
}

fn increment_path(doc: &mut Document, path: &str, by: i64) -> Result<(), DatabaseError> {
    let current = crate::filter::matcher::lookup(doc, path).cloned();
    let next = match current {
        None | Some(Value::Null) => Value::from(by),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => Value::from(i + by),
            None => Value::from(n.as_f64().unwrap_or(0.0) + by as f64),
        },
        Some(other) => {
            return Err(DatabaseError::InvalidUpdate(format!(
                "cannot increment non-numeric field {} ({})",
                path, other
            )))
        }
    };
    set_path(doc, path, next);
    Ok(())
}
