use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::manager::DatabaseError;
use super::patch::{Patch, PatchError};
use crate::filter::{validate_field_path, Filter, FilterError};

/// A stored JSON object. Every document carries a string `_id`.
pub type Document = Map<String, Value>;

/// Single-document update: `$set`-style assignments plus atomic increments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub set: Vec<(String, Value)>,
    pub inc: Vec<(String, i64)>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    /// An update that refreshes `updated_at`.
    pub fn stamped(now: DateTime<Utc>) -> Self {
        Self::new().set("updated_at", now.to_rfc3339())
    }

    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.set.push((field.to_string(), value.into()));
        self
    }

    pub fn inc(mut self, field: &str, by: i64) -> Self {
        self.inc.push((field.to_string(), by));
        self
    }

    /// Apply a nullable patch field.
    pub fn patch<T: Serialize>(self, field: &str, patch: &Patch<T>) -> Result<Self, PatchError> {
        match patch.to_json(field)? {
            Some(value) => Ok(self.set(field, value)),
            None => Ok(self),
        }
    }

    /// Apply a patch field that may be omitted but never cleared.
    pub fn require<T: Serialize>(self, field: &str, patch: &Patch<T>) -> Result<Self, PatchError> {
        if matches!(patch, Patch::Null) {
            return Err(PatchError::NullRequired(field.to_string()));
        }
        self.patch(field, patch)
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.inc.is_empty()
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        for (field, _) in &self.set {
            validate_field_path(field)?;
        }
        for (field, _) in &self.inc {
            validate_field_path(field)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted: u64,
}

/// Collection-oriented document store.
///
/// `update_one` and `delete_one` act on the first document (in insertion
/// order) matching the filter. Increments are applied atomically by the
/// backend, never as read-modify-write in the caller.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<(), DatabaseError>;

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError>;

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult, DatabaseError>;

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<DeleteResult, DatabaseError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Accepts non-empty names of ASCII alphanumerics and underscores.
pub fn is_valid_collection(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn check_collection(name: &str) -> Result<(), DatabaseError> {
    if is_valid_collection(name) {
        Ok(())
    } else {
        Err(DatabaseError::InvalidCollection(name.to_string()))
    }
}
