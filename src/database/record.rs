use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored document: server-assigned identity and timestamps around a
/// resource's own fields, flattened into one JSON object.
///
/// Input bodies decode into `F` alone, so clients cannot supply `_id` or
/// the timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<F> {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: F,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<F> Record<F> {
    pub fn new(fields: F, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }
}
