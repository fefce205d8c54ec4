use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::record::Record;

pub type VisitorLog = Record<VisitorFields>;

/// What the capture middleware learns about one page view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisitorFields {
    pub ip: String,
    pub device: String,
    pub country: String,
    pub browser: String,
    pub os: String,
    pub user_agent: String,
    pub referer: String,
    pub path: String,
    pub visited_at: DateTime<Utc>,
    #[serde(default)]
    pub t1: Option<String>,
    #[serde(default)]
    pub t2: Option<String>,
}
