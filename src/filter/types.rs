use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Between,
}

impl FilterOp {
    pub fn to_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "IS DISTINCT FROM",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::In => "IN",
            FilterOp::Between => "BETWEEN",
        }
    }
}

/// Operand of a filter condition.
///
/// Timestamps are compared as instants, not as the RFC 3339 text stored in
/// the document, so `2024-01-01T00:00:00+02:00` sorts before
/// `2024-01-01T00:00:00Z`.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Json(Value),
    Timestamp(DateTime<Utc>),
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        FilterValue::Json(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Json(Value::String(value.to_string()))
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Json(Value::String(value))
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        FilterValue::Json(Value::String(value.to_string()))
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Json(Value::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Json(Value::from(value))
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Json(Value::Bool(value))
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        FilterValue::Timestamp(value)
    }
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    /// Dotted path into the document, e.g. `data.view_count`
    pub field: String,
    pub operator: FilterOp,
    pub operands: Vec<FilterValue>,
}

/// Bind parameter produced by the SQL compilers
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    BigInt(i64),
    Jsonb(Value),
    Timestamp(DateTime<Utc>),
}

impl From<&FilterValue> for SqlParam {
    fn from(value: &FilterValue) -> Self {
        match value {
            FilterValue::Json(v) => SqlParam::Jsonb(v.clone()),
            FilterValue::Timestamp(ts) => SqlParam::Timestamp(*ts),
        }
    }
}
