use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::types::{FilterOp, FilterValue, FilterWhereInfo};
use crate::database::Document;

/// Walk a dotted path through nested objects.
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

pub fn matches(condition: &FilterWhereInfo, doc: &Document) -> bool {
    let stored = lookup(doc, &condition.field);

    match condition.operator {
        FilterOp::Ne => match stored {
            None => true,
            Some(value) => compare(value, &condition.operands[0]) != Some(Ordering::Equal),
        },
        FilterOp::In => match stored {
            None => false,
            Some(value) => condition
                .operands
                .iter()
                .any(|operand| compare(value, operand) == Some(Ordering::Equal)),
        },
        FilterOp::Between => {
            let Some(value) = stored else { return false };
            let above = matches!(
                compare(value, &condition.operands[0]),
                Some(Ordering::Greater | Ordering::Equal)
            );
            let below = matches!(
                compare(value, &condition.operands[1]),
                Some(Ordering::Less | Ordering::Equal)
            );
            above && below
        }
        op => {
            let Some(value) = stored else { return false };
            let Some(ordering) = compare(value, &condition.operands[0]) else {
                return false;
            };
            match op {
                FilterOp::Eq => ordering == Ordering::Equal,
                FilterOp::Gt => ordering == Ordering::Greater,
                FilterOp::Gte => ordering != Ordering::Less,
                FilterOp::Lt => ordering == Ordering::Less,
                FilterOp::Lte => ordering != Ordering::Greater,
                FilterOp::Ne | FilterOp::In | FilterOp::Between => false,
            }
        }
    }
}

/// Order a stored value against an operand; `None` when incomparable.
fn compare(stored: &Value, operand: &FilterValue) -> Option<Ordering> {
    match operand {
        FilterValue::Timestamp(ts) => {
            let parsed = stored.as_str().and_then(parse_timestamp)?;
            Some(parsed.cmp(ts))
        }
        FilterValue::Json(expected) => compare_json(stored, expected),
    }
}

fn compare_json(stored: &Value, expected: &Value) -> Option<Ordering> {
    match (stored, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (a, b) if a == b => Some(Ordering::Equal),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.with_timezone(&Utc))
}
