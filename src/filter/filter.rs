use uuid::Uuid;

use super::error::FilterError;
use super::filter_where::FilterWhere;
use super::matcher;
use super::types::{FilterOp, FilterValue, FilterWhereInfo};
use crate::database::Document;

/// Conjunction of field conditions over a document.
///
/// An empty filter matches every document. Field paths are validated when
/// the filter is compiled or evaluated, not when it is built.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<FilterWhereInfo>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: Uuid) -> Self {
        Self::new().eq("_id", id)
    }

    pub fn eq(self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.push(field, FilterOp::Eq, vec![value.into()])
    }

    pub fn ne(self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.push(field, FilterOp::Ne, vec![value.into()])
    }

    pub fn gt(self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.push(field, FilterOp::Gt, vec![value.into()])
    }

    pub fn gte(self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.push(field, FilterOp::Gte, vec![value.into()])
    }

    pub fn lt(self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.push(field, FilterOp::Lt, vec![value.into()])
    }

    pub fn lte(self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.push(field, FilterOp::Lte, vec![value.into()])
    }

    pub fn is_in<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        let operands = values.into_iter().map(Into::into).collect();
        self.push(field, FilterOp::In, operands)
    }

    /// Inclusive on both ends
    pub fn between(self, field: &str, low: impl Into<FilterValue>, high: impl Into<FilterValue>) -> Self {
        self.push(field, FilterOp::Between, vec![low.into(), high.into()])
    }

    pub fn conditions(&self) -> &[FilterWhereInfo] {
        &self.conditions
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        for condition in &self.conditions {
            validate_field_path(&condition.field)?;
            match condition.operator {
                FilterOp::Between if condition.operands.len() != 2 => {
                    return Err(FilterError::InvalidOperatorData(
                        "between requires exactly 2 values".to_string(),
                    ));
                }
                FilterOp::In => {}
                FilterOp::Between => {}
                _ if condition.operands.len() != 1 => {
                    return Err(FilterError::InvalidOperatorData(format!(
                        "{:?} requires exactly 1 value",
                        condition.operator
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Compile to a Postgres predicate over the `doc` column. Parameters are
    /// numbered after `starting_param_index`.
    pub fn to_sql_where(&self, starting_param_index: usize) -> Result<(String, Vec<super::SqlParam>), FilterError> {
        self.validate()?;
        Ok(FilterWhere::generate(&self.conditions, starting_param_index))
    }

    /// Evaluate against an in-memory document with the same semantics as
    /// the SQL compiler.
    pub fn matches(&self, doc: &Document) -> Result<bool, FilterError> {
        self.validate()?;
        Ok(self.conditions.iter().all(|condition| matcher::matches(condition, doc)))
    }

    fn push(mut self, field: &str, operator: FilterOp, operands: Vec<FilterValue>) -> Self {
        self.conditions.push(FilterWhereInfo {
            field: field.to_string(),
            operator,
            operands,
        });
        self
    }
}

/// Dotted paths of `[A-Za-z_][A-Za-z0-9_]*` segments. Paths are inlined into
/// SQL as `'{a,b}'` literals, so nothing else may pass.
pub fn validate_field_path(path: &str) -> Result<(), FilterError> {
    if path.is_empty() {
        return Err(FilterError::InvalidField(path.to_string()));
    }
    for segment in path.split('.') {
        let mut chars = segment.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidField(path.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_field_paths() {
        assert!(validate_field_path("_id").is_ok());
        assert!(validate_field_path("data.view_count").is_ok());
        assert!(validate_field_path("created_at").is_ok());
        assert!(validate_field_path("").is_err());
        assert!(validate_field_path("data..x").is_err());
        assert!(validate_field_path("1abc").is_err());
        assert!(validate_field_path("a'}; DROP TABLE documents; --").is_err());
    }

    #[test]
    fn between_requires_two_operands() {
        let filter = Filter::new().eq("a", 1i64);
        assert!(filter.validate().is_ok());

        let mut broken = Filter::new();
        broken.conditions.push(FilterWhereInfo {
            field: "a".into(),
            operator: FilterOp::Between,
            operands: vec![FilterValue::from(1i64)],
        });
        assert!(broken.validate().is_err());
    }
}
