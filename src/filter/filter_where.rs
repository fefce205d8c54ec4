use super::types::{FilterOp, FilterValue, FilterWhereInfo, SqlParam};

/// Compiles validated conditions into a JSONB predicate over `doc`.
///
/// JSON operands compare `doc #> '{path}'` against `$n::jsonb`, so a missing
/// field yields NULL and fails every comparison except `Ne`. Timestamp
/// operands cast the stored text to `timestamptz` first.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(conditions: &[FilterWhereInfo], starting_param_index: usize) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new(starting_param_index);
        let sql_conditions: Vec<String> = conditions
            .iter()
            .map(|condition| filter_where.build_sql_condition(condition))
            .collect();

        let where_clause = if sql_conditions.is_empty() {
            "TRUE".to_string()
        } else {
            sql_conditions.join(" AND ")
        };
        (where_clause, filter_where.param_values)
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        let path = json_path_literal(&condition.field);
        match condition.operator {
            FilterOp::In => {
                if condition.operands.is_empty() {
                    return "FALSE".to_string();
                }
                let alternatives: Vec<String> = condition
                    .operands
                    .iter()
                    .map(|operand| {
                        let lhs = Self::lhs(&path, operand);
                        format!("{} = {}", lhs, self.param(operand))
                    })
                    .collect();
                format!("({})", alternatives.join(" OR "))
            }
            FilterOp::Between => {
                let lhs = Self::lhs(&path, &condition.operands[0]);
                let low = self.param(&condition.operands[0]);
                let high = self.param(&condition.operands[1]);
                format!("{} BETWEEN {} AND {}", lhs, low, high)
            }
            op => {
                let operand = &condition.operands[0];
                let lhs = Self::lhs(&path, operand);
                format!("{} {} {}", lhs, op.to_sql(), self.param(operand))
            }
        }
    }

    fn lhs(path: &str, operand: &FilterValue) -> String {
        match operand {
            FilterValue::Json(_) => format!("doc #> {}", path),
            FilterValue::Timestamp(_) => format!("(doc #>> {})::timestamptz", path),
        }
    }

    fn param(&mut self, operand: &FilterValue) -> String {
        self.param_values.push(SqlParam::from(operand));
        self.param_index += 1;
        match operand {
            FilterValue::Json(_) => format!("${}::jsonb", self.param_index),
            FilterValue::Timestamp(_) => format!("${}", self.param_index),
        }
    }
}

/// `data.view_count` -> `'{data,view_count}'`. Callers validate the path.
pub fn json_path_literal(field: &str) -> String {
    format!("'{{{}}}'", field.replace('.', ","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn empty_filter_is_true() {
        let (sql, params) = Filter::new().to_sql_where(1).unwrap();
        assert_eq!(sql, "TRUE");
        assert!(params.is_empty());
    }

    #[test]
    fn equality_numbers_params_after_offset() {
        let (sql, params) = Filter::new()
            .eq("user_id", "abc")
            .eq("type", "001")
            .to_sql_where(1)
            .unwrap();
        assert_eq!(sql, "doc #> '{user_id}' = $2::jsonb AND doc #> '{type}' = $3::jsonb");
        assert_eq!(params, vec![SqlParam::Jsonb(json!("abc")), SqlParam::Jsonb(json!("001"))]);
    }

    #[test]
    fn nested_paths_and_not_equal() {
        let (sql, _) = Filter::new().ne("data.kind", "x").to_sql_where(0).unwrap();
        assert_eq!(sql, "doc #> '{data,kind}' IS DISTINCT FROM $1::jsonb");
    }

    #[test]
    fn timestamps_compare_as_instants() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let (sql, params) = Filter::new().between("created_at", start, end).to_sql_where(0).unwrap();
        assert_eq!(sql, "(doc #>> '{created_at}')::timestamptz BETWEEN $1 AND $2");
        assert_eq!(params, vec![SqlParam::Timestamp(start), SqlParam::Timestamp(end)]);
    }

    #[test]
    fn in_expands_alternatives() {
        let (sql, params) = Filter::new().is_in("type", ["001", "002"]).to_sql_where(0).unwrap();
        assert_eq!(sql, "(doc #> '{type}' = $1::jsonb OR doc #> '{type}' = $2::jsonb)");
        assert_eq!(params.len(), 2);

        let empty: Vec<String> = vec![];
        let (sql, _) = Filter::new().is_in("type", empty).to_sql_where(0).unwrap();
        assert_eq!(sql, "FALSE");
    }

    #[test]
    fn rejects_injection_in_paths() {
        assert!(Filter::new().eq("a'}'; --", 1i64).to_sql_where(0).is_err());
    }
}
