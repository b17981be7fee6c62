use tfw_guard_application::{AggregateMetric, AggregateQuerySpec};
use tfw_guard_domain::IdentityField;

/// Builds the SQL text for one §4.E aggregate query against the
/// `prepared_users` view. The grammar here targets a ClickHouse-flavored
/// columnar dialect (array aggregate functions, `toUnixTimestamp`), the
/// store tfw-guard is deployed beside — but per §1 this is explicitly an
/// external-collaborator concern: only `AggregateQuerySpec`'s *semantics*
/// are part of the core's contract.
///
/// `threshold` is always bound as a parameter, never interpolated, per
/// SPEC_FULL.md §E.0's resolution of the "string-interpolated thresholds"
/// ambiguity.
pub struct BuiltQuery {
    pub sql: String,
    pub threshold_param: rust_decimal::Decimal,
    pub limit_param: i64,
}

pub fn build_group_aggregate(spec: &AggregateQuerySpec) -> BuiltQuery {
    let group_col = grouping_column(spec.grouping);
    let metric_expr = metric_expr(&spec.metric);

    let sql = format!(
        "SELECT \
            arrayStringConcat(groupUniqArray(address), ',') AS ip_csv, \
            arrayStringConcat(groupUniqArray(tft), ',') AS tft_csv, \
            arrayStringConcat(groupUniqArray(tfh), ',') AS tfh_csv, \
            {metric_expr} AS value \
         FROM prepared_users \
         WHERE timestamp >= {start} AND timestamp < {finish} \
         GROUP BY {group_col} \
         HAVING value >= ? \
         ORDER BY value DESC \
         LIMIT ?",
        metric_expr = metric_expr,
        group_col = group_col,
        start = spec.window_start,
        finish = spec.window_finish,
    );

    BuiltQuery {
        sql,
        threshold_param: spec.threshold,
        limit_param: spec.limit as i64,
    }
}

pub fn build_active_addresses(start: i64, finish: i64) -> String {
    format!(
        "SELECT DISTINCT address FROM prepared_users WHERE timestamp >= {start} AND timestamp < {finish}"
    )
}

fn grouping_column(field: IdentityField) -> &'static str {
    match field {
        IdentityField::Ip => "address",
        IdentityField::Tft => "tft",
        IdentityField::Tfh => "tfh",
    }
}

fn metric_expr(metric: &AggregateMetric) -> String {
    match metric {
        AggregateMetric::Count => "count(1)".to_string(),
        AggregateMetric::SumResponseTime => "sum(response_time)".to_string(),
        AggregateMetric::ErrorCount { allowed_statuses } => {
            if allowed_statuses.is_empty() {
                "countIf(1 = 1)".to_string()
            } else {
                let list = allowed_statuses
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("countIf(status NOT IN ({list}))")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn error_metric_with_no_allowed_statuses_counts_everything_as_error() {
        let expr = metric_expr(&AggregateMetric::ErrorCount {
            allowed_statuses: BTreeSet::new(),
        });
        assert_eq!(expr, "countIf(1 = 1)");
    }

    #[test]
    fn error_metric_excludes_allowed_statuses() {
        let mut allowed = BTreeSet::new();
        allowed.insert(200u16);
        let expr = metric_expr(&AggregateMetric::ErrorCount {
            allowed_statuses: allowed,
        });
        assert_eq!(expr, "countIf(status NOT IN (200))");
    }

    #[test]
    fn threshold_is_a_bound_parameter_not_interpolated_text() {
        let spec = AggregateQuerySpec {
            grouping: IdentityField::Ip,
            metric: AggregateMetric::Count,
            window_start: 0,
            window_finish: 60,
            threshold: rust_decimal::Decimal::from(42),
            limit: 10,
        };
        let built = build_group_aggregate(&spec);
        assert!(!built.sql.contains("42"));
        assert_eq!(built.threshold_param, rust_decimal::Decimal::from(42));
    }
}
