//! Schedule expressions and cron-fired tasks.
//!
//! A scheduled task binds an implicit single-container task definition to
//! a cluster and a recurrence expression. Each firing launches an
//! independent, non-restarting task instance; no persistent service is
//! created. The expression grammar is validated here, at declaration
//! time — a malformed schedule never reaches the provisioner.
//!
//! Two expression forms are accepted:
//!
//! - `cron(minutes hours day-of-month month day-of-week year)` — six
//!   fields; numbers, `,` lists, `-` ranges, `/` steps, `*`, month and
//!   weekday names, and `?` in exactly one of the two day fields.
//! - `rate(value unit)` — unit is minute(s), hour(s) or day(s), singular
//!   exactly when value is 1.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use gridplan_core::{ConfigError, ConfigResult, LogicalId};

use crate::task::ContainerSpec;

/// A validated recurrence expression, kept in its source form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleExpression {
    raw: String,
}

/// A task definition fired on a schedule instead of run as a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTaskSpec {
    pub id: LogicalId,
    pub cluster: LogicalId,
    pub schedule: ScheduleExpression,
    /// The single container launched per firing.
    pub container: ContainerSpec,
}

static FIELD_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\*|\?|[A-Za-z0-9]+(?:-[A-Za-z0-9]+)?)(?:/(\d+))?$").expect("valid regex")
});

static RATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^rate\(\s*(\d+)\s+([a-z]+)\s*\)$").expect("valid regex"));

struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
    /// Offset of the first name in `names` (e.g. JAN = 1).
    name_base: u32,
    allows_question: bool,
}

const MONTH_NAMES: &[&str] = &[
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];
const DAY_NAMES: &[&str] = &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

const CRON_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "minutes", min: 0, max: 59, names: &[], name_base: 0, allows_question: false },
    FieldSpec { name: "hours", min: 0, max: 23, names: &[], name_base: 0, allows_question: false },
    FieldSpec { name: "day-of-month", min: 1, max: 31, names: &[], name_base: 0, allows_question: true },
    FieldSpec { name: "month", min: 1, max: 12, names: MONTH_NAMES, name_base: 1, allows_question: false },
    FieldSpec { name: "day-of-week", min: 1, max: 7, names: DAY_NAMES, name_base: 1, allows_question: true },
    FieldSpec { name: "year", min: 1970, max: 2199, names: &[], name_base: 0, allows_question: false },
];

impl ScheduleExpression {
    /// Parse and validate a schedule expression.
    pub fn parse(expr: &str) -> ConfigResult<ScheduleExpression> {
        let trimmed = expr.trim();
        if let Some(body) = trimmed
            .strip_prefix("cron(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            validate_cron(trimmed, body)?;
        } else if RATE.is_match(trimmed) {
            validate_rate(trimmed)?;
        } else {
            return Err(invalid(trimmed, "expected cron(...) or rate(...)"));
        }

        Ok(ScheduleExpression {
            raw: trimmed.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for ScheduleExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn invalid(expression: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidSchedule {
        expression: expression.to_string(),
        reason: reason.into(),
    }
}

fn validate_cron(expr: &str, body: &str) -> ConfigResult<()> {
    let fields: Vec<&str> = body.split_whitespace().collect();
    if fields.len() != CRON_FIELDS.len() {
        return Err(invalid(
            expr,
            format!("expected 6 cron fields, got {}", fields.len()),
        ));
    }

    for (field, spec) in fields.iter().zip(CRON_FIELDS) {
        validate_cron_field(expr, field, spec)?;
    }

    // The provider grammar resolves the day ambiguity by requiring exactly
    // one of the two day fields to be '?'.
    let day_of_month = fields[2];
    let day_of_week = fields[4];
    match (day_of_month == "?", day_of_week == "?") {
        (true, true) => Err(invalid(expr, "only one of day-of-month and day-of-week may be '?'")),
        (false, false) => Err(invalid(expr, "one of day-of-month and day-of-week must be '?'")),
        _ => Ok(()),
    }
}

fn validate_cron_field(expr: &str, field: &str, spec: &FieldSpec) -> ConfigResult<()> {
    for term in field.split(',') {
        let captures = FIELD_TERM
            .captures(term)
            .ok_or_else(|| invalid(expr, format!("malformed {} field '{field}'", spec.name)))?;

        let base = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let step = captures.get(2);

        match base {
            "?" => {
                if !spec.allows_question {
                    return Err(invalid(
                        expr,
                        format!("'?' is not allowed in the {} field", spec.name),
                    ));
                }
                if field != "?" {
                    return Err(invalid(expr, "'?' must be the whole field"));
                }
            }
            "*" => {}
            _ => {
                let mut bounds = base.splitn(2, '-');
                let lo = resolve_atom(expr, bounds.next().unwrap_or_default(), spec)?;
                if let Some(hi_atom) = bounds.next() {
                    let hi = resolve_atom(expr, hi_atom, spec)?;
                    if lo > hi {
                        return Err(invalid(
                            expr,
                            format!("descending range '{base}' in {} field", spec.name),
                        ));
                    }
                }
            }
        }

        if let Some(step) = step {
            let value: u32 = step
                .as_str()
                .parse()
                .map_err(|_| invalid(expr, format!("bad step in {} field", spec.name)))?;
            if value == 0 {
                return Err(invalid(expr, format!("step of 0 in {} field", spec.name)));
            }
        }
    }
    Ok(())
}

/// Resolve a single number or name to its numeric value, range-checked.
fn resolve_atom(expr: &str, atom: &str, spec: &FieldSpec) -> ConfigResult<u32> {
    if let Ok(value) = atom.parse::<u32>() {
        if value < spec.min || value > spec.max {
            return Err(invalid(
                expr,
                format!("{} value {value} out of range {}..={}", spec.name, spec.min, spec.max),
            ));
        }
        return Ok(value);
    }

    let upper = atom.to_ascii_uppercase();
    if let Some(index) = spec.names.iter().position(|n| *n == upper) {
        return Ok(spec.name_base + index as u32);
    }

    Err(invalid(
        expr,
        format!("unrecognized {} value '{atom}'", spec.name),
    ))
}

fn validate_rate(expr: &str) -> ConfigResult<()> {
    let captures = RATE.captures(expr).ok_or_else(|| invalid(expr, "malformed rate expression"))?;
    let value: u64 = captures[1]
        .parse()
        .map_err(|_| invalid(expr, "rate value out of range"))?;
    if value == 0 {
        return Err(invalid(expr, "rate value must be positive"));
    }

    let unit = &captures[2];
    let singular = matches!(unit, "minute" | "hour" | "day");
    let plural = matches!(unit, "minutes" | "hours" | "days");
    if !singular && !plural {
        return Err(invalid(expr, format!("unrecognized rate unit '{unit}'")));
    }
    if value == 1 && !singular {
        return Err(invalid(expr, "rate unit must be singular when value is 1"));
    }
    if value > 1 && !plural {
        return Err(invalid(expr, "rate unit must be plural when value is greater than 1"));
    }
    Ok(())
}

impl ScheduledTaskSpec {
    /// Declare a task fired on `schedule`, built from inline container
    /// options.
    pub fn declare(
        id: &str,
        cluster: &str,
        schedule: &str,
        container: ContainerSpec,
    ) -> ConfigResult<ScheduledTaskSpec> {
        let schedule = ScheduleExpression::parse(schedule)?;
        debug!(task = id, cluster, schedule = %schedule, "declared scheduled task");
        Ok(ScheduledTaskSpec {
            id: id.to_string(),
            cluster: cluster.to_string(),
            schedule,
            container,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(expr: &str) -> ConfigResult<ScheduleExpression> {
        ScheduleExpression::parse(expr)
    }

    #[test]
    fn five_minute_cron_accepted() {
        let schedule = parse("cron(0/5 * * * ? *)").unwrap();
        assert_eq!(schedule.as_str(), "cron(0/5 * * * ? *)");
    }

    #[test]
    fn names_ranges_and_lists_accepted() {
        assert!(parse("cron(0 12 ? JAN-MAR MON-FRI 2026)").is_ok());
        assert!(parse("cron(0,30 8,20 1,15 * ? *)").is_ok());
        assert!(parse("cron(15 10 ? * 6L 2026)").is_err()); // L not supported
    }

    #[test]
    fn wrong_field_count_rejected() {
        let err = parse("cron(0 12 * * ?)").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSchedule { .. }));
    }

    #[test]
    fn out_of_range_values_rejected() {
        assert!(parse("cron(60 * * * ? *)").is_err());
        assert!(parse("cron(0 24 * * ? *)").is_err());
        assert!(parse("cron(0 0 32 * ? *)").is_err());
        assert!(parse("cron(0 0 ? 13 * *)").is_err());
    }

    #[test]
    fn day_fields_require_exactly_one_question_mark() {
        assert!(parse("cron(0 12 * * * *)").is_err());
        assert!(parse("cron(0 12 ? * ? *)").is_err());
        assert!(parse("cron(0 12 ? * MON *)").is_ok());
    }

    #[test]
    fn question_mark_outside_day_fields_rejected() {
        assert!(parse("cron(? 12 * * ? *)").is_err());
    }

    #[test]
    fn descending_range_rejected() {
        assert!(parse("cron(30-10 * * * ? *)").is_err());
    }

    #[test]
    fn zero_step_rejected() {
        assert!(parse("cron(0/0 * * * ? *)").is_err());
    }

    #[test]
    fn rate_expressions() {
        assert!(parse("rate(5 minutes)").is_ok());
        assert!(parse("rate(1 hour)").is_ok());
        assert!(parse("rate(1 hours)").is_err());
        assert!(parse("rate(5 minute)").is_err());
        assert!(parse("rate(0 minutes)").is_err());
        assert!(parse("rate(5 fortnights)").is_err());
    }

    #[test]
    fn garbage_rejected() {
        assert!(parse("every day at noon").is_err());
        assert!(parse("cron()").is_err());
    }

    #[test]
    fn scheduled_task_rejects_bad_schedule() {
        let container = ContainerSpec::new("job", "amazonlinux:2", 512);
        let err = ScheduledTaskSpec::declare("demo/job", "demo/cluster", "cron(bad)", container)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSchedule { .. }));
    }
}
