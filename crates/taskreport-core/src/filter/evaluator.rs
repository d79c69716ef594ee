//! Filter evaluation against task records.
//!
//! Evaluation is pure and never fails: an attribute the task does not carry
//! (and that has no default) simply does not match a comparison.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use taskreport_core::filter::{FilterEvaluator, FilterParser};
//! use taskreport_core::{AttributeSchema, Task, Value};
//!
//! let schema = AttributeSchema::builtin();
//! let filter = FilterParser::parse("status:pending or status:waiting", &schema).unwrap();
//!
//! let mut task = Task::new();
//! task.set(&schema, "status", Value::from("waiting")).unwrap();
//!
//! let evaluator = FilterEvaluator::new(&filter, Utc::now());
//! assert!(evaluator.matches(&task));
//! ```

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::schema::AttributeType;
use crate::task::Task;
use crate::value::Value;

use super::ast::{Condition, Filter, Operand, Predicate};

/// Evaluates a filter against one task at a fixed evaluation time.
pub fn evaluate(filter: &Filter, task: &Task, now: DateTime<Utc>) -> bool {
    match filter {
        Filter::All => true,

        // Tag filters
        Filter::HasTag(tag) => task.has_tag(tag),
        Filter::LacksTag(tag) => !task.has_tag(tag),

        Filter::Attribute(predicate) => evaluate_predicate(predicate, task, now),

        // Boolean operators (short-circuit)
        Filter::And(left, right) => evaluate(left, task, now) && evaluate(right, task, now),
        Filter::Or(left, right) => evaluate(left, task, now) || evaluate(right, task, now),
        Filter::Not(inner) => !evaluate(inner, task, now),
    }
}

/// Evaluates a parsed filter against tasks.
///
/// The evaluation time is fixed when the evaluator is created, so every task in
/// a pass sees the same value for relative dates such as `now-1wk`.
#[derive(Debug)]
pub struct FilterEvaluator<'a> {
    filter: &'a Filter,
    now: DateTime<Utc>,
}

impl<'a> FilterEvaluator<'a> {
    /// Binds `filter` to the evaluation time `now`, which anchors relative
    /// dates such as `today` or `eow`.
    pub fn new(filter: &'a Filter, now: DateTime<Utc>) -> Self {
        Self { filter, now }
    }

    /// Returns the evaluation time.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Returns true if the task matches the filter.
    pub fn matches(&self, task: &Task) -> bool {
        evaluate(self.filter, task, self.now)
    }

    /// Filters a slice of tasks, returning only those that match, in input order.
    pub fn filter_tasks<'b>(&self, tasks: &'b [Task]) -> Vec<&'b Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

/// Evaluates one attribute comparison.
fn evaluate_predicate(predicate: &Predicate, task: &Task, now: DateTime<Utc>) -> bool {
    let value = task.get_or(&predicate.attribute, predicate.default.as_ref());

    match (&predicate.condition, value) {
        (Condition::Unset, value) => is_unset(value),

        // Every other condition needs a value
        (_, None) => false,

        (Condition::Equals(operand), Some(value)) => equals(predicate, value, operand, now),
        (Condition::Before(operand), Some(value)) => {
            compare(predicate, value, operand, now) == Some(Ordering::Less)
        }
        (Condition::After(operand), Some(value)) => {
            compare(predicate, value, operand, now) == Some(Ordering::Greater)
        }
        (Condition::Contains(pattern), Some(value)) => match value {
            Value::Tags(tags) => tags.iter().any(|t| t == pattern),
            Value::Text(text) => text.contains(pattern.as_str()),
            _ => false,
        },
        (Condition::StartsWith(pattern), Some(value)) => value
            .as_text()
            .is_some_and(|text| text.starts_with(pattern.as_str())),
        (Condition::EndsWith(pattern), Some(value)) => value
            .as_text()
            .is_some_and(|text| text.ends_with(pattern.as_str())),
    }
}

/// An empty tag list counts as unset.
fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None => true,
        Some(Value::Tags(tags)) => tags.is_empty(),
        Some(_) => false,
    }
}

fn equals(predicate: &Predicate, value: &Value, operand: &Operand, now: DateTime<Utc>) -> bool {
    match (value, operand) {
        // Dates match on the calendar day
        (Value::Date(actual), Operand::Date(expr)) => {
            actual.date_naive() == expr.resolve(now).date_naive()
        }
        (Value::Tags(tags), Operand::Literal(Value::Tags(wanted))) => {
            wanted.iter().all(|w| tags.contains(w))
        }
        (Value::Text(actual), Operand::Literal(Value::Text(wanted))) if predicate.hierarchical => {
            actual == wanted
                || actual
                    .strip_prefix(wanted.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        }
        (Value::Number(a), Operand::Literal(Value::Number(b))) => a == b,
        (actual, Operand::Literal(wanted)) => actual == wanted,
        _ => false,
    }
}

fn compare(
    predicate: &Predicate,
    value: &Value,
    operand: &Operand,
    now: DateTime<Utc>,
) -> Option<Ordering> {
    match (value, operand) {
        (Value::Date(actual), Operand::Date(expr)) => Some(actual.cmp(&expr.resolve(now))),
        (Value::Text(actual), Operand::Literal(Value::Text(wanted)))
            if predicate.kind == AttributeType::Enumerated =>
        {
            let rank = |v: &str| predicate.ranks.iter().rev().position(|r| r == v);
            Some(rank(actual)?.cmp(&rank(wanted)?))
        }
        (actual, Operand::Literal(wanted)) => Some(actual.natural_cmp(wanted)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterParser;
    use crate::schema::{AttributeSchema, UdaDeclaration};
    use chrono::TimeZone;

    // --- helpers ---

    fn schema() -> AttributeSchema {
        let udas = [
            (
                "ppri".to_string(),
                UdaDeclaration {
                    kind: Some("numeric".to_string()),
                    ..Default::default()
                },
            ),
            (
                "etag".to_string(),
                UdaDeclaration {
                    kind: Some("string".to_string()),
                    default: Some("EVNT".to_string()),
                    ..Default::default()
                },
            ),
        ];
        AttributeSchema::with_udas(udas.iter().map(|(k, v)| (k, v))).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn make_task(fields: &[(&str, &str)]) -> Task {
        let schema = schema();
        let mut task = Task::new();
        for (name, value) in fields {
            task.set(&schema, name, Value::from(*value)).unwrap();
        }
        task
    }

    fn matches(filter: &str, task: &Task) -> bool {
        let filter = FilterParser::parse(filter, &schema()).unwrap();
        evaluate(&filter, task, now())
    }

    // --- basic ---

    #[test]
    fn test_all_matches_everything() {
        assert!(evaluate(&Filter::All, &Task::new(), now()));
    }

    #[test]
    fn test_status_or() {
        let filter = "status:pending or status:waiting";
        assert!(matches(filter, &make_task(&[("status", "pending")])));
        assert!(matches(filter, &make_task(&[("status", "waiting")])));
        assert!(!matches(filter, &make_task(&[("status", "completed")])));
    }

    #[test]
    fn test_default_applies_to_missing_attribute() {
        // status defaults to pending
        assert!(matches("status:pending", &Task::new()));
        assert!(matches("etag:EVNT", &Task::new()));
        assert!(!matches("etag:", &Task::new()));
    }

    #[test]
    fn test_missing_attribute_never_matches_comparison() {
        let task = Task::new();
        assert!(!matches("ppri:1", &task));
        assert!(!matches("ppri.after:0", &task));
        assert!(!matches("due.before:now", &task));
        // ...but negated comparisons do
        assert!(matches("ppri.not:1", &task));
    }

    #[test]
    fn test_presence() {
        let started = make_task(&[("start", "2024-03-01")]);
        assert!(matches("start.not:", &started));
        assert!(!matches("start:", &started));
        assert!(matches("start:", &Task::new()));
        assert!(matches("start.any:", &started));
    }

    // --- tag ---

    #[test]
    fn test_tags() {
        let task = make_task(&[("tags", "inv,home")]);
        assert!(matches("+inv", &task));
        assert!(!matches("-inv", &task));
        assert!(matches("-ar", &task));
        assert!(matches("(-inv and -ar)", &Task::new()));
        assert!(matches("tags:home", &task));
        assert!(matches("tags.hasnt:work", &task));
        assert!(matches("tags:", &Task::new()));
    }

    // --- date ---

    #[test]
    fn test_relative_date_after() {
        let recent = make_task(&[("end", "2024-03-12")]);
        let old = make_task(&[("end", "2024-02-01")]);
        assert!(matches("end.after:now-1wk", &recent));
        assert!(!matches("end.after:now-1wk", &old));
        assert!(matches("end.after:now-3mo", &old));
    }

    #[test]
    fn test_date_equality_is_same_day() {
        let task = make_task(&[("due", "2024-03-15T18:45:00")]);
        assert!(matches("due:today", &task));
        assert!(matches("due:2024-03-15", &task));
        assert!(!matches("due:tomorrow", &task));
    }

    #[test]
    fn test_relative_dates_use_evaluator_now() {
        let filter = FilterParser::parse("due.before:now", &schema()).unwrap();
        let task = make_task(&[("due", "2024-03-20")]);
        assert!(!FilterEvaluator::new(&filter, now()).matches(&task));
        let later = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        assert!(FilterEvaluator::new(&filter, later).matches(&task));
    }

    // --- text ---

    #[test]
    fn test_project_hierarchy() {
        let task = make_task(&[("project", "Home.Garden")]);
        assert!(matches("project:Home", &task));
        assert!(matches("project:Home.Garden", &task));
        assert!(!matches("project:Hom", &task));
        assert!(!matches("project:Home.Garden.Shed", &task));
    }

    #[test]
    fn test_text_patterns() {
        let task = make_task(&[("description", "water the plants")]);
        assert!(matches("description.has:the", &task));
        assert!(matches("description.startswith:water", &task));
        assert!(matches("description.endswith:plants", &task));
        assert!(!matches("description.hasnt:plants", &task));
    }

    // --- ordering ---

    #[test]
    fn test_numeric_ordering() {
        let task = make_task(&[("ppri", "5")]);
        assert!(matches("ppri.above:2", &task));
        assert!(matches("ppri.below:10", &task));
        assert!(matches("ppri:5.0", &task));
    }

    #[test]
    fn test_enumerated_ordering_uses_rank() {
        let high = make_task(&[("priority", "H")]);
        let low = make_task(&[("priority", "L")]);
        assert!(matches("priority.above:M", &high));
        assert!(!matches("priority.above:M", &low));
        assert!(matches("priority.below:M", &low));
    }

    // --- boolean ---

    #[test]
    fn test_and_is_commutative() {
        let tasks = [
            make_task(&[("tags", "obj")]),
            make_task(&[("status", "waiting")]),
            make_task(&[("status", "completed"), ("start", "2024-03-01")]),
        ];
        for task in &tasks {
            assert_eq!(
                matches("-obj and status:waiting", task),
                matches("status:waiting and -obj", task)
            );
        }
    }

    #[test]
    fn test_filter_tasks_preserves_order() {
        let tasks = vec![
            make_task(&[("uuid", "a"), ("status", "pending")]),
            make_task(&[("uuid", "b"), ("status", "deleted")]),
            make_task(&[("uuid", "c"), ("status", "waiting")]),
        ];
        let filter =
            FilterParser::parse("status:pending or status:waiting", &schema()).unwrap();
        let evaluator = FilterEvaluator::new(&filter, now());
        let uuids: Vec<_> = evaluator
            .filter_tasks(&tasks)
            .iter()
            .filter_map(|t| t.uuid())
            .collect();
        assert_eq!(uuids, vec!["a", "c"]);
    }
}
