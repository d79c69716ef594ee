//! Projection of sorted tasks into report rows.

use serde::Serialize;

use crate::format::{Column, FormatOptions};
use crate::sort::SortSpec;
use crate::task::Task;

/// One rendered row: a cell per column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub cells: Vec<String>,
}

/// A line of report output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReportLine {
    /// A task row.
    Row(Row),
    /// Separator between groups whose break keys differ.
    Break,
}

impl ReportLine {
    /// Returns the row, if this line is one.
    pub fn as_row(&self) -> Option<&Row> {
        match self {
            ReportLine::Row(row) => Some(row),
            ReportLine::Break => None,
        }
    }
}

/// Renders tasks through a report's columns.
///
/// Tasks must already be sorted by the same [`SortSpec`] the projector is
/// given; it is only used to detect group boundaries.
pub struct Projector<'a> {
    columns: &'a [Column],
    sort: &'a SortSpec,
    options: &'a FormatOptions,
}

impl<'a> Projector<'a> {
    pub fn new(columns: &'a [Column], sort: &'a SortSpec, options: &'a FormatOptions) -> Self {
        Self {
            columns,
            sort,
            options,
        }
    }

    /// Renders one task.
    pub fn row(&self, task: &Task) -> Row {
        Row {
            cells: self
                .columns
                .iter()
                .map(|column| column.render(task, self.options))
                .collect(),
        }
    }

    /// Renders all tasks, inserting a break wherever a break key changes.
    pub fn project(&self, tasks: &[&Task]) -> Vec<ReportLine> {
        let mut lines = Vec::with_capacity(tasks.len());
        let mut previous: Option<&Task> = None;

        for &task in tasks {
            if let Some(prev) = previous {
                if !self.sort.same_group(prev, task) {
                    lines.push(ReportLine::Break);
                }
            }
            lines.push(ReportLine::Row(self.row(task)));
            previous = Some(task);
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttributeSchema;
    use crate::value::Value;
    use chrono::{TimeZone, Utc};

    fn make_task(fields: &[(&str, &str)]) -> Task {
        let schema = AttributeSchema::builtin();
        let mut task = Task::new();
        for (name, value) in fields {
            task.set(&schema, name, Value::from(*value)).unwrap();
        }
        task
    }

    fn columns(specs: &[&str]) -> Vec<Column> {
        let schema = AttributeSchema::builtin();
        specs
            .iter()
            .map(|s| Column::parse(s, &schema).unwrap())
            .collect()
    }

    fn options() -> FormatOptions {
        FormatOptions::new(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_project_rows() {
        let tasks = [
            make_task(&[("description", "one"), ("project", "Home")]),
            make_task(&[("description", "two")]),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let columns = columns(&["project", "description"]);
        let sort = SortSpec::default();
        let options = options();

        let lines = Projector::new(&columns, &sort, &options).project(&refs);
        let cells: Vec<Vec<String>> = lines
            .iter()
            .filter_map(ReportLine::as_row)
            .map(|r| r.cells.clone())
            .collect();
        assert_eq!(
            cells,
            vec![
                vec!["Home".to_string(), "one".to_string()],
                vec![String::new(), "two".to_string()],
            ]
        );
    }

    #[test]
    fn test_breaks_between_groups() {
        let schema = AttributeSchema::builtin();
        let tasks = [
            make_task(&[("description", "a"), ("project", "Home")]),
            make_task(&[("description", "b"), ("project", "Home")]),
            make_task(&[("description", "c"), ("project", "Work")]),
            make_task(&[("description", "d")]),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let sort = SortSpec::parse("project+/,description+", &schema).unwrap();
        let columns = columns(&["description"]);
        let options = options();

        let lines = Projector::new(&columns, &sort, &options).project(&refs);
        let shape: Vec<&str> = lines
            .iter()
            .map(|line| match line {
                ReportLine::Row(row) => row.cells[0].as_str(),
                ReportLine::Break => "|",
            })
            .collect();
        assert_eq!(shape, vec!["a", "b", "|", "c", "|", "d"]);
    }

    #[test]
    fn test_no_breaks_without_break_keys() {
        let schema = AttributeSchema::builtin();
        let tasks = [
            make_task(&[("project", "Home")]),
            make_task(&[("project", "Work")]),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let sort = SortSpec::parse("project+", &schema).unwrap();
        let columns = columns(&["project"]);
        let options = options();

        let lines = Projector::new(&columns, &sort, &options).project(&refs);
        assert!(lines.iter().all(|l| matches!(l, ReportLine::Row(_))));
    }

    #[test]
    fn test_empty_input() {
        let sort = SortSpec::default();
        let options = options();
        let lines = Projector::new(&[], &sort, &options).project(&[]);
        assert!(lines.is_empty());
    }
}
