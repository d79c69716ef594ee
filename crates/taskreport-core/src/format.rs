//! Report columns and cell formatting.
//!
//! A column is written `attribute[.format]`, e.g. `uuid.short`, `start.age`,
//! `description.count`. The formats available depend on the attribute:
//!
//! | column        | formats |
//! |---------------|---------|
//! | `uuid`        | `long` (default), `short` |
//! | dates         | `formatted` (default), `iso`, `epoch`, `age`, `relative`, `remaining` |
//! | `description` | `combined` (default), `desc`, `oneline`, `truncated`, `count`, `truncated_count` |
//! | tags          | `list` (default), `indicator`, `count` |
//! | `project`     | `full` (default), `parent`, `indented` |
//! | others        | `default`, `indicator` |
//!
//! Every column also accepts `default`, meaning its first listed format.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::schema::{AttributeSchema, AttributeType};
use crate::task::{Annotation, Task};
use crate::value::Value;

/// Date format used when neither the report nor the configuration sets one.
pub const DEFAULT_DATE_FORMAT: &str = "Y-M-D";

/// How a column renders its attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    /// Plain value.
    Default,
    /// Shows the indicator when the attribute is set.
    Indicator,

    // ==================== UUID ====================
    Long,
    Short,

    // ==================== Dates ====================
    Formatted,
    Iso,
    Epoch,
    Age,
    Relative,
    Remaining,

    // ==================== Description ====================
    Combined,
    Desc,
    Oneline,
    Truncated,
    /// Description with an annotation count, or a tag count.
    Count,
    TruncatedCount,

    // ==================== Tags ====================
    List,

    // ==================== Project ====================
    Full,
    Parent,
    Indented,
}

impl ColumnFormat {
    /// Returns the format name as written in a column specification.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnFormat::Default => "default",
            ColumnFormat::Indicator => "indicator",
            ColumnFormat::Long => "long",
            ColumnFormat::Short => "short",
            ColumnFormat::Formatted => "formatted",
            ColumnFormat::Iso => "iso",
            ColumnFormat::Epoch => "epoch",
            ColumnFormat::Age => "age",
            ColumnFormat::Relative => "relative",
            ColumnFormat::Remaining => "remaining",
            ColumnFormat::Combined => "combined",
            ColumnFormat::Desc => "desc",
            ColumnFormat::Oneline => "oneline",
            ColumnFormat::Truncated => "truncated",
            ColumnFormat::Count => "count",
            ColumnFormat::TruncatedCount => "truncated_count",
            ColumnFormat::List => "list",
            ColumnFormat::Full => "full",
            ColumnFormat::Parent => "parent",
            ColumnFormat::Indented => "indented",
        }
    }
}

/// The family of formats a column supports, first entry is the default.
fn supported_formats(attribute: &str, kind: AttributeType) -> &'static [ColumnFormat] {
    use ColumnFormat::*;

    match (attribute, kind) {
        ("uuid", _) => &[Long, Short],
        ("description", _) => &[Combined, Desc, Oneline, Truncated, Count, TruncatedCount],
        ("project", _) => &[Full, Parent, Indented],
        (_, AttributeType::Date) => &[Formatted, Iso, Epoch, Age, Relative, Remaining],
        (_, AttributeType::Tags) => &[List, Indicator, Count],
        _ => &[Default, Indicator],
    }
}

/// Settings that affect how cells are rendered.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Reference time for `age`, `relative` and `remaining`.
    pub now: DateTime<Utc>,
    /// Taskwarrior date format for `formatted` dates.
    pub date_format: String,
    /// Maximum width of `truncated` descriptions.
    pub truncate_width: usize,
    /// Text shown by `indicator` columns.
    pub indicator: String,
}

impl FormatOptions {
    /// Creates options with the default date format, width and indicator.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            truncate_width: 40,
            indicator: "+".to_string(),
        }
    }
}

/// A parsed report column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Canonical attribute name.
    pub attribute: String,
    /// Declared type of the attribute.
    pub kind: AttributeType,
    /// Resolved format.
    pub format: ColumnFormat,
    /// The schema label, used when a report declares no labels.
    pub label: String,
    default: Option<Value>,
}

impl Column {
    /// Parses `attribute[.format]` against the schema.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAttribute`/`AmbiguousAttribute` for unresolvable names
    /// and `UnsupportedFormat` when the format does not apply to the attribute.
    pub fn parse(spec: &str, schema: &AttributeSchema) -> Result<Self> {
        let spec = spec.trim();
        let (name, format) = match spec.split_once('.') {
            Some((name, format)) => (name, Some(format)),
            None => (spec, None),
        };

        let def = schema.resolve(name)?;
        let family = supported_formats(&def.name, def.kind);
        let format = match format {
            None | Some("default") => family[0],
            Some(f) => family
                .iter()
                .copied()
                .find(|candidate| candidate.name() == f)
                .ok_or_else(|| Error::UnsupportedFormat {
                    attribute: def.name.clone(),
                    format: f.to_string(),
                })?,
        };

        Ok(Self {
            attribute: def.name.clone(),
            kind: def.kind,
            format,
            label: def.label.clone(),
            default: def.default.clone(),
        })
    }

    /// Renders the column for a task. Unset attributes render as empty text.
    pub fn render(&self, task: &Task, options: &FormatOptions) -> String {
        // Annotations are part of the description even when it is unset
        if self.attribute == "description" {
            let text = task
                .get("description")
                .map(Value::to_string)
                .unwrap_or_default();
            return render_description(&text, task, self.format, options);
        }

        let Some(value) = task.get_or(&self.attribute, self.default.as_ref()) else {
            return String::new();
        };

        match (self.format, value) {
            (ColumnFormat::Short, Value::Text(uuid)) => uuid.chars().take(8).collect(),

            (ColumnFormat::Formatted, Value::Date(d)) => format_date(*d, &options.date_format),
            (ColumnFormat::Iso, Value::Date(d)) => d.format("%Y%m%dT%H%M%SZ").to_string(),
            (ColumnFormat::Epoch, Value::Date(d)) => d.timestamp().to_string(),
            (ColumnFormat::Age, Value::Date(d)) => {
                format_duration((options.now - *d).num_seconds())
            }
            (ColumnFormat::Relative, Value::Date(d)) => {
                format_duration((*d - options.now).num_seconds())
            }
            (ColumnFormat::Remaining, Value::Date(d)) => {
                let seconds = (*d - options.now).num_seconds();
                if seconds > 0 {
                    format_duration(seconds)
                } else {
                    String::new()
                }
            }

            (ColumnFormat::List, Value::Tags(tags)) => tags.join(" "),
            (ColumnFormat::Count, Value::Tags(tags)) if !tags.is_empty() => {
                format!("[{}]", tags.len())
            }
            (ColumnFormat::Indicator, Value::Tags(tags)) if !tags.is_empty() => {
                options.indicator.clone()
            }
            (_, Value::Tags(_)) => String::new(),
            (ColumnFormat::Indicator, _) => options.indicator.clone(),

            (ColumnFormat::Parent, Value::Text(project)) => project
                .split_once('.')
                .map_or(project.as_str(), |(parent, _)| parent)
                .to_string(),
            (ColumnFormat::Indented, Value::Text(project)) => {
                let depth = project.matches('.').count();
                let leaf = project.rsplit('.').next().unwrap_or(project);
                format!("{}{}", "  ".repeat(depth), leaf)
            }

            (_, other) => other.to_string(),
        }
    }

    /// Returns the column specification, e.g. `start.age`.
    pub fn spec(&self) -> String {
        let family = supported_formats(&self.attribute, self.kind);
        if family.first() == Some(&self.format) {
            self.attribute.clone()
        } else {
            format!("{}.{}", self.attribute, self.format.name())
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec())
    }
}

fn render_description(
    text: &str,
    task: &Task,
    format: ColumnFormat,
    options: &FormatOptions,
) -> String {
    let annotations = task.annotations();
    let count_suffix = |s: String| {
        if annotations.is_empty() {
            s
        } else {
            format!("{s} [{}]", annotations.len())
        }
    };
    let note = |a: &Annotation| match a.entry {
        Some(entry) => format!("{} {}", format_date(entry, &options.date_format), a.description),
        None => a.description.clone(),
    };

    match format {
        ColumnFormat::Combined => {
            let mut out = text.to_string();
            for annotation in annotations {
                out.push_str("\n  ");
                out.push_str(&note(annotation));
            }
            out
        }
        ColumnFormat::Oneline => std::iter::once(text.to_string())
            .chain(annotations.iter().map(note))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        ColumnFormat::Truncated => truncate_str(text, options.truncate_width),
        ColumnFormat::Count => count_suffix(text.to_string()),
        ColumnFormat::TruncatedCount => {
            count_suffix(truncate_str(text, options.truncate_width))
        }
        _ => text.to_string(),
    }
}

/// Truncates a string to a maximum number of characters, ending with `...`.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Formats a signed number of seconds as a vague duration (`3d`, `-2wk`, `1.5y`).
pub fn format_duration(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let secs = seconds.unsigned_abs();
    let days = secs / 86_400;

    let body = if days >= 365 {
        format!("{:.1}y", days as f64 / 365.0)
    } else if days > 84 {
        format!("{}mo", days / 30)
    } else if days > 13 {
        format!("{}wk", days / 7)
    } else if days >= 1 {
        format!("{days}d")
    } else if secs >= 3_600 {
        format!("{}h", secs / 3_600)
    } else if secs >= 60 {
        format!("{}min", secs / 60)
    } else {
        format!("{secs}s")
    };
    format!("{sign}{body}")
}

/// Formats a date with a taskwarrior date format (`Y-M-D`, `yMD-WVa`, ...).
pub fn format_date(date: DateTime<Utc>, date_format: &str) -> String {
    date.format(&to_strftime(date_format)).to_string()
}

/// Translates taskwarrior date format letters to a chrono format string.
///
/// Unrecognized characters are copied literally.
pub fn to_strftime(date_format: &str) -> String {
    let mut out = String::with_capacity(date_format.len() * 2);
    for c in date_format.chars() {
        let spec = match c {
            'Y' => "%Y",
            'y' => "%y",
            'M' => "%m",
            'm' => "%-m",
            'D' => "%d",
            'd' => "%-d",
            'a' => "%a",
            'A' => "%A",
            'b' => "%b",
            'B' => "%B",
            'V' => "%V",
            'v' => "%-V",
            'H' => "%H",
            'h' => "%-H",
            'N' => "%M",
            'n' => "%-M",
            'S' => "%S",
            's' => "%-S",
            'j' => "%j",
            'J' => "%-j",
            '%' => "%%",
            other => {
                out.push(other);
                continue;
            }
        };
        out.push_str(spec);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn schema() -> AttributeSchema {
        AttributeSchema::builtin()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn options() -> FormatOptions {
        FormatOptions::new(now())
    }

    fn render(spec: &str, task: &Task) -> String {
        Column::parse(spec, &schema()).unwrap().render(task, &options())
    }

    fn make_task(fields: &[(&str, &str)]) -> Task {
        let mut task = Task::new();
        for (name, value) in fields {
            task.set(&schema(), name, Value::from(*value)).unwrap();
        }
        task
    }

    // ==================== Parsing ====================

    #[test]
    fn test_parse_default_formats() {
        assert_eq!(
            Column::parse("uuid", &schema()).unwrap().format,
            ColumnFormat::Long
        );
        assert_eq!(
            Column::parse("due", &schema()).unwrap().format,
            ColumnFormat::Formatted
        );
        assert_eq!(
            Column::parse("tags.default", &schema()).unwrap().format,
            ColumnFormat::List
        );
        assert_eq!(
            Column::parse("priority", &schema()).unwrap().format,
            ColumnFormat::Default
        );
    }

    #[test]
    fn test_parse_label_from_schema() {
        assert_eq!(Column::parse("end", &schema()).unwrap().label, "Completed");
    }

    #[test]
    fn test_unsupported_format() {
        let err = Column::parse("priority.age", &schema()).unwrap_err();
        match err {
            Error::UnsupportedFormat { attribute, format } => {
                assert_eq!(attribute, "priority");
                assert_eq!(format, "age");
            }
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
        assert!(Column::parse("uuid.count", &schema()).is_err());
    }

    #[test]
    fn test_spec_text() {
        let column = Column::parse("start.age", &schema()).unwrap();
        assert_eq!(column.to_string(), "start.age");
        let column = Column::parse("project.full", &schema()).unwrap();
        assert_eq!(column.to_string(), "project");
    }

    // ==================== Rendering ====================

    #[test]
    fn test_uuid_short() {
        let task = make_task(&[("uuid", "8f1b6c2e-5a0d-4c9b-9e3f-0123456789ab")]);
        assert_eq!(render("uuid.short", &task), "8f1b6c2e");
    }

    #[test]
    fn test_unset_renders_empty() {
        assert_eq!(render("due", &Task::new()), "");
        assert_eq!(render("tags.count", &Task::new()), "");
    }

    #[test]
    fn test_default_value_is_rendered() {
        assert_eq!(render("status", &Task::new()), "pending");
    }

    #[test]
    fn test_dates() {
        let task = make_task(&[("start", "2024-03-12T12:00:00"), ("due", "2024-03-29")]);
        assert_eq!(render("start", &task), "2024-03-12");
        assert_eq!(render("start.iso", &task), "20240312T120000Z");
        assert_eq!(render("start.age", &task), "3d");
        assert_eq!(render("start.relative", &task), "-3d");
        assert_eq!(render("start.remaining", &task), "");
        assert_eq!(render("due.remaining", &task), "13d");
        assert_eq!(render("start.epoch", &task), "1710244800");
    }

    #[test]
    fn test_description_formats() {
        let mut task = make_task(&[("description", "water the plants")]);
        let day = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        task.annotate(Some(day), "used the can");

        assert_eq!(
            render("description", &task),
            "water the plants\n  2024-03-01 used the can"
        );
        assert_eq!(render("description.desc", &task), "water the plants");
        assert_eq!(
            render("description.oneline", &task),
            "water the plants 2024-03-01 used the can"
        );
        assert_eq!(render("description.count", &task), "water the plants [1]");
        assert_eq!(
            render("description.count", &make_task(&[("description", "plain")])),
            "plain"
        );
    }

    #[test]
    fn test_description_truncated() {
        let long = "a".repeat(50);
        let task = make_task(&[("description", long.as_str())]);
        let rendered = render("description.truncated", &task);
        assert_eq!(rendered.chars().count(), 40);
        assert!(rendered.ends_with("..."));
    }

    #[test]
    fn test_tags_formats() {
        let task = make_task(&[("tags", "inv home")]);
        assert_eq!(render("tags.list", &task), "inv home");
        assert_eq!(render("tags.count", &task), "[2]");
        assert_eq!(render("tags.indicator", &task), "+");
    }

    #[test]
    fn test_project_formats() {
        let task = make_task(&[("project", "Home.Garden.Shed")]);
        assert_eq!(render("project", &task), "Home.Garden.Shed");
        assert_eq!(render("project.parent", &task), "Home");
        assert_eq!(render("project.indented", &task), "    Shed");
    }

    #[test]
    fn test_numbers_render_without_fraction() {
        let mut task = Task::new();
        task.set(&schema(), "id", Value::Number(12.0)).unwrap();
        assert_eq!(render("id", &task), "12");
    }

    // ==================== Helpers ====================

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(120), "2min");
        assert_eq!(format_duration(7_200), "2h");
        assert_eq!(format_duration(-3 * 86_400), "-3d");
        assert_eq!(format_duration(20 * 86_400), "2wk");
        assert_eq!(format_duration(100 * 86_400), "3mo");
        assert_eq!(format_duration(547 * 86_400), "1.5y");
    }

    #[test]
    fn test_format_date_letters() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 9, 7, 3).unwrap();
        assert_eq!(format_date(date, "Y-M-D"), "2024-03-05");
        assert_eq!(format_date(date, "yMD-WVa"), "240305-W10Tue");
        assert_eq!(format_date(date, "m/d/Y H:N:S"), "3/5/2024 09:07:03");
        assert_eq!(format_date(date, "h:n:s j"), "9:7:3 065");
    }

    #[test]
    fn test_truncate_str_is_char_aware() {
        assert_eq!(truncate_str("héllo wörld", 8), "héllo...");
        assert_eq!(truncate_str("short", 8), "short");
    }
}
