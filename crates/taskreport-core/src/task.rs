//! Task records.
//!
//! Tasks are imported from taskwarrior's `export` JSON. Every attribute is
//! coerced through the [`AttributeSchema`] on import, so a stored value always
//! has its attribute's declared type.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::schema::{AttributeSchema, AttributeType};
use crate::value::{parse_date, Value};

/// A note attached to a task.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// When the annotation was added.
    pub entry: Option<DateTime<Utc>>,
    /// The annotation text.
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct RawAnnotation {
    #[serde(default)]
    entry: Option<String>,
    #[serde(default)]
    description: String,
}

/// A task record: typed attributes plus annotations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Task {
    attributes: BTreeMap<String, Value>,
    annotations: Vec<Annotation>,
}

impl Task {
    /// Creates an empty task.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value of an attribute, ignoring defaults.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns the stored value, falling back to the given default.
    pub fn get_or<'a>(&'a self, name: &str, default: Option<&'a Value>) -> Option<&'a Value> {
        self.attributes.get(name).or(default)
    }

    /// Sets an attribute, coercing the value through the schema.
    ///
    /// Empty text unsets the attribute.
    ///
    /// # Errors
    ///
    /// Returns the schema's resolution or coercion error.
    pub fn set(&mut self, schema: &AttributeSchema, name: &str, value: Value) -> Result<()> {
        let def = schema.resolve(name)?;
        let canonical = def.name.clone();
        if matches!(&value, Value::Text(s) if s.is_empty()) {
            self.attributes.remove(&canonical);
            return Ok(());
        }
        let typed = schema.coerce(&canonical, value)?;
        self.attributes.insert(canonical, typed);
        Ok(())
    }

    /// Appends an annotation.
    pub fn annotate(&mut self, entry: Option<DateTime<Utc>>, description: impl Into<String>) {
        self.annotations.push(Annotation {
            entry,
            description: description.into(),
        });
    }

    /// Returns the task's annotations in insertion order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Returns the task's tags (empty when none are set).
    pub fn tags(&self) -> &[String] {
        self.attributes
            .get("tags")
            .and_then(Value::as_tags)
            .unwrap_or(&[])
    }

    /// Returns true if the task carries the tag (exact, case-sensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }

    /// Returns the task uuid, if set.
    pub fn uuid(&self) -> Option<&str> {
        self.attributes.get("uuid").and_then(Value::as_text)
    }

    /// Converts one exported JSON object into a task.
    ///
    /// Keys that are not declared in the schema (such as `urgency` or orphaned
    /// UDAs) are skipped.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch`/`InvalidEnumValue` for values that do not fit
    /// their declared type, or `Config` when the record is not an object.
    pub fn from_json(schema: &AttributeSchema, record: &JsonValue) -> Result<Self> {
        let object = record
            .as_object()
            .ok_or_else(|| Error::config(0, "task record is not a JSON object"))?;

        let mut task = Task::new();
        for (key, raw) in object {
            if key == "annotations" {
                let notes: Vec<RawAnnotation> = serde_json::from_value(raw.clone())?;
                for note in notes {
                    let entry = note.entry.as_deref().and_then(parse_date);
                    task.annotate(entry, note.description);
                }
                continue;
            }

            // Only exact names: abbreviations are a filter convenience.
            if !schema.contains(key) {
                tracing::debug!(attribute = %key, "skipping attribute not in schema");
                continue;
            }

            let value = match raw {
                JsonValue::Null => continue,
                JsonValue::String(s) => Value::Text(s.clone()),
                JsonValue::Number(n) => match n.as_f64() {
                    Some(f) => Value::Number(f),
                    None => continue,
                },
                JsonValue::Bool(b) => Value::Text(b.to_string()),
                JsonValue::Array(items) => Value::Tags(
                    items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect(),
                ),
                JsonValue::Object(_) => {
                    return Err(Error::type_mismatch(
                        key.as_str(),
                        schema.attribute_type(key)?,
                        raw.to_string(),
                    ))
                }
            };

            // Arrays only make sense for tag lists; other attributes take the joined text.
            let value = match (value, schema.attribute_type(key)?) {
                (Value::Tags(items), kind) if kind != AttributeType::Tags => {
                    Value::Text(items.join(","))
                }
                (v, _) => v,
            };

            task.set(schema, key, value)?;
        }
        Ok(task)
    }
}

/// Loads tasks from a taskwarrior export (a JSON array of objects).
///
/// # Errors
///
/// Returns `Json` for malformed input and `InvalidTask` (naming the task's uuid
/// or index) when a record does not fit the schema.
pub fn load_tasks(schema: &AttributeSchema, json: &str) -> Result<Vec<Task>> {
    let records: Vec<JsonValue> = serde_json::from_str(json)?;
    let tasks = records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            Task::from_json(schema, record).map_err(|e| {
                let task = record
                    .get("uuid")
                    .and_then(JsonValue::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", idx + 1));
                Error::InvalidTask {
                    task,
                    source: Box::new(e),
                }
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(count = tasks.len(), "parsed task export");
    Ok(tasks)
}
