//! Sort specifications.
//!
//! A sort specification is a comma separated list of keys, each an attribute
//! followed by an optional direction:
//!
//! ```text
//! priority-,due+,project+
//! end+/,start+/,description+
//! ```
//!
//! `+` is ascending (the default) and `-` descending. A `/` after a key marks
//! it as a break key: the projector separates groups of rows whenever a break
//! key changes between adjacent tasks. Empty tokens are ignored, so leading
//! and trailing commas are harmless.
//!
//! Unset values always sort after set values, whatever the direction.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};
use crate::schema::{AttributeSchema, AttributeType};
use crate::task::Task;
use crate::value::Value;

/// Sort direction of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// One compiled sort key.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    /// Canonical attribute name.
    pub attribute: String,
    /// Declared type of the attribute.
    pub kind: AttributeType,
    pub direction: Direction,
    /// Whether a change in this key starts a new group of rows.
    pub is_break: bool,
    /// Value used when a task omits the attribute.
    pub default: Option<Value>,
    /// Enumerated values in declared order; ascending follows this order.
    pub ranks: Vec<String>,
}

impl SortKey {
    /// Returns the value this key sorts a task by, or `None` when unset.
    pub fn value<'t>(&'t self, task: &'t Task) -> Option<&'t Value> {
        match task.get_or(&self.attribute, self.default.as_ref()) {
            Some(Value::Tags(tags)) if tags.is_empty() => None,
            other => other,
        }
    }

    /// Compares two tasks by this key alone.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match (self.value(a), self.value(b)) {
            (None, None) => Ordering::Equal,
            // Unset goes last in both directions
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ordering = self.compare_values(x, y);
                match self.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            }
        }
    }

    fn compare_values(&self, a: &Value, b: &Value) -> Ordering {
        match (self.kind, a, b) {
            (AttributeType::Enumerated, Value::Text(a), Value::Text(b)) => {
                self.rank(a).cmp(&self.rank(b))
            }
            _ => a.natural_cmp(b),
        }
    }

    /// Position of an enumerated value in declared order. Undeclared values
    /// sort after every declared one.
    fn rank(&self, value: &str) -> usize {
        self.ranks
            .iter()
            .position(|v| v == value)
            .unwrap_or(self.ranks.len())
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.direction {
            Direction::Ascending => '+',
            Direction::Descending => '-',
        };
        write!(f, "{}{}", self.attribute, sign)?;
        if self.is_break {
            f.write_str("/")?;
        }
        Ok(())
    }
}

/// A compiled multi-key comparator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

/// Compiles a sort specification against the schema.
///
/// Equivalent to [`SortSpec::parse`].
pub fn compile(spec: &str, schema: &AttributeSchema) -> Result<SortSpec> {
    SortSpec::parse(spec, schema)
}

impl SortSpec {
    /// Parses a sort specification.
    ///
    /// A blank specification yields an empty spec, which leaves tasks in
    /// input order.
    ///
    /// # Errors
    ///
    /// Returns `MalformedExpression` for a key without an attribute name and
    /// `UnknownAttribute`/`AmbiguousAttribute` for unresolvable names.
    pub fn parse(spec: &str, schema: &AttributeSchema) -> Result<Self> {
        let mut keys = Vec::new();
        let mut offset = 0;

        for token in spec.split(',') {
            let segments: Vec<&str> = token.split('/').collect();
            let mut segment_offset = offset;
            for (idx, segment) in segments.iter().enumerate() {
                let is_break = idx + 1 < segments.len();
                if let Some(key) = parse_key(segment, segment_offset, is_break, schema)? {
                    keys.push(key);
                }
                segment_offset += segment.len() + 1;
            }
            offset += token.len() + 1;
        }

        tracing::debug!(sort = spec, keys = keys.len(), "compiled sort");
        Ok(Self { keys })
    }

    /// Returns the keys in priority order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Returns true if there are no sort keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the break-flagged keys.
    pub fn break_keys(&self) -> impl Iterator<Item = &SortKey> {
        self.keys.iter().filter(|k| k.is_break)
    }

    /// Compares two tasks key by key; the first non-equal key decides.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        self.keys
            .iter()
            .map(|key| key.compare(a, b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Sorts tasks in place. Tasks that compare equal keep their input order.
    pub fn sort(&self, tasks: &mut [&Task]) {
        if self.keys.is_empty() {
            return;
        }
        tasks.sort_by(|a, b| self.compare(a, b));
    }

    /// Returns true if the two tasks belong to the same break group.
    pub fn same_group(&self, a: &Task, b: &Task) -> bool {
        self.break_keys()
            .all(|key| key.value(a) == key.value(b))
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, key) in self.keys.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

fn parse_key(
    segment: &str,
    offset: usize,
    is_break: bool,
    schema: &AttributeSchema,
) -> Result<Option<SortKey>> {
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let position = offset + (segment.len() - segment.trim_start().len());

    let (name, direction) = if let Some(name) = trimmed.strip_suffix('+') {
        (name, Direction::Ascending)
    } else if let Some(name) = trimmed.strip_suffix('-') {
        (name, Direction::Descending)
    } else {
        (trimmed, Direction::Ascending)
    };

    if name.is_empty() {
        return Err(Error::malformed("sort key without attribute", position));
    }

    let def = schema.resolve(name)?;
    Ok(Some(SortKey {
        attribute: def.name.clone(),
        kind: def.kind,
        direction,
        is_break,
        default: def.default.clone(),
        ranks: def.values.clone(),
    }))
}
