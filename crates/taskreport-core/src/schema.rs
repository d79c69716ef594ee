//! Attribute schema: the declared type, label and default of every task field.
//!
//! The schema starts from the taskwarrior built-in attributes and is extended
//! by user-defined attributes (UDAs) declared in configuration:
//!
//! ```text
//! uda.ppri.type=numeric
//! uda.ppri.label=ppri
//! uda.size.type=string
//! uda.size.values=S,M,L,XL,2XL
//! uda.priority.values=H,M,L,Z
//! ```
//!
//! A schema is immutable once built and is passed explicitly to the filter
//! parser, the sort compiler and the column parser.

use std::collections::BTreeMap;
use std::fmt;

use strsim::levenshtein;

use crate::error::{Error, Result};
use crate::value::{parse_date, Value};

/// Shortest prefix accepted as an attribute abbreviation.
const MIN_ABBREVIATION: usize = 2;

/// Maximum Levenshtein distance to consider a name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// The declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// Floating point number.
    Numeric,
    /// Free text.
    String,
    /// An instant in time.
    Date,
    /// Text restricted to a declared set of values.
    Enumerated,
    /// A set of tags.
    Tags,
}

impl AttributeType {
    /// Parses a UDA `type` value.
    fn from_uda(name: &str) -> Option<Self> {
        match name {
            "numeric" => Some(AttributeType::Numeric),
            "string" => Some(AttributeType::String),
            "date" => Some(AttributeType::Date),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeType::Numeric => "numeric",
            AttributeType::String => "string",
            AttributeType::Date => "date",
            AttributeType::Enumerated => "enumerated",
            AttributeType::Tags => "tags",
        };
        f.write_str(name)
    }
}

/// A single attribute declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDef {
    /// Attribute name.
    pub name: String,
    /// Declared type.
    pub kind: AttributeType,
    /// Column label used when a report does not declare one.
    pub label: String,
    /// Value used when a task omits the attribute.
    pub default: Option<Value>,
    /// Allowed values of an enumerated attribute, in declared order.
    pub values: Vec<String>,
    /// Whether equality also matches dotted children (`Home` matches `Home.Garden`).
    pub hierarchical: bool,
    /// Whether this is a taskwarrior built-in.
    pub builtin: bool,
}

impl AttributeDef {
    fn builtin(name: &str, kind: AttributeType, label: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            label: label.to_string(),
            default: None,
            values: Vec::new(),
            hierarchical: false,
            builtin: true,
        }
    }

    /// Returns the position of an enumerated value in declared order, which
    /// is the order an ascending sort lists values in.
    pub fn rank(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }
}

/// The raw `uda.<name>.*` keys of one attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UdaDeclaration {
    /// `uda.<name>.type`
    pub kind: Option<String>,
    /// `uda.<name>.label`
    pub label: Option<String>,
    /// `uda.<name>.default`
    pub default: Option<String>,
    /// `uda.<name>.values`
    pub values: Option<String>,
}

/// Mapping from attribute name to its declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSchema {
    attributes: BTreeMap<String, AttributeDef>,
}

impl Default for AttributeSchema {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AttributeSchema {
    /// Creates a schema containing only the built-in attributes.
    pub fn builtin() -> Self {
        use AttributeType::*;

        let mut status = AttributeDef::builtin("status", Enumerated, "Status");
        // `status-` lists pending work first
        status.values = ["deleted", "completed", "recurring", "waiting", "pending"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        status.default = Some(Value::from("pending"));

        let mut priority = AttributeDef::builtin("priority", Enumerated, "P");
        priority.values = vec!["H".to_string(), "M".to_string(), "L".to_string()];

        let mut project = AttributeDef::builtin("project", String, "Project");
        project.hierarchical = true;

        let defs = vec![
            AttributeDef::builtin("id", Numeric, "ID"),
            AttributeDef::builtin("uuid", String, "UUID"),
            AttributeDef::builtin("description", String, "Description"),
            project,
            status,
            priority,
            AttributeDef::builtin("tags", Tags, "Tags"),
            AttributeDef::builtin("recur", String, "Recur"),
            AttributeDef::builtin("parent", String, "Parent task"),
            AttributeDef::builtin("depends", String, "Depends"),
            AttributeDef::builtin("entry", Date, "Added"),
            AttributeDef::builtin("modified", Date, "Modified"),
            AttributeDef::builtin("start", Date, "Started"),
            AttributeDef::builtin("end", Date, "Completed"),
            AttributeDef::builtin("due", Date, "Due"),
            AttributeDef::builtin("scheduled", Date, "Scheduled"),
            AttributeDef::builtin("wait", Date, "Wait"),
            AttributeDef::builtin("until", Date, "Until"),
        ];

        Self {
            attributes: defs.into_iter().map(|d| (d.name.clone(), d)).collect(),
        }
    }

    /// Builds a schema from the built-ins plus UDA declarations.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an unsupported UDA type, a new UDA without
    /// a type, or a default the attribute cannot hold.
    pub fn with_udas<'a>(
        udas: impl IntoIterator<Item = (&'a String, &'a UdaDeclaration)>,
    ) -> Result<Self> {
        let mut schema = Self::builtin();
        for (name, decl) in udas {
            schema.declare(name, decl)?;
        }
        Ok(schema)
    }

    /// Adds or amends one attribute.
    fn declare(&mut self, name: &str, decl: &UdaDeclaration) -> Result<()> {
        let kind = match decl.kind.as_deref().map(str::trim) {
            Some(t) => Some(AttributeType::from_uda(t).ok_or_else(|| {
                Error::config(0, format!("unsupported type '{t}' for uda '{name}'"))
            })?),
            None => None,
        };

        let mut def = match (self.attributes.remove(name), kind) {
            (Some(existing), None) => existing,
            (Some(existing), Some(kind)) if existing.builtin => {
                // Built-in types cannot change, but a matching declaration is harmless.
                if existing.kind != kind
                    && !(existing.kind == AttributeType::Enumerated
                        && kind == AttributeType::String)
                {
                    self.attributes.insert(name.to_string(), existing);
                    return Err(Error::config(
                        0,
                        format!("cannot change the type of built-in attribute '{name}'"),
                    ));
                }
                existing
            }
            (_, Some(kind)) => AttributeDef {
                name: name.to_string(),
                kind,
                label: name.to_string(),
                default: None,
                values: Vec::new(),
                hierarchical: false,
                builtin: false,
            },
            (None, None) => {
                return Err(Error::config(0, format!("uda '{name}' has no type")));
            }
        };

        if let Some(label) = &decl.label {
            def.label = label.trim().to_string();
        }

        if let Some(values) = &decl.values {
            if def.kind == AttributeType::Numeric || def.kind == AttributeType::Date {
                return Err(Error::config(
                    0,
                    format!("uda '{name}' of type {} cannot declare values", def.kind),
                ));
            }
            def.values = values
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect();
            def.kind = if def.values.is_empty() {
                AttributeType::String
            } else {
                AttributeType::Enumerated
            };
        }

        self.attributes.insert(name.to_string(), def);

        if let Some(default) = decl.default.as_deref().map(str::trim) {
            let value = if default.is_empty() {
                None
            } else {
                let value = self.coerce(name, Value::from(default)).map_err(|e| {
                    Error::config(0, format!("invalid uda.{name}.default '{default}': {e}"))
                })?;
                Some(value)
            };
            if let Some(def) = self.attributes.get_mut(name) {
                def.default = value;
            }
        }

        Ok(())
    }

    /// Resolves an attribute name, accepting unique abbreviations.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAttribute` (with a suggestion when a declared name is
    /// close) or `AmbiguousAttribute` when an abbreviation matches several names.
    pub fn resolve(&self, name: &str) -> Result<&AttributeDef> {
        if let Some(def) = self.attributes.get(name) {
            return Ok(def);
        }

        if name.len() >= MIN_ABBREVIATION {
            let candidates: Vec<&AttributeDef> = self
                .attributes
                .values()
                .filter(|d| d.name.starts_with(name))
                .collect();
            match candidates.as_slice() {
                [single] => return Ok(single),
                [] => {}
                many => {
                    return Err(Error::AmbiguousAttribute {
                        name: name.to_string(),
                        candidates: many.iter().map(|d| d.name.clone()).collect(),
                    })
                }
            }
        }

        Err(Error::UnknownAttribute {
            name: name.to_string(),
            suggestion: self.suggest(name),
        })
    }

    /// Returns the declared type of an attribute.
    pub fn attribute_type(&self, name: &str) -> Result<AttributeType> {
        self.resolve(name).map(|d| d.kind)
    }

    /// Returns the default value of an attribute, if it declares one.
    pub fn default_value(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).and_then(|d| d.default.as_ref())
    }

    /// Converts a value to the attribute's declared type.
    ///
    /// Text is parsed into the declared type; a value that already has the
    /// declared type is validated and returned unchanged, so coercion is
    /// idempotent.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` when the value cannot be converted and
    /// `InvalidEnumValue` when an enumerated value is not declared.
    pub fn coerce(&self, name: &str, value: Value) -> Result<Value> {
        let def = self.resolve(name)?;
        let attribute = def.name.as_str();

        match (def.kind, value) {
            (AttributeType::Numeric, Value::Number(n)) => Ok(Value::Number(n)),
            (AttributeType::Numeric, Value::Text(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Number)
                .ok_or_else(|| Error::type_mismatch(attribute, def.kind, s)),

            (AttributeType::String, Value::Text(s)) => Ok(Value::Text(s)),

            (AttributeType::Enumerated, Value::Text(s)) => {
                if def.values.iter().any(|v| *v == s) {
                    Ok(Value::Text(s))
                } else {
                    Err(Error::InvalidEnumValue {
                        attribute: attribute.to_string(),
                        value: s,
                        allowed: def.values.clone(),
                    })
                }
            }

            (AttributeType::Date, Value::Date(d)) => Ok(Value::Date(d)),
            (AttributeType::Date, Value::Text(s)) => parse_date(&s)
                .map(Value::Date)
                .ok_or_else(|| Error::type_mismatch(attribute, def.kind, s)),

            (AttributeType::Tags, Value::Tags(tags)) => Ok(Value::Tags(tags)),
            (AttributeType::Tags, Value::Text(s)) => Ok(Value::Tags(
                s.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),

            (kind, other) => Err(Error::type_mismatch(attribute, kind, other.to_string())),
        }
    }

    /// Iterates over all declarations in name order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributeDef> {
        self.attributes.values()
    }

    /// Returns true if the exact name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Finds the closest declared name for a "did you mean" hint.
    fn suggest(&self, name: &str) -> Option<String> {
        let (best, distance) = self
            .attributes
            .keys()
            .map(|candidate| (candidate, levenshtein(name, candidate)))
            .min_by_key(|(_, d)| *d)?;

        if distance > 0 && distance <= MAX_SUGGESTION_DISTANCE {
            Some(best.clone())
        } else {
            None
        }
    }
}
