//! Abstract Syntax Tree (AST) for filter expressions.

use crate::schema::AttributeType;
use crate::value::Value;

use super::date::DateExpr;

/// Represents a parsed filter expression.
///
/// Leaves are already validated against the schema; a `Filter` never refers
/// to an unknown attribute or carries a literal of the wrong type.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every task (the empty filter).
    All,

    // ==================== Tag Filters ====================
    /// Matches tasks carrying the tag (`+tag`).
    HasTag(String),

    /// Matches tasks not carrying the tag (`-tag`).
    LacksTag(String),

    // ==================== Attribute Filter ====================
    /// An attribute comparison (`field:value`, `field.before:value`, ...).
    Attribute(Predicate),

    // ==================== Boolean Operators ====================
    /// Logical AND of two filters.
    And(Box<Filter>, Box<Filter>),

    /// Logical OR of two filters.
    Or(Box<Filter>, Box<Filter>),

    /// Logical NOT of a filter.
    Not(Box<Filter>),
}

impl Filter {
    /// Creates an AND filter from two filters.
    pub fn and(left: Filter, right: Filter) -> Self {
        Filter::And(Box::new(left), Box::new(right))
    }

    /// Creates an OR filter from two filters.
    pub fn or(left: Filter, right: Filter) -> Self {
        Filter::Or(Box::new(left), Box::new(right))
    }

    /// Creates a NOT filter from another filter.
    pub fn negate(inner: Filter) -> Self {
        Filter::Not(Box::new(inner))
    }

    /// Combines two filters with AND, dropping `All` operands.
    pub fn conjoin(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (a, b) => Filter::and(a, b),
        }
    }
}

/// A comparison between a task attribute and a literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Canonical attribute name.
    pub attribute: String,
    /// Declared type of the attribute.
    pub kind: AttributeType,
    /// Whether equality also matches dotted children.
    pub hierarchical: bool,
    /// Enumerated values (highest first), used for ordering comparisons.
    pub ranks: Vec<String>,
    /// The attribute's default, used when a task omits it.
    pub default: Option<Value>,
    /// The comparison to perform.
    pub condition: Condition,
}

/// The comparison a predicate performs.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Attribute equals the operand (`field:value`).
    Equals(Operand),
    /// Attribute is ordered before the operand.
    Before(Operand),
    /// Attribute is ordered after the operand.
    After(Operand),
    /// Text contains the pattern, or the tag list contains the tag.
    Contains(String),
    /// Text starts with the pattern.
    StartsWith(String),
    /// Text ends with the pattern.
    EndsWith(String),
    /// Attribute has no value (`field:`).
    Unset,
}

/// The right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A literal already coerced to the attribute's type.
    Literal(Value),
    /// A date, possibly relative to the evaluation time.
    Date(DateExpr),
}
