//! Turns filter tokens into a typed [`Filter`] tree.

use crate::error::{Error, Result};
use crate::schema::{AttributeDef, AttributeSchema, AttributeType};
use crate::value::Value;

use super::ast::{Condition, Filter, Operand, Predicate};
use super::date::DateExpr;
use super::lexer::{FilterToken, Lexer, PositionedToken};

/// Parser for taskwarrior-style filter expressions.
///
/// # Grammar
///
/// ```text
/// expression ::= or_expr
/// or_expr    ::= and_expr ("or" and_expr)*
/// and_expr   ::= unary_expr (["and"] unary_expr)*
/// unary_expr ::= ("not" | "!") unary_expr | primary
/// primary    ::= "(" expression ")" | tag | attribute
/// tag        ::= "+" name | "-" name
/// attribute  ::= name ["." modifier] ":" [value]
/// ```
///
/// Adjacent leaves without an operator are joined with AND.
///
/// `not` binds tightest, then `and`, then `or`; both binary operators
/// associate to the left.
///
/// Every attribute leaf is resolved and type-checked against the schema while
/// parsing, so an invalid filter fails before any task is evaluated.
pub struct FilterParser<'s> {
    tokens: Vec<PositionedToken>,
    position: usize,
    end: usize,
    schema: &'s AttributeSchema,
}

/// A parsed modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    Equals,
    NotEquals,
    Before,
    After,
    Has,
    Hasnt,
    StartsWith,
    EndsWith,
    None,
    Any,
}

impl Modifier {
    fn parse(name: Option<&str>) -> Option<Self> {
        let Some(name) = name else {
            return Some(Modifier::Equals);
        };
        match name.to_ascii_lowercase().as_str() {
            "is" | "equals" => Some(Modifier::Equals),
            "not" | "isnt" => Some(Modifier::NotEquals),
            "before" | "under" | "below" => Some(Modifier::Before),
            "after" | "over" | "above" => Some(Modifier::After),
            "has" | "contains" => Some(Modifier::Has),
            "hasnt" => Some(Modifier::Hasnt),
            "startswith" | "left" => Some(Modifier::StartsWith),
            "endswith" | "right" => Some(Modifier::EndsWith),
            "none" => Some(Modifier::None),
            "any" => Some(Modifier::Any),
            _ => None,
        }
    }
}

impl<'s> FilterParser<'s> {
    /// Parses `input` against `schema`.
    ///
    /// A blank expression yields [`Filter::All`].
    ///
    /// # Errors
    ///
    /// Returns `MalformedExpression` for syntax errors (unbalanced parentheses,
    /// dangling operators, bare words, unterminated quotes), `UnknownAttribute`
    /// or `AmbiguousAttribute` for unresolvable fields, `InvalidModifier`,
    /// `TypeMismatch` and `InvalidEnumValue` for invalid comparisons.
    pub fn parse(input: &str, schema: &'s AttributeSchema) -> Result<Filter> {
        if input.trim().is_empty() {
            return Ok(Filter::All);
        }

        let lexed = Lexer::new(input).tokenize_with_errors();
        if let Some(err) = lexed.errors.first() {
            return Err(Error::malformed(err.message.clone(), err.position));
        }

        let mut parser = Self {
            tokens: lexed.tokens,
            position: 0,
            end: input.len(),
            schema,
        };
        let filter = parser.parse_expression()?;

        // Leftover tokens mean a stray `)` or similar
        if let Some(remaining) = parser.tokens.get(parser.position) {
            return Err(Error::malformed(
                format!("unexpected token '{}'", remaining.token),
                remaining.position,
            ));
        }

        tracing::debug!(filter = input, "parsed filter");
        Ok(filter)
    }

    fn peek(&self) -> Option<&FilterToken> {
        self.tokens.get(self.position).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<PositionedToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn at(&self, expected: &FilterToken) -> bool {
        self.peek() == Some(expected)
    }

    /// Consumes the current token if it is `expected`.
    fn eat(&mut self, expected: &FilterToken) -> bool {
        let found = self.at(expected);
        if found {
            self.position += 1;
        }
        found
    }

    /// Returns true if the current token can start a unary expression.
    fn starts_operand(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                FilterToken::Not
                    | FilterToken::OpenParen
                    | FilterToken::Tag { .. }
                    | FilterToken::Attribute { .. }
                    | FilterToken::Word(_)
            )
        )
    }

    fn parse_expression(&mut self) -> Result<Filter> {
        self.parse_or_expr()
    }

    fn parse_or_expr(&mut self) -> Result<Filter> {
        let mut expr = self.parse_and_expr()?;
        while self.eat(&FilterToken::Or) {
            expr = Filter::or(expr, self.parse_and_expr()?);
        }
        Ok(expr)
    }

    fn parse_and_expr(&mut self) -> Result<Filter> {
        let mut expr = self.parse_unary_expr()?;
        // `and` is optional between adjacent operands
        while self.eat(&FilterToken::And) || self.starts_operand() {
            expr = Filter::and(expr, self.parse_unary_expr()?);
        }
        Ok(expr)
    }

    fn parse_unary_expr(&mut self) -> Result<Filter> {
        if self.eat(&FilterToken::Not) {
            Ok(Filter::negate(self.parse_unary_expr()?))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<Filter> {
        let PositionedToken { token, position } = self
            .advance()
            .ok_or_else(|| Error::malformed("unexpected end of expression", self.end))?;

        match token {
            FilterToken::OpenParen => {
                if self.at(&FilterToken::CloseParen) {
                    return Err(Error::malformed("empty parentheses", position));
                }
                let inner = self.parse_expression()?;
                if self.eat(&FilterToken::CloseParen) {
                    Ok(inner)
                } else {
                    Err(Error::malformed("unclosed parenthesis", position))
                }
            }

            FilterToken::Tag { include: true, name } => Ok(Filter::HasTag(name)),
            FilterToken::Tag {
                include: false,
                name,
            } => Ok(Filter::LacksTag(name)),

            FilterToken::Attribute {
                name,
                modifier,
                value,
            } => self.parse_attribute(&name, modifier.as_deref(), &value),

            // Unexpected tokens
            FilterToken::Word(w) => Err(Error::malformed(
                format!("unexpected word '{w}'"),
                position,
            )),
            other @ (FilterToken::And
            | FilterToken::Or
            | FilterToken::Not
            | FilterToken::CloseParen) => Err(Error::malformed(
                format!("unexpected token '{other}'"),
                position,
            )),
        }
    }

    /// Builds a predicate for `name[.modifier]:value`.
    fn parse_attribute(&self, name: &str, modifier: Option<&str>, raw: &str) -> Result<Filter> {
        let def = self.schema.resolve(name)?;
        let parsed = Modifier::parse(modifier)
            .ok_or_else(|| Error::invalid_modifier(&def.name, modifier.unwrap_or_default()))?;
        let modifier_text = modifier.unwrap_or("");

        let predicate = |condition: Condition| {
            Filter::Attribute(Predicate {
                attribute: def.name.clone(),
                kind: def.kind,
                hierarchical: def.hierarchical,
                ranks: def.values.clone(),
                default: def.default.clone(),
                condition,
            })
        };

        let filter = match parsed {
            Modifier::None => predicate(Condition::Unset),
            Modifier::Any => Filter::negate(predicate(Condition::Unset)),

            // `field:` and `field.not:` test presence
            Modifier::Equals if raw.is_empty() => predicate(Condition::Unset),
            Modifier::NotEquals if raw.is_empty() => {
                Filter::negate(predicate(Condition::Unset))
            }

            Modifier::Equals => predicate(Condition::Equals(self.operand(def, raw)?)),
            Modifier::NotEquals => {
                Filter::negate(predicate(Condition::Equals(self.operand(def, raw)?)))
            }

            Modifier::Before | Modifier::After => {
                if def.kind == AttributeType::Tags {
                    return Err(Error::invalid_modifier(&def.name, modifier_text));
                }
                let operand = self.operand(def, raw)?;
                if parsed == Modifier::Before {
                    predicate(Condition::Before(operand))
                } else {
                    predicate(Condition::After(operand))
                }
            }

            Modifier::Has | Modifier::Hasnt | Modifier::StartsWith | Modifier::EndsWith => {
                let pattern_ok = match def.kind {
                    AttributeType::String | AttributeType::Enumerated => true,
                    AttributeType::Tags => {
                        matches!(parsed, Modifier::Has | Modifier::Hasnt)
                    }
                    AttributeType::Numeric | AttributeType::Date => false,
                };
                if !pattern_ok {
                    return Err(Error::invalid_modifier(&def.name, modifier_text));
                }
                let pattern = raw.to_string();
                match parsed {
                    Modifier::Has => predicate(Condition::Contains(pattern)),
                    Modifier::Hasnt => Filter::negate(predicate(Condition::Contains(pattern))),
                    Modifier::StartsWith => predicate(Condition::StartsWith(pattern)),
                    _ => predicate(Condition::EndsWith(pattern)),
                }
            }
        };

        Ok(filter)
    }

    /// Converts a literal into a typed operand for the attribute.
    fn operand(&self, def: &AttributeDef, raw: &str) -> Result<Operand> {
        match def.kind {
            AttributeType::Date => DateExpr::parse(raw)
                .map(Operand::Date)
                .ok_or_else(|| Error::type_mismatch(&def.name, def.kind, raw)),
            // `tags:x` tests membership of a single tag
            AttributeType::Tags => Ok(Operand::Literal(Value::Tags(vec![raw.to_string()]))),
            _ => self
                .schema
                .coerce(&def.name, Value::from(raw))
                .map(Operand::Literal),
        }
    }
}
