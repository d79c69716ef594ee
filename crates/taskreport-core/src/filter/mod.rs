//! Filter expression parser and evaluator for taskwarrior filter syntax.
//!
//! Report filters select the tasks a report shows. They are parsed once,
//! validated against an [`AttributeSchema`](crate::AttributeSchema), and then
//! evaluated against each task.
//!
//! # Supported Syntax
//!
//! ## Attributes
//! - `status:pending` - Attribute equals a value
//! - `project:Home` - Project `Home` or any `Home.*` subproject
//! - `due:` - Attribute has no value
//! - `start.not:` - Attribute has a value
//! - `end.after:now-1wk` - Modifiers: `is`, `not`, `before`, `after`,
//!   `has`, `hasnt`, `startswith`, `endswith`, `none`, `any`
//!
//! ## Dates
//! - `2024-03-01`, `20240301T103000Z` - Absolute dates
//! - `now`, `today`, `yesterday`, `tomorrow` - Anchors
//! - `now-1wk`, `today+2d` - Offsets in `s`, `min`, `h`, `d`, `wk`, `mo`, `y`
//!
//! ## Tags
//! - `+tag` - Tasks carrying the tag
//! - `-tag` - Tasks without the tag
//!
//! ## Boolean Operators
//! - `and` (or adjacency) - AND
//! - `or` - OR
//! - `not`, `!` - NOT
//! - `()` - Grouping
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use taskreport_core::filter::{evaluate, FilterParser};
//! use taskreport_core::{AttributeSchema, Task};
//!
//! let schema = AttributeSchema::builtin();
//! let filter = FilterParser::parse("-obj and (start.not: or status:pending)", &schema).unwrap();
//!
//! // status defaults to pending
//! assert!(evaluate(&filter, &Task::new(), Utc::now()));
//! ```

mod ast;
mod date;
mod evaluator;
mod lexer;
mod parser;

pub use ast::{Condition, Filter, Operand, Predicate};
pub use date::{Anchor, DateExpr, Offset, OffsetUnit};
pub use evaluator::{evaluate, FilterEvaluator};
pub use lexer::{FilterToken, Lexer, LexerError, LexerResult, PositionedToken};
pub use parser::FilterParser;
