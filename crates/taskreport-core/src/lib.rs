//! Report query engine for taskwarrior-style configurations.
//!
//! A report is described by a filter expression, a sort specification and a
//! list of columns, all validated against an [`AttributeSchema`] built from
//! the built-in attributes and user-defined attributes (UDAs). Running a
//! report filters a task snapshot, sorts it, and projects it into rows.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use taskreport_core::{
//!     load_tasks, presets, FormatOptions, PresetVersion, ReportCatalog, RunOptions,
//! };
//!
//! let catalog = ReportCatalog::load(&presets::taskrc(PresetVersion::Current)).unwrap();
//! let tasks = load_tasks(
//!     catalog.schema(),
//!     r#"[{"uuid": "8f1b6c2e-0000", "description": "water plants", "status": "pending"}]"#,
//! )
//! .unwrap();
//!
//! let report = catalog.get("main").unwrap();
//! let output = report.run(&tasks, &RunOptions::new(FormatOptions::new(Utc::now())));
//! assert_eq!(output.matched, 1);
//! ```

pub mod error;
pub mod filter;
pub mod format;
pub mod presets;
pub mod projector;
pub mod report;
pub mod schema;
pub mod sort;
pub mod task;
pub mod taskrc;
pub mod value;

pub use error::{Error, Result};
pub use filter::{Filter, FilterEvaluator, FilterParser};
pub use format::{Column, ColumnFormat, FormatOptions};
pub use presets::PresetVersion;
pub use projector::{Projector, ReportLine, Row};
pub use report::{RawReport, ReportCatalog, ReportDefinition, ReportOutput, RunOptions};
pub use schema::{AttributeDef, AttributeSchema, AttributeType, UdaDeclaration};
pub use sort::{Direction, SortKey, SortSpec};
pub use task::{load_tasks, Annotation, Task};
pub use taskrc::Taskrc;
pub use value::Value;
