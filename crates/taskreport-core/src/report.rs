//! Report definitions and the report catalog.
//!
//! A report combines a filter, a sort specification and a column list. Every
//! part is parsed and validated when the definition is built, so running a
//! report cannot fail.

use std::collections::BTreeMap;

use serde::Serialize;
use strsim::levenshtein;

use crate::error::{Error, Result};
use crate::filter::{evaluate, Filter, FilterParser};
use crate::format::{Column, FormatOptions, DEFAULT_DATE_FORMAT};
use crate::projector::{Projector, ReportLine};
use crate::schema::AttributeSchema;
use crate::sort::SortSpec;
use crate::task::Task;
use crate::taskrc::Taskrc;

/// Maximum Levenshtein distance to consider a report name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// The unparsed `report.<name>.*` keys of one report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReport {
    pub labels: Option<String>,
    pub columns: Option<String>,
    pub description: Option<String>,
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub dateformat: Option<String>,
}

/// A validated report.
#[derive(Debug, Clone)]
pub struct ReportDefinition {
    name: String,
    description: String,
    labels: Vec<String>,
    columns: Vec<Column>,
    filter: Filter,
    filter_text: String,
    sort: SortSpec,
    date_format: Option<String>,
}

/// Per-run settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Cell formatting; `date_format` is replaced by the report's own when it has one.
    pub format: FormatOptions,
    /// Additional filter ANDed with the report filter.
    pub extra_filter: Filter,
}

impl RunOptions {
    pub fn new(format: FormatOptions) -> Self {
        Self {
            format,
            extra_filter: Filter::All,
        }
    }
}

/// The result of running a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportOutput {
    /// Report name.
    pub report: String,
    /// Column labels.
    pub labels: Vec<String>,
    /// Rows and break markers in display order.
    pub lines: Vec<ReportLine>,
    /// Number of tasks that passed the filter.
    pub matched: usize,
}

impl ReportDefinition {
    /// Builds a report from its raw configuration keys.
    ///
    /// Labels and columns are checked for equal length before anything else
    /// is parsed. Missing labels are taken from the schema labels of the
    /// columns.
    ///
    /// # Errors
    ///
    /// Returns `InvalidReport` wrapping the first definition error.
    pub fn from_raw(name: &str, raw: &RawReport, schema: &AttributeSchema) -> Result<Self> {
        Self::build(name, raw, schema).map_err(|e| e.in_report(name))
    }

    fn build(name: &str, raw: &RawReport, schema: &AttributeSchema) -> Result<Self> {
        let column_specs = split_list(raw.columns.as_deref().unwrap_or_default());
        if column_specs.is_empty() {
            return Err(Error::config(0, "report declares no columns"));
        }

        let declared_labels = split_list(raw.labels.as_deref().unwrap_or_default());
        if !declared_labels.is_empty() && declared_labels.len() != column_specs.len() {
            return Err(Error::ColumnLabelMismatch {
                labels: declared_labels.len(),
                columns: column_specs.len(),
            });
        }

        let columns = column_specs
            .iter()
            .map(|spec| Column::parse(spec, schema))
            .collect::<Result<Vec<_>>>()?;

        let labels = if declared_labels.is_empty() {
            columns.iter().map(|c| c.label.clone()).collect()
        } else {
            declared_labels
        };

        let filter_text = raw.filter.clone().unwrap_or_default();
        let filter = FilterParser::parse(&filter_text, schema)?;
        let sort = SortSpec::parse(raw.sort.as_deref().unwrap_or_default(), schema)?;

        Ok(Self {
            name: name.to_string(),
            description: raw.description.clone().unwrap_or_default(),
            labels,
            columns,
            filter,
            filter_text,
            sort,
            date_format: raw.dateformat.clone().filter(|f| !f.is_empty()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// The filter as written in the configuration.
    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    /// The report's own date format, if it overrides the global one.
    pub fn date_format(&self) -> Option<&str> {
        self.date_format.as_deref()
    }

    /// Runs the report: filter, then sort, then project.
    pub fn run(&self, tasks: &[Task], options: &RunOptions) -> ReportOutput {
        let now = options.format.now;

        let mut selected: Vec<&Task> = tasks
            .iter()
            .filter(|task| {
                evaluate(&self.filter, task, now) && evaluate(&options.extra_filter, task, now)
            })
            .collect();
        let matched = selected.len();

        self.sort.sort(&mut selected);

        let mut format = options.format.clone();
        if let Some(date_format) = &self.date_format {
            format.date_format = date_format.clone();
        }
        let lines = Projector::new(&self.columns, &self.sort, &format).project(&selected);

        tracing::debug!(
            report = %self.name,
            total = tasks.len(),
            matched,
            "ran report"
        );

        ReportOutput {
            report: self.name.clone(),
            labels: self.labels.clone(),
            lines,
            matched,
        }
    }
}

/// Splits a comma separated list, trimming entries and dropping empty ones.
fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// The schema plus every report defined by a configuration.
#[derive(Debug, Clone)]
pub struct ReportCatalog {
    schema: AttributeSchema,
    reports: BTreeMap<String, ReportDefinition>,
    date_format: String,
}

impl ReportCatalog {
    /// Builds the schema and all reports from a configuration.
    ///
    /// Every report is validated here; the first invalid one fails the load.
    ///
    /// # Errors
    ///
    /// Returns `Config` (or a coercion error) for invalid UDA declarations and
    /// `InvalidReport` for the first report that does not build.
    pub fn load(taskrc: &Taskrc) -> Result<Self> {
        let udas = taskrc.udas();
        let schema = AttributeSchema::with_udas(&udas)?;

        let reports = taskrc
            .reports()
            .iter()
            .map(|(name, raw)| {
                ReportDefinition::from_raw(name, raw, &schema).map(|r| (name.clone(), r))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        tracing::debug!(
            attributes = schema.iter().count(),
            reports = reports.len(),
            "loaded report catalog"
        );

        Ok(Self {
            schema,
            reports,
            date_format: taskrc
                .date_format()
                .unwrap_or(DEFAULT_DATE_FORMAT)
                .to_string(),
        })
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    /// The global date format.
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Looks up a report by name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReport` with the closest defined name as a suggestion.
    pub fn get(&self, name: &str) -> Result<&ReportDefinition> {
        self.reports.get(name).ok_or_else(|| Error::UnknownReport {
            name: name.to_string(),
            suggestion: self.suggest(name),
        })
    }

    /// Iterates over reports in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ReportDefinition> {
        self.reports.values()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Parses an ad-hoc filter against the catalog's schema.
    pub fn parse_filter(&self, expression: &str) -> Result<Filter> {
        FilterParser::parse(expression, &self.schema)
    }

    fn suggest(&self, name: &str) -> Option<String> {
        let (best, distance) = self
            .reports
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
