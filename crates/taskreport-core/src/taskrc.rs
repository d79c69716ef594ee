//! Taskwarrior-style configuration (`taskrc`).
//!
//! The format is one `key=value` per line:
//!
//! ```text
//! # comments run to the end of the line
//! dateformat=Y-M-D
//! uda.ppri.type=numeric
//! report.next.columns=uuid.short,project,description
//! include ~/.config/task/reports.rc
//! ```
//!
//! Later keys override earlier ones. `include` paths are resolved relative to
//! the including file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::report::RawReport;
use crate::schema::UdaDeclaration;

/// Maximum depth of nested `include` directives.
const MAX_INCLUDE_DEPTH: usize = 10;

/// Parsed configuration entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taskrc {
    entries: BTreeMap<String, String>,
}

impl Taskrc {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration text. `include` paths are resolved against the
    /// current directory.
    ///
    /// # Errors
    ///
    /// Returns `Config` for lines that are not `key=value` or a directive,
    /// and `Io` when an included file cannot be read.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rc = Self::new();
        rc.parse_into(text, None, 0)?;
        Ok(rc)
    }

    /// Loads a configuration file and everything it includes.
    pub fn load(path: &Path) -> Result<Self> {
        let mut rc = Self::new();
        rc.load_into(path, 0)?;
        tracing::debug!(path = %path.display(), keys = rc.entries.len(), "loaded taskrc");
        Ok(rc)
    }

    fn load_into(&mut self, path: &Path, depth: usize) -> Result<()> {
        let text = fs::read_to_string(path)?;
        self.parse_into(&text, path.parent(), depth)
    }

    fn parse_into(&mut self, text: &str, base: Option<&Path>, depth: usize) -> Result<()> {
        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }

            if let Some(target) = line.strip_prefix("include ") {
                if depth >= MAX_INCLUDE_DEPTH {
                    return Err(Error::config(line_no, "include nesting too deep"));
                }
                let path = resolve_include(target.trim(), base);
                tracing::debug!(path = %path.display(), "including taskrc");
                self.load_into(&path, depth + 1)?;
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| Error::config(line_no, format!("expected key=value, got '{line}'")))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(Error::config(line_no, "empty key"));
            }
            self.set(key, value.trim());
        }
        Ok(())
    }

    /// Returns the value of a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Sets a key, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Applies a `key=value` override such as `--rc dateformat=Y-M-D`.
    pub fn apply_override(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .filter(|(k, _)| !k.trim().is_empty())
            .ok_or_else(|| Error::config(0, format!("expected key=value, got '{assignment}'")))?;
        self.set(key.trim(), value.trim());
        Ok(())
    }

    /// Overlays another configuration; its keys win.
    pub fn merge(&mut self, other: Taskrc) {
        self.entries.extend(other.entries);
    }

    /// Iterates over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no keys are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the global `dateformat`, if set.
    pub fn date_format(&self) -> Option<&str> {
        self.get("dateformat").filter(|f| !f.is_empty())
    }

    /// Collects `uda.<name>.<property>` keys.
    ///
    /// Properties other than `type`, `label`, `default` and `values` (such as
    /// `indicator`) are ignored.
    pub fn udas(&self) -> BTreeMap<String, UdaDeclaration> {
        let mut udas: BTreeMap<String, UdaDeclaration> = BTreeMap::new();
        for (key, value) in self.prefixed("uda.") {
            let Some((name, property)) = key.split_once('.') else {
                continue;
            };
            if !matches!(property, "type" | "label" | "default" | "values") {
                continue;
            }
            let decl = udas.entry(name.to_string()).or_default();
            let value = Some(value.to_string());
            match property {
                "type" => decl.kind = value,
                "label" => decl.label = value,
                "default" => decl.default = value,
                _ => decl.values = value,
            }
        }
        udas
    }

    /// Collects `report.<name>.<property>` keys.
    pub fn reports(&self) -> BTreeMap<String, RawReport> {
        let mut reports: BTreeMap<String, RawReport> = BTreeMap::new();
        for (key, value) in self.prefixed("report.") {
            let Some((name, property)) = key.rsplit_once('.') else {
                continue;
            };
            if !matches!(
                property,
                "labels" | "columns" | "description" | "filter" | "sort" | "dateformat"
            ) {
                tracing::debug!(report = name, property, "ignoring report property");
                continue;
            }
            let report = reports.entry(name.to_string()).or_default();
            let value = Some(value.to_string());
            match property {
                "labels" => report.labels = value,
                "columns" => report.columns = value,
                "description" => report.description = value,
                "filter" => report.filter = value,
                "sort" => report.sort = value,
                _ => report.dateformat = value,
            }
        }
        reports
    }

    /// Iterates over keys with a prefix, yielding the rest of the key.
    fn prefixed<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.entries
            .range(prefix.to_string()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(move |(k, v)| (&k[prefix.len()..], v.as_str()))
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn resolve_include(target: &str, base: Option<&Path>) -> PathBuf {
    let expanded = match target.strip_prefix("~/") {
        Some(rest) => directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(rest))
            .unwrap_or_else(|| PathBuf::from(target)),
        None => PathBuf::from(target),
    };
    match base {
        Some(dir) if expanded.is_relative() => dir.join(expanded),
        _ => expanded,
    }
}
