//! Built-in report sets.
//!
//! The reports are assembled from named sort, filter and column fragments
//! rather than textual macros. Two generations exist:
//!
//! - [`PresetVersion::Current`]: `all`, `main`, `obj`, `modif`, the `sort*`
//!   views, the completion windows and `delmin`.
//! - [`PresetVersion::Legacy`]: the older `curmin`/`invmin`/`armin`/`allmin`
//!   family with a single sort template and the `tagmin` view.
//!
//! Both share the same UDA declarations and date format.

use std::fmt;
use std::str::FromStr;

use crate::taskrc::Taskrc;

// ==================== Sort Orders ====================

pub const SORT_MAIN: &str = "end+/,start+/,desort-/,priority+/,ppri+/,due+/,modified-/,scheduled-/,gcode+/,gpri+/,project+/,description+,";
pub const SORT_MODIF: &str = "end+/,start+/,desort-/,modified-/,priority+/,ppri+/,due+/,scheduled-/,gcode+/,gpri+/,project+/,description+,";
pub const SORT_OBJ: &str = "end+/,start+/,desort-/,childdepth+/,priority+/,ppri+/,gpri+/,due+/,modified-/,scheduled-/,gcode+/,project+/,description+,";
pub const SORT_DUE_H: &str = "end+/,start+/,desort-/,due+/,priority+/,ppri+/,gcode+/,gpri+/,scheduled-/,project+/,description+";
pub const SORT_SCH_L: &str = "end+/,start+/,desort-/,scheduled-/,due+/,priority+/,ppri+/,gcode+/,gpri+/,project+/,description+,";
pub const SORT_EST_L: &str = "end+/,start+/,desort-/,priority+/,ppri+/,gcode+/,gpri+/,due+/,scheduled-/,project+/,blkest+/,description+";
pub const SORT_EST_H: &str = "end+/,start+/,desort-/,blkest+/,priority+/,ppri+/,gcode+/,gpri+/,due+/,scheduled-/,project+/,description+";
pub const SORT_PRI_H: &str = "end+/,start+/,desort-/,ppri+/,priority+/,gcode+/,gpri+/,due+/,scheduled-/,project+/,description+";
pub const SORT_GCODE: &str = "end+/,start+/,desort-/,gcode+/,gpri+/,priority+/,ppri+/,due+/,scheduled-/,project+/,description+,";
pub const SORT_DONE: &str = "end+/,";

/// Legacy sort orders, scheduled ascending.
pub mod legacy {
    pub const SORT_TMPL1: &str = ",end+/,start+/,desort-/,priority+/,ppri+/,gcode+/,gpri+/,due+/,scheduled+/,project+/,description+,";
    pub const SORT_DUE_H: &str = ",end+/,start+/,desort-/,due+/,priority+/,ppri+/,gcode+/,gpri+/,scheduled+/,project+/,description+";
    pub const SORT_EST_L: &str = ",end+/,start+/,desort-/,priority+/,ppri+/,gcode+/,gpri+/,due+/,scheduled+/,project+/,blkest+/,description+";
    pub const SORT_EST_H: &str = ",end+/,start+/,desort-/,blkest+/,priority+/,ppri+/,gcode+/,gpri+/,due+/,scheduled+/,project+/,description+";
    pub const SORT_PRI_H: &str = ",end+/,start+/,desort-/,ppri+/,priority+/,gcode+/,gpri+/,due+/,scheduled+/,project+/,description+";
    pub const SORT_DONE: &str = ",end+/,";
}

/// Prefixes a sort order with `status-/` so pending work comes first.
pub fn sort_by_status(sort: &str) -> String {
    format!("status-/,{sort}")
}

// ==================== Filters ====================

pub const FILTER_PENDING: &str = "(status:pending or status:waiting)";
pub const FILTER_HIDE: &str = "(-inv and -ar)";
pub const FILTER_STARTED: &str = "start.not:";

/// Started tasks, or visible pending tasks.
pub fn filter_curmin() -> String {
    format!("{FILTER_STARTED} or ({FILTER_HIDE} and {FILTER_PENDING})")
}

/// Started tasks, or visible pending tasks that also match `extra`.
pub fn filter_curmin_with(extra: &str) -> String {
    format!("{FILTER_STARTED} or ({FILTER_HIDE} and {FILTER_PENDING} and {extra})")
}

/// Started tasks, or tasks matching `other`.
pub fn filter_started_or(other: &str) -> String {
    format!("{FILTER_STARTED} or {other}")
}

/// Started tasks, or tasks completed after `now<offset>` (e.g. `-1wk`).
pub fn filter_done_since(offset: &str) -> String {
    filter_started_or(&format!("(status:completed and end.after:now{offset})"))
}

// ==================== Columns / Labels ====================

pub const MAIN_LABELS: &str = "UUID,Compl,dTs,PPri,GPri,Sch,Due,Rem,Put,GCode,Project,Description";
pub const MAIN_COLUMNS: &str = "uuid.short,end,start.age,ppri,gpri,scheduled.relative,due,blkrem,blkputcum,gcode,project,description.count";

pub const MODIFIED_LABELS: &str =
    "UUID,Compl,Modified,dTs,PPri,GPri,Sch,Due,Rem,Put,GCode,Project,Description";
pub const MODIFIED_COLUMNS: &str = "uuid.short,end,modified,start.age,ppri,gpri,scheduled.relative,due,blkrem,blkputcum,gcode,project,description.count";

pub const TAG_LABELS: &str = "UUID,Compl,dTs,Mod,Sch,Tags,Project,Description";
pub const TAG_COLUMNS: &str =
    "uuid.short,end,start.age,modified.age,scheduled.relative,tags.list,project,description.count";

// ==================== Attributes ====================

/// Date format shared by both generations.
pub const DATE_FORMAT: &str = "yMD-WVa";

/// UDA declarations shared by both generations, as taskrc keys.
pub const UDAS: &[(&str, &str)] = &[
    ("uda.blkput.type", "numeric"),
    ("uda.blkput.label", "Put"),
    ("uda.blkputman.type", "numeric"),
    ("uda.blkputman.label", "Put"),
    ("uda.blkputcum.type", "numeric"),
    ("uda.blkputcum.label", "Put"),
    ("uda.blkest.type", "numeric"),
    ("uda.blkest.label", "Est"),
    ("uda.blkrem.type", "numeric"),
    ("uda.blkrem.label", "Est"),
    ("uda.blkestcum.type", "numeric"),
    ("uda.blkestcum.label", "Est"),
    ("uda.endsch.type", "date"),
    ("uda.endsch.label", "EndSch"),
    ("uda.etag.type", "string"),
    ("uda.etag.label", "EventTag"),
    ("uda.etag.default", "EVNT"),
    ("uda.size.type", "string"),
    ("uda.size.label", "Siz"),
    ("uda.size.values", "S,M,L,XL,2XL"),
    ("uda.notelinks.type", "string"),
    ("uda.notelinks.label", "NLinks"),
    ("uda.issuelinks.type", "string"),
    ("uda.issuelinks.label", "ILinks"),
    ("uda.linkedto.type", "string"),
    ("uda.linkedto.label", "LinkedTo"),
    ("uda.childof.type", "string"),
    ("uda.childof.label", "Parent"),
    ("uda.children.type", "string"),
    ("uda.children.label", "Children"),
    ("uda.childdepth.type", "numeric"),
    ("uda.childdepth.label", "Ancestors"),
    ("uda.childdepth.default", "0"),
    ("uda.expdur.type", "numeric"),
    ("uda.expdur.label", "expdur"),
    ("uda.expdur.default", "0"),
    ("uda.durunit.type", "string"),
    ("uda.durunit.label", "durunit"),
    ("uda.durunit.values", "1m,15m,20m,1h"),
    ("uda.durunit.default", "1h"),
    ("uda.priority.values", "H,M,L,Z"),
    ("uda.ppri.type", "numeric"),
    ("uda.ppri.label", "ppri"),
    ("uda.ppri.default", ""),
    ("uda.gpri.type", "numeric"),
    ("uda.gpri.label", "gpri"),
    ("uda.gpri.default", ""),
    ("uda.state.type", "string"),
    ("uda.state.default", ""),
    ("uda.gcode.type", "string"),
    ("uda.gcode.label", "GCode"),
    ("uda.gcode.default", ""),
    ("uda.desort.type", "string"),
    ("uda.desort.default", ""),
];

// ==================== Presets ====================

/// A generation of the built-in report set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetVersion {
    /// The `curmin` family.
    Legacy,
    /// The `main` family.
    Current,
}

impl PresetVersion {
    pub fn name(&self) -> &'static str {
        match self {
            PresetVersion::Legacy => "legacy",
            PresetVersion::Current => "current",
        }
    }
}

impl fmt::Display for PresetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PresetVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(PresetVersion::Legacy),
            "current" => Ok(PresetVersion::Current),
            other => Err(format!("unknown preset '{other}' (expected current or legacy)")),
        }
    }
}

/// One built-in report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPreset {
    pub name: &'static str,
    pub description: &'static str,
    pub labels: &'static str,
    pub columns: &'static str,
    pub filter: String,
    pub sort: String,
}

impl ReportPreset {
    fn main(name: &'static str, description: &'static str, filter: String, sort: &str) -> Self {
        Self {
            name,
            description,
            labels: MAIN_LABELS,
            columns: MAIN_COLUMNS,
            filter,
            sort: sort.to_string(),
        }
    }
}

/// Returns the reports of a preset generation.
pub fn reports(version: PresetVersion) -> Vec<ReportPreset> {
    match version {
        PresetVersion::Current => current_reports(),
        PresetVersion::Legacy => legacy_reports(),
    }
}

fn current_reports() -> Vec<ReportPreset> {
    let started_or_pending = filter_started_or(FILTER_PENDING);
    vec![
        ReportPreset::main(
            "all",
            "All items, no filters applied",
            String::new(),
            &sort_by_status(SORT_MAIN),
        ),
        ReportPreset::main(
            "main",
            "Main report view. Does not show objectives.",
            format!("-obj and ({started_or_pending})"),
            &sort_by_status(SORT_MAIN),
        ),
        ReportPreset::main(
            "obj",
            "Tasks and their objectives",
            started_or_pending.clone(),
            &sort_by_status(SORT_OBJ),
        ),
        ReportPreset {
            labels: MODIFIED_LABELS,
            columns: MODIFIED_COLUMNS,
            ..ReportPreset::main(
                "modif",
                "All tasks not completed, most recently modified first",
                started_or_pending.clone(),
                &sort_by_status(SORT_MODIF),
            )
        },
        ReportPreset::main(
            "nosort",
            "All tasks not completed, unsorted",
            started_or_pending,
            "",
        ),
        ReportPreset::main(
            "sortdue",
            "Current tasks, sorted by due date",
            filter_curmin_with("due.not:"),
            SORT_DUE_H,
        ),
        ReportPreset::main(
            "sortsch",
            "Current tasks, sorted by schedule",
            filter_curmin_with("sch.not:"),
            SORT_SCH_L,
        ),
        ReportPreset::main(
            "sortest",
            "Current tasks displaying their estimated time to completion",
            filter_curmin_with("blkest.not:"),
            SORT_EST_H,
        ),
        ReportPreset::main(
            "sortpri",
            "Current tasks, sorted by ppri",
            filter_curmin_with("ppri.not:"),
            SORT_PRI_H,
        ),
        ReportPreset::main(
            "sortg",
            "Current tasks, sorted by gcode",
            filter_curmin_with("gcode.not:"),
            SORT_GCODE,
        ),
        ReportPreset::main(
            "wkdone",
            "Completed tasks within last week",
            filter_done_since("-1wk"),
            SORT_DONE,
        ),
        ReportPreset::main(
            "2wkdone",
            "Completed tasks within last 2 weeks",
            filter_done_since("-2wk"),
            SORT_DONE,
        ),
        ReportPreset::main(
            "modone",
            "Completed tasks within last month",
            filter_done_since("-1mo"),
            SORT_DONE,
        ),
        ReportPreset::main(
            "3modone",
            "Completed tasks within last 3 months",
            filter_done_since("-3mo"),
            SORT_DONE,
        ),
        ReportPreset::main(
            "alldone",
            "Completed tasks",
            filter_started_or("(status:completed)"),
            SORT_DONE,
        ),
        ReportPreset::main(
            "delmin",
            "Deleted tasks",
            "status:deleted".to_string(),
            SORT_MAIN,
        ),
    ]
}

fn legacy_reports() -> Vec<ReportPreset> {
    let started_or_pending = filter_started_or(FILTER_PENDING);
    vec![
        ReportPreset::main(
            "curmin",
            "Current tasks in minimum entry style",
            filter_curmin(),
            legacy::SORT_TMPL1,
        ),
        ReportPreset::main(
            "invmin",
            "Current tasks including ones marked +inv",
            filter_started_or(&format!("({FILTER_PENDING} and +inv)")),
            legacy::SORT_TMPL1,
        ),
        ReportPreset::main(
            "armin",
            "Current tasks including ones marked +ar",
            filter_started_or(&format!("({FILTER_PENDING} and +ar)")),
            legacy::SORT_TMPL1,
        ),
        ReportPreset::main(
            "allmin",
            "All tasks (no filters) in minimum entry style",
            String::new(),
            &sort_by_status(legacy::SORT_TMPL1),
        ),
        ReportPreset::main(
            "allcur",
            "All tasks not completed, in minimum entry style",
            started_or_pending.clone(),
            &sort_by_status(legacy::SORT_TMPL1),
        ),
        ReportPreset::main(
            "nosort",
            "All tasks not completed, unsorted",
            started_or_pending,
            "",
        ),
        ReportPreset::main(
            "sortdue",
            "Current tasks, sorted by due date",
            filter_curmin_with("due.not:"),
            legacy::SORT_DUE_H,
        ),
        ReportPreset::main(
            "sortest",
            "Current tasks displaying their estimated time to completion",
            filter_curmin_with("blkest.not:"),
            legacy::SORT_EST_H,
        ),
        ReportPreset::main(
            "sortpri",
            "Current tasks, sorted by ppri",
            filter_curmin_with("ppri.not:"),
            legacy::SORT_PRI_H,
        ),
        ReportPreset::main(
            "wkdone",
            "Completed tasks within last week",
            filter_done_since("-1wk"),
            legacy::SORT_DONE,
        ),
        ReportPreset::main(
            "2wkdone",
            "Completed tasks within last 2 weeks",
            filter_done_since("-2wk"),
            legacy::SORT_DONE,
        ),
        ReportPreset::main(
            "modone",
            "Completed tasks within last month",
            filter_done_since("-1mo"),
            legacy::SORT_DONE,
        ),
        ReportPreset::main(
            "3modone",
            "Completed tasks within last 3 months",
            filter_done_since("-3mo"),
            legacy::SORT_DONE,
        ),
        ReportPreset::main(
            "alldone",
            "Completed tasks",
            filter_started_or("(status:completed)"),
            legacy::SORT_DONE,
        ),
        ReportPreset::main(
            "delmin",
            "Deleted tasks",
            "status:deleted".to_string(),
            legacy::SORT_TMPL1,
        ),
        ReportPreset {
            labels: TAG_LABELS,
            columns: TAG_COLUMNS,
            ..ReportPreset::main(
                "tagmin",
                "Minimal details of tasks with tags",
                "status:pending or status:waiting or status:completed".to_string(),
                "end-/,modified-/,tags-/,project+/,description+",
            )
        },
    ]
}

/// Builds the configuration of a preset generation: UDAs, date format and reports.
pub fn taskrc(version: PresetVersion) -> Taskrc {
    let mut rc = Taskrc::new();
    for (key, value) in UDAS {
        rc.set(*key, *value);
    }
    rc.set("dateformat", DATE_FORMAT);

    for report in reports(version) {
        let prefix = format!("report.{}", report.name);
        rc.set(format!("{prefix}.labels"), report.labels);
        rc.set(format!("{prefix}.columns"), report.columns);
        rc.set(format!("{prefix}.description"), report.description);
        rc.set(format!("{prefix}.filter"), report.filter);
        rc.set(format!("{prefix}.sort"), report.sort);
    }
    rc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportCatalog;

    #[test]
    fn test_current_reports_build() {
        let catalog = ReportCatalog::load(&taskrc(PresetVersion::Current)).unwrap();
        let names: Vec<_> = catalog.iter().map(|r| r.name()).collect();
        for expected in ["all", "main", "obj", "modif", "sortsch", "sortg", "delmin"] {
            assert!(names.contains(&expected), "missing {expected}");
        }
        assert_eq!(catalog.len(), 16);
        assert_eq!(catalog.date_format(), DATE_FORMAT);
    }

    #[test]
    fn test_legacy_reports_build() {
        let catalog = ReportCatalog::load(&taskrc(PresetVersion::Legacy)).unwrap();
        assert_eq!(catalog.len(), 16);
        assert!(catalog.get("curmin").is_ok());
        assert!(catalog.get("tagmin").is_ok());
        assert!(catalog.get("main").is_err());
    }

    #[test]
    fn test_modif_has_modified_column() {
        let catalog = ReportCatalog::load(&taskrc(PresetVersion::Current)).unwrap();
        let modif = catalog.get("modif").unwrap();
        assert_eq!(modif.labels()[2], "Modified");
        assert_eq!(modif.columns().len(), 13);
    }

    #[test]
    fn test_sort_breaks_follow_markers() {
        let catalog = ReportCatalog::load(&taskrc(PresetVersion::Current)).unwrap();
        let main = catalog.get("main").unwrap();
        let keys = main.sort().keys();
        assert_eq!(keys[0].attribute, "status");
        assert!(keys[0].is_break);
        let last = keys.last().unwrap();
        assert_eq!(last.attribute, "description");
        assert!(!last.is_break);
    }

    #[test]
    fn test_filter_composition() {
        assert_eq!(
            filter_curmin_with("due.not:"),
            "start.not: or ((-inv and -ar) and (status:pending or status:waiting) and due.not:)"
        );
        assert_eq!(
            filter_done_since("-1wk"),
            "start.not: or (status:completed and end.after:now-1wk)"
        );
    }

    #[test]
    fn test_priority_gains_z() {
        let catalog = ReportCatalog::load(&taskrc(PresetVersion::Current)).unwrap();
        let priority = catalog.schema().resolve("priority").unwrap();
        assert_eq!(priority.values, ["H", "M", "L", "Z"]);
    }

    #[test]
    fn test_preset_version_from_str() {
        assert_eq!("Legacy".parse::<PresetVersion>(), Ok(PresetVersion::Legacy));
        assert!("next".parse::<PresetVersion>().is_err());
    }
}
