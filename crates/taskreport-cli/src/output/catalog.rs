//! Report catalog and schema output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;
use taskreport_core::format::truncate_str;
use taskreport_core::{AttributeDef, ReportDefinition};

use super::helpers::{column_widths, count_noun, dim, format_header, format_row};

/// Maximum width of report descriptions in the reports table.
const DESCRIPTION_WIDTH: usize = 60;

/// JSON output structure for the reports command.
#[derive(Serialize)]
pub struct ReportsListOutput<'a> {
    pub reports: Vec<ReportSummary<'a>>,
}

/// JSON output structure for one report in a list.
#[derive(Serialize)]
pub struct ReportSummary<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub columns: usize,
}

/// Formats the report list as JSON.
pub fn format_reports_json(reports: &[&ReportDefinition]) -> Result<String, serde_json::Error> {
    let output = ReportsListOutput {
        reports: reports
            .iter()
            .map(|r| ReportSummary {
                name: r.name(),
                description: r.description(),
                columns: r.columns().len(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats the report list as a table.
pub fn format_reports_table(reports: &[&ReportDefinition], use_colors: bool) -> String {
    if reports.is_empty() {
        return "No reports defined.\n".to_string();
    }

    let labels = vec!["Report".to_string(), "Description".to_string()];
    let rows: Vec<Vec<String>> = reports
        .iter()
        .map(|r| {
            vec![
                r.name().to_string(),
                truncate_str(r.description(), DESCRIPTION_WIDTH),
            ]
        })
        .collect();
    let widths = column_widths(&labels, rows.iter().map(Vec::as_slice));

    let mut out = format_header(&labels, &widths, use_colors);
    for row in &rows {
        out.push_str(&format_row(row, &widths));
    }
    out.push('\n');
    out.push_str(&dim(&count_noun(reports.len(), "report"), use_colors));
    out.push('\n');
    out
}

/// JSON output structure for the show command.
#[derive(Serialize)]
pub struct ReportDetailsOutput<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub filter: &'a str,
    pub sort: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<&'a str>,
    pub columns: Vec<ColumnOutput<'a>>,
}

/// JSON output structure for one report column.
#[derive(Serialize)]
pub struct ColumnOutput<'a> {
    pub label: &'a str,
    pub column: String,
    pub attribute: &'a str,
    pub format: &'static str,
}

/// Formats a report definition as JSON.
pub fn format_report_details_json(report: &ReportDefinition) -> Result<String, serde_json::Error> {
    let output = ReportDetailsOutput {
        name: report.name(),
        description: report.description(),
        filter: report.filter_text(),
        sort: report.sort().to_string(),
        date_format: report.date_format(),
        columns: report
            .labels()
            .iter()
            .zip(report.columns())
            .map(|(label, column)| ColumnOutput {
                label,
                column: column.spec(),
                attribute: &column.attribute,
                format: column.format.name(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats a report definition for humans.
pub fn format_report_details_table(
    report: &ReportDefinition,
    global_date_format: &str,
    use_colors: bool,
) -> String {
    let mut out = String::new();

    let title = format!("Report: {}", report.name());
    if use_colors {
        out.push_str(&format!("{}\n", title.bold()));
    } else {
        out.push_str(&title);
        out.push('\n');
    }

    if !report.description().is_empty() {
        out.push_str(&format!("Description: {}\n", report.description()));
    }

    let filter = match report.filter_text().trim() {
        "" => dim("(none)", use_colors),
        text => text.to_string(),
    };
    out.push_str(&format!("Filter: {filter}\n"));

    let sort = if report.sort().is_empty() {
        dim("(unsorted)", use_colors)
    } else {
        report.sort().to_string()
    };
    out.push_str(&format!("Sort: {sort}\n"));

    let date_format = match report.date_format() {
        Some(format) => format.to_string(),
        None => format!("{global_date_format} {}", dim("(global)", use_colors)),
    };
    out.push_str(&format!("Date format: {date_format}\n"));

    out.push_str("\nColumns:\n");
    let width = report
        .labels()
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    for (label, column) in report.labels().iter().zip(report.columns()) {
        out.push_str(&format!("  {label:<width$}  {}\n", column.spec()));
    }

    out
}

/// JSON output structure for the udas command.
#[derive(Serialize)]
pub struct AttributesListOutput<'a> {
    pub attributes: Vec<AttributeOutput<'a>>,
}

/// JSON output structure for one attribute.
#[derive(Serialize)]
pub struct AttributeOutput<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "no_values")]
    pub values: &'a [String],
    pub builtin: bool,
}

fn no_values(values: &&[String]) -> bool {
    values.is_empty()
}

/// Formats the attribute schema as JSON.
pub fn format_attributes_json(attributes: &[&AttributeDef]) -> Result<String, serde_json::Error> {
    let output = AttributesListOutput {
        attributes: attributes
            .iter()
            .map(|a| AttributeOutput {
                name: &a.name,
                kind: a.kind.to_string(),
                label: &a.label,
                default: a.default.as_ref().map(ToString::to_string),
                values: &a.values,
                builtin: a.builtin,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats the attribute schema as a table.
pub fn format_attributes_table(attributes: &[&AttributeDef], use_colors: bool) -> String {
    let labels: Vec<String> = ["Name", "Type", "Label", "Default", "Values", "UDA"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows: Vec<Vec<String>> = attributes
        .iter()
        .map(|a| {
            vec![
                a.name.clone(),
                a.kind.to_string(),
                a.label.clone(),
                a.default.as_ref().map(ToString::to_string).unwrap_or_default(),
                a.values.join(","),
                if a.builtin { String::new() } else { "*".to_string() },
            ]
        })
        .collect();
    let widths = column_widths(&labels, rows.iter().map(Vec::as_slice));

    let mut out = format_header(&labels, &widths, use_colors);
    for row in &rows {
        out.push_str(&format_row(row, &widths));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskreport_core::{presets, PresetVersion, ReportCatalog};

    fn catalog() -> ReportCatalog {
        ReportCatalog::load(&presets::taskrc(PresetVersion::Current)).unwrap()
    }

    #[test]
    fn test_reports_table_lists_every_report() {
        let catalog = catalog();
        let reports: Vec<_> = catalog.iter().collect();
        let table = format_reports_table(&reports, false);
        assert!(table.starts_with("Report"));
        assert!(table.contains("sortdue"));
        assert!(table.contains("Main report view"));
        assert!(table.ends_with("16 reports\n"));
    }

    #[test]
    fn test_reports_json() {
        let catalog = catalog();
        let reports: Vec<_> = catalog.iter().collect();
        let value: serde_json::Value =
            serde_json::from_str(&format_reports_json(&reports).unwrap()).unwrap();
        let names: Vec<&str> = value["reports"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"main"));
        assert_eq!(names.len(), 16);
    }

    #[test]
    fn test_report_details_table() {
        let catalog = catalog();
        let report = catalog.get("sortdue").unwrap();
        let text = format_report_details_table(report, catalog.date_format(), false);
        assert!(text.starts_with("Report: sortdue\n"));
        assert!(text.contains("Filter: start.not: or"));
        assert!(text.contains("Sort: end+/,start+/"));
        assert!(text.contains("Date format: yMD-WVa (global)"));
        assert!(text.contains("uuid.short"));
    }

    #[test]
    fn test_unsorted_report_details() {
        let catalog = catalog();
        let report = catalog.get("nosort").unwrap();
        let text = format_report_details_table(report, catalog.date_format(), false);
        assert!(text.contains("Sort: (unsorted)"));
    }

    #[test]
    fn test_report_details_json() {
        let catalog = catalog();
        let report = catalog.get("main").unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&format_report_details_json(report).unwrap()).unwrap();
        assert_eq!(value["name"], "main");
        assert_eq!(value["columns"][0]["label"], "UUID");
        assert_eq!(value["columns"][0]["column"], "uuid.short");
        assert_eq!(value["columns"][0]["format"], "short");
        assert!(value.get("date_format").is_none());
    }

    #[test]
    fn test_attributes_table_marks_udas() {
        let catalog = catalog();
        let attributes: Vec<_> = catalog.schema().iter().collect();
        let table = format_attributes_table(&attributes, false);
        let gcode = table
            .lines()
            .find(|l| l.starts_with("gcode "))
            .unwrap();
        assert!(gcode.ends_with('*'));
        let project = table
            .lines()
            .find(|l| l.starts_with("project "))
            .unwrap();
        assert!(!project.ends_with('*'));
    }

    #[test]
    fn test_attributes_json() {
        let catalog = catalog();
        let attributes: Vec<_> = catalog.schema().iter().collect();
        let value: serde_json::Value =
            serde_json::from_str(&format_attributes_json(&attributes).unwrap()).unwrap();
        let etag = value["attributes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|a| a["name"] == "etag")
            .unwrap();
        assert_eq!(etag["type"], "string");
        assert_eq!(etag["default"], "EVNT");
        assert_eq!(etag["builtin"], false);
    }
}
