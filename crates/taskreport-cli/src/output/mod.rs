//! Output formatting for the trep CLI.
//!
//! Every command renders either a plain or colored table or pretty JSON:
//!
//! - [`report`] - report runs
//! - [`catalog`] - report lists, report definitions and the attribute schema
//! - [`helpers`] - column layout and styling shared by the tables

mod catalog;
pub mod helpers;
mod report;

pub use catalog::{
    format_attributes_json, format_attributes_table, format_report_details_json,
    format_report_details_table, format_reports_json, format_reports_table,
};
pub use report::{format_report_json, format_report_table};
