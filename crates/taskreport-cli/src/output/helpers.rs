//! Common helper functions for table output.

use owo_colors::OwoColorize;

/// Separator between table columns.
pub const COLUMN_GAP: &str = " ";

/// Display width of a cell line, counted in characters.
pub fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Width of a possibly multi-line cell: its widest line.
pub fn cell_width(cell: &str) -> usize {
    cell.lines().map(text_width).max().unwrap_or(0)
}

/// Pads `s` with spaces to `width` characters.
pub fn pad(s: &str, width: usize) -> String {
    format!("{s:<width$}")
}

/// Computes column widths from the labels and every row.
pub fn column_widths<'a>(
    labels: &[String],
    rows: impl IntoIterator<Item = &'a [String]>,
) -> Vec<usize> {
    let mut widths: Vec<usize> = labels.iter().map(|l| text_width(l)).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell_width(cell));
            }
        }
    }
    widths
}

/// Formats the header line. Colored headers are underlined; plain headers
/// get a dashed rule underneath.
pub fn format_header(labels: &[String], widths: &[usize], use_colors: bool) -> String {
    if use_colors {
        let line = labels
            .iter()
            .zip(widths)
            .map(|(label, &width)| {
                let fill = width.saturating_sub(text_width(label));
                format!("{}{}", label.underline(), " ".repeat(fill))
            })
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);
        format!("{}\n", line.trim_end())
    } else {
        let line = join_padded(labels.iter().map(String::as_str), widths);
        let rules: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        let rule = join_padded(rules.iter().map(String::as_str), widths);
        format!("{line}\n{rule}\n")
    }
}

/// Pads each cell to its column width and joins them, trimming the line end.
pub fn join_padded<'a>(cells: impl IntoIterator<Item = &'a str>, widths: &[usize]) -> String {
    let line = cells
        .into_iter()
        .zip(widths)
        .map(|(cell, &width)| pad(cell, width))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    line.trim_end().to_string()
}

/// Lays out one row whose cells may span several lines.
pub fn format_row(cells: &[String], widths: &[usize]) -> String {
    let split: Vec<Vec<&str>> = cells.iter().map(|c| c.lines().collect()).collect();
    let height = split.iter().map(Vec::len).max().unwrap_or(0).max(1);

    let mut out = String::new();
    for line_idx in 0..height {
        let line = split
            .iter()
            .map(|lines| lines.get(line_idx).copied().unwrap_or(""));
        out.push_str(&join_padded(line, widths));
        out.push('\n');
    }
    out
}

/// "1 task", "3 tasks".
pub fn count_noun(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Dims `text` when colors are on.
pub fn dim(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_text_width_counts_chars() {
        assert_eq!(text_width("abc"), 3);
        assert_eq!(text_width("héllo"), 5);
        assert_eq!(text_width(""), 0);
    }

    #[test]
    fn test_cell_width_multiline() {
        assert_eq!(cell_width("short\n  a much longer line"), 20);
        assert_eq!(cell_width(""), 0);
    }

    #[test]
    fn test_column_widths() {
        let labels = strings(&["ID", "Description"]);
        let rows = [strings(&["12345", "x"]), strings(&["1", "y"])];
        let widths = column_widths(&labels, rows.iter().map(Vec::as_slice));
        assert_eq!(widths, vec![5, 11]);
    }

    #[test]
    fn test_plain_header_has_rule() {
        let labels = strings(&["ID", "Project"]);
        let header = format_header(&labels, &[4, 7], false);
        assert_eq!(header, "ID   Project\n---- -------\n");
    }

    #[test]
    fn test_format_row_trims_trailing_space() {
        let row = format_row(&strings(&["a", "b", ""]), &[3, 3, 3]);
        assert_eq!(row, "a   b\n");
    }

    #[test]
    fn test_format_row_multiline_cell() {
        let row = format_row(&strings(&["1", "task\n  note"]), &[2, 6]);
        assert_eq!(row, "1  task\n     note\n");
    }

    #[test]
    fn test_count_noun() {
        assert_eq!(count_noun(1, "task"), "1 task");
        assert_eq!(count_noun(0, "task"), "0 tasks");
        assert_eq!(count_noun(5, "report"), "5 reports");
    }

    #[test]
    fn test_dim_without_colors() {
        assert_eq!(dim("text", false), "text");
    }
}
