//! Tabular rendering of a result set

use crate::format::{MISSING, format_value, group_thousands};
use crate::model::{Metric, ResultSet};
use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL};
use comfy_table::{CellAlignment, ContentArrangement, Table};
use serde_json::Value;
use std::collections::BTreeSet;

/// Table look
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableStyle {
    /// Box-drawing borders for the terminal
    #[default]
    Boxed,
    /// Markdown pipes, used inside prompts
    Plain,
}

/// Render one row per quarter with the five metric columns
///
/// Pass-through fields follow the metrics, one column per key seen in any
/// quarter, in key order.
pub fn render_table(results: &ResultSet, style: TableStyle) -> String {
    let mut table = Table::new();
    table
        .load_preset(match style {
            TableStyle::Boxed => UTF8_FULL,
            TableStyle::Plain => ASCII_MARKDOWN,
        })
        .set_content_arrangement(ContentArrangement::Disabled);

    let extra_keys: BTreeSet<&str> = results
        .iter()
        .flat_map(|r| r.extra.keys().map(String::as_str))
        .collect();

    let mut header: Vec<&str> = vec!["Quarter"];
    header.extend(Metric::ALL.iter().map(|m| m.label()));
    header.extend(extra_keys.iter().copied());
    table.set_header(header);

    for record in results {
        let mut row = vec![record.quarter.clone()];
        row.extend(
            Metric::ALL
                .iter()
                .map(|m| format_value(record.value(*m), m.decimals())),
        );
        row.extend(extra_keys.iter().map(|k| format_extra(record.extra.get(*k))));
        table.add_row(row);
    }

    for index in 1..=Metric::ALL.len() {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    table.to_string()
}

fn format_extra(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING.to_string(),
        Some(Value::Number(n)) => n.as_f64().map_or_else(
            || n.to_string(),
            |v| group_thousands(v, if n.is_f64() { 2 } else { 0 }),
        ),
        Some(Value::String(s)) if s.trim().is_empty() => MISSING.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{FieldMap, normalize};
    use serde_json::json;

    fn sample() -> ResultSet {
        normalize(
            &[
                json!({"quarter": "Mar 2024", "sales": 1_234_567, "operatingProfit": 123_456.7}),
                json!({"quarter": "Jun 2024", "sales": 0, "eps": 12.5}),
            ],
            &FieldMap::identity(),
        )
    }

    #[test]
    fn test_plain_table() {
        let text = render_table(&sample(), TableStyle::Plain);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Quarter"));
        assert!(lines[0].contains("OPM%"));
        assert!(lines[2].contains("Mar 2024"));
        assert!(lines[2].contains("1,234,567"));
        assert!(lines[2].contains("10.00"));
        assert!(lines[3].contains("12.50"));
        assert_eq!(lines[3].matches("N/A").count(), 3);
    }

    #[test]
    fn test_boxed_table_has_borders() {
        let text = render_table(&sample(), TableStyle::Boxed);
        assert!(text.contains('│'));
        assert!(text.contains("Net Profit"));
    }

    #[test]
    fn test_pass_through_columns() {
        let results = normalize(
            &[
                json!({"Quarter": "2024-03-31", "Total Revenue": 900, "Revenue": 1_250_000, "Basic EPS": 2.5}),
                json!({"Quarter": "2024-06-30", "Total Revenue": 950, "currencyCode": "INR"}),
            ],
            &FieldMap::yahoo(),
        );

        let text = render_table(&results, TableStyle::Plain);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].contains("Basic EPS"));
        assert!(lines[0].contains("Sales (Earnings Tab)"));
        assert!(lines[0].contains("currencyCode"));
        assert!(lines[2].contains("2.50"));
        assert!(lines[2].contains("1,250,000"));
        assert!(lines[3].contains("INR"));
        assert_eq!(lines[3].matches("N/A").count(), 6);

        let boxed = render_table(&results, TableStyle::Boxed);
        assert!(boxed.contains("currencyCode"));
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let text = render_table(&ResultSet::default(), TableStyle::Plain);
        assert!(text.contains("EPS"));
        assert!(!text.contains("N/A"));
    }
}
