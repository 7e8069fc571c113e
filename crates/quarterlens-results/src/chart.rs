//! Line charts for metric series
//!
//! [`TerminalChartRenderer`] draws a ratatui [`Chart`] into an off-screen
//! buffer and returns the cells as text, so the same chart works in a
//! terminal session, a pipe or a test assertion.

use crate::config::ChartConfig;
use crate::error::{Result, ResultsError};
use crate::format::{compact, group_thousands};
use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::Rect;
use ratatui::symbols::Marker;
use ratatui::widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, Widget};
use std::fmt;

/// A rendered chart with its period legend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedChart {
    pub title: String,
    /// Plot rows, trailing whitespace trimmed
    pub lines: Vec<String>,
    /// One entry per period: index, label and value
    pub legend: Vec<String>,
}

impl fmt::Display for RenderedChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines.iter().chain(&self.legend) {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Renders a labelled numeric series as a line chart
#[cfg_attr(test, mockall::automock)]
pub trait ChartRenderer: Send + Sync {
    /// Render `y_values` against `x_labels`; absent values are left out of the line
    fn render_series(
        &self,
        x_labels: &[String],
        y_values: &[Option<f64>],
        title: &str,
    ) -> Result<RenderedChart>;
}

/// Braille line charts sized in terminal cells
#[derive(Debug, Clone, Copy)]
pub struct TerminalChartRenderer {
    width: u16,
    height: u16,
}

impl TerminalChartRenderer {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl Default for TerminalChartRenderer {
    fn default() -> Self {
        ChartConfig::default().into()
    }
}

impl From<ChartConfig> for TerminalChartRenderer {
    fn from(config: ChartConfig) -> Self {
        Self::new(config.width, config.height)
    }
}

impl ChartRenderer for TerminalChartRenderer {
    fn render_series(
        &self,
        x_labels: &[String],
        y_values: &[Option<f64>],
        title: &str,
    ) -> Result<RenderedChart> {
        if x_labels.len() != y_values.len() {
            return Err(ResultsError::Chart(format!(
                "{} labels for {} values",
                x_labels.len(),
                y_values.len()
            )));
        }

        let points: Vec<(f64, f64)> = y_values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.filter(|v| v.is_finite()).map(|v| (i as f64, v)))
            .collect();
        if points.is_empty() {
            return Err(ResultsError::Chart(format!("no values to plot for {title}")));
        }

        let (low, high) = y_bounds(&points);
        let x_max = (x_labels.len().saturating_sub(1)).max(1) as f64;
        let graph_type = if points.len() == 1 {
            GraphType::Scatter
        } else {
            GraphType::Line
        };

        let first = x_labels.first().cloned().unwrap_or_default();
        let last = x_labels.last().cloned().unwrap_or_default();
        let x_axis_labels = if x_labels.len() > 1 {
            vec![first, last]
        } else {
            vec![first]
        };

        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(graph_type)
            .data(&points);
        let chart = Chart::new(vec![dataset])
            .block(
                Block::default()
                    .title(format!(" {title} "))
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            )
            .x_axis(Axis::default().bounds([0.0, x_max]).labels(x_axis_labels))
            .y_axis(
                Axis::default()
                    .bounds([low, high])
                    .labels([compact(low), compact(high)]),
            )
            .legend_position(None);

        let area = Rect::new(0, 0, self.width, self.height);
        let mut buffer = Buffer::empty(area);
        chart.render(area, &mut buffer);

        let legend = x_labels
            .iter()
            .zip(y_values)
            .enumerate()
            .map(|(i, (label, value))| {
                let value = value.map_or_else(|| "N/A".to_string(), |v| group_thousands(v, 2));
                format!("{:>3}. {label:<12} {value:>20}", i + 1)
            })
            .collect();

        Ok(RenderedChart {
            title: title.to_string(),
            lines: buffer_lines(&buffer, area),
            legend,
        })
    }
}

fn y_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    let (low, high) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| {
            (lo.min(*y), hi.max(*y))
        });
    if (high - low).abs() < f64::EPSILON {
        let pad = if low == 0.0 { 1.0 } else { low.abs() * 0.1 };
        (low - pad, high + pad)
    } else {
        (low, high)
    }
}

fn buffer_lines(buffer: &Buffer, area: Rect) -> Vec<String> {
    (area.top()..area.bottom())
        .map(|y| {
            let line: String = (area.left()..area.right())
                .map(|x| buffer.cell((x, y)).map_or(" ", Cell::symbol))
                .collect();
            line.trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (1..=n).map(|q| format!("2024-Q{q}")).collect()
    }

    fn is_braille(c: char) -> bool {
        ('\u{2800}'..='\u{28FF}').contains(&c)
    }

    #[test]
    fn test_render_line_chart() {
        let renderer = TerminalChartRenderer::new(60, 14);
        let chart = renderer
            .render_series(
                &labels(4),
                &[Some(100.0), Some(150.0), None, Some(120.0)],
                "Sales",
            )
            .unwrap();

        assert_eq!(chart.lines.len(), 14);
        assert!(chart.lines[0].contains("Sales"));
        assert!(chart.lines.iter().any(|l| l.chars().any(is_braille)));
        assert!(chart.lines.iter().any(|l| l.contains("2024-Q1")));
        assert_eq!(chart.legend.len(), 4);
        assert!(chart.legend[2].contains("N/A"));
        assert!(chart.legend[1].contains("150.00"));

        let text = chart.to_string();
        assert_eq!(text.lines().count(), 18);
    }

    #[test]
    fn test_single_point_chart() {
        let chart = TerminalChartRenderer::default()
            .render_series(&labels(1), &[Some(5.0)], "EPS")
            .unwrap();
        assert!(chart.lines[0].contains("EPS"));
        assert_eq!(chart.legend.len(), 1);
    }

    #[test]
    fn test_length_mismatch_is_error() {
        let err = TerminalChartRenderer::default()
            .render_series(&labels(2), &[Some(1.0)], "Sales")
            .unwrap_err();
        assert!(matches!(err, ResultsError::Chart(_)));
    }

    #[test]
    fn test_all_absent_is_error() {
        let err = TerminalChartRenderer::default()
            .render_series(&labels(2), &[None, None], "OPM%")
            .unwrap_err();
        assert!(matches!(err, ResultsError::Chart(_)));
    }

    #[test]
    fn test_flat_series_bounds() {
        assert_eq!(y_bounds(&[(0.0, 0.0), (1.0, 0.0)]), (-1.0, 1.0));
        assert_eq!(y_bounds(&[(0.0, 50.0)]), (45.0, 55.0));
        assert_eq!(y_bounds(&[(0.0, 1.0), (1.0, 3.0)]), (1.0, 3.0));
    }
}
