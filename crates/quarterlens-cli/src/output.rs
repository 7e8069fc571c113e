//! Dashboard output
//!
//! Rendering is kept apart from printing so the layout can be checked in
//! tests without a terminal.

use crate::spinner;
use quarterlens_results::{Dashboard, QuarterlyReport, TableStyle, render_table};

/// Heading, results table and charts for a loaded report
pub fn render_report(report: &QuarterlyReport) -> String {
    let mut out = format!("\n{} · {}\n\n", report.symbol, report.source);
    out.push_str(&render_table(&report.quarters, TableStyle::Boxed));
    out.push('\n');

    for (_, chart) in &report.charts {
        out.push('\n');
        out.push_str(&chart.to_string());
    }
    out
}

pub fn render_commentary(text: &str) -> String {
    format!("\nAI Analysis\n===========\n\n{text}\n")
}

/// Run one query and print it
///
/// Both a failed fetch and a failed AI step are returned to the caller. The
/// table is printed before the AI step starts, so it stays on screen when
/// generation fails.
pub async fn show(
    dashboard: &Dashboard,
    symbol: &str,
    ai_warning: Option<&str>,
) -> quarterlens_results::Result<()> {
    let report = spinner::spin(
        format!("Fetching quarterly results for {}...", symbol.trim()),
        dashboard.load(symbol),
    )
    .await?;

    println!("{}", render_report(&report));

    if !dashboard.has_commentator() {
        if let Some(warning) = ai_warning {
            println!("{warning}\n");
        }
        return Ok(());
    }

    let commentary =
        spinner::spin("Generating AI analysis...", dashboard.commentary(&report)).await?;
    if let Some(text) = commentary {
        println!("{}", render_commentary(&text));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quarterlens_llm::LLMError;
    use quarterlens_results::{
        ErrorKind, FieldMap, FinancialDataSource, Metric, RawQuarterlyData, RenderedChart,
        ResultSet, ResultsError, TerminalChartRenderer, TextGenerationService,
    };
    use serde_json::json;
    use std::sync::Arc;

    struct OneQuarter;

    #[async_trait]
    impl FinancialDataSource for OneQuarter {
        async fn fetch_quarterly(
            &self,
            _symbol: &str,
        ) -> quarterlens_results::Result<RawQuarterlyData> {
            Ok(RawQuarterlyData {
                financials: vec![json!({"quarter": "Q1", "sales": 100, "operatingProfit": 20})],
                earnings: Vec::new(),
            })
        }

        fn field_map(&self) -> FieldMap {
            FieldMap::identity()
        }

        fn name(&self) -> &'static str {
            "Fixture"
        }
    }

    struct Unauthorized;

    #[async_trait]
    impl TextGenerationService for Unauthorized {
        async fn generate(&self, _prompt: &str) -> quarterlens_results::Result<String> {
            Err(ResultsError::Ai(LLMError::AuthenticationFailed))
        }
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(Arc::new(OneQuarter), Arc::new(TerminalChartRenderer::new(40, 10)))
            .with_charts(false)
    }

    fn report(charts: Vec<(Metric, RenderedChart)>) -> QuarterlyReport {
        QuarterlyReport {
            symbol: "TCS.NS".to_string(),
            source: "Yahoo Finance",
            quarters: ResultSet::default(),
            charts,
        }
    }

    #[test]
    fn test_render_report_heading() {
        let text = render_report(&report(Vec::new()));
        assert!(text.starts_with("\nTCS.NS · Yahoo Finance\n\n"));
        assert!(text.contains("Quarter"));
    }

    #[test]
    fn test_render_report_includes_charts_in_order() {
        let chart = |title: &str| RenderedChart {
            title: title.to_string(),
            lines: vec![format!("[{title}]")],
            legend: vec!["1 2024-03-31".to_string()],
        };
        let text = render_report(&report(vec![
            (Metric::Sales, chart("Sales")),
            (Metric::Eps, chart("EPS")),
        ]));

        let sales = text.find("[Sales]").unwrap();
        let eps = text.find("[EPS]").unwrap();
        assert!(sales < eps);
        assert!(text.contains("1 2024-03-31"));
    }

    #[test]
    fn test_render_commentary() {
        assert_eq!(
            render_commentary("Sales grew."),
            "\nAI Analysis\n===========\n\nSales grew.\n"
        );
    }

    #[tokio::test]
    async fn test_show_returns_ai_failure() {
        let dashboard = dashboard().with_commentator(Arc::new(Unauthorized));
        let err = show(&dashboard, "tcs.ns", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AiFailure);
    }

    #[tokio::test]
    async fn test_show_without_commentator_succeeds() {
        assert!(show(&dashboard(), "tcs.ns", Some("no key")).await.is_ok());
    }
}
