//! The per-query pipeline: fetch, normalize, chart, comment
//!
//! Steps run strictly in sequence and a failed step stops the later ones.
//! Nothing is kept between queries.

use crate::chart::{ChartRenderer, RenderedChart, TerminalChartRenderer};
use crate::commentary::{LlmCommentator, TextGenerationService};
use crate::config::ResultsConfig;
use crate::error::{Result, ResultsError};
use crate::model::{Metric, ResultSet};
use crate::normalize::{DEFAULT_MAX_QUARTERS, ResultNormalizer};
use crate::prompts::PromptBuilder;
use crate::source::{FinancialDataSource, build_source};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

const MAX_SYMBOL_LEN: usize = 20;

/// Everything shown for one symbol
#[derive(Debug, Clone, Serialize)]
pub struct QuarterlyReport {
    pub symbol: String,
    pub source: &'static str,
    pub quarters: ResultSet,
    /// One chart per metric that has at least one value
    #[serde(skip)]
    pub charts: Vec<(Metric, RenderedChart)>,
}

impl QuarterlyReport {
    /// Pretty JSON of the symbol, source and quarters
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Quarterly results dashboard
pub struct Dashboard {
    source: Arc<dyn FinancialDataSource>,
    renderer: Arc<dyn ChartRenderer>,
    commentator: Option<Arc<dyn TextGenerationService>>,
    prompts: PromptBuilder,
    max_quarters: usize,
    charts_enabled: bool,
}

impl Dashboard {
    pub fn new(source: Arc<dyn FinancialDataSource>, renderer: Arc<dyn ChartRenderer>) -> Self {
        Self {
            source,
            renderer,
            commentator: None,
            prompts: PromptBuilder::new(),
            max_quarters: DEFAULT_MAX_QUARTERS,
            charts_enabled: true,
        }
    }

    /// Wire the source, renderer and commentator named by the configuration
    pub fn from_config(config: &ResultsConfig) -> Result<Self> {
        config.validate()?;
        let prompts = PromptBuilder::new();
        let commentator = LlmCommentator::from_config(&config.ai)?
            .map(|c| Arc::new(c.with_system(prompts.system_prompt())) as Arc<dyn TextGenerationService>);
        if commentator.is_none() {
            info!("No AI API key configured, AI analysis disabled");
        }

        let mut dashboard = Self::new(
            build_source(config)?,
            Arc::new(TerminalChartRenderer::from(config.charts)),
        )
        .with_max_quarters(config.max_quarters)
        .with_charts(config.charts.enabled);
        dashboard.commentator = commentator;
        Ok(dashboard)
    }

    pub fn with_commentator(mut self, commentator: Arc<dyn TextGenerationService>) -> Self {
        self.commentator = Some(commentator);
        self
    }

    pub fn with_max_quarters(mut self, max_quarters: usize) -> Self {
        self.max_quarters = max_quarters;
        self
    }

    pub fn with_charts(mut self, enabled: bool) -> Self {
        self.charts_enabled = enabled;
        self
    }

    /// Whether AI analysis will run
    pub fn has_commentator(&self) -> bool {
        self.commentator.is_some()
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Fetch and normalize the results for `symbol` and draw its charts
    ///
    /// An empty result set is reported as [`ResultsError::DataUnavailable`].
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn load(&self, symbol: &str) -> Result<QuarterlyReport> {
        let symbol = validate_symbol(symbol)?;
        let raw = self.source.fetch_quarterly(&symbol).await?;

        let quarters = ResultNormalizer::new(self.source.field_map())
            .with_max_quarters(self.max_quarters)
            .normalize(raw.sources());
        if quarters.is_empty() {
            return Err(ResultsError::DataUnavailable { symbol });
        }
        info!(symbol = %symbol, quarters = quarters.len(), "Normalized quarterly results");

        let charts = if self.charts_enabled {
            self.render_charts(&quarters)?
        } else {
            Vec::new()
        };

        Ok(QuarterlyReport {
            symbol,
            source: self.source.name(),
            quarters,
            charts,
        })
    }

    /// The prompt that would be sent for `report`
    pub fn prompt(&self, report: &QuarterlyReport) -> Result<String> {
        self.prompts.build(&report.symbol, &report.quarters)
    }

    /// AI commentary on a loaded report; `None` when no credential is configured
    #[instrument(skip(self, report), fields(symbol = %report.symbol))]
    pub async fn commentary(&self, report: &QuarterlyReport) -> Result<Option<String>> {
        let Some(commentator) = &self.commentator else {
            return Ok(None);
        };
        let prompt = self.prompt(report)?;
        commentator.generate(&prompt).await.map(Some)
    }

    fn render_charts(&self, quarters: &ResultSet) -> Result<Vec<(Metric, RenderedChart)>> {
        let labels = quarters.quarters();
        Metric::ALL
            .into_iter()
            .filter(|metric| quarters.has_metric(*metric))
            .map(|metric| {
                let chart =
                    self.renderer
                        .render_series(&labels, &quarters.series(metric), metric.label())?;
                Ok((metric, chart))
            })
            .collect()
    }
}

/// Trim and upper-case a ticker, rejecting anything that cannot be one
pub fn validate_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim();
    if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN {
        return Err(ResultsError::InvalidSymbol(symbol.to_string()));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=' | '&' | '_'))
    {
        return Err(ResultsError::InvalidSymbol(symbol.to_string()));
    }
    Ok(symbol.to_ascii_uppercase())
}
