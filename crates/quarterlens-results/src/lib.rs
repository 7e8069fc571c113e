//! Quarterly results dashboard
//!
//! This crate fetches a company's recent quarterly results, shapes them into a
//! uniform table and feeds them to charts and an AI commentary step. It
//! includes:
//!
//! - Data fetching from two sources (Yahoo Finance fundamentals, Alpha Vantage)
//! - A normalizer that renames source fields, outer-merges statement and
//!   earnings feeds, keeps the most recent quarters and derives OPM%
//! - Table and terminal chart rendering
//! - Prompt construction and text generation through `quarterlens-llm`
//! - Slash-command parsing and session state for the interactive shell
//!
//! # Architecture
//!
//! A [`Dashboard`] runs one query at a time:
//! [`FinancialDataSource`] → [`ResultNormalizer`] → {table, [`ChartRenderer`],
//! [`PromptBuilder`]} → [`TextGenerationService`]. Each collaborator sits
//! behind a trait so the pipeline can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use quarterlens_results::{Dashboard, ResultsConfig, TableStyle, render_table};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ResultsConfig::from_env()?;
//!     let dashboard = Dashboard::from_config(&config)?;
//!
//!     let report = dashboard.load("TCS.NS").await?;
//!     println!("{}", render_table(&report.quarters, TableStyle::Boxed));
//!     if let Some(text) = dashboard.commentary(&report).await? {
//!         println!("{text}");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chart;
pub mod commands;
pub mod commentary;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod model;
pub mod normalize;
pub mod prompts;
pub mod session;
pub mod source;
pub mod table;

// Re-export main types for convenience
pub use chart::{ChartRenderer, RenderedChart, TerminalChartRenderer};
pub use commands::Command;
pub use commentary::{LlmCommentator, TextGenerationService};
pub use config::{AiBackend, AiConfig, ChartConfig, DataProvider, ResultsConfig};
pub use dashboard::{Dashboard, QuarterlyReport, validate_symbol};
pub use error::{ErrorKind, Result, ResultsError};
pub use model::{Metric, QuarterlyRecord, ResultSet, operating_margin};
pub use normalize::{FieldMap, ResultNormalizer, normalize};
pub use prompts::PromptBuilder;
pub use session::Session;
pub use source::{FinancialDataSource, RawQuarterlyData, build_source};
pub use table::{TableStyle, render_table};
