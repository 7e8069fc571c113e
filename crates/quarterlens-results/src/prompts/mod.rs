//! Prompt construction for AI commentary

pub mod system;
pub mod user;

use crate::error::{Result, ResultsError};
use crate::model::{Metric, ResultSet};
use crate::table::{TableStyle, render_table};
use minijinja::{Environment, context};

/// Renders a result set into the commentary prompt
///
/// Every call renders a fresh prompt from the given results.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// System prompt sent with every request
    pub fn system_prompt(&self) -> &'static str {
        system::RESULTS_ANALYST
    }

    /// Build the user prompt for `symbol`
    pub fn build(&self, symbol: &str, results: &ResultSet) -> Result<String> {
        let (Some(first), Some(last)) = (results.records().first(), results.latest()) else {
            return Err(ResultsError::DataUnavailable {
                symbol: symbol.to_string(),
            });
        };

        let has_missing = results
            .iter()
            .any(|r| Metric::ALL.iter().any(|m| r.value(*m).is_none()));

        let env = Environment::new();
        let prompt = env.render_str(
            user::RESULTS_ANALYSIS,
            context! {
                symbol => symbol,
                quarters => results.len(),
                first => first.quarter.as_str(),
                last => last.quarter.as_str(),
                table => render_table(results, TableStyle::Plain),
                has_missing => has_missing,
            },
        )?;
        Ok(prompt)
    }
}
