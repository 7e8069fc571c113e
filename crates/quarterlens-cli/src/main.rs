//! quarterlens
//!
//! Quarterly results dashboard for the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Interactive session (asks for the AI key unless one is configured)
//! export GEMINI_API_KEY="..."
//! cargo run --bin quarterlens
//!
//! # One query, then exit
//! cargo run --bin quarterlens -- --symbol TCS.NS
//!
//! # Machine-readable output
//! cargo run --bin quarterlens -- --symbol IBM --provider alphavantage --json
//! ```

mod output;
mod repl;
mod secret;
mod spinner;

use anyhow::Context;
use clap::Parser;
use quarterlens_results::{AiBackend, ChartConfig, DataProvider, ResultsConfig, Session};
use quarterlens_utils::LogFormat;
use quarterlens_utils::logging::DEFAULT_FILTER;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "quarterlens", version)]
#[command(about = "Quarterly results dashboard with charts and AI commentary", long_about = None)]
struct Args {
    /// Run a single query for this symbol and exit
    #[arg(short, long)]
    symbol: Option<String>,

    /// Print the quarters as JSON instead of the table (one-shot mode only)
    #[arg(long, requires = "symbol")]
    json: bool,

    /// Data provider: yahoo or alphavantage
    #[arg(short, long, env = "QUARTERLENS_PROVIDER")]
    provider: Option<DataProvider>,

    /// Text-generation backend: gemini, openai or anthropic
    #[arg(long, env = "QUARTERLENS_AI_BACKEND")]
    ai_backend: Option<AiBackend>,

    /// Model name for the AI backend
    #[arg(long, env = "QUARTERLENS_AI_MODEL")]
    model: Option<String>,

    /// Base URL for the AI backend (OpenAI-compatible servers)
    #[arg(long)]
    api_base: Option<String>,

    /// API key for the AI backend
    #[arg(long)]
    api_key: Option<String>,

    /// Alpha Vantage API key
    #[arg(long, env = "ALPHA_VANTAGE_API_KEY", hide_env_values = true)]
    alpha_vantage_key: Option<String>,

    /// Number of recent quarters to show
    #[arg(short, long)]
    quarters: Option<usize>,

    /// Do not draw the metric charts
    #[arg(long)]
    no_charts: bool,

    /// Chart width in terminal cells
    #[arg(long)]
    chart_width: Option<u16>,

    /// Chart height in terminal cells
    #[arg(long)]
    chart_height: Option<u16>,

    /// Skip the AI key prompt at session start
    #[arg(long)]
    no_key_prompt: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Args {
    /// Environment first, then flags on top
    fn config(&self) -> quarterlens_results::Result<ResultsConfig> {
        let mut builder = ResultsConfig::builder().with_env();

        if let Some(provider) = self.provider {
            builder = builder.provider(provider);
        }
        if let Some(backend) = self.ai_backend {
            builder = builder.ai_backend(backend);
        }
        if let Some(model) = &self.model {
            builder = builder.ai_model(model);
        }
        if let Some(base) = &self.api_base {
            builder = builder.ai_api_base(base);
        }
        if let Some(key) = &self.api_key {
            builder = builder.ai_api_key(key);
        }
        if let Some(key) = &self.alpha_vantage_key {
            builder = builder.alpha_vantage_api_key(key);
        }
        if let Some(quarters) = self.quarters {
            builder = builder.max_quarters(quarters);
        }

        let defaults = ChartConfig::default();
        builder = builder.charts(ChartConfig {
            width: self.chart_width.unwrap_or(defaults.width),
            height: self.chart_height.unwrap_or(defaults.height),
            enabled: !self.no_charts && !self.json,
        });

        builder.build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let format = if args.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    quarterlens_utils::init_tracing(DEFAULT_FILTER, format);

    let config = args.config().context("Invalid configuration")?;
    info!(provider = %config.provider, backend = %config.ai.backend, "Starting quarterlens");

    if let Some(symbol) = &args.symbol {
        return one_shot(config, symbol, args.json).await;
    }

    let interactive_key = !args.no_key_prompt && std::io::stdin().is_terminal();
    let config = if interactive_key && !config.ai.has_credential() {
        ask_for_key(config)?
    } else {
        config
    };

    let mut session = Session::new(config)?;
    repl::run(&mut session).await?;

    Ok(ExitCode::SUCCESS)
}

/// Single query; the exit code reflects the outcome
async fn one_shot(config: ResultsConfig, symbol: &str, json: bool) -> anyhow::Result<ExitCode> {
    let session = Session::new(config)?;

    let outcome = if json {
        session
            .dashboard()
            .load(symbol)
            .await
            .and_then(|report| report.to_json())
            .map(|text| println!("{text}"))
    } else {
        output::show(session.dashboard(), symbol, session.ai_warning().as_deref()).await
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn ask_for_key(mut config: ResultsConfig) -> anyhow::Result<ResultsConfig> {
    let prompt = format!(
        "{} API key (input hidden, Enter to skip): ",
        config.ai.backend
    );
    config.ai.api_key = secret::read_masked(&prompt).context("Failed to read API key")?;
    Ok(config)
}
