//! API clients for quarterly results providers

pub mod alpha_vantage;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageClient;
pub use yahoo::YahooFundamentalsClient;
