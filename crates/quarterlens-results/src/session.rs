//! Interactive session state

use crate::config::{DataProvider, ResultsConfig};
use crate::dashboard::Dashboard;
use crate::error::Result;
use tracing::info;

/// Session-wide settings and the dashboard built from them
///
/// Each change rebuilds the dashboard from an updated configuration; a change
/// that fails validation leaves the session as it was.
pub struct Session {
    config: ResultsConfig,
    dashboard: Dashboard,
}

impl Session {
    pub fn new(config: ResultsConfig) -> Result<Self> {
        let dashboard = Dashboard::from_config(&config)?;
        Ok(Self { config, dashboard })
    }

    pub fn config(&self) -> &ResultsConfig {
        &self.config
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Replace the AI credential; `None` or a blank key disables AI analysis
    pub fn set_api_key(&mut self, api_key: Option<String>) -> Result<()> {
        let mut config = self.config.clone();
        config.ai.api_key = api_key.filter(|k| !k.trim().is_empty());
        self.rebuild(config)
    }

    /// Switch the data provider
    pub fn set_provider(&mut self, provider: DataProvider) -> Result<()> {
        let mut config = self.config.clone();
        config.provider = provider;
        self.rebuild(config)?;
        info!(%provider, "Switched data provider");
        Ok(())
    }

    pub fn set_charts(&mut self, enabled: bool) -> Result<()> {
        let mut config = self.config.clone();
        config.charts.enabled = enabled;
        self.rebuild(config)
    }

    /// Standing warning shown while AI analysis is unavailable
    pub fn ai_warning(&self) -> Option<String> {
        if self.dashboard.has_commentator() {
            None
        } else {
            Some(format!(
                "Please provide your {} API key to enable AI analysis.",
                self.config.ai.backend
            ))
        }
    }

    fn rebuild(&mut self, config: ResultsConfig) -> Result<()> {
        self.dashboard = Dashboard::from_config(&config)?;
        self.config = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResultsError;

    #[test]
    fn test_new_session_warns_without_key() {
        let session = Session::new(ResultsConfig::default()).unwrap();
        assert_eq!(session.dashboard().source_name(), "Yahoo Finance");
        assert_eq!(
            session.ai_warning().as_deref(),
            Some("Please provide your Gemini API key to enable AI analysis.")
        );
    }

    #[test]
    fn test_set_api_key() {
        let mut session = Session::new(ResultsConfig::default()).unwrap();
        session.set_api_key(Some("secret".to_string())).unwrap();
        assert!(session.dashboard().has_commentator());
        assert!(session.ai_warning().is_none());

        session.set_api_key(Some("  ".to_string())).unwrap();
        assert!(!session.dashboard().has_commentator());
        assert!(session.config().ai.api_key.is_none());
    }

    #[test]
    fn test_failed_switch_keeps_state() {
        let mut session = Session::new(ResultsConfig::default()).unwrap();
        let err = session.set_provider(DataProvider::AlphaVantage).unwrap_err();
        assert!(matches!(err, ResultsError::Config(_)));
        assert_eq!(session.config().provider, DataProvider::Yahoo);
        assert_eq!(session.dashboard().source_name(), "Yahoo Finance");
    }

    #[test]
    fn test_switch_provider_with_key() {
        let config = ResultsConfig {
            alpha_vantage_api_key: Some("demo".to_string()),
            ..ResultsConfig::default()
        };
        let mut session = Session::new(config).unwrap();
        session.set_provider(DataProvider::AlphaVantage).unwrap();
        assert_eq!(session.dashboard().source_name(), "Alpha Vantage");

        session.set_charts(false).unwrap();
        assert!(!session.config().charts.enabled);
    }
}
