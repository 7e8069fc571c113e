//! Command parsing for the interactive session

use crate::config::DataProvider;
use crate::error::{Result, ResultsError};

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show quarterly results for a symbol
    Results { symbol: String },
    /// Re-enter the AI API key
    Key,
    /// Switch the data provider
    Provider(DataProvider),
    /// Turn charts on or off
    Charts(bool),
    /// Show help
    Help,
    /// Exit the session
    Exit,
}

impl Command {
    /// Parse a command from user input
    ///
    /// A bare word is a symbol; slash commands cover everything else.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(ResultsError::Command("Empty input".to_string()));
        }

        let Some(command) = input.strip_prefix('/') else {
            if input.split_whitespace().count() > 1 {
                return Err(ResultsError::Command(
                    "Enter a single symbol, for example RELIANCE.NS".to_string(),
                ));
            }
            return Ok(Command::Results {
                symbol: input.to_uppercase(),
            });
        };

        let parts: Vec<&str> = command.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            return Err(ResultsError::Command("Empty command".to_string()));
        };
        let cmd = cmd.to_lowercase();

        match cmd.as_str() {
            "results" | "r" => match args {
                [symbol] => Ok(Command::Results {
                    symbol: symbol.to_uppercase(),
                }),
                [] => Err(ResultsError::Command(
                    "Missing symbol for results command".to_string(),
                )),
                _ => Err(ResultsError::Command(
                    "Results takes exactly one symbol".to_string(),
                )),
            },
            "key" | "k" => Ok(Command::Key),
            "provider" | "p" => {
                let name = args.first().ok_or_else(|| {
                    ResultsError::Command("Missing name for provider command".to_string())
                })?;
                name.parse()
                    .map(Command::Provider)
                    .map_err(|e| ResultsError::Command(e.to_string()))
            }
            "charts" | "c" => match args.first().map(|a| a.to_lowercase()).as_deref() {
                Some("on") => Ok(Command::Charts(true)),
                Some("off") => Ok(Command::Charts(false)),
                _ => Err(ResultsError::Command("Usage: /charts on|off".to_string())),
            },
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            _ => Err(ResultsError::Command(format!("Unknown command: {cmd}"))),
        }
    }

    /// Get help text for all commands
    pub fn help_text() -> &'static str {
        r"
Quarterly Results Commands
==========================

  <symbol>                 Show the last quarters for a symbol
  /results <symbol>        Same as typing the symbol
  /key                     Enter the AI API key (hidden input)
  /provider yahoo|alphavantage
                           Switch the data source
  /charts on|off           Show or hide the metric charts
  /help                    Show help
  /exit                    Exit

Aliases:
  /r = /results   /k = /key   /p = /provider   /c = /charts   /q = /exit

Symbols follow the data source: RELIANCE.NS or TCS.NS on Yahoo Finance,
IBM or MSFT on Alpha Vantage.
"
    }

    /// Get a short description of the command
    pub fn description(&self) -> &'static str {
        match self {
            Command::Results { .. } => "Quarterly results",
            Command::Key => "Enter AI API key",
            Command::Provider(_) => "Switch data provider",
            Command::Charts(_) => "Toggle charts",
            Command::Help => "Show help",
            Command::Exit => "Exit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_symbol() {
        let cmd = Command::parse("  reliance.ns ").unwrap();
        assert_eq!(
            cmd,
            Command::Results {
                symbol: "RELIANCE.NS".to_string()
            }
        );
    }

    #[test]
    fn test_parse_results() {
        let cmd = Command::parse("/r tcs.ns").unwrap();
        assert_eq!(
            cmd,
            Command::Results {
                symbol: "TCS.NS".to_string()
            }
        );
        assert!(Command::parse("/results").is_err());
        assert!(Command::parse("/results AAPL MSFT").is_err());
    }

    #[test]
    fn test_parse_rejects_multiple_symbols() {
        assert!(Command::parse("AAPL MSFT").is_err());
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!(
            Command::parse("/provider AlphaVantage").unwrap(),
            Command::Provider(DataProvider::AlphaVantage)
        );
        assert_eq!(
            Command::parse("/p yahoo").unwrap(),
            Command::Provider(DataProvider::Yahoo)
        );
        assert!(Command::parse("/provider").is_err());
        assert!(matches!(
            Command::parse("/provider bloomberg"),
            Err(ResultsError::Command(_))
        ));
    }

    #[test]
    fn test_parse_charts() {
        assert_eq!(Command::parse("/charts OFF").unwrap(), Command::Charts(false));
        assert_eq!(Command::parse("/c on").unwrap(), Command::Charts(true));
        assert!(Command::parse("/charts maybe").is_err());
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(Command::parse("/key").unwrap(), Command::Key);
        assert_eq!(Command::parse("/help").unwrap(), Command::Help);
        assert_eq!(Command::parse("/q").unwrap(), Command::Exit);
        assert!(Command::parse("").is_err());
        assert!(Command::parse("/").is_err());
        assert!(Command::parse("/watch AAPL").is_err());
    }
}
