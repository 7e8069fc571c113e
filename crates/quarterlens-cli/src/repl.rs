//! Interactive session loop

use crate::{output, secret};
use quarterlens_results::{Command, Session};
use std::io::{self, BufRead, Write};
use tracing::debug;

const PROMPT: &str = "quarterlens> ";

fn print_banner(session: &Session) {
    println!(
        r"
╔══════════════════════════════════════════════════════════════╗
║                  Quarterly Results Dashboard                 ║
║                                                              ║
║  Type a symbol to see its last quarters, e.g. RELIANCE.NS    ║
║                                                              ║
║  Commands:                                                   ║
║    /key                    - Enter the AI API key            ║
║    /provider <name>        - yahoo or alphavantage           ║
║    /charts on|off          - Show or hide charts             ║
║    /help                   - Show help                       ║
║    /exit                   - Exit                            ║
╚══════════════════════════════════════════════════════════════╝
"
    );
    print_status(session);
}

fn print_status(session: &Session) {
    let config = session.config();
    println!("Configuration:");
    println!("  Data provider: {}", config.provider);
    println!("  AI backend: {} ({})", config.ai.backend, config.ai.model());
    println!(
        "  Charts: {}",
        if config.charts.enabled { "on" } else { "off" }
    );
    if let Some(warning) = session.ai_warning() {
        println!("\n{warning}");
    }
    println!();
}

/// Run the read-eval-print loop until `/exit` or end of input
pub async fn run(session: &mut Session) -> io::Result<()> {
    print_banner(session);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{PROMPT}");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let command = match Command::parse(input) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}\n", e.user_message());
                continue;
            }
        };
        debug!(command = command.description(), "Dispatching");

        match command {
            Command::Results { symbol } => {
                let warning = session.ai_warning();
                if let Err(e) = output::show(session.dashboard(), &symbol, warning.as_deref()).await
                {
                    eprintln!("{}\n", e.user_message());
                }
            }
            Command::Key => {
                let prompt = format!(
                    "{} API key (input hidden, Enter to clear): ",
                    session.config().ai.backend
                );
                let key = secret::read_masked(&prompt)?;
                match session.set_api_key(key) {
                    Ok(()) => match session.ai_warning() {
                        Some(warning) => println!("{warning}\n"),
                        None => println!("AI analysis enabled.\n"),
                    },
                    Err(e) => eprintln!("{}\n", e.user_message()),
                }
            }
            Command::Provider(provider) => match session.set_provider(provider) {
                Ok(()) => println!("Data provider: {provider}\n"),
                Err(e) => eprintln!("{}\n", e.user_message()),
            },
            Command::Charts(enabled) => match session.set_charts(enabled) {
                Ok(()) => println!("Charts {}\n", if enabled { "on" } else { "off" }),
                Err(e) => eprintln!("{}\n", e.user_message()),
            },
            Command::Help => println!("{}", Command::help_text()),
            Command::Exit => {
                println!("Goodbye!");
                break;
            }
        }
    }

    Ok(())
}
