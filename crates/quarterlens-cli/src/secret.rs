//! Hidden credential entry
//!
//! Keys are read in raw mode and echoed as `*`, so they never show on
//! screen or land in scrollback.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, IsTerminal, Write};

/// Outcome of a single key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Typed,
    Erased,
    Ignored,
    Submit,
    Cancel,
}

/// Leaves raw mode when dropped, including on early return
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

fn apply_key(buffer: &mut String, key: KeyEvent) -> Edit {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Edit::Submit,
        KeyCode::Esc => Edit::Cancel,
        KeyCode::Char('c' | 'd') if ctrl => Edit::Cancel,
        KeyCode::Char('u') if ctrl => {
            if buffer.is_empty() {
                Edit::Ignored
            } else {
                buffer.clear();
                Edit::Erased
            }
        }
        KeyCode::Char(c) if !ctrl => {
            buffer.push(c);
            Edit::Typed
        }
        KeyCode::Backspace => {
            if buffer.pop().is_some() {
                Edit::Erased
            } else {
                Edit::Ignored
            }
        }
        _ => Edit::Ignored,
    }
}

/// Blank input counts as no key
fn non_blank(input: String) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Prompt for a secret; `None` when skipped, cancelled or blank
///
/// Falls back to a plain line read when stdin is not a terminal.
pub fn read_masked(prompt: &str) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;

    if !io::stdin().is_terminal() {
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        return Ok(non_blank(line));
    }

    let mut buffer = String::new();
    let submitted = {
        let _guard = RawModeGuard::enable()?;
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match apply_key(&mut buffer, key) {
                Edit::Typed => write!(stdout, "*")?,
                Edit::Erased => {
                    // Redraw the mask from scratch
                    write!(stdout, "\r{prompt}{}", " ".repeat(buffer.chars().count() + 1))?;
                    write!(stdout, "\r{prompt}{}", "*".repeat(buffer.chars().count()))?;
                }
                Edit::Ignored => {}
                Edit::Submit => break true,
                Edit::Cancel => break false,
            }
            stdout.flush()?;
        }
    };
    writeln!(stdout)?;

    Ok(if submitted { non_blank(buffer) } else { None })
}
