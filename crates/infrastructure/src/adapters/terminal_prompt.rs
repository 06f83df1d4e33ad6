//! Terminal prompt adapter.
//!
//! Secrets are read with the terminal in raw mode so nothing is echoed.
//! Prompts go to stderr; stdout carries command output only.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::debug;

use acctl_application::ports::{Prompt, PromptError};
use acctl_domain::Password;

/// Prompt backed by the controlling terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompt {
    prompts_enabled: bool,
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPrompt {
    /// Creates an interactive prompt.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prompts_enabled: true,
        }
    }

    /// Creates a prompt that approves every confirmation without asking and
    /// refuses to read secrets.
    #[must_use]
    pub const fn non_interactive() -> Self {
        Self {
            prompts_enabled: false,
        }
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, prompt: &str) -> Result<bool, PromptError> {
        if !self.prompts_enabled {
            debug!(prompt, "prompts disabled; confirming");
            return Ok(true);
        }
        let stdin = io::stdin();
        ask_yes_no(&mut stdin.lock(), &mut io::stderr(), prompt).map_err(PromptError::from)
    }

    fn read_secret(&self, prompt: &str) -> Result<Password, PromptError> {
        if !self.prompts_enabled || !io::stdin().is_terminal() {
            return Err(PromptError::NotInteractive);
        }
        let mut stderr = io::stderr();
        write!(stderr, "{prompt}")?;
        stderr.flush()?;

        enable_raw_mode()?;
        let line = read_hidden_line();
        disable_raw_mode()?;
        writeln!(stderr)?;

        line.map(Password::new)
    }
}

/// Asks until the answer is yes or no. End of input counts as no.
fn ask_yes_no<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<bool> {
    loop {
        write!(output, "{prompt} ")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(false);
        }
        if let Some(answer) = parse_answer(&line) {
            return Ok(answer);
        }
    }
}

fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

fn read_hidden_line() -> Result<String, PromptError> {
    let mut line = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(line),
            KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(PromptError::Aborted);
            }
            KeyCode::Esc => return Err(PromptError::Aborted),
            KeyCode::Backspace => {
                line.pop();
            }
            KeyCode::Char(c) => line.push(c),
            _ => {}
        }
    }
}
