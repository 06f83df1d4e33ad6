//! Prompt answered from a fixed script.

use std::collections::VecDeque;
use std::sync::Mutex;

use acctl_domain::Password;

use crate::ports::{Prompt, PromptError};

/// Prompt that replays queued answers and records every question asked.
///
/// Running out of answers fails with [`PromptError::NotInteractive`], the
/// same error a terminal-less session reports.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    secrets: Mutex<VecDeque<String>>,
    confirmations: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    /// Creates a prompt with no answers queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues answers for secret prompts, in order.
    #[must_use]
    pub fn with_secrets<I, S>(self, secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut queue) = self.secrets.lock() {
            queue.extend(secrets.into_iter().map(Into::into));
        }
        self
    }

    /// Queues answers for confirmation prompts, in order.
    #[must_use]
    pub fn with_confirmations<I>(self, answers: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        if let Ok(mut queue) = self.confirmations.lock() {
            queue.extend(answers);
        }
        self
    }

    /// Every prompt shown so far.
    #[must_use]
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    fn record(&self, prompt: &str) -> Result<(), PromptError> {
        self.asked
            .lock()
            .map_err(|_| PromptError::Aborted)?
            .push(prompt.to_string());
        Ok(())
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, prompt: &str) -> Result<bool, PromptError> {
        self.record(prompt)?;
        self.confirmations
            .lock()
            .map_err(|_| PromptError::Aborted)?
            .pop_front()
            .ok_or(PromptError::NotInteractive)
    }

    fn read_secret(&self, prompt: &str) -> Result<Password, PromptError> {
        self.record(prompt)?;
        self.secrets
            .lock()
            .map_err(|_| PromptError::Aborted)?
            .pop_front()
            .map(Password::new)
            .ok_or(PromptError::NotInteractive)
    }
}
