// src/handler.rs

//! User interaction and cancellation
//!
//! Operations that may need a decision from the user (trusting a new
//! key) or that block on the network receive a [`Handler`]. Output modes:
//! - `CliHandler`: asks on stderr, reads the answer from stdin
//! - `BatchHandler`: answers every question with a fixed value
//! - `SilentHandler`: denies everything (non-interactive default)
//!
//! Every handler carries a [`CancellationToken`] that network operations
//! check before and after blocking.

use crate::error::{Error, Result};
use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Shared flag requesting that running operations stop
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`Error::Cancelled`] once cancellation was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Callback interface for decisions and cancellation
pub trait Handler: Send + Sync {
    /// Ask a yes/no question; `Ok(false)` means denied
    fn ask(&self, question: &str) -> Result<bool>;

    fn cancellation(&self) -> &CancellationToken;
}

/// Denies every question
#[derive(Debug, Default)]
pub struct SilentHandler {
    token: CancellationToken,
}

impl SilentHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Handler for SilentHandler {
    fn ask(&self, question: &str) -> Result<bool> {
        info!("Denying without asking: {}", question);
        Ok(false)
    }

    fn cancellation(&self) -> &CancellationToken {
        &self.token
    }
}

/// Answers every question with the same value
#[derive(Debug, Default)]
pub struct BatchHandler {
    answer: bool,
    token: CancellationToken,
}

impl BatchHandler {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            token: CancellationToken::new(),
        }
    }
}

impl Handler for BatchHandler {
    fn ask(&self, question: &str) -> Result<bool> {
        info!("{} {}", question, if self.answer { "[yes]" } else { "[no]" });
        Ok(self.answer)
    }

    fn cancellation(&self) -> &CancellationToken {
        &self.token
    }
}

/// Prompts on the terminal
#[derive(Debug, Default)]
pub struct CliHandler {
    token: CancellationToken,
}

impl CliHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Handler for CliHandler {
    fn ask(&self, question: &str) -> Result<bool> {
        self.token.check()?;

        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            info!("No terminal to ask: {}", question);
            return Ok(false);
        }

        let mut stderr = std::io::stderr();
        loop {
            write!(stderr, "{} [y/N] ", question)?;
            stderr.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                return Ok(false);
            }
            match parse_answer(&line) {
                Some(answer) => return Ok(answer),
                None => writeln!(stderr, "Please answer 'y' or 'n'.")?,
            }
        }
    }

    fn cancellation(&self) -> &CancellationToken {
        &self.token
    }
}

fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "" | "n" | "no" => Some(false),
        _ => None,
    }
}
