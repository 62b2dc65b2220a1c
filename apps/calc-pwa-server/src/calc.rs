//! Line-oriented calculator front end.
//!
//! Each input line is one key name (`7`, `.`, `+`, `Enter`, `Backspace`,
//! `Escape`, ...). The display is printed once at startup and after every
//! handled key; other lines are ignored.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use calculator::{CalculatorController, DisplaySink};
use tracing::debug;

/// Writes each rendered display as one line.
struct LineSink<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> DisplaySink for LineSink<W> {
    fn render(&mut self, text: &str) {
        if self.error.is_none()
            && let Err(err) = writeln!(self.out, "{text}").and_then(|()| self.out.flush())
        {
            self.error = Some(err);
        }
    }
}

/// Feeds key names from `input` to a calculator, printing the display to `output`.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub fn run_keys(input: impl BufRead, output: impl Write) -> Result<()> {
    let mut controller = CalculatorController::new(LineSink {
        out: output,
        error: None,
    });

    for line in input.lines() {
        let line = line.context("Failed to read key from input")?;
        let key = line.trim_end_matches(['\r', '\n']);
        if key.is_empty() {
            continue;
        }
        if !controller.key_down(key) {
            debug!(key, "Key not handled");
        }
        if let Some(err) = controller.display().error.as_ref() {
            anyhow::bail!("Failed to write display: {err}");
        }
    }

    match controller.into_display().error {
        Some(err) => Err(err).context("Failed to write display"),
        None => Ok(()),
    }
}
