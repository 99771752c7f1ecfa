pub mod action;
pub mod auth;
pub mod completions;
pub mod idea;
pub mod init;
pub mod stats;
pub mod voice;

use std::fmt;
use std::io::{IsTerminal, Write};

use talkboard_core::BoardError;
use talkboard_core::engine::Capability;

use crate::output::{CliError, OutputMode, render_error};

/// Marker for a failure whose message has already been written to stderr.
///
/// `main` exits non-zero on it without printing a second line.
#[derive(Debug)]
pub struct Reported(pub String);

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Reported {}

/// Render `error` once and wrap it so the caller can bail with `?`.
pub fn reported(output: OutputMode, error: CliError) -> anyhow::Error {
    // stderr may already be closed; the exit code still reports the failure.
    render_error(output, &error).ok();
    anyhow::Error::new(Reported(error.message))
}

/// Shorthand for a failed board operation.
pub fn board_failure(output: OutputMode, error: &BoardError) -> anyhow::Error {
    reported(output, CliError::from(error))
}

/// Whether a delete stops at the confirmation prompt. Callers who may not
/// delete, or records where delete is not offered, go straight to the board
/// so the refusal is reported without a prompt.
pub const fn needs_confirmation(capability: Capability, offered: bool, force: bool) -> bool {
    capability.can_mutate() && offered && !force
}

/// Ask before a permanent delete. Non-interactive runs confirm implicitly.
pub fn confirm_delete(kind: &str, id: &str, summary: &str) -> anyhow::Result<bool> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return Ok(true);
    }

    eprint!("Delete {kind} {id} '{summary}'? This cannot be undone. [y/N] ");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// First `max` characters of `text`, with an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("lockers", 10), "lockers");
        assert_eq!(truncate("more lockers on deck", 4), "more…");
    }

    #[test]
    fn anonymous_delete_skips_the_prompt() {
        assert!(!needs_confirmation(Capability::ANONYMOUS, true, false));
        assert!(!needs_confirmation(Capability::AUTHENTICATED, false, false));
        assert!(!needs_confirmation(Capability::AUTHENTICATED, true, true));
        assert!(needs_confirmation(Capability::AUTHENTICATED, true, false));
    }

    #[test]
    fn reported_error_downcasts() {
        let err = reported(OutputMode::Text, CliError::new("nope"));
        assert!(err.is::<Reported>());
        assert_eq!(err.to_string(), "nope");
    }
}
