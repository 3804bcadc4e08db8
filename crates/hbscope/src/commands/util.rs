//! Shared helpers for command handlers.

use std::io::BufRead;

use chrono::{DateTime, Utc};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// First line of stdin without its line ending.
pub fn read_stdin_line() -> Result<String, CliError> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

/// `2024-05-01 12:00 UTC`, or `-` when absent.
pub fn fmt_time(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M UTC").to_string())
}

/// Truncate to `max` characters with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn time_formatting() {
        assert_eq!(fmt_time(None), "-");
        assert_eq!(
            fmt_time(Utc.with_ymd_and_hms(2024, 5, 1, 9, 5, 0).single()),
            "2024-05-01 09:05 UTC"
        );
    }

    #[test]
    fn truncation_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Humble Book Bundle", 8), "Humble …");
    }
}
