// SPDX-License-Identifier: GPL-3.0-only

//! Classification of flash script output
//!
//! Until the script prints [`DOWNLOAD_FINISHED_SENTINEL`], any line with a `%`
//! is a download progress report. After it, every line goes to the log.

use crate::error::ProgressParseError;

pub const DOWNLOAD_FINISHED_SENTINEL: &str = "Downloading has been finished!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Update the progress bar; the line is not logged.
    Progress(u8),
    /// Append the line to the log verbatim.
    Log,
    /// Looked like progress but the number could not be read.
    MalformedProgress(ProgressParseError),
}

#[derive(Debug, Clone, Default)]
pub struct RelayState {
    download_finished: bool,
}

impl RelayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn download_finished(&self) -> bool {
        self.download_finished
    }

    pub fn classify(&mut self, line: &str) -> LineOutcome {
        if line.trim_end() == DOWNLOAD_FINISHED_SENTINEL {
            self.download_finished = true;
            return LineOutcome::Log;
        }

        if self.download_finished || !line.contains('%') {
            return LineOutcome::Log;
        }

        match parse_percent(line) {
            Ok(percent) => LineOutcome::Progress(percent),
            Err(e) => LineOutcome::MalformedProgress(e),
        }
    }
}

/// Read the number written just before the first `%` of `line`.
///
/// Fractions are truncated and values above 100 are clamped.
pub fn parse_percent(line: &str) -> Result<u8, ProgressParseError> {
    let before = line.split_once('%').map(|(b, _)| b).unwrap_or(line);

    let token = before
        .split_whitespace()
        .next_back()
        .ok_or_else(|| ProgressParseError::MissingNumber(line.trim_end().to_string()))?;

    // Tolerate progress meters like "[ 45%" or "(45%".
    let number = token.trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.');

    let value: f64 = number
        .parse()
        .map_err(|_| ProgressParseError::InvalidNumber {
            token: token.to_string(),
            line: line.trim_end().to_string(),
        })?;

    if !value.is_finite() {
        return Err(ProgressParseError::InvalidNumber {
            token: token.to_string(),
            line: line.trim_end().to_string(),
        });
    }

    Ok(value.clamp(0.0, 100.0) as u8)
}

/// How a flash run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashOutcome {
    Succeeded,
    /// Non-zero exit, or the script could not be started (`code` is `None`).
    Failed { code: Option<i32> },
    Cancelled,
}

impl FlashOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl std::fmt::Display for FlashOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Succeeded => f.write_str("Flash finished successfully"),
            Self::Failed { code: Some(code) } => write!(f, "Flash failed (exit code {code})"),
            Self::Failed { code: None } => f.write_str("Flash failed"),
            Self::Cancelled => f.write_str("Flash cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_before_sentinel_is_progress() {
        let mut state = RelayState::new();
        assert_eq!(
            state.classify("jetpack.tbz2    45%[=====>      ]  1.2G  10MB/s"),
            LineOutcome::Progress(45)
        );
    }

    #[test]
    fn same_line_after_sentinel_is_logged() {
        let mut state = RelayState::new();
        assert_eq!(state.classify("Downloading has been finished!\n"), LineOutcome::Log);
        assert!(state.download_finished());
        assert_eq!(state.classify("image 45% written"), LineOutcome::Log);
    }

    #[test]
    fn lines_without_percent_are_logged() {
        let mut state = RelayState::new();
        assert_eq!(state.classify("Preparing rootfs"), LineOutcome::Log);
        assert!(!state.download_finished());
    }

    #[test]
    fn malformed_progress_is_reported() {
        let mut state = RelayState::new();
        assert!(matches!(
            state.classify("%"),
            LineOutcome::MalformedProgress(ProgressParseError::MissingNumber(_))
        ));
        assert!(matches!(
            state.classify("ratio abc%"),
            LineOutcome::MalformedProgress(ProgressParseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn outcome_messages() {
        assert_eq!(FlashOutcome::Succeeded.to_string(), "Flash finished successfully");
        assert_eq!(
            FlashOutcome::Failed { code: Some(3) }.to_string(),
            "Flash failed (exit code 3)"
        );
        assert!(!FlashOutcome::Cancelled.is_success());
    }

    #[test]
    fn percent_parsing_edge_cases() {
        assert_eq!(parse_percent("  7%"), Ok(7));
        assert_eq!(parse_percent("[ 45%]"), Ok(45));
        assert_eq!(parse_percent("(99.9%)"), Ok(99));
        assert_eq!(parse_percent("250% done"), Ok(100));
        assert_eq!(parse_percent("100%\n"), Ok(100));
    }
}
