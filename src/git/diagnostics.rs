//! Classification of git's diagnostic stream
//!
//! git writes progress to stderr even when it succeeds, so stderr text alone
//! does not mean failure. This heuristic only flags text that carries an
//! error marker and no progress marker.

/// Substrings that indicate a failure (matched case-insensitively)
const ERROR_MARKERS: &[&str] = &["fatal:", "error:", "permission denied", "not found"];

/// Substrings git prints during a normal checkout
const PROGRESS_MARKERS: &[&str] = &["cloning into", "remote:"];

/// Result of [`classify_diagnostic_text`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticVerdict {
    pub is_error: bool,
}

pub fn classify_diagnostic_text(text: &str) -> DiagnosticVerdict {
    let lower = text.to_lowercase();
    let has_error = ERROR_MARKERS.iter().any(|m| lower.contains(m));
    let has_progress = PROGRESS_MARKERS.iter().any(|m| lower.contains(m));

    DiagnosticVerdict {
        is_error: has_error && !has_progress,
    }
}
