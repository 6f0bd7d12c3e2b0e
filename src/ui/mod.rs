//! Terminal output helpers
//!
//! Styled, spinner-driven output on interactive terminals with automatic
//! fallback to plain lines in CI/non-interactive environments. Everything
//! here writes to stderr so stdout stays machine-readable.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{key_value, key_value_status, section, step_ok_detail, step_warn_hint};
pub use progress::TaskSpinner;
