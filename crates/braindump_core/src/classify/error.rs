//! Classification error taxonomy.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again in a minute.";
pub const INPUT_TOO_LONG_MESSAGE: &str = "Input exceeds maximum length";
pub const UPSTREAM_STATUS_MESSAGE: &str = "AI processing failed";
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse AI response";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// Required credential or client setup is missing.
    Configuration(String),
    /// Caller input is missing or blank.
    Validation(String),
    /// Input is longer than the configured ceiling.
    InputTooLong { chars: usize, max_chars: usize },
    /// The rate limiter denied admission.
    RateLimited,
    /// The outbound call exceeded its deadline.
    Timeout { after_ms: u64 },
    /// Non-success status or transport failure.
    Upstream(String),
    /// Response body could not be turned into a classified item.
    Parse(String),
}

impl ClassifyError {
    /// Stable short name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Validation(_) => "validation",
            Self::InputTooLong { .. } => "input_too_long",
            Self::RateLimited => "rate_limited",
            Self::Timeout { .. } => "timeout",
            Self::Upstream(_) => "upstream",
            Self::Parse(_) => "parse",
        }
    }
}

impl Display for ClassifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(message) | Self::Validation(message) | Self::Upstream(message) => {
                f.write_str(message)
            }
            Self::InputTooLong { .. } => f.write_str(INPUT_TOO_LONG_MESSAGE),
            Self::RateLimited => f.write_str(RATE_LIMITED_MESSAGE),
            Self::Timeout { after_ms } => write!(f, "AI request timed out after {after_ms} ms"),
            Self::Parse(_) => f.write_str(PARSE_FAILURE_MESSAGE),
        }
    }
}

impl Error for ClassifyError {}
