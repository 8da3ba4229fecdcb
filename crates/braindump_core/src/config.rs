//! Classifier configuration.
//!
//! # Responsibility
//! - Hold endpoint, model, credential and limits for classification calls.
//! - Read overrides from process environment.
//!
//! # Invariants
//! - The API key is never printed by `Debug`.
//! - A missing API key is not an error here; it surfaces as a configuration
//!   error when classification is attempted.

use crate::rate_limit::DEFAULT_REQUESTS_PER_MINUTE;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_INPUT_CHARS: usize = 1000;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ENDPOINT_ENV: &str = "BRAINDUMP_OPENAI_URL";
pub const MODEL_ENV: &str = "BRAINDUMP_OPENAI_MODEL";

#[derive(Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Bearer credential for the classification endpoint.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    /// Hard deadline for one outbound call.
    pub timeout: Duration,
    /// Inputs longer than this (in characters) are never sent.
    pub max_input_chars: usize,
    pub requests_per_minute: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
        }
    }
}

impl ClassifierConfig {
    /// Builds a config from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            api_key: read(API_KEY_ENV),
            endpoint: read(ENDPOINT_ENV).unwrap_or(defaults.endpoint),
            model: read(MODEL_ENV).unwrap_or(defaults.model),
            ..defaults
        }
    }
}

impl Debug for ClassifierConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("max_input_chars", &self.max_input_chars)
            .field("requests_per_minute", &self.requests_per_minute)
            .finish()
    }
}
