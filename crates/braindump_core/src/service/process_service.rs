//! Text-to-item entry point.
//!
//! # Responsibility
//! - Validate inbound text and run it through the classifier.
//! - Mint the durable item for a successful classification.
//! - Map failures onto status-coded errors for transport layers.
//!
//! # Invariants
//! - A returned item has a fresh ID, `created == updated` and is not completed.
//! - `original_input` is exactly the request text.
//! - Fallback results are never turned into items here.

use crate::classify::backend::CompletionBackend;
use crate::classify::client::ClassifierClient;
use crate::classify::error::ClassifyError;
use crate::model::item::{now_millis, Item};
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Status reported for a created item.
pub const CREATED_STATUS: u16 = 201;

const NO_TEXT_MESSAGE: &str = "No text provided";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessRequest {
    pub text: Option<String>,
}

impl ProcessRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResponse {
    pub item: Item,
}

impl ProcessResponse {
    pub fn status_code(&self) -> u16 {
        CREATED_STATUS
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// Missing or blank text.
    Validation(String),
    /// Classifier credentials are not configured.
    Configuration(String),
    /// Classification ran but produced a fallback.
    Classification(String),
}

impl ProcessError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Configuration(_) | Self::Classification(_) => 500,
        }
    }
}

impl Display for ProcessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message)
            | Self::Configuration(message)
            | Self::Classification(message) => f.write_str(message),
        }
    }
}

impl Error for ProcessError {}

impl From<ClassifyError> for ProcessError {
    fn from(value: ClassifyError) -> Self {
        match value {
            ClassifyError::Validation(message) => Self::Validation(message),
            ClassifyError::Configuration(message) => Self::Configuration(message),
            other => Self::Classification(other.to_string()),
        }
    }
}

pub struct ProcessService<B> {
    classifier: ClassifierClient<B>,
}

impl<B: CompletionBackend> ProcessService<B> {
    pub fn new(classifier: ClassifierClient<B>) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &ClassifierClient<B> {
        &self.classifier
    }

    pub async fn process(&self, request: ProcessRequest) -> Result<ProcessResponse, ProcessError> {
        self.process_at(request, now_millis()).await
    }

    /// Classifies the request text as of `now` and mints a new item.
    ///
    /// # Errors
    /// - `Validation` when text is missing or blank.
    /// - `Configuration` when the classifier has no credentials.
    /// - `Classification` with the result message for any fallback result.
    pub async fn process_at(
        &self,
        request: ProcessRequest,
        now: DateTime<Utc>,
    ) -> Result<ProcessResponse, ProcessError> {
        let text = request
            .text
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ProcessError::Validation(NO_TEXT_MESSAGE.to_string()))?;

        let result = self.classifier.classify_at(&text, now).await?;
        if !result.is_success() {
            let message = result
                .message
                .unwrap_or_else(|| "Classification failed".to_string());
            return Err(ProcessError::Classification(message));
        }

        Ok(ProcessResponse {
            item: result.item.into_item(now),
        })
    }
}
