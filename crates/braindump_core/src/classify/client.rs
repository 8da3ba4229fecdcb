//! Classification pipeline.
//!
//! # Responsibility
//! - Apply the length ceiling and rate limiter before any outbound call.
//! - Sanitize, frame and time-box the call to the backend.
//! - Map every failure to a fallback result.
//!
//! # Invariants
//! - Over-long input never reaches the limiter or the backend.
//! - A denied admission never reaches the backend.
//! - Each call makes at most one backend request.
//! - Timed-out calls are abandoned; any late response is discarded.

use super::backend::{CompletionBackend, CompletionRequest};
use super::error::ClassifyError;
use super::prompt::build_request;
use super::result::{parse_completion, ClassificationResult, ClassifiedItem};
use crate::config::ClassifierConfig;
use crate::rate_limit::RateLimiter;
use crate::sanitize::sanitize;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

const NO_TEXT_MESSAGE: &str = "No text provided";

/// Classifier over a pluggable backend and a shared rate limiter.
pub struct ClassifierClient<B> {
    backend: B,
    limiter: Arc<RateLimiter>,
    timeout: Duration,
    max_input_chars: usize,
}

impl<B: CompletionBackend> ClassifierClient<B> {
    /// Creates a client using limits from `config`.
    ///
    /// `limiter` is shared so one budget applies to every client in the
    /// process.
    pub fn new(backend: B, limiter: Arc<RateLimiter>, config: &ClassifierConfig) -> Self {
        Self {
            backend,
            limiter,
            timeout: config.timeout,
            max_input_chars: config.max_input_chars,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Classifies `text` at the current time.
    pub async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        self.classify_at(text, Utc::now()).await
    }

    /// Classifies `text` as if the current time were `now`.
    ///
    /// # Errors
    /// - `Validation` when `text` is blank.
    /// - `Configuration` when the backend is missing credentials.
    ///
    /// Every other failure is returned as an `Error`-status result.
    pub async fn classify_at(
        &self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<ClassificationResult, ClassifyError> {
        if text.trim().is_empty() {
            return Err(ClassifyError::Validation(NO_TEXT_MESSAGE.to_string()));
        }
        self.backend.ensure_configured()?;

        let input_chars = text.chars().count();
        if input_chars > self.max_input_chars {
            let error = ClassifyError::InputTooLong {
                chars: input_chars,
                max_chars: self.max_input_chars,
            };
            return Ok(self.reject(
                ClassifiedItem::too_long(text, self.max_input_chars),
                error,
            ));
        }

        if !self.limiter.admit_at(now) {
            return Ok(self.reject(ClassifiedItem::fallback(text), ClassifyError::RateLimited));
        }

        let started_at = Instant::now();
        let request = build_request(now, &sanitize(text));
        let outcome = self
            .call(&request)
            .await
            .and_then(|content| parse_completion(&content, text));

        match outcome {
            Ok((item, message)) => {
                info!(
                    "event=classify module=classify status=ok kind={} input_chars={} duration_ms={}",
                    item.kind.as_str(),
                    input_chars,
                    started_at.elapsed().as_millis()
                );
                Ok(ClassificationResult::success(item, message))
            }
            Err(error) => Ok(self.reject(ClassifiedItem::fallback(text), error)),
        }
    }

    async fn call(&self, request: &CompletionRequest) -> Result<String, ClassifyError> {
        match tokio::time::timeout(self.timeout, self.backend.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ClassifyError::Timeout {
                after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    fn reject(&self, fallback: ClassifiedItem, error: ClassifyError) -> ClassificationResult {
        match &error {
            ClassifyError::Parse(detail) => warn!(
                "event=classify module=classify status=error error_code={} detail={}",
                error.kind(),
                detail
            ),
            _ => warn!(
                "event=classify module=classify status=error error_code={} error={}",
                error.kind(),
                error
            ),
        }
        ClassificationResult::failure(fallback, error)
    }
}
