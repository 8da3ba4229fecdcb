//! Text-to-item classification.
//!
//! # Responsibility
//! - Gate, sanitize and frame classification requests.
//! - Call the external model through a pluggable `CompletionBackend`.
//! - Turn every outcome into a complete success or fallback result.
//!
//! # Invariants
//! - Only configuration and validation problems surface as `Err`.
//! - Rate limiting, timeouts and upstream/parse failures yield an
//!   `error`-status result carrying a displayable fallback item.
//! - No retries happen inside this module.

pub mod backend;
pub mod client;
pub mod error;
pub mod openai;
pub mod prompt;
pub mod result;
