//! Core logic for Braindump.
//! Turns free-form text into classified items and organizes them for display.

pub mod analytics;
pub mod classify;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod organize;
pub mod rate_limit;
pub mod repo;
pub mod sanitize;
pub mod search;
pub mod service;

pub use classify::backend::{CompletionBackend, CompletionRequest};
pub use classify::client::ClassifierClient;
pub use classify::error::ClassifyError;
pub use classify::openai::OpenAiBackend;
pub use classify::result::{ClassificationResult, ClassificationStatus, ClassifiedItem};
pub use config::ClassifierConfig;
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::{format_due_date, Item, ItemId, ItemType, Priority, Recurrence};
pub use model::tag::Tag;
pub use organize::{organize, organize_at, OrganizedItems};
pub use rate_limit::RateLimiter;
pub use repo::item_store::ItemStore;
pub use repo::kv_store::{KeyValueStore, MemoryKvStore, SqliteKvStore, StoreError};
pub use sanitize::sanitize;
pub use search::filter::ItemFilter;
pub use search::highlight::{highlight, Segment};
pub use service::item_service::{ItemAction, ItemService, ItemServiceError};
pub use service::process_service::{
    ProcessError, ProcessRequest, ProcessResponse, ProcessService, CREATED_STATUS,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
