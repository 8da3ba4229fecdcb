//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose capture, listing and item actions to Dart via FRB.
//! - Flatten core types into plain envelopes with a human-readable message.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - All `entry_process` calls share one process-wide rate limiter.
//! - Item mutations through this API are serialized per process.

use braindump_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_db,
    ClassifierClient, ClassifierConfig, Item, ItemFilter, ItemId, ItemService, ItemType,
    OpenAiBackend, OrganizedItems, ProcessRequest, ProcessService, RateLimiter, SqliteKvStore,
    CREATED_STATUS,
};
use chrono::{Local, TimeZone, Utc};
use log::warn;
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

const ENTRY_DB_FILE_NAME: &str = "braindump_entry.sqlite3";
const DB_PATH_ENV: &str = "BRAINDUMP_DB_PATH";
const SERVER_ERROR_STATUS: u16 = 500;

static ENTRY_DB_PATH: OnceCell<PathBuf> = OnceCell::new();
static ENTRY_LIMITER: Lazy<Arc<RateLimiter>> = Lazy::new(|| Arc::new(RateLimiter::default()));
static ENTRY_WRITE_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static ENTRY_RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Tag projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTag {
    pub label: String,
    /// Hex color such as `#3b82f6`.
    pub color: String,
}

/// Item projection with epoch-millisecond timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryItem {
    pub id: String,
    /// `event|task|note`.
    pub kind: String,
    pub title: String,
    pub content: String,
    pub original_input: String,
    pub tags: Vec<EntryTag>,
    pub due_epoch_ms: Option<i64>,
    pub has_time: bool,
    /// Due date rendered in the device time zone.
    pub due_label: Option<String>,
    pub priority: Option<String>,
    pub recurrence: Option<String>,
    pub completed: bool,
    pub created_epoch_ms: i64,
    pub updated_epoch_ms: i64,
}

/// Result of turning one brain-dump entry into an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryProcessResponse {
    pub ok: bool,
    /// `201` on success, `400`/`500` on failure.
    pub status_code: u16,
    pub item: Option<EntryItem>,
    pub message: String,
}

/// Organized listing envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryListResponse {
    pub today: Vec<EntryItem>,
    pub upcoming: Vec<EntryItem>,
    pub completed: Vec<EntryItem>,
    /// Items matching the filter.
    pub total: u32,
    pub message: String,
}

impl EntryListResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            today: Vec::new(),
            upcoming: Vec::new(),
            completed: Vec::new(),
            total: 0,
            message: message.into(),
        }
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryActionResponse {
    pub ok: bool,
    /// Item after the action; `None` on failure or deletion.
    pub item: Option<EntryItem>,
    pub message: String,
}

impl EntryActionResponse {
    fn success(message: impl Into<String>, item: Option<EntryItem>) -> Self {
        Self {
            ok: true,
            item,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            item: None,
            message: message.into(),
        }
    }
}

/// Classifies `text` and stores the resulting item.
///
/// # FFI contract
/// - Async call; the network request runs on a dedicated runtime.
/// - Never panics.
/// - Returns the stored item with status `201`, or a failure envelope with
///   `400` (blank text) or `500` (configuration or classification failure).
pub async fn entry_process(text: String) -> EntryProcessResponse {
    let runtime = match entry_runtime() {
        Ok(runtime) => runtime,
        Err(message) => return process_failure(SERVER_ERROR_STATUS, message),
    };

    match runtime.spawn(process_entry(text)).await {
        Ok(response) => response,
        Err(err) => process_failure(
            SERVER_ERROR_STATUS,
            format!("entry_process failed: {err}"),
        ),
    }
}

/// Lists items organized into today/upcoming/completed.
///
/// Input semantics:
/// - `kind`: `event|task|note`, or `None`/`all` for every kind.
/// - `query`: optional case-insensitive text filter.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_list(kind: Option<String>, query: Option<String>) -> EntryListResponse {
    let mut filter = match kind.as_deref().map(str::trim) {
        None | Some("") => ItemFilter::everything(),
        Some(value) if value.eq_ignore_ascii_case("all") => ItemFilter::everything(),
        Some(value) => match ItemType::parse(value) {
            Some(kind) => ItemFilter::of_kind(kind),
            None => {
                return EntryListResponse::failure(format!(
                    "entry_list failed: unknown kind `{value}`"
                ))
            }
        },
    };
    if let Some(query) = query {
        filter = filter.with_query(query);
    }

    match with_item_service(|service| Ok(service.view(&filter))) {
        Ok(organized) => list_response(organized),
        Err(message) => EntryListResponse::failure(format!("entry_list failed: {message}")),
    }
}

/// Flips completion of one item.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_toggle_complete(id: String) -> EntryActionResponse {
    run_action("entry_toggle_complete", &id, |service, item_id| {
        let completed = service.toggle_complete(item_id)?;
        Ok(if completed {
            "Item completed."
        } else {
            "Item reopened."
        })
    })
}

/// Deletes one item permanently.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_delete(id: String) -> EntryActionResponse {
    run_action("entry_delete", &id, |service, item_id| {
        service.delete(item_id)?;
        Ok("Item deleted.")
    })
}

/// Replaces item content. Unchanged content is reported as a no-op success.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_update_content(id: String, content: String) -> EntryActionResponse {
    run_action("entry_update_content", &id, |service, item_id| {
        let changed = service.edit_content(item_id, &content)?;
        Ok(if changed {
            "Item updated."
        } else {
            "No changes."
        })
    })
}

/// Sets (`Some(epoch_ms)`) or clears (`None`) the due date.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_set_due_date(id: String, epoch_ms: Option<i64>, has_time: bool) -> EntryActionResponse {
    let due = match epoch_ms {
        Some(millis) => match Utc.timestamp_millis_opt(millis).single() {
            Some(due) => Some(due),
            None => {
                return EntryActionResponse::failure(format!(
                    "entry_set_due_date failed: invalid timestamp {millis}"
                ))
            }
        },
        None => None,
    };
    run_action("entry_set_due_date", &id, |service, item_id| {
        service.set_due_date(item_id, due, has_time)?;
        Ok(if due.is_some() {
            "Due date set."
        } else {
            "Due date cleared."
        })
    })
}

async fn process_entry(text: String) -> EntryProcessResponse {
    let config = ClassifierConfig::from_env();
    let backend = match OpenAiBackend::new(&config) {
        Ok(backend) => backend,
        Err(err) => return process_failure(SERVER_ERROR_STATUS, err.to_string()),
    };
    let service = ProcessService::new(ClassifierClient::new(
        backend,
        Arc::clone(&ENTRY_LIMITER),
        &config,
    ));

    let response = match service.process(ProcessRequest { text: Some(text) }).await {
        Ok(response) => response,
        Err(err) => return process_failure(err.status_code(), err.to_string()),
    };

    let item = response.item;
    let projected = to_entry_item(&item);
    match with_item_service(|service| service.add(item).map_err(|err| err.to_string())) {
        Ok(()) => EntryProcessResponse {
            ok: true,
            status_code: CREATED_STATUS,
            item: Some(projected),
            message: "Item created.".to_string(),
        },
        Err(message) => process_failure(
            SERVER_ERROR_STATUS,
            format!("entry_process failed: {message}"),
        ),
    }
}

fn process_failure(status_code: u16, message: impl Into<String>) -> EntryProcessResponse {
    EntryProcessResponse {
        ok: false,
        status_code,
        item: None,
        message: message.into(),
    }
}

fn run_action(
    operation: &str,
    raw_id: &str,
    action: impl FnOnce(
        &mut ItemService<SqliteKvStore<'_>>,
        &ItemId,
    ) -> Result<&'static str, braindump_core::ItemServiceError>,
) -> EntryActionResponse {
    let Some(item_id) = ItemId::parse(raw_id) else {
        return EntryActionResponse::failure(format!("{operation} failed: item id is empty"));
    };

    let outcome = with_item_service(|service| {
        let message = action(service, &item_id).map_err(|err| err.to_string())?;
        Ok((message, service.get(&item_id).map(to_entry_item)))
    });
    match outcome {
        Ok((message, item)) => EntryActionResponse::success(message, item),
        Err(message) => {
            warn!("event=entry_action module=ffi status=error operation={operation}");
            EntryActionResponse::failure(format!("{operation} failed: {message}"))
        }
    }
}

fn with_item_service<T>(
    f: impl FnOnce(&mut ItemService<SqliteKvStore<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let _guard = ENTRY_WRITE_LOCK.lock();
    let db_path = resolve_entry_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("entry DB open failed: {err}"))?;
    let mut service = ItemService::open(SqliteKvStore::new(&conn));
    f(&mut service)
}

fn entry_runtime() -> Result<&'static Runtime, String> {
    ENTRY_RUNTIME.get_or_try_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("braindump-entry")
            .enable_all()
            .build()
            .map_err(|err| format!("entry runtime init failed: {err}"))
    })
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn list_response(organized: OrganizedItems) -> EntryListResponse {
    let total = u32::try_from(organized.all.len()).unwrap_or(u32::MAX);
    let project = |items: &[Item]| items.iter().map(to_entry_item).collect::<Vec<_>>();
    EntryListResponse {
        today: project(&organized.today),
        upcoming: project(&organized.upcoming),
        completed: project(&organized.completed),
        total,
        message: if total == 0 {
            "No items.".to_string()
        } else {
            format!("Found {total} item(s).")
        },
    }
}

fn to_entry_item(item: &Item) -> EntryItem {
    EntryItem {
        id: item.id.to_string(),
        kind: item.kind.as_str().to_string(),
        title: item.title.clone(),
        content: item.content.clone(),
        original_input: item.original_input.clone(),
        tags: item
            .tags
            .iter()
            .map(|tag| EntryTag {
                label: tag.label.clone(),
                color: tag.color.clone(),
            })
            .collect(),
        due_epoch_ms: item.due_date.map(|due| due.timestamp_millis()),
        has_time: item.has_time,
        due_label: item.due_label(&Local),
        priority: item.priority.map(|value| value.as_str().to_string()),
        recurrence: item.recurrence.map(|value| value.as_str().to_string()),
        completed: item.completed,
        created_epoch_ms: item.created.timestamp_millis(),
        updated_epoch_ms: item.updated.timestamp_millis(),
    }
}
