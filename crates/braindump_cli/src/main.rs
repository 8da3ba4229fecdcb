//! Command-line front end.
//!
//! # Responsibility
//! - Capture brain-dump text and print the organized item buckets.
//! - Expose the item actions (complete, delete, edit, reschedule) by ID.

use braindump_core::{
    default_log_level, init_logging, open_db, ClassifierClient, ClassifierConfig, Item,
    ItemFilter, ItemId, ItemService, ItemType, OpenAiBackend, OrganizedItems, ProcessRequest,
    ProcessService, RateLimiter, SqliteKvStore,
};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

const APP_DIR_NAME: &str = "braindump";
const DB_FILE_NAME: &str = "braindump.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "braindump", version, about = "Turn free-form text into organized items")]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true, env = "BRAINDUMP_DB_PATH")]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify text and store the resulting item.
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Print items grouped into today, upcoming and completed.
    List {
        /// event|task|note
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Toggle completion.
    Done { id: String },
    Delete { id: String },
    /// Replace item content.
    Edit {
        id: String,
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },
    /// Set or clear a due date.
    Due {
        id: String,
        /// `YYYY-MM-DD` or `YYYY-MM-DD HH:MM` in local time; omit to clear.
        when: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let db_path = match cli.db.clone().or_else(default_db_path) {
        Some(path) => path,
        None => {
            eprintln!("error: no data directory available; pass --db");
            return ExitCode::FAILURE;
        }
    };
    start_logging(cli.log_level.as_deref(), &db_path);

    match run(cli.command, &db_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, db_path: &Path) -> Result<(), String> {
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let mut items = ItemService::open(SqliteKvStore::new(&conn));

    match command {
        Command::Add { text } => {
            let config = ClassifierConfig::from_env();
            let backend = OpenAiBackend::new(&config).map_err(|err| err.to_string())?;
            // One classification per process, so the per-minute budget never binds here.
            let limiter = Arc::new(RateLimiter::new(config.requests_per_minute));
            let processor = ProcessService::new(ClassifierClient::new(backend, limiter, &config));

            let response = processor
                .process(ProcessRequest::new(text.join(" ")))
                .await
                .map_err(|err| format!("{err} (status {})", err.status_code()))?;
            let item = response.item;
            println!("{}", describe(&item));
            items.add(item).map_err(|err| err.to_string())?;
        }
        Command::List { kind, search } => {
            let mut filter = match kind {
                Some(kind) => ItemFilter::of_kind(
                    ItemType::parse(&kind).ok_or_else(|| format!("unknown kind `{kind}`"))?,
                ),
                None => ItemFilter::everything(),
            };
            if let Some(search) = search {
                filter = filter.with_query(search);
            }
            print_organized(&items.view(&filter));
        }
        Command::Done { id } => {
            let completed = items
                .toggle_complete(&parse_id(&id)?)
                .map_err(|err| err.to_string())?;
            println!("{}", if completed { "completed" } else { "reopened" });
        }
        Command::Delete { id } => {
            let removed = items.delete(&parse_id(&id)?).map_err(|err| err.to_string())?;
            println!("deleted {}", removed.title);
        }
        Command::Edit { id, content } => {
            let changed = items
                .edit_content(&parse_id(&id)?, &content.join(" "))
                .map_err(|err| err.to_string())?;
            println!("{}", if changed { "updated" } else { "no changes" });
        }
        Command::Due { id, when } => {
            let (due, has_time) = match when.as_deref() {
                Some(raw) => {
                    let (due, has_time) = parse_local_due(raw)?;
                    (Some(due), has_time)
                }
                None => (None, false),
            };
            let id = parse_id(&id)?;
            items
                .set_due_date(&id, due, has_time)
                .map_err(|err| err.to_string())?;
            match items.get(&id).and_then(|item| item.due_label(&Local)) {
                Some(label) => println!("due {label}"),
                None => println!("due date cleared"),
            }
        }
    }
    Ok(())
}

fn default_db_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME).join(DB_FILE_NAME))
}

/// Logs go next to the database; a failure only disables logging.
fn start_logging(level: Option<&str>, db_path: &Path) {
    let Some(log_dir) = db_path
        .parent()
        .map(|dir| dir.join("logs"))
        .filter(|dir| dir.is_absolute())
    else {
        return;
    };
    let level = level.unwrap_or(default_log_level());
    match init_logging(level, &log_dir.to_string_lossy()) {
        Ok(()) => info!("event=cli_start module=cli status=ok"),
        Err(err) => eprintln!("warning: logging disabled: {err}"),
    }
}

fn parse_id(raw: &str) -> Result<ItemId, String> {
    ItemId::parse(raw).ok_or_else(|| "item id is empty".to_string())
}

fn parse_local_due(raw: &str) -> Result<(DateTime<Utc>, bool), String> {
    let raw = raw.trim();
    let (date_part, time_part) = match raw.split_once(' ') {
        Some((date, time)) => (date, Some(time.trim())),
        None => (raw, None),
    };
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|err| format!("invalid date `{date_part}`: {err}"))?;
    let time = match time_part {
        Some(value) => NaiveTime::parse_from_str(value, "%H:%M")
            .map_err(|err| format!("invalid time `{value}`: {err}"))?,
        None => NaiveTime::MIN,
    };
    let local = Local
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .ok_or_else(|| format!("`{raw}` does not exist in the local time zone"))?;
    Ok((local.with_timezone(&Utc), time_part.is_some()))
}

fn print_organized(organized: &OrganizedItems) {
    for (heading, bucket) in [
        ("Today", &organized.today),
        ("Upcoming", &organized.upcoming),
        ("Completed", &organized.completed),
    ] {
        println!("{heading} ({})", bucket.len());
        for item in bucket {
            println!("  {}", describe(item));
        }
    }
}

fn describe(item: &Item) -> String {
    let mut line = format!("[{}] {} {}", item.kind.as_str(), item.id, item.title);
    if let Some(label) = item.due_label(&Local) {
        line.push_str(&format!(" (due {label})"));
    }
    if !item.tags.is_empty() {
        let labels = item
            .tags
            .iter()
            .map(|tag| format!("#{}", tag.label))
            .collect::<Vec<_>>();
        line.push(' ');
        line.push_str(&labels.join(" "));
    }
    line
}
