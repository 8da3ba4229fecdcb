//! Display bucketing for item collections.
//!
//! # Responsibility
//! - Partition items into `today`, `upcoming` and `completed`.
//! - Order each bucket deterministically.
//!
//! # Invariants
//! - Every input item lands in exactly one of the three buckets.
//! - `all` holds every item, newest `created` first.
//! - All sorts are stable.
//! - Recomputed from scratch on each call; no state is kept.

use crate::model::item::Item;
use chrono::{DateTime, Days, Duration, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use std::cmp::Ordering;

const GAP_SCAN_STEP_MINUTES: i64 = 15;
const GAP_SCAN_STEPS: i64 = 12;

/// Bucketed view over an item collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrganizedItems {
    /// Open items that are undated or due before tomorrow.
    pub today: Vec<Item>,
    /// Open items due tomorrow or later.
    pub upcoming: Vec<Item>,
    /// Completed items regardless of due date.
    pub completed: Vec<Item>,
    pub all: Vec<Item>,
}

impl OrganizedItems {
    pub fn bucketed_len(&self) -> usize {
        self.today.len() + self.upcoming.len() + self.completed.len()
    }
}

/// Organizes items relative to the local calendar day.
pub fn organize(items: &[Item]) -> OrganizedItems {
    organize_at(items, &Local::now())
}

/// Organizes items relative to the calendar day containing `now` in its own
/// time zone.
///
/// An open item is in `today` when it has no due date or its due date falls
/// before the start of the next day; otherwise it is `upcoming`.
pub fn organize_at<Tz: TimeZone>(items: &[Item], now: &DateTime<Tz>) -> OrganizedItems {
    let start_of_tomorrow = start_of_next_day(now);

    let mut all = items.to_vec();
    all.sort_by(newest_created_first);

    let mut organized = OrganizedItems {
        all,
        ..OrganizedItems::default()
    };

    for item in items {
        if item.completed {
            organized.completed.push(item.clone());
            continue;
        }
        match item.due_date {
            Some(due) if due >= start_of_tomorrow => organized.upcoming.push(item.clone()),
            _ => organized.today.push(item.clone()),
        }
    }

    organized.today.sort_by(dated_first);
    organized.upcoming.sort_by(dated_first);
    organized.completed.sort_by(newest_created_first);
    organized
}

/// Dated before undated; dated ascending by due date; undated newest first.
fn dated_first(a: &Item, b: &Item) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => newest_created_first(a, b),
    }
}

fn newest_created_first(a: &Item, b: &Item) -> Ordering {
    b.created.cmp(&a.created)
}

fn start_of_next_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let today = now.date_naive();
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    local_midnight(&now.timezone(), tomorrow)
}

/// Start of `date` in `tz`: the earliest midnight when the wall clock is
/// ambiguous, or the first valid instant after a gap that swallows midnight.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=GAP_SCAN_STEPS)
        .find_map(|step| {
            let wall = midnight + Duration::minutes(GAP_SCAN_STEP_MINUTES * step);
            tz.from_local_datetime(&wall).earliest()
        })
        .map(|value| value.with_timezone(&Utc))
        .unwrap_or_else(|| {
            let offset = tz.offset_from_utc_datetime(&midnight).fix();
            let shift = Duration::seconds(i64::from(offset.local_minus_utc()));
            Utc.from_utc_datetime(&(midnight - shift))
        })
}
