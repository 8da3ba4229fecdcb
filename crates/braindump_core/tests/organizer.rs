use async_trait::async_trait;
use braindump_core::{
    organize_at, ClassifierClient, ClassifierConfig, ClassifyError, CompletionBackend,
    CompletionRequest, Item, ItemType, RateLimiter,
};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Arc;

fn item(content: &str, created: DateTime<Utc>, due: Option<DateTime<Utc>>) -> Item {
    let mut item = Item::new(ItemType::Task, content, content, content, created);
    item.due_date = due;
    item
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 24, 12, 0, 0).unwrap()
}

#[test]
fn buckets_and_orders_mixed_items() {
    let now = noon();
    let created = now - Duration::days(3);

    let undated = item("A", created, None);
    let tomorrow = item("B", created, Some(now + Duration::days(1)));
    let mut finished = item("C", created, Some(now - Duration::days(1)));
    finished.completed = true;

    let organized = organize_at(&[undated, tomorrow, finished], &now);

    assert_eq!(contents(&organized.today), ["A"]);
    assert_eq!(contents(&organized.upcoming), ["B"]);
    assert_eq!(contents(&organized.completed), ["C"]);
    assert_eq!(organized.all.len(), 3);
}

#[test]
fn dated_overdue_item_sorts_before_undated_regardless_of_creation() {
    let now = noon();
    let tomorrow = item("A", now - Duration::days(5), Some(now + Duration::days(1)));
    let yesterday = item("B", now - Duration::days(5), Some(now - Duration::days(1)));
    let undated = item("C", now - Duration::minutes(1), None);

    let organized = organize_at(&[tomorrow, yesterday, undated], &now);

    assert_eq!(contents(&organized.today), ["B", "C"]);
    assert_eq!(contents(&organized.upcoming), ["A"]);
}

#[test]
fn overdue_and_later_today_items_stay_in_today() {
    let now = noon();
    let created = now - Duration::days(1);
    let overdue = item("overdue", created, Some(now - Duration::days(2)));
    let tonight = item("tonight", created, Some(now + Duration::hours(11)));
    let midnight = item(
        "midnight",
        created,
        Some(Utc.with_ymd_and_hms(2025, 1, 25, 0, 0, 0).unwrap()),
    );

    let organized = organize_at(&[tonight, midnight, overdue], &now);

    assert_eq!(contents(&organized.today), ["overdue", "tonight"]);
    assert_eq!(contents(&organized.upcoming), ["midnight"]);
}

#[test]
fn today_lists_dated_first_then_newest_undated() {
    let now = noon();
    let older = item("older", now - Duration::hours(5), None);
    let newer = item("newer", now - Duration::hours(1), None);
    let late = item("late", now - Duration::days(2), Some(now + Duration::hours(6)));
    let early = item("early", now - Duration::days(2), Some(now - Duration::hours(6)));

    let organized = organize_at(&[older, late, newer, early], &now);

    assert_eq!(contents(&organized.today), ["early", "late", "newer", "older"]);
}

#[test]
fn completed_and_all_are_newest_created_first() {
    let now = noon();
    let mut first = item("first", now - Duration::days(2), None);
    let mut second = item("second", now - Duration::days(1), Some(now + Duration::days(9)));
    first.completed = true;
    second.completed = true;
    let open = item("open", now - Duration::hours(1), None);

    let organized = organize_at(&[first, second, open], &now);

    assert_eq!(contents(&organized.completed), ["second", "first"]);
    assert_eq!(contents(&organized.all), ["open", "second", "first"]);
}

#[test]
fn every_item_lands_in_exactly_one_bucket() {
    let now = noon();
    let items = (0..30)
        .map(|index| {
            let due = match index % 3 {
                0 => None,
                1 => Some(now + Duration::hours(index * 7 - 60)),
                _ => Some(now + Duration::days(index)),
            };
            let mut entry = item(&format!("item-{index}"), now - Duration::minutes(index), due);
            entry.completed = index % 5 == 0;
            entry
        })
        .collect::<Vec<_>>();

    let organized = organize_at(&items, &now);

    assert_eq!(organized.bucketed_len(), items.len());
    let mut seen = HashSet::new();
    for bucketed in organized
        .today
        .iter()
        .chain(&organized.upcoming)
        .chain(&organized.completed)
    {
        assert!(seen.insert(bucketed.id.clone()), "item bucketed twice");
    }
    assert_eq!(seen.len(), items.len());
    assert!(organized.completed.iter().all(|entry| entry.completed));
}

#[test]
fn day_boundary_follows_the_clock_time_zone() {
    let tz = FixedOffset::west_opt(5 * 3600).unwrap();
    let now = tz.with_ymd_and_hms(2025, 1, 24, 22, 0, 0).unwrap();
    // 23:30 local on the 24th, already the 25th in UTC.
    let due = tz
        .with_ymd_and_hms(2025, 1, 24, 23, 30, 0)
        .unwrap()
        .with_timezone(&Utc);
    let entry = item("late call", Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap(), Some(due));

    let organized = organize_at(&[entry], &now);

    assert_eq!(contents(&organized.today), ["late call"]);
    assert!(organized.upcoming.is_empty());
}

#[test]
fn empty_input_gives_empty_buckets() {
    let organized = organize_at(&[], &noon());
    assert_eq!(organized.bucketed_len(), 0);
    assert!(organized.all.is_empty());
}

struct MeetingTomorrow;

#[async_trait]
impl CompletionBackend for MeetingTomorrow {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ClassifyError> {
        assert!(request.user.contains("2025-01-24T12:00:00.000Z"));
        Ok(r##"{"mainNote":{"type":"event","title":"Meeting with Jane","content":"meeting with Jane tomorrow at 3pm","tags":[{"label":"meeting","color":"#10b981"}],"dueDate":"2025-01-25T15:00:00.000Z","hasTime":true},"status":"success"}"##.to_string())
    }
}

#[tokio::test]
async fn classified_meeting_tomorrow_is_upcoming() {
    let now = noon();
    let client = ClassifierClient::new(
        MeetingTomorrow,
        Arc::new(RateLimiter::default()),
        &ClassifierConfig::default(),
    );

    let result = client
        .classify_at("meeting with Jane tomorrow at 3pm", now)
        .await
        .unwrap();
    assert!(result.is_success());
    let classified = result.item.into_item(now);

    let organized = organize_at(&[classified], &now);

    assert!(organized.today.is_empty());
    assert_eq!(organized.upcoming.len(), 1);
    assert_eq!(organized.upcoming[0].kind, ItemType::Event);
    assert!(organized.upcoming[0].has_time);
}

fn contents(items: &[Item]) -> Vec<&str> {
    items.iter().map(|entry| entry.content.as_str()).collect()
}
