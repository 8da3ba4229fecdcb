use braindump_core::{highlight, Item, ItemFilter, ItemType, Tag};
use chrono::{TimeZone, Utc};

fn items() -> Vec<Item> {
    let now = Utc.with_ymd_and_hms(2025, 1, 24, 9, 0, 0).unwrap();
    let mut meeting = Item::new(
        ItemType::Event,
        "Sync",
        "Team sync",
        "sync with the team on Friday",
        now,
    );
    meeting.tags = vec![Tag::from_palette("work").unwrap()];
    let groceries = Item::new(ItemType::Task, "Groceries", "Buy Milk", "buy milk", now);
    let idea = Item::new(ItemType::Note, "Idea", "App for plants", "app for plants", now);
    vec![meeting, groceries, idea]
}

fn contents(items: &[Item]) -> Vec<&str> {
    items.iter().map(|item| item.content.as_str()).collect()
}

#[test]
fn empty_filter_keeps_everything_in_order() {
    let all = items();
    assert_eq!(ItemFilter::everything().apply(&all), all);
}

#[test]
fn kind_filter_selects_one_type() {
    let filtered = ItemFilter::of_kind(ItemType::Task).apply(&items());
    assert_eq!(contents(&filtered), ["Buy Milk"]);
}

#[test]
fn query_matches_content_original_input_and_tags_case_insensitively() {
    let all = items();
    assert_eq!(
        contents(&ItemFilter::everything().with_query("MILK").apply(&all)),
        ["Buy Milk"]
    );
    assert_eq!(
        contents(&ItemFilter::everything().with_query("friday").apply(&all)),
        ["Team sync"]
    );
    assert_eq!(
        contents(&ItemFilter::everything().with_query("Work").apply(&all)),
        ["Team sync"]
    );
}

#[test]
fn query_does_not_look_at_titles() {
    let filtered = ItemFilter::everything().with_query("groceries").apply(&items());
    assert!(filtered.is_empty());
}

#[test]
fn kind_and_query_combine() {
    let filtered = ItemFilter::of_kind(ItemType::Note)
        .with_query("milk")
        .apply(&items());
    assert!(filtered.is_empty());
}

#[test]
fn highlight_treats_query_literally() {
    let segments = highlight("cost (approx) $5.00 or (APPROX) more", "(approx)");
    let matched = segments
        .iter()
        .filter(|segment| segment.matched)
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>();
    assert_eq!(matched, ["(approx)", "(APPROX)"]);

    let rebuilt = segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<String>();
    assert_eq!(rebuilt, "cost (approx) $5.00 or (APPROX) more");
}
