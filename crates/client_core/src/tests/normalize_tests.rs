use super::*;
use serde_json::{json, Value};

fn entry(key: &str, record: Value) -> LedgerEntry {
    LedgerEntry::new(key, record.as_object().cloned().expect("object"))
}

fn group(key: &str, name: &str) -> LedgerEntry {
    entry(key, json!({ "groupName": name }))
}

fn keys(records: &[KeyedRecord]) -> Vec<&str> {
    records.iter().map(KeyedRecord::key).collect()
}

fn names(records: &[KeyedRecord]) -> Vec<&str> {
    records
        .iter()
        .map(|record| record.str_field(GROUP_NAME_FIELD).unwrap_or_default())
        .collect()
}

#[test]
fn merge_injects_container_key_and_keeps_order() {
    let records = merge_keys(vec![
        entry("2", json!({ "groupName": "B", "Key": "stale" })),
        entry("1", json!({ "groupName": "A" })),
    ]);
    assert_eq!(keys(&records), ["2", "1"]);
    assert_eq!(records[0].clone().into_record()["Key"], json!("2"));
    assert_eq!(records[0].field("groupName"), Some(&json!("B")));
}

#[test]
fn groups_sort_by_name_ignoring_case() {
    let records = normalize(
        vec![
            group("1", "Bravo"),
            group("2", "alpha"),
            group("3", "Charlie"),
        ],
        SortOrder::GroupName,
    );
    assert_eq!(names(&records), ["alpha", "Bravo", "Charlie"]);
}

#[test]
fn group_name_ties_keep_lowercase_first() {
    let records = normalize(
        vec![group("1", "AB17"), group("2", "ab17"), group("3", "Ab17")],
        SortOrder::GroupName,
    );
    assert_eq!(names(&records), ["ab17", "Ab17", "AB17"]);
}

#[test]
fn missing_group_name_sorts_as_empty() {
    let records = normalize(
        vec![
            group("1", "AB18"),
            entry("2", json!({ "userName": "no group" })),
            entry("3", json!({ "groupName": 17 })),
        ],
        SortOrder::GroupName,
    );
    assert_eq!(keys(&records), ["2", "3", "1"]);
}

#[test]
fn equal_group_names_keep_input_order() {
    let records = normalize(
        vec![
            group("9", "AB17"),
            group("3", "AB17"),
            group("5", "AB16"),
            group("1", "AB17"),
        ],
        SortOrder::GroupName,
    );
    assert_eq!(keys(&records), ["5", "9", "3", "1"]);
}

#[test]
fn delivery_items_sort_numerically_not_lexically() {
    let records = normalize(
        vec![
            entry("10", json!({})),
            entry("2", json!({})),
            entry("33", json!({})),
        ],
        SortOrder::NumericKey,
    );
    assert_eq!(keys(&records), ["2", "10", "33"]);
}

#[test]
fn zero_padded_keys_compare_by_value() {
    let records = normalize(
        vec![
            entry("0000000000000100", json!({})),
            entry("0000000000000020", json!({})),
            entry("3.5", json!({})),
        ],
        SortOrder::NumericKey,
    );
    assert_eq!(
        keys(&records),
        ["3.5", "0000000000000020", "0000000000000100"]
    );
}

#[test]
fn non_numeric_keys_trail_in_input_order() {
    let records = normalize(
        vec![
            entry("zeta", json!({})),
            entry("7", json!({})),
            entry("NaN", json!({})),
            entry("alpha", json!({})),
            entry("1", json!({})),
        ],
        SortOrder::NumericKey,
    );
    assert_eq!(keys(&records), ["1", "7", "zeta", "NaN", "alpha"]);
}

#[test]
fn sort_order_follows_operation() {
    assert_eq!(
        SortOrder::for_operation(Operation::GetAllGroups),
        Some(SortOrder::GroupName)
    );
    assert_eq!(
        SortOrder::for_operation(Operation::QueryAllUsers),
        Some(SortOrder::GroupName)
    );
    assert_eq!(
        SortOrder::for_operation(Operation::PrepareForDelivery),
        Some(SortOrder::NumericKey)
    );
    assert_eq!(SortOrder::for_operation(Operation::AddGroup), None);
}

#[test]
fn locale_compare_orders_case_insensitively() {
    assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
    assert_eq!(locale_compare("Zulu", "yankee"), Ordering::Greater);
    assert_eq!(locale_compare("same", "same"), Ordering::Equal);
    assert_eq!(locale_compare("", "a"), Ordering::Less);
}

#[test]
fn accented_names_sort_by_base_letter() {
    let records = normalize(
        vec![group("1", "Zed"), group("2", "Émile"), group("3", "apple")],
        SortOrder::GroupName,
    );
    assert_eq!(names(&records), ["apple", "Émile", "Zed"]);
}

#[test]
fn accents_break_ties_before_case() {
    let records = normalize(
        vec![
            group("1", "résumé"),
            group("2", "Resume"),
            group("3", "resume"),
            group("4", "Ängel"),
            group("5", "Anton"),
        ],
        SortOrder::GroupName,
    );
    assert_eq!(
        names(&records),
        ["Ängel", "Anton", "resume", "Resume", "résumé"]
    );
}

#[test]
fn precomposed_and_decomposed_accents_compare_equal() {
    assert_eq!(locale_compare("\u{e9}cole", "e\u{301}cole"), Ordering::Equal);
}

#[test]
fn numeric_prefix_is_read_like_parse_float() {
    assert_eq!(numeric_key("12abc"), Some(12.0));
    assert_eq!(numeric_key("  -3.5e2x"), Some(-350.0));
    assert_eq!(numeric_key("2e"), Some(2.0));
    assert_eq!(numeric_key(".5"), Some(0.5));
    assert_eq!(numeric_key("Infinity"), Some(f64::INFINITY));
    assert_eq!(numeric_key("inf"), None);
    assert_eq!(numeric_key("NaN"), None);
    assert_eq!(numeric_key("."), None);
    assert_eq!(numeric_key("abc12"), None);
}

#[test]
fn keys_with_numeric_prefix_sort_among_numbers() {
    let records = normalize(
        vec![
            entry("20", json!({})),
            entry("12abc", json!({})),
            entry("inf", json!({})),
            entry("-Infinity", json!({})),
        ],
        SortOrder::NumericKey,
    );
    assert_eq!(keys(&records), ["-Infinity", "12abc", "20", "inf"]);
}
