use bill_aggregator::filters::{filter_by_chamber, filter_by_type, search_by_bill_number};
use bill_aggregator::types::BillRecord;

fn bill(number: &str, title: &str) -> BillRecord {
    BillRecord {
        bill_number: number.to_string(),
        title: title.to_string(),
        ..Default::default()
    }
}

fn sample_bills() -> Vec<BillRecord> {
    vec![
        bill("HB1001", "House Bill 1001"),
        bill("SB2001", "Senate Bill 2001"),
        bill("HR3001", "House Resolution 3001"),
        bill("SJR4001", "Senate Joint Resolution 4001"),
        bill("HB200", "House Bill 200"),
        bill("SB200", "Senate Bill 200"),
    ]
}

fn numbers<'a>(bills: &[&'a BillRecord]) -> Vec<&'a str> {
    bills.iter().map(|b| b.bill_number.as_str()).collect()
}

#[test]
fn search_by_bill_number_exact_match() {
    let bills = sample_bills();
    let result = search_by_bill_number("HB1001", &bills);
    assert_eq!(numbers(&result), vec!["HB1001"]);
}

#[test]
fn search_by_bill_number_partial_match() {
    let bills = sample_bills();
    // Digits match as a substring of the full bill number
    let result = search_by_bill_number("200", &bills);
    assert_eq!(numbers(&result), vec!["SB2001", "HB200", "SB200"]);
}

#[test]
fn search_by_bill_number_chamber_only() {
    let bills = sample_bills();
    let result = search_by_bill_number("H", &bills);
    assert_eq!(numbers(&result), vec!["HB1001", "HR3001", "HB200"]);
}

#[test]
fn search_by_bill_number_type_only() {
    let bills = sample_bills();
    let result = search_by_bill_number("B", &bills);
    assert_eq!(numbers(&result), vec!["HB1001", "SB2001", "HB200", "SB200"]);
}

#[test]
fn search_by_bill_number_is_case_insensitive() {
    let bills = sample_bills();
    let result = search_by_bill_number("hb200", &bills);
    assert_eq!(numbers(&result), vec!["HB200"]);
}

#[test]
fn search_by_bill_number_rejects_malformed_terms() {
    let bills = sample_bills();
    assert!(search_by_bill_number("XB12", &bills).is_empty());
    assert!(search_by_bill_number("HB12X", &bills).is_empty());
}

#[test]
fn search_by_bill_number_empty_term_is_all_wildcards() {
    let bills = sample_bills();
    let result = search_by_bill_number("", &bills);
    assert_eq!(result.len(), bills.len());
}

#[test]
fn filter_by_chamber_house() {
    let bills = sample_bills();
    let result = filter_by_chamber("House", &bills);
    assert_eq!(numbers(&result), vec!["HB1001", "HR3001", "HB200"]);
}

#[test]
fn filter_by_chamber_senate() {
    let bills = sample_bills();
    let result = filter_by_chamber("Senate", &bills);
    assert_eq!(numbers(&result), vec!["SB2001", "SJR4001", "SB200"]);
}

#[test]
fn filter_by_chamber_unknown_label_matches_nothing() {
    let bills = sample_bills();
    assert!(filter_by_chamber("Parliament", &bills).is_empty());
}

#[test]
fn filter_by_type_bill() {
    let bills = sample_bills();
    let result = filter_by_type("Bill", &bills);
    assert_eq!(numbers(&result), vec!["HB1001", "SB2001", "HB200", "SB200"]);
}

#[test]
fn filter_by_type_resolution() {
    let bills = sample_bills();
    // SJR4001 is a joint resolution, not a resolution
    let result = filter_by_type("Resolution", &bills);
    assert_eq!(numbers(&result), vec!["HR3001"]);
}

#[test]
fn filter_by_type_joint_resolution() {
    let bills = sample_bills();
    let result = filter_by_type("Joint Resolution", &bills);
    assert_eq!(numbers(&result), vec!["SJR4001"]);
}

#[test]
fn filter_by_type_unknown_label_matches_nothing() {
    let bills = sample_bills();
    assert!(filter_by_type("Amendment", &bills).is_empty());
}
