use async_trait::async_trait;
use bill_aggregator::digest::{collect_digests, dispatch_digests, is_upcoming_bill, KeywordEntry};
use bill_aggregator::traits::{BillSearch, DigestMailer};
use bill_aggregator::types::{BillRecord, Result};
use chrono::{Duration, NaiveDate, Utc};
use interfaces::defs::Recipient;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const FRONTEND: &str = "http://localhost:3000";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

/// Scripted search collaborator that records every external call.
struct MockSearch {
    results: HashMap<String, Vec<BillRecord>>,
    calls: Mutex<Vec<String>>,
}

impl MockSearch {
    fn new(results: HashMap<String, Vec<BillRecord>>) -> Self {
        Self {
            results,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BillSearch for MockSearch {
    async fn text_search(&self, query: &str) -> Result<Vec<BillRecord>> {
        self.calls.lock().unwrap().push(query.to_string());
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }
}

/// Mail collaborator that captures sends instead of talking SMTP.
#[derive(Default)]
struct MockMailer {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl DigestMailer for MockMailer {
    async fn send_digest(
        &self,
        recipient: &Recipient,
        subject: &str,
        _html_body: &str,
        _from: &str,
    ) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.email.clone(), subject.to_string()));
        Ok(())
    }
}

fn upcoming_bill(bill_id: i64, number: &str, title: &str, today: NaiveDate) -> BillRecord {
    BillRecord {
        bill_id,
        bill_number: number.to_string(),
        title: title.to_string(),
        last_action_date: Some(today.format("%Y-%m-%d").to_string()),
        ..Default::default()
    }
}

fn entry(user_id: Uuid, email: &str, keyword: &str) -> KeywordEntry {
    KeywordEntry {
        user_id,
        email: email.to_string(),
        full_name: format!("User {}", email),
        keyword: keyword.to_string(),
    }
}

#[tokio::test]
async fn shared_keyword_triggers_one_external_call() {
    init_tracing();

    let today = Utc::now().date_naive();
    let search = MockSearch::new(HashMap::from([(
        "education".to_string(),
        vec![upcoming_bill(1, "HB100", "School Funding", today)],
    )]));

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let entries = vec![
        entry(alice, "alice@example.org", "education"),
        entry(bob, "bob@example.org", "Education"),
    ];

    let digests = collect_digests(&search, &entries, &HashMap::new(), today, FRONTEND).await;

    assert_eq!(search.call_count(), 1, "memoized keyword searched twice");
    assert_eq!(digests.len(), 2);
    assert_eq!(digests[0].sections[0].bills[0].bill_number, "HB100");
    assert_eq!(digests[1].sections[0].bills[0].bill_number, "HB100");
}

#[tokio::test]
async fn ignored_bill_is_excluded_only_for_the_ignoring_user() {
    init_tracing();

    let today = Utc::now().date_naive();
    let search = MockSearch::new(HashMap::from([(
        "education".to_string(),
        vec![
            upcoming_bill(1, "HB100", "School Funding", today),
            upcoming_bill(2, "HB200", "Teacher Pay", today),
        ],
    )]));

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let entries = vec![
        entry(alice, "alice@example.org", "education"),
        entry(bob, "bob@example.org", "education"),
    ];
    let ignored = HashMap::from([(alice, HashSet::from(["HB100".to_string()]))]);

    let digests = collect_digests(&search, &entries, &ignored, today, FRONTEND).await;

    let alice_digest = digests
        .iter()
        .find(|d| d.recipient.email == "alice@example.org")
        .unwrap();
    let alice_numbers: Vec<&str> = alice_digest.sections[0]
        .bills
        .iter()
        .map(|b| b.bill_number.as_str())
        .collect();
    assert_eq!(alice_numbers, vec!["HB200"]);

    let bob_digest = digests
        .iter()
        .find(|d| d.recipient.email == "bob@example.org")
        .unwrap();
    let bob_numbers: Vec<&str> = bob_digest.sections[0]
        .bills
        .iter()
        .map(|b| b.bill_number.as_str())
        .collect();
    assert_eq!(bob_numbers, vec!["HB100", "HB200"]);
}

#[tokio::test]
async fn only_upcoming_bills_are_included() {
    let today = Utc::now().date_naive();
    let yesterday = today - Duration::days(1);
    let tomorrow = today + Duration::days(1);

    let stale = upcoming_bill(1, "HB1", "Stale", yesterday);
    let mut undated = upcoming_bill(3, "HB3", "Undated", today);
    undated.last_action_date = None;

    let search = MockSearch::new(HashMap::from([(
        "water".to_string(),
        vec![
            stale,
            upcoming_bill(2, "HB2", "Today", today),
            undated,
            upcoming_bill(4, "HB4", "Tomorrow", tomorrow),
        ],
    )]));

    let entries = vec![entry(Uuid::new_v4(), "carol@example.org", "water")];
    let digests = collect_digests(&search, &entries, &HashMap::new(), today, FRONTEND).await;

    let numbers: Vec<&str> = digests[0].sections[0]
        .bills
        .iter()
        .map(|b| b.bill_number.as_str())
        .collect();
    assert_eq!(numbers, vec!["HB2", "HB4"]);
}

#[tokio::test]
async fn users_with_no_matches_are_omitted() {
    let today = Utc::now().date_naive();
    let search = MockSearch::new(HashMap::from([(
        "education".to_string(),
        vec![upcoming_bill(1, "HB100", "School Funding", today)],
    )]));

    let entries = vec![
        entry(Uuid::new_v4(), "alice@example.org", "education"),
        entry(Uuid::new_v4(), "dave@example.org", "quarry permits"),
    ];

    let digests = collect_digests(&search, &entries, &HashMap::new(), today, FRONTEND).await;

    assert_eq!(digests.len(), 1);
    assert_eq!(digests[0].recipient.email, "alice@example.org");
    // The unmatched keyword still costs one (memoized) search call
    assert_eq!(search.call_count(), 2);
}

#[tokio::test]
async fn bill_summaries_carry_frontend_detail_urls() {
    let today = Utc::now().date_naive();
    let search = MockSearch::new(HashMap::from([(
        "education".to_string(),
        vec![upcoming_bill(184390, "HB100", "School Funding", today)],
    )]));

    let entries = vec![entry(Uuid::new_v4(), "alice@example.org", "education")];
    let digests = collect_digests(&search, &entries, &HashMap::new(), today, FRONTEND).await;

    assert_eq!(
        digests[0].sections[0].bills[0].url,
        "http://localhost:3000/bill/184390"
    );
}

#[tokio::test]
async fn dispatch_sends_one_email_per_user() {
    let today = Utc::now().date_naive();
    let search = MockSearch::new(HashMap::from([(
        "education".to_string(),
        vec![upcoming_bill(1, "HB100", "School Funding", today)],
    )]));

    let entries = vec![
        entry(Uuid::new_v4(), "alice@example.org", "education"),
        entry(Uuid::new_v4(), "bob@example.org", "education"),
    ];
    let digests = collect_digests(&search, &entries, &HashMap::new(), today, FRONTEND).await;

    let mailer = Arc::new(MockMailer::default());
    let sent = dispatch_digests(digests, mailer.clone(), FRONTEND, "digest@billtracker.local").await;

    assert_eq!(sent, 2);
    let sent_messages = mailer.sent.lock().unwrap();
    assert_eq!(sent_messages.len(), 2);
    assert!(sent_messages
        .iter()
        .all(|(_, subject)| subject == "Your Daily Bill Digest"));
}

#[test]
fn bill_with_future_last_action_date_is_upcoming() {
    let today = Utc::now().date_naive();
    let future = (today + Duration::days(5)).format("%Y-%m-%d").to_string();
    let bill = BillRecord {
        last_action_date: Some(future),
        ..Default::default()
    };
    assert!(is_upcoming_bill(&bill, today));
}

#[test]
fn bill_with_todays_last_action_date_is_upcoming() {
    let today = Utc::now().date_naive();
    let bill = BillRecord {
        last_action_date: Some(today.format("%Y-%m-%d").to_string()),
        ..Default::default()
    };
    assert!(is_upcoming_bill(&bill, today));
}

#[test]
fn bill_with_past_last_action_date_is_not_upcoming() {
    let today = Utc::now().date_naive();
    let past = (today - Duration::days(5)).format("%Y-%m-%d").to_string();
    let bill = BillRecord {
        last_action_date: Some(past),
        ..Default::default()
    };
    assert!(!is_upcoming_bill(&bill, today));
}

#[test]
fn bill_without_last_action_date_is_not_upcoming() {
    let today = Utc::now().date_naive();
    let bill = BillRecord::default();
    assert!(!is_upcoming_bill(&bill, today));
}

#[test]
fn bill_with_malformed_date_is_not_upcoming() {
    let today = Utc::now().date_naive();
    let bill = BillRecord {
        last_action_date: Some("not-a-date".to_string()),
        ..Default::default()
    };
    assert!(!is_upcoming_bill(&bill, today));
}
