use crate::config::Config;
use crate::interaction_manager::InteractionManager;
use crate::keyword_manager::KeywordManager;
use crate::traits::{BillSearch, DigestMailer};
use crate::types::{BillRecord, Result};
use chrono::{NaiveDate, Utc};
use interfaces::defs::{BillSummary, KeywordMatches, Recipient, UserDigest};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One saved (user, keyword) pair joined with the owner's identity, as
/// loaded for a digest run.
#[derive(Debug, Clone)]
pub struct KeywordEntry {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub keyword: String,
}

/// A bill belongs in a digest only if its last action date is today or
/// later. Bills without the field, or with an unparseable date, are out.
pub fn is_upcoming_bill(bill: &BillRecord, today: NaiveDate) -> bool {
    bill.last_action_date
        .as_deref()
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .map(|date| date >= today)
        .unwrap_or(false)
}

/// Format a bill for a digest e-mail, including its frontend detail URL.
pub fn format_bill(bill: &BillRecord, frontend_base_url: &str) -> BillSummary {
    BillSummary {
        bill_number: bill.bill_number.clone(),
        title: bill.title.clone(),
        url: format!("{}/bill/{}", frontend_base_url, bill.bill_id),
    }
}

/// Run the aggregation step of the digest job: search once per distinct
/// keyword (memoized across users), drop ignored and non-upcoming bills,
/// and group the survivors per user and keyword. Users with nothing to
/// report are omitted; nothing is dispatched here.
pub async fn collect_digests(
    search: &dyn BillSearch,
    entries: &[KeywordEntry],
    ignored_by_user: &HashMap<Uuid, HashSet<String>>,
    today: NaiveDate,
    frontend_base_url: &str,
) -> Vec<UserDigest> {
    let mut keyword_cache: HashMap<String, Vec<BillRecord>> = HashMap::new();
    let mut digests: Vec<UserDigest> = Vec::new();
    let mut digest_index: HashMap<Uuid, usize> = HashMap::new();
    let empty_ignored = HashSet::new();

    for entry in entries {
        let keyword = entry.keyword.to_lowercase();

        if !keyword_cache.contains_key(&keyword) {
            let results = match search.text_search(&keyword).await {
                Ok(results) => results,
                Err(e) => {
                    warn!("Search for '{}' failed: {}", keyword, e);
                    Vec::new()
                }
            };
            debug!("Search for '{}' returned {} bills", keyword, results.len());
            keyword_cache.insert(keyword.clone(), results);
        }
        let matching_bills = &keyword_cache[&keyword];

        let ignored = ignored_by_user
            .get(&entry.user_id)
            .unwrap_or(&empty_ignored);

        let bills: Vec<BillSummary> = matching_bills
            .iter()
            .filter(|bill| is_upcoming_bill(bill, today) && !ignored.contains(&bill.bill_number))
            .map(|bill| format_bill(bill, frontend_base_url))
            .collect();

        if bills.is_empty() {
            continue;
        }

        let index = *digest_index.entry(entry.user_id).or_insert_with(|| {
            digests.push(UserDigest {
                recipient: Recipient {
                    user_id: entry.user_id.to_string(),
                    email: entry.email.clone(),
                    full_name: entry.full_name.clone(),
                },
                sections: Vec::new(),
            });
            digests.len() - 1
        });

        digests[index].sections.push(KeywordMatches {
            keyword: entry.keyword.clone(),
            bills,
        });
    }

    digests
}

/// Dispatch one e-mail per user with non-empty digest content. Sends run
/// as spawned tasks; failures are logged and not retried. Returns the
/// number of successfully sent messages.
pub async fn dispatch_digests(
    digests: Vec<UserDigest>,
    mailer: Arc<dyn DigestMailer>,
    frontend_base_url: &str,
    from_email: &str,
) -> usize {
    let mut handles = Vec::new();

    for digest in digests {
        let (subject, html_body) = email_digest::format_digest_email(&digest, frontend_base_url);
        let mailer = mailer.clone();
        let from = from_email.to_string();

        handles.push(tokio::spawn(async move {
            match mailer
                .send_digest(&digest.recipient, &subject, &html_body, &from)
                .await
            {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to send digest to {}: {}", digest.recipient.email, e);
                    false
                }
            }
        }));
    }

    let mut sent = 0;
    for handle in handles {
        if let Ok(true) = handle.await {
            sent += 1;
        }
    }
    sent
}

/// Fetch new bills and send a single HTML digest e-mail per user.
pub async fn run_digest_job(
    search: &dyn BillSearch,
    keywords: &KeywordManager,
    interactions: &InteractionManager,
    mailer: Arc<dyn DigestMailer>,
    config: &Config,
) -> Result<usize> {
    let entries = keywords.all_keywords().await?;
    info!("Digest run over {} saved keywords", entries.len());

    let mut ignored_by_user: HashMap<Uuid, HashSet<String>> = HashMap::new();
    for entry in &entries {
        if !ignored_by_user.contains_key(&entry.user_id) {
            let ignored = interactions.ignored_bill_numbers(entry.user_id).await?;
            ignored_by_user.insert(entry.user_id, ignored);
        }
    }

    let today = Utc::now().date_naive();
    let digests = collect_digests(
        search,
        &entries,
        &ignored_by_user,
        today,
        &config.frontend_base_url,
    )
    .await;

    let sent = dispatch_digests(
        digests,
        mailer,
        &config.frontend_base_url,
        &config.from_email,
    )
    .await;

    info!("Sent {} HTML digest emails", sent);
    Ok(sent)
}
