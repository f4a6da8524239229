use crate::bill_manager::{BillManager, StoredAnnotation};
use crate::filters::{filter_by_chamber, filter_by_type, search_by_bill_number};
use crate::interaction_manager::InteractionManager;
use crate::keyword_manager::KeywordManager;
use crate::legiscan::LegiscanClient;
use crate::types::{
    AnnotatedBill, Bill, BillRecord, Result, Stance, UserBillInteraction,
};
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Parameters of a bill search. Everything is optional; an empty set of
/// parameters returns the state's current bill list unfiltered.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub bill_number: Option<String>,
    pub query: Option<String>,
    pub sponsor: Option<i64>,
    pub chamber: Option<String>,
    pub bill_type: Option<String>,
}

impl SearchParams {
    pub fn is_empty(&self) -> bool {
        self.bill_number.is_none()
            && self.query.is_none()
            && self.sponsor.is_none()
            && self.chamber.is_none()
            && self.bill_type.is_none()
    }
}

/// Everything known about one bill: the live LegiScan record, the stored
/// admin annotation, and the requesting user's interaction if any.
#[derive(Debug, Clone)]
pub struct BillDetail {
    pub bill_data: Option<BillRecord>,
    pub admin_info: StoredAnnotation,
    pub user_interaction: Option<UserBillInteraction>,
}

/// Orchestrates the LegiScan client and the store managers behind the
/// service operations: listing, searching, bill detail, annotation, and
/// per-user keyword matches.
pub struct BillTracker {
    client: Arc<LegiscanClient>,
    bills: Arc<BillManager>,
    keywords: Arc<KeywordManager>,
    interactions: Arc<InteractionManager>,
}

impl BillTracker {
    pub fn new(db: PgPool, client: Arc<LegiscanClient>) -> Self {
        Self {
            client,
            bills: Arc::new(BillManager::new(db.clone())),
            keywords: Arc::new(KeywordManager::new(db.clone())),
            interactions: Arc::new(InteractionManager::new(db)),
        }
    }

    pub fn bills(&self) -> Arc<BillManager> {
        self.bills.clone()
    }

    pub fn keywords(&self) -> Arc<KeywordManager> {
        self.keywords.clone()
    }

    pub fn interactions(&self) -> Arc<InteractionManager> {
        self.interactions.clone()
    }

    /// The session master list with stored admin annotations merged in.
    /// Bills we have never annotated come back with empty admin fields.
    pub async fn master_list(&self) -> Result<(Value, Vec<AnnotatedBill>)> {
        let (session, records) = self.client.get_master_list().await?;
        let annotations = self.bills.annotations_by_bill_number().await?;

        let merged = records
            .into_iter()
            .map(|record| {
                let annotation = annotations
                    .get(&record.bill_number)
                    .cloned()
                    .unwrap_or_default();
                AnnotatedBill {
                    record,
                    admin_stance: annotation.admin_stance,
                    admin_note: annotation.admin_note,
                    admin_expanded_analysis_url: annotation.admin_expanded_analysis_url,
                }
            })
            .collect();

        Ok((session, merged))
    }

    /// Search bills by bill number, full-text keywords, sponsor, chamber
    /// or type. A full-text query replaces the base state listing; the
    /// remaining parameters narrow (sponsor: extend) the result set in
    /// order.
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<BillRecord>> {
        let mut results = self.client.list_state_bills().await?;

        if params.is_empty() {
            return Ok(results);
        }

        if let Some(query) = &params.query {
            results = self.client.search(&query.to_lowercase()).await?;
        }

        if let Some(bill_number) = &params.bill_number {
            results = search_by_bill_number(bill_number, &results)
                .into_iter()
                .cloned()
                .collect();
        }

        if let Some(sponsor) = params.sponsor {
            let sponsored = self.client.get_sponsored_list(sponsor).await?;
            results.extend(sponsored);
        }

        if let Some(chamber) = &params.chamber {
            results = filter_by_chamber(chamber, &results)
                .into_iter()
                .cloned()
                .collect();
        }

        if let Some(bill_type) = &params.bill_type {
            results = filter_by_type(bill_type, &results)
                .into_iter()
                .cloned()
                .collect();
        }

        Ok(results)
    }

    /// Bill details for display: live API data, stored admin info, and
    /// the requesting user's interaction. An upstream failure degrades to
    /// a detail with no live data rather than an error.
    pub async fn bill_detail(
        &self,
        user_id: Option<Uuid>,
        legiscan_bill_id: i64,
    ) -> Result<BillDetail> {
        let bill_data = match self.client.get_bill(legiscan_bill_id).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("bill fetch failed for {}: {}", legiscan_bill_id, e);
                None
            }
        };

        let stored = self.bills.get_by_legiscan_id(legiscan_bill_id).await?;
        let admin_info = stored
            .as_ref()
            .map(|bill| StoredAnnotation {
                admin_stance: bill.admin_stance,
                admin_note: bill.admin_note.clone(),
                admin_expanded_analysis_url: bill.admin_expanded_analysis_url.clone(),
            })
            .unwrap_or_default();

        let user_interaction = match (user_id, stored.as_ref()) {
            (Some(user_id), Some(bill)) => {
                self.interactions.get_interaction(user_id, bill.id).await?
            }
            _ => None,
        };

        Ok(BillDetail {
            bill_data,
            admin_info,
            user_interaction,
        })
    }

    /// Retrieve the stored row for a bill, creating and backfilling it
    /// from the LegiScan API when it is new or still lacks its number and
    /// title.
    pub async fn get_or_create_bill(&self, legiscan_bill_id: i64) -> Result<Bill> {
        let bill = self.bills.get_or_create_row(legiscan_bill_id).await?;

        if bill.bill_number.is_some() && bill.bill_title.is_some() {
            return Ok(bill);
        }

        match self.client.get_bill(legiscan_bill_id).await {
            Ok(record) => {
                self.bills
                    .set_bill_data(
                        bill.id,
                        Some(&record.bill_number).filter(|n| !n.is_empty()).map(|n| n.as_str()),
                        Some(&record.title).filter(|t| !t.is_empty()).map(|t| t.as_str()),
                    )
                    .await?;
                self.bills
                    .get_by_legiscan_id(legiscan_bill_id)
                    .await?
                    .ok_or(crate::types::TrackerError::NotFound("bill"))
            }
            Err(e) => {
                warn!(
                    "Could not backfill bill {} from LegiScan: {}",
                    legiscan_bill_id, e
                );
                Ok(bill)
            }
        }
    }

    /// Create or update a user's interaction with a bill, creating the
    /// bill row on first reference.
    pub async fn upsert_interaction(
        &self,
        user_id: Uuid,
        legiscan_bill_id: i64,
        stance: Option<Stance>,
        note: Option<&str>,
    ) -> Result<(UserBillInteraction, bool)> {
        let bill = self.get_or_create_bill(legiscan_bill_id).await?;
        self.interactions
            .upsert_interaction(user_id, bill.id, stance, note)
            .await
    }

    /// Admin annotation upsert: stance, note, expanded-analysis URL and
    /// optionally a replacement tag set, creating the bill row on first
    /// reference.
    pub async fn annotate_bill(
        &self,
        legiscan_bill_id: i64,
        stance: Option<Stance>,
        note: Option<&str>,
        expanded_analysis_url: Option<&str>,
        tag_names: Option<&[String]>,
    ) -> Result<Bill> {
        let bill = self.get_or_create_bill(legiscan_bill_id).await?;

        self.bills
            .update_annotation(bill.id, stance, note, expanded_analysis_url)
            .await?;
        if let Some(tag_names) = tag_names {
            self.bills.set_tags(bill.id, tag_names).await?;
        }

        info!("Annotated bill {}", legiscan_bill_id);
        self.bills
            .get_by_legiscan_id(legiscan_bill_id)
            .await?
            .ok_or(crate::types::TrackerError::NotFound("bill"))
    }

    /// Bills currently matching each of a user's saved keywords. Keywords
    /// with no matches are omitted.
    pub async fn matching_bills(&self, user_id: Uuid) -> Result<Vec<(String, Vec<BillRecord>)>> {
        let keywords = self.keywords.list_keywords(user_id).await?;
        let mut matched = Vec::new();

        for entry in keywords {
            let keyword = entry.keyword.to_lowercase();
            let bills = self.client.search(&keyword).await?;
            if !bills.is_empty() {
                matched.push((keyword, bills));
            }
        }

        Ok(matched)
    }
}
