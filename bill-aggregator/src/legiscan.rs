use crate::types::{BillRecord, Result, TrackerError};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const LEGISCAN_BASE_URL: &str = "https://api.legiscan.com/";

/// Bill progress codes as documented by LegiScan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegiscanStatus {
    Na,
    Introduced,
    Engrossed,
    Enrolled,
    Passed,
    Vetoed,
    Failed,
    Override,
    Chaptered,
    Refer,
    ReportPass,
    ReportDnp,
    Draft,
}

impl LegiscanStatus {
    pub fn code(&self) -> i64 {
        match self {
            LegiscanStatus::Na => 0,
            LegiscanStatus::Introduced => 1,
            LegiscanStatus::Engrossed => 2,
            LegiscanStatus::Enrolled => 3,
            LegiscanStatus::Passed => 4,
            LegiscanStatus::Vetoed => 5,
            LegiscanStatus::Failed => 6,
            LegiscanStatus::Override => 7,
            LegiscanStatus::Chaptered => 8,
            LegiscanStatus::Refer => 9,
            LegiscanStatus::ReportPass => 10,
            LegiscanStatus::ReportDnp => 11,
            LegiscanStatus::Draft => 12,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LegiscanStatus::Na => "N/A",
            LegiscanStatus::Introduced => "Introduced",
            LegiscanStatus::Engrossed => "Engrossed",
            LegiscanStatus::Enrolled => "Enrolled",
            LegiscanStatus::Passed => "Passed",
            LegiscanStatus::Vetoed => "Vetoed",
            LegiscanStatus::Failed => "Failed",
            LegiscanStatus::Override => "Override",
            LegiscanStatus::Chaptered => "Chaptered",
            LegiscanStatus::Refer => "Refer",
            LegiscanStatus::ReportPass => "Report Pass",
            LegiscanStatus::ReportDnp => "Report DNP",
            LegiscanStatus::Draft => "Draft",
        }
    }

    pub fn notes(&self) -> &'static str {
        match self {
            LegiscanStatus::Na => "Pre-filed or pre-introduction",
            LegiscanStatus::Failed => "Limited support based on state",
            LegiscanStatus::Override
            | LegiscanStatus::Chaptered
            | LegiscanStatus::Refer
            | LegiscanStatus::ReportPass
            | LegiscanStatus::ReportDnp
            | LegiscanStatus::Draft => "Progress array only",
            _ => "",
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        [
            LegiscanStatus::Na,
            LegiscanStatus::Introduced,
            LegiscanStatus::Engrossed,
            LegiscanStatus::Enrolled,
            LegiscanStatus::Passed,
            LegiscanStatus::Vetoed,
            LegiscanStatus::Failed,
            LegiscanStatus::Override,
            LegiscanStatus::Chaptered,
            LegiscanStatus::Refer,
            LegiscanStatus::ReportPass,
            LegiscanStatus::ReportDnp,
            LegiscanStatus::Draft,
        ]
        .into_iter()
        .find(|status| status.code() == code)
    }

    /// Textual representation of a status code for display.
    pub fn code_to_text(code: i64) -> String {
        match Self::from_code(code) {
            Some(status) => {
                if status.notes().is_empty() {
                    status.description().to_string()
                } else {
                    format!("{}- {}", status.description(), status.notes())
                }
            }
            None => "Unknown Status".to_string(),
        }
    }
}

/// HTTP client for the LegiScan API. All searches are scoped to the
/// configured state. Non-success responses on search paths degrade to an
/// empty result; the single-bill fetch surfaces them as an error value.
pub struct LegiscanClient {
    client: Client,
    api_key: String,
    state: String,
    base_url: String,
}

impl LegiscanClient {
    pub fn new(api_key: String, state: String) -> Self {
        let client = Client::builder()
            .user_agent("bill-aggregator/0.1")
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            state,
            base_url: LEGISCAN_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn get(&self, params: &[(&str, String)]) -> Result<reqwest::Response> {
        let mut query = vec![("key", self.api_key.clone())];
        query.extend(params.iter().map(|(k, v)| (*k, v.clone())));

        let response = self.client.get(&self.base_url).query(&query).send().await?;
        Ok(response)
    }

    /// Fetch a single bill. The numeric `status` field is replaced with
    /// its textual description before the record is returned.
    pub async fn get_bill(&self, legiscan_bill_id: i64) -> Result<BillRecord> {
        debug!("Fetching bill {} from LegiScan", legiscan_bill_id);

        let response = self
            .get(&[
                ("op", "getBill".to_string()),
                ("id", legiscan_bill_id.to_string()),
            ])
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::UpstreamStatus {
                operation: "getBill",
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await?;
        let bill_value = body
            .get("bill")
            .cloned()
            .ok_or(TrackerError::NotFound("bill"))?;

        let mut record: BillRecord = serde_json::from_value(bill_value)?;
        if let Some(code) = record.status.as_ref().and_then(Value::as_i64) {
            record.status = Some(Value::String(LegiscanStatus::code_to_text(code)));
        }

        Ok(record)
    }

    /// Fetch the state master list. Returns the session descriptor split
    /// out from the per-bill entries.
    pub async fn get_master_list(&self) -> Result<(Value, Vec<BillRecord>)> {
        debug!("Fetching master list for state {}", self.state);

        let response = self
            .get(&[
                ("op", "getMasterList".to_string()),
                ("state", self.state.clone()),
            ])
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::UpstreamStatus {
                operation: "getMasterList",
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await?;
        let mut masterlist = match body.get("masterlist") {
            Some(Value::Object(map)) => map.clone(),
            _ => return Ok((Value::Null, Vec::new())),
        };

        let session = masterlist.remove("session").unwrap_or(Value::Null);
        let bills = keyed_bill_records(masterlist);

        Ok((session, bills))
    }

    /// State-scoped full-text search. The leading "summary" entry of the
    /// search result is dropped; a non-success response yields an empty
    /// list rather than an error.
    pub async fn search(&self, query: &str) -> Result<Vec<BillRecord>> {
        debug!("Full-text search for '{}'", query);

        let response = self
            .get(&[
                ("op", "getSearch".to_string()),
                ("state", self.state.clone()),
                ("query", query.to_string()),
            ])
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("text search failed: status_code {}", status.as_u16());
            return Ok(Vec::new());
        }

        let body: Value = response.json().await?;
        Ok(parse_search_results(&body))
    }

    /// The state's current bill list: a search with no query term.
    /// Degrades to empty like the other search paths.
    pub async fn list_state_bills(&self) -> Result<Vec<BillRecord>> {
        debug!("Listing bills for state {}", self.state);

        let response = self
            .get(&[
                ("op", "getSearch".to_string()),
                ("state", self.state.clone()),
            ])
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("state bill listing failed: status_code {}", status.as_u16());
            return Ok(Vec::new());
        }

        let body: Value = response.json().await?;
        Ok(parse_search_results(&body))
    }

    /// Session-scoped paged full-text search.
    pub async fn search_session(
        &self,
        session_id: i64,
        query: &str,
        page: u32,
    ) -> Result<Vec<BillRecord>> {
        debug!("Session {} search for '{}' page {}", session_id, query, page);

        let response = self
            .get(&[
                ("op", "getSearch".to_string()),
                ("id", session_id.to_string()),
                ("query", query.to_string()),
                ("page", page.to_string()),
            ])
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("session search failed: status_code {}", status.as_u16());
            return Ok(Vec::new());
        }

        let body: Value = response.json().await?;
        Ok(parse_search_results(&body))
    }

    /// Bills sponsored by a legislator. Degrades to empty on a
    /// non-success response.
    pub async fn get_sponsored_list(&self, people_id: i64) -> Result<Vec<BillRecord>> {
        debug!("Fetching sponsored list for person {}", people_id);

        let response = self
            .get(&[
                ("op", "getSponsoredList".to_string()),
                ("id", people_id.to_string()),
            ])
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("sponsored list failed: status_code {}", status.as_u16());
            return Ok(Vec::new());
        }

        let body: Value = response.json().await?;
        let bills = body
            .get("sponsoredbills")
            .and_then(|v| v.get("bills"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let records = bills
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();

        Ok(records)
    }
}

/// Extract bill records from a `searchresult` payload, skipping the
/// "summary" entry and preserving the numeric result order.
fn parse_search_results(body: &Value) -> Vec<BillRecord> {
    let map = match body.get("searchresult") {
        Some(Value::Object(map)) => map.clone(),
        _ => return Vec::new(),
    };
    keyed_bill_records(
        map.into_iter()
            .filter(|(key, _)| key != "summary")
            .collect(),
    )
}

/// LegiScan returns bill collections as objects keyed by "0", "1", ...;
/// order them numerically and decode each entry.
fn keyed_bill_records(map: serde_json::Map<String, Value>) -> Vec<BillRecord> {
    let mut entries: Vec<(usize, Value)> = map
        .into_iter()
        .filter_map(|(key, value)| key.parse::<usize>().ok().map(|index| (index, value)))
        .collect();
    entries.sort_by_key(|(index, _)| *index);

    entries
        .into_iter()
        .filter_map(|(_, value)| serde_json::from_value(value).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_codes_map_to_text() {
        assert_eq!(LegiscanStatus::code_to_text(4), "Passed");
        assert_eq!(
            LegiscanStatus::code_to_text(6),
            "Failed- Limited support based on state"
        );
        assert_eq!(
            LegiscanStatus::code_to_text(0),
            "N/A- Pre-filed or pre-introduction"
        );
        assert_eq!(LegiscanStatus::code_to_text(99), "Unknown Status");
    }

    #[test]
    fn search_results_skip_summary_and_keep_numeric_order() {
        let body = json!({
            "status": "OK",
            "searchresult": {
                "summary": {"page": "1 of 1", "count": 12},
                "0": {"bill_id": 1, "bill_number": "HB1", "title": "First"},
                "2": {"bill_id": 3, "bill_number": "HB3", "title": "Third"},
                "1": {"bill_id": 2, "bill_number": "HB2", "title": "Second"},
                "10": {"bill_id": 11, "bill_number": "HB11", "title": "Eleventh"}
            }
        });

        let bills = parse_search_results(&body);
        let numbers: Vec<&str> = bills.iter().map(|b| b.bill_number.as_str()).collect();
        assert_eq!(numbers, vec!["HB1", "HB2", "HB3", "HB11"]);
    }

    #[test]
    fn search_results_empty_when_payload_malformed() {
        assert!(parse_search_results(&json!({"status": "ERROR"})).is_empty());
        assert!(parse_search_results(&json!({"searchresult": []})).is_empty());
    }

    #[test]
    fn master_list_records_accept_number_alias() {
        // getMasterList uses "number" where getSearch uses "bill_number"
        let record: BillRecord =
            serde_json::from_value(json!({"bill_id": 7, "number": "SB7", "title": "Alias"}))
                .unwrap();
        assert_eq!(record.bill_number, "SB7");
    }
}
