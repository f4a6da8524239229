use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A bill record as returned by the LegiScan API. Ephemeral: fetched per
/// request, never authoritative in our store. Master-list responses use
/// `number` where search responses use `bill_number`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BillRecord {
    #[serde(default)]
    pub bill_id: i64,
    #[serde(alias = "number", default)]
    pub bill_number: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<i64>,
}

/// A LegiScan bill record merged with our stored admin annotation, if any.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedBill {
    #[serde(flatten)]
    pub record: BillRecord,
    pub admin_stance: Option<Stance>,
    pub admin_note: Option<String>,
    pub admin_expanded_analysis_url: Option<String>,
}

/// A declared position on a bill, shared by users and admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Support,
    Oppose,
    Watch,
}

impl Stance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::Support => "support",
            Stance::Oppose => "oppose",
            Stance::Watch => "watch",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stance {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "support" => Ok(Stance::Support),
            "oppose" => Ok(Stance::Oppose),
            "watch" => Ok(Stance::Watch),
            other => Err(TrackerError::Validation(format!(
                "unknown stance '{}', expected support, oppose or watch",
                other
            ))),
        }
    }
}

/// A stored bill row. Created lazily on first reference and backfilled from
/// the API; the admin fields hold this site's annotation of the bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: Uuid,
    pub legiscan_bill_id: i64,
    pub bill_number: Option<String>,
    pub bill_title: Option<String>,
    pub admin_stance: Option<Stance>,
    pub admin_note: Option<String>,
    pub admin_expanded_analysis_url: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A keyword a user monitors for new bills.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserKeyword {
    pub id: Uuid,
    pub user_id: Uuid,
    pub keyword: String,
    pub created_at: DateTime<Utc>,
}

/// A user's interaction with a bill: a note, a stance, and an ignore flag
/// that suppresses the bill from their digests. Unique per (user, bill).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBillInteraction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bill_id: Uuid,
    pub legiscan_bill_id: i64,
    pub bill_number: Option<String>,
    pub bill_title: Option<String>,
    pub stance: Option<Stance>,
    pub note: Option<String>,
    pub ignored: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdStyle {
    Horizontal,
    Vertical,
    Square,
}

impl AdStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdStyle::Horizontal => "horizontal",
            AdStyle::Vertical => "vertical",
            AdStyle::Square => "square",
        }
    }
}

impl FromStr for AdStyle {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "horizontal" => Ok(AdStyle::Horizontal),
            "vertical" => Ok(AdStyle::Vertical),
            "square" => Ok(AdStyle::Square),
            other => Err(TrackerError::Validation(format!(
                "unknown ad style '{}'",
                other
            ))),
        }
    }
}

/// A sponsored placement. Higher weight means more frequent display in the
/// randomized listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ad {
    pub id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub link: String,
    pub weight: u32,
    pub is_active: bool,
    pub style: Option<AdStyle>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("LegiScan request failed: {operation} returned status {status}")]
    UpstreamStatus { operation: &'static str, status: u16 },

    #[error("mail error: {0}")]
    Mail(#[from] email_digest::MailError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
