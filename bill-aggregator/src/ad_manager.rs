use crate::types::{Ad, AdStyle, Result, TrackerError};
use chrono::Utc;
use rand::seq::SliceRandom;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

pub struct AdManager {
    db: PgPool,
}

impl AdManager {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_ad(
        &self,
        title: &str,
        image_url: Option<&str>,
        link: &str,
        weight: u32,
        style: Option<AdStyle>,
    ) -> Result<Ad> {
        if title.trim().is_empty() {
            return Err(TrackerError::Validation("title is required".to_string()));
        }
        if weight == 0 {
            return Err(TrackerError::Validation(
                "weight must be at least 1".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO ads (id, title, image_url, link, weight, is_active, style, created_at, modified_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6, $7, $7)
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(image_url)
        .bind(link)
        .bind(weight as i32)
        .bind(style.map(|s| s.as_str()))
        .bind(now)
        .execute(&self.db)
        .await?;

        info!("Created ad '{}' with weight {}", title, weight);
        self.get_ad(id).await
    }

    pub async fn get_ad(&self, ad_id: Uuid) -> Result<Ad> {
        let row = sqlx::query("SELECT * FROM ads WHERE id = $1")
            .bind(ad_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(TrackerError::NotFound("ad"))?;

        ad_from_row(&row)
    }

    pub async fn update_ad(
        &self,
        ad_id: Uuid,
        title: Option<&str>,
        weight: Option<u32>,
        is_active: Option<bool>,
    ) -> Result<Ad> {
        if weight == Some(0) {
            return Err(TrackerError::Validation(
                "weight must be at least 1".to_string(),
            ));
        }

        let result = sqlx::query(
            r#"
            UPDATE ads
            SET title = COALESCE($1, title),
                weight = COALESCE($2, weight),
                is_active = COALESCE($3, is_active),
                modified_at = $4
            WHERE id = $5
            "#,
        )
        .bind(title)
        .bind(weight.map(|w| w as i32))
        .bind(is_active)
        .bind(Utc::now())
        .bind(ad_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TrackerError::NotFound("ad"));
        }

        self.get_ad(ad_id).await
    }

    pub async fn delete_ad(&self, ad_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM ads WHERE id = $1")
            .bind(ad_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TrackerError::NotFound("ad"));
        }

        Ok(())
    }

    pub async fn active_ads(&self) -> Result<Vec<Ad>> {
        let rows = sqlx::query("SELECT * FROM ads WHERE is_active = TRUE ORDER BY created_at")
            .fetch_all(&self.db)
            .await?;

        rows.iter().map(ad_from_row).collect()
    }

    /// Active ads with weight-based randomization: each ad appears
    /// `weight` times, shuffled. Callers render the list top to bottom.
    pub async fn weighted_listing(&self) -> Result<Vec<Ad>> {
        let mut listing = expand_by_weight(&self.active_ads().await?);
        listing.shuffle(&mut rand::thread_rng());
        Ok(listing)
    }

    /// Unique ads, newest first, for the admin view.
    pub async fn admin_listing(&self) -> Result<Vec<Ad>> {
        let rows = sqlx::query("SELECT * FROM ads ORDER BY created_at DESC")
            .fetch_all(&self.db)
            .await?;

        rows.iter().map(ad_from_row).collect()
    }
}

/// Repeat each ad by its weight. Higher weight means more frequent display
/// once the expansion is shuffled.
pub fn expand_by_weight(ads: &[Ad]) -> Vec<Ad> {
    ads.iter()
        .flat_map(|ad| std::iter::repeat(ad.clone()).take(ad.weight as usize))
        .collect()
}

fn ad_from_row(row: &sqlx::postgres::PgRow) -> Result<Ad> {
    let style: Option<String> = row.try_get("style")?;
    let weight: i32 = row.try_get("weight")?;

    Ok(Ad {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        image_url: row.try_get("image_url")?,
        link: row.try_get("link")?,
        weight: weight.max(0) as u32,
        is_active: row.try_get("is_active")?,
        style: style.and_then(|s| s.parse::<AdStyle>().ok()),
        created_at: row.try_get("created_at")?,
        modified_at: row.try_get("modified_at")?,
    })
}
