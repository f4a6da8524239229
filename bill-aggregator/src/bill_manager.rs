use crate::types::{Bill, Result, Stance, TrackerError};
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Admin annotation fields of a stored bill, keyed by bill number when
/// merging into master-list responses.
#[derive(Debug, Clone, Default)]
pub struct StoredAnnotation {
    pub admin_stance: Option<Stance>,
    pub admin_note: Option<String>,
    pub admin_expanded_analysis_url: Option<String>,
}

pub struct BillManager {
    db: PgPool,
}

impl BillManager {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Fetch the stored row for a LegiScan bill id, creating an empty one
    /// if none exists. Callers backfill number/title from the API when the
    /// returned row lacks them.
    pub async fn get_or_create_row(&self, legiscan_bill_id: i64) -> Result<Bill> {
        if let Some(bill) = self.get_by_legiscan_id(legiscan_bill_id).await? {
            return Ok(bill);
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO bills (id, legiscan_bill_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (legiscan_bill_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(legiscan_bill_id)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await?;

        debug!("Created bill row for legiscan id {}", legiscan_bill_id);

        self.get_by_legiscan_id(legiscan_bill_id)
            .await?
            .ok_or(TrackerError::NotFound("bill"))
    }

    pub async fn get_by_legiscan_id(&self, legiscan_bill_id: i64) -> Result<Option<Bill>> {
        let row = sqlx::query("SELECT * FROM bills WHERE legiscan_bill_id = $1")
            .bind(legiscan_bill_id)
            .fetch_optional(&self.db)
            .await?;

        match row {
            Some(row) => {
                let mut bill = bill_from_row(&row)?;
                bill.tags = self.tags_for_bill(bill.id).await?;
                Ok(Some(bill))
            }
            None => Ok(None),
        }
    }

    /// Backfill number/title fetched from the API onto a lazily created row.
    pub async fn set_bill_data(
        &self,
        bill_id: Uuid,
        bill_number: Option<&str>,
        bill_title: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE bills
            SET bill_number = COALESCE($1, bill_number),
                bill_title = COALESCE($2, bill_title),
                updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(bill_number)
        .bind(bill_title.map(|t| truncate(t, 255)))
        .bind(Utc::now())
        .bind(bill_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Update the admin annotation fields. `None` values leave the stored
    /// value untouched; use `clear_annotation` to remove them.
    pub async fn update_annotation(
        &self,
        bill_id: Uuid,
        stance: Option<Stance>,
        note: Option<&str>,
        expanded_analysis_url: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE bills
            SET admin_stance = COALESCE($1, admin_stance),
                admin_note = COALESCE($2, admin_note),
                admin_expanded_analysis_url = COALESCE($3, admin_expanded_analysis_url),
                updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(stance.map(|s| s.as_str()))
        .bind(note)
        .bind(expanded_analysis_url)
        .bind(Utc::now())
        .bind(bill_id)
        .execute(&self.db)
        .await?;

        info!("Updated annotation for bill {}", bill_id);
        Ok(())
    }

    /// The admin "remove" operation: null the annotation fields but keep
    /// the row (and its tags). This is not a delete.
    pub async fn clear_annotation(&self, legiscan_bill_id: i64) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE bills
            SET admin_stance = NULL,
                admin_note = NULL,
                admin_expanded_analysis_url = NULL,
                updated_at = $1
            WHERE legiscan_bill_id = $2
            "#,
        )
        .bind(Utc::now())
        .bind(legiscan_bill_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TrackerError::NotFound("bill"));
        }

        info!("Cleared annotation for legiscan bill {}", legiscan_bill_id);
        Ok(())
    }

    /// Replace a bill's tag set, creating unseen tags on the fly.
    pub async fn set_tags(&self, bill_id: Uuid, tag_names: &[String]) -> Result<()> {
        sqlx::query("DELETE FROM bill_tags WHERE bill_id = $1")
            .bind(bill_id)
            .execute(&self.db)
            .await?;

        for name in tag_names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            sqlx::query(
                r#"
                INSERT INTO tags (id, name)
                VALUES ($1, $2)
                ON CONFLICT (name) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(name)
            .execute(&self.db)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO bill_tags (bill_id, tag_id)
                SELECT $1, id FROM tags WHERE name = $2
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(bill_id)
            .bind(name)
            .execute(&self.db)
            .await?;
        }

        Ok(())
    }

    pub async fn list_tags(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM tags ORDER BY name")
            .fetch_all(&self.db)
            .await?;

        rows.iter()
            .map(|row| row.try_get("name").map_err(TrackerError::from))
            .collect()
    }

    /// Bills carrying at least one of the given tags.
    pub async fn bills_with_any_tag(&self, tag_names: &[String]) -> Result<Vec<Bill>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT b.* FROM bills b
            JOIN bill_tags bt ON bt.bill_id = b.id
            JOIN tags t ON t.id = bt.tag_id
            WHERE t.name = ANY($1)
            ORDER BY b.created_at
            "#,
        )
        .bind(tag_names)
        .fetch_all(&self.db)
        .await?;

        let mut bills = Vec::new();
        for row in rows {
            let mut bill = bill_from_row(&row)?;
            bill.tags = self.tags_for_bill(bill.id).await?;
            bills.push(bill);
        }

        Ok(bills)
    }

    /// All stored annotations keyed by bill number, for merging admin data
    /// into master-list responses in one pass.
    pub async fn annotations_by_bill_number(&self) -> Result<HashMap<String, StoredAnnotation>> {
        let rows = sqlx::query(
            r#"
            SELECT bill_number, admin_stance, admin_note, admin_expanded_analysis_url
            FROM bills
            WHERE bill_number IS NOT NULL
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut annotations = HashMap::new();
        for row in rows {
            let bill_number: String = row.try_get("bill_number")?;
            annotations.insert(
                bill_number,
                StoredAnnotation {
                    admin_stance: parse_stance(row.try_get("admin_stance")?),
                    admin_note: row.try_get("admin_note")?,
                    admin_expanded_analysis_url: row.try_get("admin_expanded_analysis_url")?,
                },
            );
        }

        Ok(annotations)
    }

    async fn tags_for_bill(&self, bill_id: Uuid) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT t.name FROM tags t
            JOIN bill_tags bt ON bt.tag_id = t.id
            WHERE bt.bill_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(bill_id)
        .fetch_all(&self.db)
        .await?;

        rows.iter()
            .map(|row| row.try_get("name").map_err(TrackerError::from))
            .collect()
    }
}

fn bill_from_row(row: &sqlx::postgres::PgRow) -> Result<Bill> {
    Ok(Bill {
        id: row.try_get("id")?,
        legiscan_bill_id: row.try_get("legiscan_bill_id")?,
        bill_number: row.try_get("bill_number")?,
        bill_title: row.try_get("bill_title")?,
        admin_stance: parse_stance(row.try_get("admin_stance")?),
        admin_note: row.try_get("admin_note")?,
        admin_expanded_analysis_url: row.try_get("admin_expanded_analysis_url")?,
        tags: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn parse_stance(value: Option<String>) -> Option<Stance> {
    value.and_then(|s| s.parse().ok())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
