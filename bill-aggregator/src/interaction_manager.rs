use crate::bill_manager::parse_stance;
use crate::types::{Result, Stance, TrackerError, UserBillInteraction};
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

pub struct InteractionManager {
    db: PgPool,
}

impl InteractionManager {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create or update a user's interaction with a bill. Stance and note
    /// are overwritten; the ignore flag is left as it was. Returns the
    /// interaction and whether it was newly created.
    pub async fn upsert_interaction(
        &self,
        user_id: Uuid,
        bill_id: Uuid,
        stance: Option<Stance>,
        note: Option<&str>,
    ) -> Result<(UserBillInteraction, bool)> {
        let existing =
            sqlx::query("SELECT id FROM user_bill_interactions WHERE user_id = $1 AND bill_id = $2")
                .bind(user_id)
                .bind(bill_id)
                .fetch_optional(&self.db)
                .await?;
        let created = existing.is_none();

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO user_bill_interactions (id, user_id, bill_id, stance, note, created_at, modified_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (user_id, bill_id) DO UPDATE SET
                stance = EXCLUDED.stance,
                note = EXCLUDED.note,
                modified_at = EXCLUDED.modified_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(bill_id)
        .bind(stance.map(|s| s.as_str()))
        .bind(note)
        .bind(now)
        .execute(&self.db)
        .await?;

        debug!(
            "{} interaction for user {} on bill {}",
            if created { "Created" } else { "Updated" },
            user_id,
            bill_id
        );

        let interaction = self
            .get_interaction(user_id, bill_id)
            .await?
            .ok_or(TrackerError::NotFound("interaction"))?;
        Ok((interaction, created))
    }

    /// Flip the per-user suppression marker that keeps a bill out of
    /// future digests.
    pub async fn set_ignore(&self, user_id: Uuid, bill_id: Uuid, ignored: bool) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE user_bill_interactions
            SET ignored = $1, modified_at = $2
            WHERE user_id = $3 AND bill_id = $4
            "#,
        )
        .bind(ignored)
        .bind(Utc::now())
        .bind(user_id)
        .bind(bill_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TrackerError::NotFound("interaction"));
        }

        info!(
            "User {} {} bill {}",
            user_id,
            if ignored { "ignores" } else { "unignores" },
            bill_id
        );
        Ok(())
    }

    pub async fn get_interaction(
        &self,
        user_id: Uuid,
        bill_id: Uuid,
    ) -> Result<Option<UserBillInteraction>> {
        let row = sqlx::query(
            r#"
            SELECT i.*, b.legiscan_bill_id, b.bill_number, b.bill_title
            FROM user_bill_interactions i
            JOIN bills b ON b.id = i.bill_id
            WHERE i.user_id = $1 AND i.bill_id = $2
            "#,
        )
        .bind(user_id)
        .bind(bill_id)
        .fetch_optional(&self.db)
        .await?;

        row.as_ref().map(interaction_from_row).transpose()
    }

    /// A user's interactions, most recently modified first.
    pub async fn list_interactions(&self, user_id: Uuid) -> Result<Vec<UserBillInteraction>> {
        let rows = sqlx::query(
            r#"
            SELECT i.*, b.legiscan_bill_id, b.bill_number, b.bill_title
            FROM user_bill_interactions i
            JOIN bills b ON b.id = i.bill_id
            WHERE i.user_id = $1
            ORDER BY i.modified_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(interaction_from_row).collect()
    }

    pub async fn delete_interaction(&self, user_id: Uuid, bill_id: Uuid) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM user_bill_interactions WHERE user_id = $1 AND bill_id = $2")
                .bind(user_id)
                .bind(bill_id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(TrackerError::NotFound("interaction"));
        }

        Ok(())
    }

    /// Bill numbers the user has flagged as ignored; the digest job
    /// excludes these from their results.
    pub async fn ignored_bill_numbers(&self, user_id: Uuid) -> Result<HashSet<String>> {
        let rows = sqlx::query(
            r#"
            SELECT b.bill_number
            FROM user_bill_interactions i
            JOIN bills b ON b.id = i.bill_id
            WHERE i.user_id = $1 AND i.ignored AND b.bill_number IS NOT NULL
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let mut numbers = HashSet::new();
        for row in rows {
            numbers.insert(row.try_get("bill_number")?);
        }
        Ok(numbers)
    }
}

fn interaction_from_row(row: &sqlx::postgres::PgRow) -> Result<UserBillInteraction> {
    Ok(UserBillInteraction {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        bill_id: row.try_get("bill_id")?,
        legiscan_bill_id: row.try_get("legiscan_bill_id")?,
        bill_number: row.try_get("bill_number")?,
        bill_title: row.try_get("bill_title")?,
        stance: parse_stance(row.try_get("stance")?),
        note: row.try_get("note")?,
        ignored: row.try_get("ignored")?,
        created_at: row.try_get("created_at")?,
        modified_at: row.try_get("modified_at")?,
    })
}
