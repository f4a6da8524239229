use crate::digest::KeywordEntry;
use crate::types::{Result, TrackerError, UserKeyword};
use chrono::Utc;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

pub struct KeywordManager {
    db: PgPool,
}

impl KeywordManager {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Save a keyword for a user. Duplicates (per user) are rejected at
    /// the application level; there is no database uniqueness constraint.
    pub async fn add_keyword(&self, user_id: Uuid, keyword: &str) -> Result<UserKeyword> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(TrackerError::Validation("keyword is required".to_string()));
        }

        let existing =
            sqlx::query("SELECT id FROM user_keywords WHERE user_id = $1 AND keyword = $2")
                .bind(user_id)
                .bind(keyword)
                .fetch_optional(&self.db)
                .await?;
        if existing.is_some() {
            return Err(TrackerError::Validation(
                "You are already tracking this keyword.".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO user_keywords (id, user_id, keyword, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(keyword)
        .bind(now)
        .execute(&self.db)
        .await?;

        info!("User {} now tracking '{}'", user_id, keyword);
        Ok(UserKeyword {
            id,
            user_id,
            keyword: keyword.to_string(),
            created_at: now,
        })
    }

    /// A user's keywords in creation order.
    pub async fn list_keywords(&self, user_id: Uuid) -> Result<Vec<UserKeyword>> {
        let rows = sqlx::query(
            "SELECT * FROM user_keywords WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(keyword_from_row).collect()
    }

    /// Delete one keyword; only the owner's rows are visible to this call.
    pub async fn delete_keyword(&self, user_id: Uuid, keyword_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM user_keywords WHERE id = $1 AND user_id = $2")
            .bind(keyword_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TrackerError::NotFound("keyword"));
        }

        Ok(())
    }

    /// Bulk delete, returning the number of rows actually removed. Ids
    /// belonging to other users are silently skipped.
    pub async fn bulk_delete(&self, user_id: Uuid, keyword_ids: &[Uuid]) -> Result<u64> {
        if keyword_ids.is_empty() {
            return Err(TrackerError::Validation(
                "Provide a list of keyword IDs.".to_string(),
            ));
        }

        let result =
            sqlx::query("DELETE FROM user_keywords WHERE user_id = $1 AND id = ANY($2)")
                .bind(user_id)
                .bind(keyword_ids)
                .execute(&self.db)
                .await?;

        debug!(
            "Bulk deleted {} of {} keywords for user {}",
            result.rows_affected(),
            keyword_ids.len(),
            user_id
        );
        Ok(result.rows_affected())
    }

    /// Every saved keyword joined with its owner, in creation order. This
    /// is the digest job's input.
    pub async fn all_keywords(&self) -> Result<Vec<KeywordEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT k.keyword, u.id AS user_id, u.email, u.first_name, u.last_name
            FROM user_keywords k
            JOIN users u ON u.id = k.user_id
            ORDER BY k.created_at
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut entries = Vec::new();
        for row in rows {
            let first_name: String = row.try_get("first_name")?;
            let last_name: String = row.try_get("last_name")?;
            entries.push(KeywordEntry {
                user_id: row.try_get("user_id")?,
                email: row.try_get("email")?,
                full_name: format!("{} {}", first_name, last_name).trim().to_string(),
                keyword: row.try_get("keyword")?,
            });
        }

        Ok(entries)
    }
}

fn keyword_from_row(row: &sqlx::postgres::PgRow) -> Result<UserKeyword> {
    Ok(UserKeyword {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        keyword: row.try_get("keyword")?,
        created_at: row.try_get("created_at")?,
    })
}
