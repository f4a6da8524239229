use crate::types::{Result, TrackerError, User};
use chrono::Utc;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

pub struct UserManager {
    db: PgPool,
}

impl UserManager {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a user. E-mail addresses are stored lowercased so lookups
    /// are case-insensitive; duplicates are a validation error.
    pub async fn create_user(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<User> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(TrackerError::Validation("email is required".to_string()));
        }

        let existing = sqlx::query("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.db)
            .await?;
        if existing.is_some() {
            return Err(TrackerError::Validation(format!(
                "a user with email '{}' already exists",
                email
            )));
        }

        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&email)
        .bind(first_name)
        .bind(last_name)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        info!("Created user {} ({})", id, email);
        self.get_user(id).await
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(TrackerError::NotFound("user"))?;

        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.db)
            .await?
            .ok_or(TrackerError::NotFound("user"))?;

        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
