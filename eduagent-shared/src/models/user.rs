/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(64) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     preferences JSONB NOT NULL,
///     stats JSONB NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `preferences` and `stats` keep the camelCase document shape the web client
/// reads (`learningStyle`, `learningHours`, ...).
///
/// # Example
///
/// ```no_run
/// use eduagent_shared::models::user::{CreateUser, Preferences, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     username: "ada".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     preferences: Preferences::default(),
/// })
/// .await?;
///
/// let found = User::find_by_email(&pool, "ada@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgConnection, PgPool};
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, preferences, stats, created_at, updated_at";

/// How a learner prefers to consume material
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningStyle {
    #[default]
    Visual,
    Auditory,
    Text,
    Kinesthetic,
}

/// Learner preferences set at signup and from the settings page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub learning_style: LearningStyle,
    pub interests: Vec<String>,
}

/// Gamification counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    /// Consecutive active days
    pub streak: i32,

    /// Experience points
    pub xp: i64,

    /// Level derived from `xp`, starting at 1
    pub level: i32,

    pub learning_hours: f64,

    /// Badge identifiers
    pub badges: Vec<String>,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            streak: 0,
            xp: 0,
            level: 1,
            learning_hours: 0.0,
            badges: Vec::new(),
        }
    }
}

/// User row
///
/// `password_hash` is never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    pub username: String,

    /// Stored trimmed and lowercased
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub preferences: Json<Preferences>,

    pub stats: Json<UserStats>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,

    /// Normalize with [`normalize_email`] before inserting
    pub email: String,

    /// Argon2id hash (never the plaintext password)
    pub password_hash: String,

    pub preferences: Preferences,
}

/// Settings update; only `Some` fields change
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub preferences: Option<Preferences>,
}

/// Trims and lowercases an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Inserts a new user with default stats
    ///
    /// # Errors
    ///
    /// Returns a database error on unique violations (`users_email_key`,
    /// `users_username_key`) or connection failure
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, preferences, stats)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.username.trim())
            .bind(normalize_email(&data.email))
            .bind(data.password_hash)
            .bind(Json(data.preferences))
            .bind(Json(UserStats::default()))
            .fetch_one(pool)
            .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email (normalized before lookup)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(normalize_email(email))
            .fetch_optional(pool)
            .await
    }

    /// Whether the email or username is already registered
    pub async fn exists(pool: &PgPool, email: &str, username: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 OR username = $2)",
        )
        .bind(normalize_email(email))
        .bind(username.trim())
        .fetch_one(pool)
        .await
    }

    /// Applies a settings update
    ///
    /// Returns `None` if the user does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE users
             SET username = COALESCE($2, username),
                 preferences = COALESCE($3, preferences),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(data.username.as_deref().map(str::trim))
            .bind(data.preferences.map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Applies `change` to the stored stats under a row lock
    ///
    /// Runs on the caller's connection, which must be inside a transaction
    /// for the lock to cover the write. Returns the new stats, or `None` if
    /// the user does not exist.
    pub async fn update_stats<F>(
        conn: &mut PgConnection,
        id: Uuid,
        change: F,
    ) -> Result<Option<UserStats>, sqlx::Error>
    where
        F: FnOnce(&mut UserStats),
    {
        let current: Option<Json<UserStats>> =
            sqlx::query_scalar("SELECT stats FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        let Some(Json(mut stats)) = current else {
            return Ok(None);
        };

        change(&mut stats);

        sqlx::query("UPDATE users SET stats = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(Json(&stats))
            .execute(&mut *conn)
            .await?;

        Ok(Some(stats))
    }
}
