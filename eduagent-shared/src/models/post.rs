/// Community post model
///
/// Posts are immutable after creation except for likes. Channels are opaque
/// strings with no backing table; any value is accepted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE posts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     username VARCHAR(64) NOT NULL,
///     channel TEXT NOT NULL,
///     content VARCHAR(500) NOT NULL,
///     likes INTEGER NOT NULL DEFAULT 0,
///     liked_by UUID[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const POST_COLUMNS: &str = "id, user_id, username, channel, content, likes, liked_by, created_at";

/// Number of posts returned by the feed
pub const FEED_LIMIT: i64 = 50;

/// Display name used when the author has none
pub const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Author display name at post time
    pub username: String,
    pub channel: String,
    pub content: String,
    pub likes: i32,
    pub liked_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request body for a new post
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePost {
    #[validate(length(min = 1, message = "Channel is required"))]
    pub channel: String,

    #[validate(length(min = 1, max = 500, message = "Content must be 1-500 characters"))]
    pub content: String,
}

impl Post {
    /// Inserts a post authored by `user_id`
    ///
    /// A blank `username` is stored as [`ANONYMOUS`].
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        username: &str,
        data: CreatePost,
    ) -> Result<Self, sqlx::Error> {
        let username = match username.trim() {
            "" => ANONYMOUS,
            name => name,
        };

        let query = format!(
            "INSERT INTO posts (user_id, username, channel, content)
             VALUES ($1, $2, $3, $4)
             RETURNING {POST_COLUMNS}"
        );

        sqlx::query_as::<_, Post>(&query)
            .bind(user_id)
            .bind(username)
            .bind(data.channel)
            .bind(data.content)
            .fetch_one(pool)
            .await
    }

    /// Most recent posts, newest first, optionally restricted to one channel
    pub async fn list_recent(
        pool: &PgPool,
        channel: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE ($1::TEXT IS NULL OR channel = $1)
             ORDER BY created_at DESC
             LIMIT $2"
        );

        sqlx::query_as::<_, Post>(&query)
            .bind(channel)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Records a like from `user_id`
    ///
    /// Liking twice is a no-op. Returns `None` if the post does not exist.
    pub async fn like(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE posts
             SET likes = likes + 1, liked_by = array_append(liked_by, $2)
             WHERE id = $1 AND NOT ($2 = ANY(liked_by))
             RETURNING {POST_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        match updated {
            Some(post) => Ok(Some(post)),
            None => Self::find_by_id(pool, id).await,
        }
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");

        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_length_bounds() {
        let ok = CreatePost {
            channel: "rust-beginners".to_string(),
            content: "x".repeat(500),
        };
        assert!(ok.validate().is_ok());

        let too_long = CreatePost {
            content: "x".repeat(501),
            ..ok.clone()
        };
        assert!(too_long.validate().is_err());

        let empty = CreatePost {
            content: String::new(),
            ..ok
        };
        assert!(empty.validate().is_err());

        let long_channel = CreatePost {
            channel: "study-group-".repeat(40),
            content: "hello".to_string(),
        };
        assert!(long_channel.validate().is_ok());
    }

    #[test]
    fn test_post_serialization() {
        let fan = Uuid::new_v4();
        let post = Post {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            username: ANONYMOUS.to_string(),
            channel: "general".to_string(),
            content: "hello".to_string(),
            likes: 1,
            liked_by: vec![fan],
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["likedBy"][0], fan.to_string());
    }
}
