/// Community feed endpoints
///
/// # Endpoints
///
/// - `GET /api/posts?channel=` - Latest 50 posts, newest first
/// - `POST /api/posts` - New post in a channel
/// - `POST /api/posts/:id/like` - Like a post once per user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use eduagent_shared::{
    auth::middleware::AuthContext,
    models::post::{CreatePost, Post, FEED_LIMIT},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub channel: Option<String>,
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Json<Vec<Post>>> {
    let channel = query.channel.as_deref().filter(|c| !c.is_empty());
    let posts = Post::list_recent(&state.db, channel, FEED_LIMIT).await?;
    Ok(Json(posts))
}

/// Create a post attributed to the caller's token username
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreatePost>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    req.validate()?;

    let post = Post::create(&state.db, auth.user_id, &auth.username, req).await?;
    tracing::debug!(post_id = %post.id, channel = %post.channel, "Post created");

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn like_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Post>> {
    let post = Post::like(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}
