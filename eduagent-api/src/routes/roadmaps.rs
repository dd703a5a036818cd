/// Roadmap endpoints
///
/// Every read and write checks that the caller owns the roadmap: a missing
/// roadmap is 404, someone else's is 403.
///
/// # Endpoints
///
/// - `GET /api/roadmaps` - Caller's roadmaps, newest first
/// - `POST /api/roadmaps` - Save a roadmap
/// - `GET /api/roadmaps/:id` - One roadmap
/// - `DELETE /api/roadmaps/:id` - Delete a roadmap
/// - `PATCH /api/roadmaps/:id/phases/:phase/modules/:module` - Mark a module
///   complete or incomplete

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use eduagent_shared::{
    auth::{authorization::require_owner, middleware::AuthContext},
    models::{
        roadmap::{CreateRoadmap, Roadmap},
        user::UserStats,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Module progress update
#[derive(Debug, Deserialize)]
pub struct ModuleProgressRequest {
    pub completed: bool,
}

/// Updated roadmap plus the caller's stats after any XP award
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgressResponse {
    pub roadmap: Roadmap,

    /// Present only when XP was awarded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<UserStats>,
}

fn not_found() -> ApiError {
    ApiError::NotFound("Roadmap not found".to_string())
}

/// Loads a roadmap and checks the caller owns it
async fn load_owned(state: &AppState, auth: &AuthContext, id: Uuid) -> ApiResult<Roadmap> {
    let roadmap = Roadmap::find_by_id(&state.db, id)
        .await?
        .ok_or_else(not_found)?;

    require_owner(auth, &roadmap)?;
    Ok(roadmap)
}

pub async fn list_roadmaps(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Roadmap>>> {
    let roadmaps = Roadmap::list_by_user(&state.db, auth.user_id).await?;
    Ok(Json(roadmaps))
}

/// Save a roadmap (usually the output of generate-roadmap)
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Missing title/role, or a phase or module
///   without a title
pub async fn create_roadmap(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateRoadmap>,
) -> ApiResult<(StatusCode, Json<Roadmap>)> {
    req.validate()?;

    let roadmap = Roadmap::create(&state.db, auth.user_id, req).await?;
    tracing::info!(user_id = %auth.user_id, roadmap_id = %roadmap.id, "Roadmap saved");

    Ok((StatusCode::CREATED, Json(roadmap)))
}

pub async fn get_roadmap(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Roadmap>> {
    Ok(Json(load_owned(&state, &auth, id).await?))
}

pub async fn delete_roadmap(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    load_owned(&state, &auth, id).await?;

    if !Roadmap::delete(&state.db, id).await? {
        return Err(not_found());
    }

    tracing::info!(user_id = %auth.user_id, roadmap_id = %id, "Roadmap deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Mark a module complete or incomplete
///
/// Completing a module for the first time awards XP to the caller. The
/// roadmap becomes `completed` when every module is done.
pub async fn update_module_progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, phase, module)): Path<(Uuid, usize, usize)>,
    Json(req): Json<ModuleProgressRequest>,
) -> ApiResult<Json<ModuleProgressResponse>> {
    let progress =
        Roadmap::update_module_progress(&state.db, auth.user_id, id, phase, module, req.completed)
            .await?;

    if progress.change.newly_completed {
        tracing::info!(
            user_id = %auth.user_id,
            roadmap_id = %id,
            xp = progress.stats.as_ref().map(|s| s.xp),
            "Module completed"
        );
    }

    Ok(Json(ModuleProgressResponse {
        roadmap: progress.roadmap,
        stats: progress.stats,
    }))
}
