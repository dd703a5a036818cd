/// AI agent endpoints
///
/// # Endpoints
///
/// - `POST /api/agent/generate-roadmap` - Generate a roadmap document
/// - `POST /api/agent/chat` - Tutor chat reply
/// - `POST /api/agent/speak` - Synthesize speech audio
///
/// Each call makes at most one outbound provider request, plus one fallback
/// request for text. Provider failures return 502, a missing provider 503.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, RelayOperation},
};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use eduagent_shared::auth::middleware::AuthContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Roadmap generation request
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRoadmapRequest {
    #[validate(length(min = 1, max = 200, message = "Role is required"))]
    pub role: String,

    #[serde(default)]
    pub interests: Vec<String>,
}

/// Chat request
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,

    /// Arbitrary client state forwarded to the model
    #[serde(default)]
    pub context: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Speech request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpeakRequest {
    #[validate(length(min = 1, max = 5000, message = "Text must be 1-5000 characters"))]
    pub text: String,

    /// Voice override for providers that support it
    #[serde(default)]
    pub voice_id: Option<String>,
}

/// Generate a learning roadmap for a role
///
/// The model's JSON is returned exactly as parsed; it is not checked against
/// the roadmap schema. Saving it through `POST /api/roadmaps` validates it.
///
/// ```text
/// POST /api/agent/generate-roadmap
///
/// { "role": "Data Scientist", "interests": ["statistics", "python"] }
/// ```
pub async fn generate_roadmap(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<GenerateRoadmapRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;

    tracing::info!(user_id = %auth.user_id, role = %req.role, "Roadmap generation requested");

    let roadmap = state
        .text_relay
        .generate_roadmap(&req.role, &req.interests)
        .await
        .map_err(|e| ApiError::from_relay(RelayOperation::Generation, e))?;

    Ok(Json(roadmap))
}

/// Reply to a tutor chat message
pub async fn chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    req.validate()?;

    tracing::debug!(user_id = %auth.user_id, "Chat message received");

    let reply = state
        .text_relay
        .chat(&req.message, req.context.as_ref())
        .await
        .map_err(|e| ApiError::from_relay(RelayOperation::Chat, e))?;

    Ok(Json(ChatResponse { reply }))
}

/// Synthesize speech
///
/// Responds with raw audio; `Content-Type` is `audio/mpeg` from ElevenLabs or
/// `audio/wav` from the local service.
pub async fn speak(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<SpeakRequest>,
) -> ApiResult<Response> {
    req.validate()?;

    tracing::debug!(
        user_id = %auth.user_id,
        provider = state.voice_relay.provider_name(),
        "Speech requested"
    );

    let audio = state
        .voice_relay
        .speak(&req.text, req.voice_id.as_deref())
        .await
        .map_err(|e| ApiError::from_relay(RelayOperation::Voice, e))?;

    Ok(([(header::CONTENT_TYPE, audio.content_type)], audio.bytes).into_response())
}
