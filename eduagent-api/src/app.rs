/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use eduagent_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use chrono::Duration;
use eduagent_relay::{TextRelay, VoiceRelay};
use eduagent_shared::auth::{
    jwt::{self, Claims},
    middleware::{authenticate, AUTH_TOKEN_HEADER},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// Shared application state
///
/// Cloned into every handler; all fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,

    pub config: Arc<Config>,

    /// LLM relay (Groq, then Gemini)
    pub text_relay: TextRelay,

    /// Speech relay (ElevenLabs or local TTS)
    pub voice_relay: VoiceRelay,
}

impl AppState {
    /// Creates state with relays built from the provider configuration
    pub fn new(db: PgPool, config: Config) -> Self {
        let client = reqwest_client();
        let text_relay = TextRelay::from_config(&config.providers, client.clone());
        let voice_relay = VoiceRelay::from_config(&config.providers, client);

        Self::with_relays(db, config, text_relay, voice_relay)
    }

    /// Creates state with explicit relays
    pub fn with_relays(
        db: PgPool,
        config: Config,
        text_relay: TextRelay,
        voice_relay: VoiceRelay,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            text_relay,
            voice_relay,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Signs a session token for a user
    pub fn issue_token(&self, user_id: Uuid, username: &str) -> Result<String, ApiError> {
        let claims = Claims::with_expiration(
            user_id,
            username.to_string(),
            Duration::days(self.config.jwt.expiration_days),
        );
        Ok(jwt::create_token(&claims, self.jwt_secret())?)
    }
}

fn reqwest_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("eduagent-api/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /                              # Banner (public)
/// ├── GET /health                        # Health check (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST  /signup              # public
///     │   ├── POST  /login               # public
///     │   ├── GET   /me
///     │   └── PATCH /me
///     ├── /agent/
///     │   ├── POST /generate-roadmap
///     │   ├── POST /chat
///     │   └── POST /speak
///     ├── /roadmaps/
///     │   ├── GET    /
///     │   ├── POST   /
///     │   ├── GET    /:id
///     │   ├── DELETE /:id
///     │   └── PATCH  /:id/phases/:phase/modules/:module
///     └── /posts/
///         ├── GET  /?channel=
///         ├── POST /
///         └── POST /:id/like
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Token authentication (everything except signup, login, banner, health)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS
/// 4. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_layer = axum::middleware::from_fn_with_state(state.clone(), jwt_auth_layer);

    let public_routes = Router::new()
        .route("/", get(routes::health::banner))
        .route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login));

    let account_routes = Router::new()
        .route("/me", get(routes::auth::me).patch(routes::auth::update_me))
        .layer(auth_layer.clone());

    let agent_routes = Router::new()
        .route("/generate-roadmap", post(routes::agent::generate_roadmap))
        .route("/chat", post(routes::agent::chat))
        .route("/speak", post(routes::agent::speak))
        .layer(auth_layer.clone());

    let roadmap_routes = Router::new()
        .route(
            "/",
            get(routes::roadmaps::list_roadmaps).post(routes::roadmaps::create_roadmap),
        )
        .route(
            "/:id",
            get(routes::roadmaps::get_roadmap).delete(routes::roadmaps::delete_roadmap),
        )
        .route(
            "/:id/phases/:phase/modules/:module",
            patch(routes::roadmaps::update_module_progress),
        )
        .layer(auth_layer.clone());

    let post_routes = Router::new()
        .route("/", get(routes::posts::list_posts).post(routes::posts::create_post))
        .route("/:id/like", post(routes::posts::like_post))
        .layer(auth_layer);

    let api_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(account_routes))
        .nest("/agent", agent_routes)
        .nest("/roadmaps", roadmap_routes)
        .nest("/posts", post_routes);

    let cors = cors_layer(&state.config.api.cors_origins);

    Router::new()
        .merge(public_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(AUTH_TOKEN_HEADER),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Token authentication layer
///
/// Validates the bearer (or legacy `x-auth-token`) token and inserts the
/// caller's `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret())?;

    tracing::debug!(user_id = %auth_context.user_id, "Request authenticated");
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
