/// Application state and router builder
///
/// This module defines the shared application state, the session extractor
/// that handlers use to identify the caller, and the router builder that
/// wires routes and middleware together.
///
/// # Example
///
/// ```no_run
/// use talenthub_api::{app::AppState, config::Config};
/// use talenthub_shared::storage::MemoryResumeStore;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, Arc::new(MemoryResumeStore::new()), config);
/// let app = talenthub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, Method},
    routing::{get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use talenthub_shared::auth::session::{self, Principal};
use talenthub_shared::storage::ResumeStore;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Resume blob store
    pub storage: Arc<dyn ResumeStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, storage: Arc<dyn ResumeStore>, config: Config) -> Self {
        Self {
            db,
            storage,
            config: Arc::new(config),
        }
    }

    /// Gets the session signing secret
    pub fn session_secret(&self) -> &str {
        &self.config.auth.session_secret
    }
}

/// Extracts the authenticated [`Principal`] from the `Authorization` header
///
/// Handlers take `Principal` as an argument to require a valid session.
/// Endpoints that serve both anonymous and authenticated callers take
/// `Option<Principal>` and treat extraction failure as anonymous.
#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

        let claims = session::validate_session_token(token, state.session_secret())?;

        Ok(Principal::from(claims))
    }
}

/// Requires the caller to be a recruiter
pub fn require_recruiter(principal: &Principal) -> Result<(), ApiError> {
    if principal.is_recruiter() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "This action requires a recruiter account".to_string(),
        ))
    }
}

/// Requires the caller to be a candidate
pub fn require_candidate(principal: &Principal) -> Result<(), ApiError> {
    if principal.is_candidate() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "This action requires a candidate account".to_string(),
        ))
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// ├── /v1/
/// │   ├── /auth/
/// │   │   ├── POST /register           # multipart, optional resume
/// │   │   ├── POST /login
/// │   │   ├── POST /logout
/// │   │   ├── GET  /check
/// │   │   └── GET  /profile
/// │   ├── /jobs/
/// │   │   ├── GET    /                 # public search
/// │   │   ├── POST   /                 # recruiter
/// │   │   ├── GET    /recruiter/my-jobs
/// │   │   ├── GET    /:id              # public
/// │   │   ├── PUT    /:id              # owning recruiter
/// │   │   └── DELETE /:id              # owning recruiter
/// │   └── /applications/
/// │       ├── POST /apply/:job_id      # candidate, multipart
/// │       ├── GET  /my-applications    # candidate
/// │       ├── GET  /job/:job_id        # owning recruiter
/// │       ├── GET  /recruiter/all      # recruiter
/// │       ├── PATCH /:id/status        # owning recruiter
/// │       └── GET  /:id                # candidate or owning recruiter
/// ```
///
/// Authentication is per-handler: protected handlers extract [`Principal`],
/// public ones don't. Role and ownership checks live in the handlers so a
/// missing resource reads as 404 before 403.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/check", get(routes::auth::check))
        .route("/profile", get(routes::auth::profile));

    let job_routes = Router::new()
        .route("/", get(routes::jobs::list_jobs).post(routes::jobs::create_job))
        .route("/recruiter/my-jobs", get(routes::jobs::my_jobs))
        .route(
            "/:id",
            get(routes::jobs::get_job)
                .put(routes::jobs::update_job)
                .delete(routes::jobs::delete_job),
        );

    let application_routes = Router::new()
        .route("/apply/:job_id", post(routes::applications::apply))
        .route(
            "/my-applications",
            get(routes::applications::my_applications),
        )
        .route("/job/:job_id", get(routes::applications::job_applications))
        .route(
            "/recruiter/all",
            get(routes::applications::recruiter_applications),
        )
        .route("/:id/status", patch(routes::applications::update_status))
        .route("/:id", get(routes::applications::get_application));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/jobs", job_routes)
        .nest("/applications", application_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
