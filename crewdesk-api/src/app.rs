/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use crewdesk_api::{app::AppState, config::Config};
/// use crewdesk_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let app = crewdesk_api::app::build_router(AppState::new(pool, config));
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, routes};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use crewdesk_shared::{
    auth::middleware::create_auth_middleware,
    lifecycle::{LifecycleManager, PgProjectStore},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,

    /// Lifecycle operations on projects
    pub projects: Arc<LifecycleManager<PgProjectStore>>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            projects: Arc::new(LifecycleManager::new(PgProjectStore::new(db.clone()))),
            db,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health                            (public)
/// └── /v1/                                   (bearer token required)
///     ├── GET   /me
///     ├── /projects
///     │   ├── POST  /                        create
///     │   ├── GET   /                        list
///     │   ├── GET   /summary                 counts by status and stage
///     │   ├── GET   /mine                    caller's active memberships
///     │   ├── GET   /:id
///     │   ├── PUT   /:id                     full-record edit
///     │   ├── PATCH /:id/status
///     │   ├── PATCH /:id/stage
///     │   ├── GET   /:id/members
///     │   ├── POST  /:id/members             assign
///     │   └── PATCH /:id/members/:user_id    toggle membership
///     └── /users
///         ├── GET   /                        list (optional ?role=)
///         └── PATCH /:id/active              toggle account
/// ```
///
/// Role checks happen inside each handler; the middleware only resolves the
/// caller.
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let project_routes = Router::new()
        .route(
            "/",
            post(routes::projects::create_project).get(routes::projects::list_projects),
        )
        .route("/summary", get(routes::projects::project_summary))
        .route("/mine", get(routes::projects::my_projects))
        .route(
            "/:id",
            get(routes::projects::get_project).put(routes::projects::update_project),
        )
        .route("/:id/status", patch(routes::projects::set_project_status))
        .route("/:id/stage", patch(routes::projects::set_project_stage))
        .route(
            "/:id/members",
            get(routes::members::list_members).post(routes::members::assign_member),
        )
        .route("/:id/members/:user_id", patch(routes::members::set_member_active));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/:id/active", patch(routes::users::set_user_active));

    let v1_routes = Router::new()
        .route("/me", get(routes::me::current_user))
        .nest("/projects", project_routes)
        .nest("/users", user_routes)
        .layer(axum::middleware::from_fn(create_auth_middleware(
            state.db.clone(),
            state.jwt_secret().to_string(),
        )));

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
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
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
