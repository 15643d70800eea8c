/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use crickfan_api::{app::{build_router, AppState}, config::Config};
/// use crickfan_shared::provider::client::CricApiClient;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let provider = Arc::new(CricApiClient::new(config.provider_config())?);
///
/// let app = build_router(AppState::new(pool, config, provider));
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
use crate::{config::Config, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use crickfan_shared::{
    auth::middleware::{session_auth_middleware, AuthError},
    fantasy::schedule::local_date,
    provider::CricketDataProvider,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,

    pub config: Arc<Config>,

    /// Cricket data provider; swapped for a stub in tests
    pub provider: Arc<dyn CricketDataProvider>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, provider: Arc<dyn CricketDataProvider>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            provider,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Today's date in the schedule offset
    pub fn today(&self) -> NaiveDate {
        local_date(Utc::now(), self.config.matches.schedule_offset())
    }
}

/// Builds the complete router
///
/// ```text
/// /health
/// /v1/auth       register, login, refresh, password-reset/*  (public)
///                logout, me, change-password                  (session)
/// /v1/matches    list, :id, :id/squad|scorecard|points         (public)
///                sync, :id/settle                              (admin)
/// /v1/contests   list, :id, :id/leaderboard                    (public)
///                create, :id/status                            (admin)
/// /v1/teams      create, list, :id                             (session)
/// /v1/utils      restricted-states, eligibility, time          (public)
/// ```
///
/// Admin routes sit behind the session layer; the handlers check the role.
pub fn build_router(state: AppState) -> Router {
    let session_layer = || middleware::from_fn_with_state(state.clone(), require_session);

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route(
            "/password-reset/request",
            post(routes::auth::request_password_reset),
        )
        .route(
            "/password-reset/confirm",
            post(routes::auth::confirm_password_reset),
        )
        .merge(
            Router::new()
                .route("/logout", post(routes::auth::logout))
                .route(
                    "/me",
                    get(routes::auth::me).patch(routes::auth::update_profile),
                )
                .route("/change-password", post(routes::auth::change_password))
                .layer(session_layer()),
        );

    let match_routes = Router::new()
        .route("/", get(routes::matches::list_matches))
        .route("/:id", get(routes::matches::get_match))
        .route("/:id/squad", get(routes::matches::match_squad))
        .route("/:id/scorecard", get(routes::matches::match_scorecard))
        .route("/:id/points", get(routes::matches::match_points))
        .merge(
            Router::new()
                .route("/sync", post(routes::matches::sync_matches))
                .route("/:id/settle", post(routes::matches::settle_match))
                .layer(session_layer()),
        );

    let contest_routes = Router::new()
        .route("/", get(routes::contests::list_contests))
        .route("/:id", get(routes::contests::get_contest))
        .route("/:id/leaderboard", get(routes::contests::leaderboard))
        .merge(
            Router::new()
                .route("/", post(routes::contests::create_contest))
                .route("/:id/status", post(routes::contests::update_status))
                .layer(session_layer()),
        );

    let team_routes = Router::new()
        .route(
            "/",
            post(routes::teams::create_team).get(routes::teams::list_teams),
        )
        .route("/:id", get(routes::teams::get_team))
        .layer(session_layer());

    let util_routes = Router::new()
        .route("/restricted-states", get(routes::utils::restricted_states))
        .route("/eligibility", get(routes::utils::eligibility))
        .route("/time", get(routes::utils::server_time));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/matches", match_routes)
        .nest("/contests", contest_routes)
        .nest("/teams", team_routes)
        .nest("/utils", util_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
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
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Requires a Bearer access token bound to an active session
async fn require_session(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    session_auth_middleware(state.db.clone(), state.config.jwt.secret.clone(), req, next).await
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        for (method, uri) in [
            ("GET", "/v1/auth/me"),
            ("POST", "/v1/auth/logout"),
            ("GET", "/v1/teams"),
            ("POST", "/v1/teams"),
            ("POST", "/v1/matches/sync"),
            ("POST", "/v1/contests"),
        ] {
            let response = offline_app()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
            let body = json_body(response).await;
            assert_eq!(body["error"], "unauthorized");
        }
    }

    #[tokio::test]
    async fn test_malformed_token_rejected_before_database() {
        let response = offline_app()
            .oneshot(
                Request::builder()
                    .uri("/v1/auth/me")
                    .header("authorization", "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_security_headers_on_api_responses() {
        let response = offline_app()
            .oneshot(
                Request::builder()
                    .uri("/v1/utils/restricted-states")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = offline_app()
            .oneshot(
                Request::builder()
                    .uri("/v1/unknown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
