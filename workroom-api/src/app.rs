/// Application state and router assembly
///
/// `AppState` bundles everything handlers need: the database pool, the
/// registry, the realtime hub, the mailer, and the parsed configuration.
/// It is cheap to clone and shared across every request.
///
/// The router splits the surface by authentication:
///
/// - `/users/*` account flows, `/health`, and `/ws` are public
/// - `/users/profile`, `/projects/*`, and `/tasks/*` require a session
///   token, enforced by [`require_auth`]
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use workroom_shared::auth::{jwt, Principal};
use workroom_shared::models::User;
use workroom_shared::realtime::RoomHub;
use workroom_shared::registry::Registry;

use crate::config::Config;
use crate::error::ApiError;
use crate::mail::Mailer;
use crate::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub registry: Registry,
    pub rooms: Arc<RoomHub>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, mailer: Arc<dyn Mailer>, config: Config) -> Self {
        let rooms = Arc::new(RoomHub::new());
        let registry = Registry::new(db.clone(), rooms.clone());

        Self {
            db,
            registry,
            rooms,
            mailer,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the full application router
pub fn build_router(state: AppState) -> Router {
    // Account flows are reachable without a session
    let account_routes = Router::new()
        .route("/", post(routes::users::register))
        .route("/login", post(routes::users::login))
        .route("/confirm/:token", get(routes::users::confirm_account))
        .route("/forgot-password", post(routes::users::forgot_password))
        .route(
            "/forgot-password/:token",
            get(routes::users::check_reset_token).post(routes::users::reset_password),
        );

    let profile_routes = Router::new()
        .route("/profile", get(routes::users::profile))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/collaborators",
            post(routes::projects::find_collaborator),
        )
        .route(
            "/collaborators/:id",
            post(routes::projects::add_collaborator),
        )
        .route(
            "/eliminate-collaborator/:id",
            post(routes::projects::remove_collaborator),
        )
        .route(
            "/:id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route("/status/:id", post(routes::tasks::toggle_status))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = if state.config.frontend_url == "*" {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = [state.config.frontend_url.as_str()]
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
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/ws", get(routes::ws::ws_handler))
        .nest("/users", account_routes.merge(profile_routes))
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Middleware guarding the authenticated surface
///
/// Validates the bearer token, loads the user it names, and attaches the
/// resulting [`Principal`] to the request. The user is loaded fresh on
/// every request, so deleted accounts lose access immediately.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("Missing authentication token".to_string()))?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    req.extensions_mut().insert(Principal::from(user));

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());

        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());

        assert_eq!(bearer_token(&headers), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
