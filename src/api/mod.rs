//! HTTP API server.
//!
//! This module provides the axum-based server exposing the marketplace's
//! REST endpoints.

mod auth;
mod offers;
mod progress;
mod skills;
mod tasks;

use crate::auth::TokenService;
use crate::config::Config;
use crate::db::Database;
use crate::error::ApiError;
use axum::extract::{FromRequest, Request};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub tokens: Arc<TokenService>,
    pub min_password_len: usize,
}

impl AppState {
    pub fn new(db: Arc<Database>, tokens: Arc<TokenService>, min_password_len: usize) -> Self {
        Self {
            db,
            tokens,
            min_password_len,
        }
    }

    /// Build state from loaded configuration.
    pub fn from_config(db: Arc<Database>, config: &Config) -> anyhow::Result<Self> {
        let tokens = TokenService::new(&config.auth.jwt_secret, config.auth.token_ttl_hours)?;
        Ok(Self::new(db, Arc::new(tokens), config.auth.min_password_len))
    }
}

/// JSON body extractor whose rejections use the API error shape.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                Err(ApiError::validation("Invalid request body").with_error(rejection.body_text()))
            }
        }
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router with all routes.
pub fn build_router(state: AppState, permissive_cors: bool) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        // Auth
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Skills
        .route("/skills", get(skills::list_skills).post(skills::create_skill))
        .route(
            "/skills/{skill_id}",
            get(skills::get_skill)
                .put(skills::update_skill)
                .delete(skills::delete_skill),
        )
        // Tasks
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route("/tasks/{task_id}", get(tasks::get_task).put(tasks::update_task))
        .route("/tasks/{task_id}/complete", put(tasks::mark_completed))
        .route("/tasks/{task_id}/accept-completion", put(tasks::accept_completion))
        .route("/tasks/{task_id}/reject-completion", put(tasks::reject_completion))
        // Offers
        .route(
            "/tasks/{task_id}/offers",
            get(offers::list_task_offers).post(offers::make_offer),
        )
        .route("/tasks/offers/{offer_id}/accept", put(offers::accept_offer))
        .route("/tasks/offers/{offer_id}/reject", put(offers::reject_offer))
        .route("/offers", get(offers::list_my_offers))
        // Progress
        .route(
            "/tasks/{task_id}/progress",
            get(progress::list_progress).post(progress::add_progress),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if permissive_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}

/// Bind and serve in the background.
///
/// Returns a sender that triggers graceful shutdown and the bound address.
pub async fn start_server(
    state: AppState,
    addr: SocketAddr,
    permissive_cors: bool,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr, tokio::task::JoinHandle<()>)> {
    let app = build_router(state, permissive_cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("API server listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            })
            .await
        {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr, handle))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }

    #[test]
    fn router_builds_with_all_routes() {
        let _ = build_router(test_support::state(), true);
    }

    #[tokio::test]
    async fn health_reports_version() {
        let response = health().await.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn server_binds_and_shuts_down() {
        let state = test_support::state();
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let (shutdown, bound, handle) = start_server(state, addr, true).await.unwrap();
        assert_ne!(bound.port(), 0);

        shutdown.send(()).unwrap();
        handle.await.unwrap();
    }
}
