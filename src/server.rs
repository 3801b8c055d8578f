//! # Server Module
//!
//! HTTP server setup and route configuration for the todo server.

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::auth::middleware::AuthMiddleware;
use crate::auth::{CredentialHasher, JwtService};
use crate::config::Config;
use crate::database::{DatabaseConnection, TodoStore, UserStore};
use crate::routes;

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<dyn TodoStore>,
    pub users: Arc<dyn UserStore>,
    pub jwt_service: Arc<JwtService>,
    pub hasher: Arc<CredentialHasher>,
}

/// Assemble every route, with bearer-token enforcement on the todo routes
/// when `require_auth` is set.
pub fn build_router(state: AppState, require_auth: bool, cors: CorsLayer) -> Router {
    let mut todo_routes = routes::todos::create_todo_routes();
    if require_auth {
        todo_routes = todo_routes.route_layer(middleware::from_fn_with_state(
            state.jwt_service.clone(),
            AuthMiddleware::validate_token,
        ));
    }

    Router::new()
        .merge(routes::health::create_health_routes())
        .merge(todo_routes)
        .merge(routes::auth::create_auth_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_request))
                .layer(cors),
        )
        .with_state(state)
}

/// CORS for the API: any origin unless a list is configured
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origin = if allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins = allowed_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin: {origin}"))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        "{} {} {} {:?}",
        method,
        path,
        response.status().as_u16(),
        start.elapsed()
    );
    response
}

/// Starts the todo HTTP server and runs until SIGINT/SIGTERM.
pub async fn start(config: Config) -> Result<()> {
    let db = Arc::new(
        DatabaseConnection::new(config.database.clone())
            .await
            .context("Failed to connect to database")?,
    );

    let hasher = CredentialHasher::new(config.auth.hash_cost)
        .context("Invalid password hash cost")?;

    let state = AppState {
        todos: db.clone(),
        users: db,
        jwt_service: Arc::new(JwtService::new(&config.auth.jwt_secret)),
        hasher: Arc::new(hasher),
    };

    let cors = cors_layer(&config.server.cors_allowed_origins)?;
    let app = build_router(state, config.auth.require_auth, cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr} - port may already be in use"))?;

    tracing::info!("🚀 Todo server listening on http://{}", addr);
    tracing::info!("🏥 Health check available at http://{}/ping", addr);
    if config.auth.require_auth {
        tracing::info!("🔒 Bearer tokens required on /todos");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server exited");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Server shutting down...");
}
