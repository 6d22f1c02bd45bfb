use crate::config::ApiConfig;
use crate::db::repositories::opens::OpensRepository;
use crate::error::Error;
use crate::security::AdminGate;
use anyhow::Result;
use axum::{
    extract::FromRef,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::{error, info};
use serde::Serialize;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use url::form_urlencoded;

pub mod admin_controller;
pub mod pixel_controller;


// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub opens_repo: OpensRepository,
    pub admin_gate: AdminGate,
}

impl AppState {
    pub fn new(db_pool: Arc<SqlitePool>, admin_gate: AdminGate) -> Self {
        Self {
            opens_repo: OpensRepository::new(db_pool),
            admin_gate,
        }
    }
}

impl FromRef<AppState> for AdminGate {
    fn from_ref(state: &AppState) -> Self {
        state.admin_gate.clone()
    }
}

/// First value of `key` in a raw query string. Repeated keys never reject the request.
pub fn first_query_value(query: Option<&str>, key: &str) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
    pub status: u16,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Unauthorized => ApiError {
                message: err.to_string(),
                status: StatusCode::UNAUTHORIZED.as_u16(),
            },
            Error::BadRequest(_) => ApiError {
                message: err.to_string(),
                status: StatusCode::BAD_REQUEST.as_u16(),
            },
            Error::Database(_) => {
                error!("Storage failure: {}", err);
                ApiError {
                    message: err.to_string(),
                    status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                }
            }
            _ => ApiError {
                message: err.to_string(),
                status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            },
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(err) = err.downcast_ref::<Error>() {
            return (*err).clone().into();
        }

        error!("Unhandled error: {}", err);
        ApiError {
            message: err.to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
    }
}

/// Implement IntoResponse for ApiError
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(self);
        (status, body).into_response()
    }
}

/// Build the full route table over the given state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/pixel.gif", get(pixel_controller::pixel))
        .merge(admin_controller::create_router())
        .with_state(state)
}

async fn index() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Pixel tracker running.",
    )
}

pub struct RestApi {
    config: ApiConfig,
    state: AppState,
}

impl RestApi {
    pub fn new(config: &ApiConfig, db_pool: Arc<SqlitePool>, admin_gate: AdminGate) -> Self {
        Self {
            config: config.clone(),
            state: AppState::new(db_pool, admin_gate),
        }
    }

    /// Serve until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        let app = router(self.state.clone());

        // Build the server address
        let addr = self.config.address.clone() + ":" + &self.config.port.to_string();
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::Config(format!("Invalid listen address {}: {}", addr, e)))?;

        let listener = TcpListener::bind(addr).await?;
        info!("API server listening on {}", addr);

        // Peer addresses are needed by the pixel handler
        axum::Server::from_tcp(listener.into_std()?)?
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped");

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}
