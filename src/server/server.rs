use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Map, Value};
use tokio::select;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, error, info};

use crate::config::settings::SettingsConfig;
use crate::errors::BrokerError;
use crate::handler::response::{ErrorBody, TokenBody};
use crate::handler::{Response as PathResponse, SecretBackend};
use crate::issuer::command::CommandRunner;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::record::ValidationError;
use crate::storage::SecretStorage;
use crate::utils::constants::API_PREFIX;

pub struct AppState<S, R> {
    pub backend: Arc<SecretBackend<S, R>>,
}

impl<S, R> Clone for AppState<S, R> {
    fn clone(&self) -> Self {
        Self { backend: self.backend.clone() }
    }
}

/// Secret path routes under `/v1/<mount_point>` plus the metrics route.
pub fn router<S, R>(
    settings_config: &SettingsConfig,
    backend: Arc<SecretBackend<S, R>>,
    metrics: &Metrics,
) -> Router
where
    S: SecretStorage,
    R: CommandRunner,
{
    let secret_route = format!("{}{}{{*path}}", API_PREFIX, settings_config.mount_point);
    info!("served path: {}", secret_route);

    Router::new()
        .route(
            &secret_route,
            get(handle_read::<S, R>)
                .head(handle_exists::<S, R>)
                .put(handle_write::<S, R>)
                .post(handle_write::<S, R>)
                .delete(handle_delete::<S, R>),
        )
        .with_state(AppState { backend })
        .merge(MetricsState::new(metrics.registry.clone()).router(&settings_config.metrics))
}

/// Serve until SIGINT or SIGTERM.
pub async fn start<S, R>(settings_config: &SettingsConfig, backend: Arc<SecretBackend<S, R>>) -> Result<()>
where
    S: SecretStorage,
    R: CommandRunner,
{
    let metrics = get_metrics().await;
    let app = router(settings_config, backend, metrics);

    let address = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| anyhow!("cannot bind {}: {}", address, e))?;
    info!("listening on {}", address);

    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    metrics.up.set(0);
    info!("server stopped");
    Ok(())
}

async fn handle_read<S: SecretStorage, R: CommandRunner>(
    State(state): State<AppState<S, R>>,
    Path(path): Path<String>,
) -> Response {
    into_http(state.backend.read(&path).await)
}

async fn handle_write<S: SecretStorage, R: CommandRunner>(
    State(state): State<AppState<S, R>>,
    Path(path): Path<String>,
    body: Bytes,
) -> Response {
    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(invalid) => return into_http(Ok(PathResponse::Invalid(invalid))),
    };
    let operation = match state.backend.exists(&path).await {
        Ok(true) => "update",
        Ok(false) => "create",
        Err(e) => return into_http(Err(e)),
    };
    debug!(path = %path, operation, "write request");
    into_http(state.backend.write(&path, payload).await)
}

async fn handle_delete<S: SecretStorage, R: CommandRunner>(
    State(state): State<AppState<S, R>>,
    Path(path): Path<String>,
) -> Response {
    into_http(state.backend.delete(&path).await)
}

async fn handle_exists<S: SecretStorage, R: CommandRunner>(
    State(state): State<AppState<S, R>>,
    Path(path): Path<String>,
) -> StatusCode {
    match state.backend.exists(&path).await {
        Ok(true) => StatusCode::OK,
        Ok(false) => StatusCode::NOT_FOUND,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Empty body (or `{}`) means "clear this path".
pub fn parse_payload(body: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ValidationError::PayloadNotObject),
        Err(e) => Err(ValidationError::MalformedPayload(e.to_string())),
    }
}

fn into_http(result: Result<PathResponse, BrokerError>) -> Response {
    match result {
        Ok(PathResponse::Token(token)) => {
            (StatusCode::OK, Json(TokenBody { token: &token })).into_response()
        }
        Ok(PathResponse::NoValue(message)) => {
            (StatusCode::NOT_FOUND, Json(ErrorBody::new(message))).into_response()
        }
        Ok(PathResponse::Invalid(invalid)) => {
            (StatusCode::BAD_REQUEST, Json(ErrorBody::new(invalid.to_string()))).into_response()
        }
        Ok(PathResponse::Done) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new(e.to_string()))).into_response()
        }
    }
}

async fn shutdown_signal() {
    let (mut sigint, mut sigterm) = match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
        (Err(e), _) | (_, Err(e)) => {
            error!("cannot install signal handlers: {}", e);
            return std::future::pending::<()>().await;
        }
    };
    select! {
        _ = sigint.recv() => {
            info!("Received SIGINT (Ctrl+C). Initiating graceful shutdown...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM. Initiating graceful shutdown...");
        }
    }
}
