//! HTTP surface of the service.
//!
//! `GET /forecast?latitude=..&longitude=..` answers with the first forecast
//! period of the point, reduced to a short description and a temperature
//! category.

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use forecast_core::{ForecastError, ForecastOutput, ForecastProvider, ForecastRequest};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ForecastProvider>,
}

/// Failure of a `/forecast` request, rendered as a plain-text body.
#[derive(Debug)]
pub enum ApiError {
    MethodNotAllowed,
    Forecast(ForecastError),
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        Self::Forecast(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response()
            }
            Self::Forecast(err) => (err.status(), err.to_string()).into_response(),
        }
    }
}

/// The first occurrence of each key wins; an empty value counts as missing.
fn parse_coordinates(query: Option<&str>) -> Result<ForecastRequest, ForecastError> {
    let mut latitude = None;
    let mut longitude = None;

    for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        match key.as_ref() {
            "latitude" if latitude.is_none() => latitude = Some(value.into_owned()),
            "longitude" if longitude.is_none() => longitude = Some(value.into_owned()),
            _ => {}
        }
    }

    match (latitude, longitude) {
        (Some(lat), Some(lon)) if !lat.is_empty() && !lon.is_empty() => {
            Ok(ForecastRequest::new(lat, lon))
        }
        _ => Err(ForecastError::MissingCoordinates),
    }
}

/// /forecast - Any method is routed here so that non-GET gets a 405 before validation.
async fn forecast(
    State(state): State<AppState>,
    method: Method,
    RawQuery(query): RawQuery,
) -> Result<Json<ForecastOutput>, ApiError> {
    if method != Method::GET {
        return Err(ApiError::MethodNotAllowed);
    }

    let request = parse_coordinates(query.as_deref())?;

    let output = state.provider.forecast(&request).await.map_err(|err| {
        warn!(
            latitude = %request.latitude,
            longitude = %request.longitude,
            status = %err.status(),
            error = %err,
            "forecast lookup failed"
        );
        err
    })?;

    Ok(Json(output))
}

/// GET /health - Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

/// Create the HTTP router
pub fn create_router(provider: Arc<dyn ForecastProvider>) -> Router {
    let state = AppState { provider };

    Router::new()
        .route("/health", get(health_check))
        .route("/forecast", any(forecast))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until Ctrl-C.
pub async fn run_http_server(
    provider: Arc<dyn ForecastProvider>,
    bind: &str,
) -> anyhow::Result<()> {
    let app = create_router(provider);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {bind}"))?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated with an error")?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to install Ctrl-C handler, serving until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
