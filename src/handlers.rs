// SPDX-FileCopyrightText: 2026 T.S Plumbing
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact intake service.

use crate::config::Config;
use crate::intake::{ContactIntake, IntakeRequest};
use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::warn;

pub const SUCCESS_MESSAGE: &str = "הפנייה נשלחה בהצלחה";

/// Rate limit key used when no client address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Shared application state.
pub struct AppState {
    pub intake: ContactIntake,
    pub config: Config,
}

/// Successful submission response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
    pub submission_id: i64,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router.
///
/// Fails only if the configured CORS origin is not a valid header value.
pub fn build_router(state: Arc<AppState>) -> Result<Router, header::InvalidHeaderValue> {
    let allow_origin = HeaderValue::from_str(&state.config.cors_allow_origin)?;

    let mut router = Router::new()
        .route("/api/contact", any(contact))
        .route("/health", get(health))
        .route("/healthz", get(health));

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(metrics));
    }

    Ok(router
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            allow_origin,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-intake",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.intake.metrics().render() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Contact form endpoint. Accepts every method so that anything other
/// than POST gets the intake's own 405 body.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    method: Method,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // CORS pre-flight
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let peer = connect_info.map(|ConnectInfo(addr)| addr.ip());
    let client = client_key(&headers, peer);

    let request = IntakeRequest {
        method,
        client: &client,
        body: &body,
    };

    match state.intake.handle(request).await {
        Ok(submission_id) => Json(SubmitResponse {
            success: true,
            message: SUCCESS_MESSAGE,
            submission_id,
        })
        .into_response(),
        Err(err) => err.into_response(),
    }
}

/// Determine the rate limit key for a request.
///
/// Prefers the first `X-Forwarded-For` entry, then `X-Real-IP`, then the
/// TCP peer address.
pub fn client_key(headers: &HeaderMap, peer: Option<IpAddr>) -> String {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    header_value("x-forwarded-for")
        .or_else(|| header_value("x-real-ip"))
        .or_else(|| peer.map(|ip| ip.to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
