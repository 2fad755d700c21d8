//! HTTP surface for the chain inspector.
//!
//! Thin plumbing over the core in `lib.rs`: one endpoint taking `ip` and
//! `url` query parameters, plus health and metrics endpoints. Each request
//! is an independent unit of work with no shared mutable state; the
//! blocking connect/validate pass runs on the blocking thread pool.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::TlsCheckError;
use crate::metrics::prom;
use crate::{fetch_chain, normalize_hostname, summarize_chain, validate_chain, CertSummary};

/// Shared, immutable per-process state.
#[derive(Clone)]
pub struct AppState {
    /// Bound on the TCP connect phase of each probe.
    pub connect_timeout: Duration,
}

/// Successful response body for `GET /check-ssl`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub target_url: String,
    pub certificates: Vec<CertSummary>,
    pub chain_validation_message: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckParams {
    ip: Option<String>,
    url: Option<String>,
}

/// Errors surfaced by the HTTP layer. Each maps 1:1 onto a status code and
/// a JSON error envelope; nothing is retried.
#[derive(Debug)]
pub enum ApiError {
    /// A required query parameter is missing or empty (400)
    MissingParameters,
    /// Transport or handshake failure while capturing the chain (500)
    Connect(String),
    /// Handshake succeeded but the peer presented no certificates (500)
    NoCertificates,
    /// Unexpected internal failure, e.g. a panicked worker task (500)
    Internal(String),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::MissingParameters => (
                StatusCode::BAD_REQUEST,
                "Query parameters 'ip' and 'url' are required.".to_string(),
            ),
            ApiError::Connect(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to connect via TLS: {}", details),
            ),
            ApiError::NoCertificates => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server did not provide any certificates.".to_string(),
            ),
            ApiError::Internal(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error: {}", details),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

/// Create the application router.
pub fn router(connect_timeout: Duration) -> Router {
    let state = AppState { connect_timeout };

    Router::new()
        .route("/check-ssl", get(check_ssl))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Inspects the chain served at `ip:443` under the hostname in `url`.
///
/// # Route
///
/// `GET /check-ssl?ip=<ip>&url=<host-or-url>`
///
/// Missing or empty parameters yield a 400 before any network activity.
/// Connect-phase failures and an empty peer chain yield a 500. An invalid
/// chain is not an error: it comes back as a 200 whose
/// `chain_validation_message` carries the failure reason.
async fn check_ssl(
    State(state): State<AppState>,
    Query(params): Query<CheckParams>,
) -> Result<Json<CheckResponse>, ApiError> {
    let (ip, raw_host) = match (params.ip, params.url) {
        (Some(ip), Some(url)) if !ip.is_empty() && !url.is_empty() => (ip, url),
        _ => return Err(ApiError::MissingParameters),
    };

    let hostname = normalize_hostname(&raw_host);
    debug!("checking chain at {} for hostname {}", ip, hostname);

    let timeout = state.connect_timeout;
    let probe_hostname = hostname.clone();
    let probe_ip = ip.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let chain = fetch_chain(&probe_ip, &probe_hostname, timeout)?;
        let certificates = summarize_chain(&chain);
        let verdict = validate_chain(&chain, &probe_hostname)?;
        Ok::<_, TlsCheckError>((certificates, verdict))
    })
    .await
    .map_err(|e| {
        prom::record_error();
        ApiError::Internal(e.to_string())
    })?;

    match outcome {
        Ok((certificates, verdict)) => {
            prom::record_verdict(&verdict);
            info!(
                "chain at {} for {}: {} certificate(s), valid={}",
                ip,
                hostname,
                certificates.len(),
                verdict.is_valid()
            );
            Ok(Json(CheckResponse {
                target_url: format!("https://{}", hostname),
                certificates,
                chain_validation_message: verdict.message(),
            }))
        }
        Err(TlsCheckError::NoCertificates) => {
            prom::record_error();
            Err(ApiError::NoCertificates)
        }
        Err(e) => {
            prom::record_error();
            info!("chain check for {} at {} failed: {}", hostname, ip, e);
            Err(ApiError::Connect(e.to_string()))
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn metrics() -> (StatusCode, String) {
    (StatusCode::OK, prom::render())
}
