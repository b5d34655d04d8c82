//! HTTP interface
//!
//! | Route | Response |
//! |---|---|
//! | `GET /ping` | `{"message": "pong: <server id>"}` |
//! | `GET /cert/:domain` | renewal info, JSON or `text/plain` by `Accept` |
//! | `GET /cert/:domain/serial` | serial as `text/plain` |
//! | `GET /cert/:domain/:item` | item bytes |
//! | `GET /cert/:domain/:item/stat` | `{"mod_time": ..., "size": ...}` |
//!
//! Credentials arrive as `Authorization: Bearer <key>`. `HEAD` is answered
//! for every route.

use std::net::SocketAddr;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use http::header::{self, HeaderMap, HeaderValue};
use http::StatusCode;
use serde::Serialize;
use tracing::{debug, error, info};

use certvault_common::{ApiKey, ItemKind, ServerId};
use certvault_config::ListenerConfig;

use crate::backend::{BackendError, CertBackend};
use crate::reload::ShutdownSignal;

const PEM_CONTENT_TYPE: &str = "application/x-pem-file";
const PKCS12_CONTENT_TYPE: &str = "application/x-pkcs12";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Path segment that selects the serial shortcut instead of an item kind
const SERIAL_SEGMENT: &str = "serial";

/// Time in-flight requests get to finish on shutdown
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Shared state of every handler
#[derive(Clone)]
pub struct AppState {
    pub backend: CertBackend,
    pub server_id: ServerId,
}

/// Build the router serving all routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/cert/:domain", get(get_info))
        .route("/cert/:domain/:item", get(get_item))
        .route("/cert/:domain/:item/stat", get(get_stat))
        .with_state(state)
}

/// Backend failure rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub BackendError);

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BackendError::Unauthorized => StatusCode::UNAUTHORIZED,
            BackendError::InvalidDomain(_) | BackendError::UnsupportedItemKind(_) => {
                StatusCode::BAD_REQUEST
            }
            BackendError::NotFound(_) => StatusCode::NOT_FOUND,
            BackendError::MalformedMetadata { .. }
            | BackendError::KeyDecode { .. }
            | BackendError::CertDecode { .. }
            | BackendError::Encode { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            BackendError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            BackendError::Unauthorized => "unauthorized".to_string(),
            BackendError::Store(_) => {
                error!(error = %self.0, "Store failure while serving request");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[derive(Serialize)]
struct PingResponse {
    message: String,
}

async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    Json(PingResponse {
        message: format!("pong: {}", state.server_id),
    })
}

async fn get_info(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let key = api_key(&headers);
    let info = state.backend.fetch_info(&domain, &key).await?;

    if prefers_text(&headers) {
        return Ok(([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], info.to_text()).into_response());
    }
    Ok(Json(info).into_response())
}

async fn get_item(
    State(state): State<AppState>,
    Path((domain, item)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let key = api_key(&headers);

    if item == SERIAL_SEGMENT {
        let serial = state.backend.fetch_serial(&domain, &key).await?;
        return Ok(([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], serial).into_response());
    }

    let kind = state.backend.parse_kind(&domain, &item, &key)?;
    let result = state.backend.fetch_item(&domain, kind, &key).await?;
    debug!(domain = %domain, kind = %kind, bytes = result.data.len(), "Serving item");

    let mut response = result.data.into_response();
    let response_headers = response.headers_mut();
    response_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type(kind)));
    if let Some(value) = last_modified(result.mod_time) {
        response_headers.insert(header::LAST_MODIFIED, value);
    }
    if kind.is_archive() {
        if let Some(value) = attachment(&domain, kind) {
            response_headers.insert(header::CONTENT_DISPOSITION, value);
        }
    }
    Ok(response)
}

async fn get_stat(
    State(state): State<AppState>,
    Path((domain, item)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let key = api_key(&headers);
    let kind = state.backend.parse_kind(&domain, &item, &key)?;
    let stat = state.backend.stat_item(&domain, kind, &key).await?;

    let mut response = Json(stat).into_response();
    if let Some(value) = last_modified(stat.mod_time) {
        response.headers_mut().insert(header::LAST_MODIFIED, value);
    }
    Ok(response)
}

fn api_key(headers: &HeaderMap) -> ApiKey {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(ApiKey::from_authorization)
        .unwrap_or_else(|| ApiKey::new(""))
}

/// Whether the client asked for `text/plain` ahead of JSON
fn prefers_text(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    for media in accept.split(',') {
        let media = media.split(';').next().unwrap_or("").trim();
        if media.eq_ignore_ascii_case("application/json") {
            return false;
        }
        if media.eq_ignore_ascii_case("text/plain") {
            return true;
        }
    }
    false
}

fn content_type(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Info => "application/json",
        ItemKind::Key | ItemKind::Cert | ItemKind::CertChain => PEM_CONTENT_TYPE,
        ItemKind::ArchiveSingle | ItemKind::ArchiveChain => PKCS12_CONTENT_TYPE,
    }
}

fn last_modified(mod_time: DateTime<Utc>) -> Option<HeaderValue> {
    HeaderValue::from_str(&httpdate::fmt_http_date(SystemTime::from(mod_time))).ok()
}

fn attachment(domain: &str, kind: ItemKind) -> Option<HeaderValue> {
    let stem = domain.replace('"', "_");
    let suffix = match kind {
        ItemKind::ArchiveChain => "-chain.pfx",
        _ => ".pfx",
    };
    HeaderValue::from_str(&format!("attachment; filename=\"{}{}\"", stem, suffix)).ok()
}

/// Serve `router` on the configured listener until `shutdown` fires
pub async fn serve(listener: &ListenerConfig, router: Router, shutdown: ShutdownSignal) -> Result<()> {
    let addr: SocketAddr = listener
        .address
        .parse()
        .with_context(|| format!("Invalid listener address: {}", listener.address))?;

    match &listener.tls {
        None => {
            let tcp = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            info!(address = %addr, "HTTP listening");
            axum::serve(tcp, router)
                .with_graceful_shutdown(shutdown.wait())
                .await
                .context("HTTP server failed")?;
        }
        Some(tls) => {
            let rustls = axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.cert_file, &tls.key_file)
                .await
                .with_context(|| {
                    format!(
                        "Failed to load TLS certificate {} and key {}",
                        tls.cert_file.display(),
                        tls.key_file.display()
                    )
                })?;

            let handle = axum_server::Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                shutdown.wait().await;
                shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
            });

            info!(address = %addr, cert = %tls.cert_file.display(), "HTTPS listening");
            axum_server::bind_rustls(addr, rustls)
                .handle(handle)
                .serve(router.into_make_service())
                .await
                .context("HTTPS server failed")?;
        }
    }

    info!("Server stopped");
    Ok(())
}
