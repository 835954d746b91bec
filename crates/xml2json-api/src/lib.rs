//! HTTP front-end for XML to JSON conversion
//!
//! Routes:
//! - `GET /api/health`
//! - `POST /api/convert` returns the converted object inside a status envelope
//! - `POST /api/convert/download` returns pretty JSON as a file attachment

#![forbid(unsafe_code)]

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};
use xml2json::{ConvertOptions, DEFAULT_OUTPUT_FILE, Object, Value, XmlConfig};

/// Server settings read from the environment
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub xml: XmlConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            xml: XmlConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read `XML2JSON_HOST`, `XML2JSON_PORT`, `XML2JSON_MAX_DEPTH` and
    /// `XML2JSON_MAX_SIZE`, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("XML2JSON_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "XML2JSON_PORT", defaults.port),
            xml: XmlConfig::new(
                parse_var(&lookup, "XML2JSON_MAX_DEPTH", defaults.xml.max_depth),
                parse_var(&lookup, "XML2JSON_MAX_SIZE", defaults.xml.max_size),
            ),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, raw = %raw, "ignoring unparsable setting");
            default
        }),
        None => default,
    }
}

#[derive(Clone, Copy, Debug)]
struct AppState {
    xml: XmlConfig,
}

/// Conversion request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub content: String,
    #[serde(default)]
    pub country_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum ApiResponse {
    Ok { data: Object },
    Err { error: String },
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::Err {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// Room for the JSON wrapper around `content`
const BODY_OVERHEAD: usize = 64 * 1024;

/// Request body cap derived from the document size limit. Escaping can
/// double the document inside the JSON string.
fn body_limit(xml: &XmlConfig) -> DefaultBodyLimit {
    if xml.max_size == 0 {
        DefaultBodyLimit::disable()
    } else {
        DefaultBodyLimit::max(xml.max_size.saturating_mul(2).saturating_add(BODY_OVERHEAD))
    }
}

/// Build the application router
pub fn app(config: &AppConfig) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/convert", post(convert))
        .route("/api/convert/download", post(download))
        .layer(body_limit(&config.xml))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(AppState { xml: config.xml })
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn convert(
    State(state): State<AppState>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let Json(payload) = payload?;
    let data = run_conversion(state, &payload)?;
    Ok(Json(ApiResponse::Ok { data }))
}

async fn download(
    State(state): State<AppState>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let data = run_conversion(state, &payload)?;
    let body = xml2json::json::to_string_pretty(&Value::Object(data));
    let headers = [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{DEFAULT_OUTPUT_FILE}\""),
        ),
    ];
    Ok((headers, body).into_response())
}

fn run_conversion(state: AppState, payload: &ConvertRequest) -> Result<Object, ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError {
            status: StatusCode::BAD_REQUEST,
            message: "content is empty".to_string(),
        });
    }

    let options = ConvertOptions {
        xml: state.xml,
        region: payload.country_code.clone(),
    };
    xml2json::convert_xml_with_options(&payload.content, &options).map_err(|err| {
        debug!(%err, "conversion rejected");
        let status = if err.is_parse_failure() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::PAYLOAD_TOO_LARGE
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    })
}
