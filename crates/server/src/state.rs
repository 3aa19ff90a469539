use std::path::Path;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use library::LibraryOptions;
use serde::Serialize;

use crate::config::ServerConfig;

/// Shared, read-only request context. Scans take what they need from
/// `library` and keep nothing between requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub library: Arc<LibraryOptions>,
}

impl AppState {
    pub fn new(config_path: &Path, config: ServerConfig) -> Self {
        let library = config.library_options(config_path);
        Self {
            config: Arc::new(config),
            library: Arc::new(library),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CoverResponse {
    pub cover: String,
}

#[derive(Serialize)]
pub struct ApiIndexResponse {
    pub name: &'static str,
    pub description: &'static str,
    pub list: Vec<ApiGroup>,
}

#[derive(Serialize)]
pub struct ApiGroup {
    pub name: &'static str,
    pub url: &'static str,
}

pub type JsonResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;
