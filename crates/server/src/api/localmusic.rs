use std::sync::Arc;

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    Json,
};
use common::SongDescriptor;
use library::{CoverLookupError, LibraryError};
use tracing::{error, warn};

use crate::scan::{self, CoverTaskError, ScanError};
use crate::state::{AppState, CoverResponse, JsonResult};
use crate::utils::{json_error, json_error_with_details};

pub async fn list_songs(State(state): State<AppState>) -> JsonResult<Vec<SongDescriptor>> {
    match scan::list_songs(Arc::clone(&state.library)).await {
        Ok(songs) => Ok(Json(songs)),
        Err(ScanError::Library(LibraryError::DirectoryNotFound(path))) => {
            error!("Music directory does not exist: {}", path.display());
            Err(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Music directory not found",
            ))
        }
        Err(err) => {
            error!("Error scanning local music: {}", err);
            Err(json_error_with_details(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to scan local music",
                err.to_string(),
            ))
        }
    }
}

pub async fn get_cover(
    State(state): State<AppState>,
    AxumPath(filename): AxumPath<String>,
) -> JsonResult<CoverResponse> {
    match scan::cover_for_file(Arc::clone(&state.library), filename).await {
        Ok(cover) => Ok(Json(CoverResponse { cover })),
        Err(CoverTaskError::Lookup(
            err @ (CoverLookupError::FileNotFound(_) | CoverLookupError::InvalidName(_)),
        )) => {
            warn!("Cover lookup rejected: {}", err);
            Err(json_error(StatusCode::NOT_FOUND, "File not found"))
        }
        Err(CoverTaskError::Lookup(err)) => {
            error!("Error reading file metadata: {}", err);
            Err(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read file metadata",
            ))
        }
        Err(CoverTaskError::Join(err)) => {
            error!("Cover task failed: {}", err);
            Err(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read file metadata",
            ))
        }
    }
}
