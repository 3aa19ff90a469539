pub mod localmusic;

use axum::{response::IntoResponse, routing::get, Json, Router};

use crate::state::{ApiGroup, ApiIndexResponse, AppState, HealthResponse};

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/localmusic", get(localmusic::list_songs))
        .route("/localmusic/:filename", get(localmusic::get_cover))
        .with_state(state)
}

async fn index() -> Json<ApiIndexResponse> {
    Json(ApiIndexResponse {
        name: "Local Music API",
        description: "Local audio library service",
        list: vec![ApiGroup {
            name: "LocalMusicAPI",
            url: "/api/localmusic",
        }],
    })
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}
