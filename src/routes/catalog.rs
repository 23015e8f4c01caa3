use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use validator::Validate;

use crate::{
    catalog::AlbumSummary, dto::catalog::SearchQuery, error::AppError,
    services::catalog_service, state::SharedState,
};

/// Read-only proxy routes over the music catalog.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/search", get(search_albums))
        .route("/api/covers", get(list_covers))
}

/// Search albums by free text.
#[utoipa::path(
    get,
    path = "/api/search",
    tag = "catalog",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching albums", body = [AlbumSummary]),
        (status = 400, description = "Missing or empty query"),
        (status = 503, description = "Music catalog unavailable")
    )
)]
pub async fn search_albums(
    State(state): State<SharedState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<AlbumSummary>>, AppError> {
    query.validate()?;
    Ok(Json(catalog_service::search(&state, query).await?))
}

/// Draw a freshly shuffled and verified set of album covers.
#[utoipa::path(
    get,
    path = "/api/covers",
    tag = "catalog",
    responses(
        (status = 200, description = "Verified album covers", body = [AlbumSummary]),
        (status = 404, description = "No usable album found"),
        (status = 503, description = "Music catalog unavailable")
    )
)]
pub async fn list_covers(
    State(state): State<SharedState>,
) -> Result<Json<Vec<AlbumSummary>>, AppError> {
    Ok(Json(catalog_service::covers(&state).await?))
}
