use tracing::info;

use crate::{
    catalog::AlbumSummary,
    dto::catalog::SearchQuery,
    error::AppError,
    state::{SharedState, deck::RoundDeck},
};

/// Forward a free-text album search to the catalog.
pub async fn search(state: &SharedState, query: SearchQuery) -> Result<Vec<AlbumSummary>, AppError> {
    let terms = query.q.trim().to_string();
    let albums = state.catalog().search_albums(terms.clone()).await?;
    info!(query = %terms, results = albums.len(), "album search");
    Ok(albums)
}

/// Build a fresh verified deck and return it as album summaries.
pub async fn covers(state: &SharedState) -> Result<Vec<AlbumSummary>, AppError> {
    let settings = state.config().deck_settings();
    let deck = RoundDeck::build(state.catalog().as_ref(), &settings).await?;
    Ok(deck.iter().cloned().map(AlbumSummary::from).collect())
}
