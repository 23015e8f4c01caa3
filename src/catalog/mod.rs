//! Music catalog collaborator: album search and the round-pool candidates.

mod deezer;
mod error;
mod models;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use deezer::DeezerCatalog;
pub use error::{CatalogError, CatalogResult};

/// Album projection shared by the catalog, the round deck and the proxy routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AlbumSummary {
    /// Catalog identifier of the album.
    pub id: u64,
    /// Album title, used as the answer of a round.
    pub title: String,
    /// Display artist.
    pub artist: String,
    /// Cover image URL.
    pub cover: String,
}

/// Abstraction over the upstream music catalog.
pub trait Catalog: Send + Sync {
    /// Free-text album search.
    fn search_albums(&self, query: String) -> BoxFuture<'static, CatalogResult<Vec<AlbumSummary>>>;
    /// Albums of every track of the reference listening history, in catalog order.
    ///
    /// The same album may appear several times.
    fn pool_candidates(&self) -> BoxFuture<'static, CatalogResult<Vec<AlbumSummary>>>;
    /// Number of tracks of an album.
    fn album_track_count(&self, album_id: u64) -> BoxFuture<'static, CatalogResult<u32>>;
}
