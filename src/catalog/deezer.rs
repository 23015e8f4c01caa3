use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::AppConfig;

use super::{
    AlbumSummary, Catalog,
    error::{CatalogError, CatalogResult},
    models::{DataEnvelope, DeezerAlbum, DeezerAlbumDetails, DeezerTrack},
};

/// [`Catalog`] implementation backed by the public Deezer API.
#[derive(Clone)]
pub struct DeezerCatalog {
    client: Client,
    base_url: Arc<str>,
    reference_user_id: Arc<str>,
    track_fetch_limit: u32,
}

impl DeezerCatalog {
    /// Build a catalog client from the application configuration.
    pub fn new(config: &AppConfig) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(config.catalog_timeout())
            .build()
            .map_err(|source| CatalogError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::from(config.catalog_base_url.trim_end_matches('/')),
            reference_user_id: Arc::from(config.reference_user_id.as_str()),
            track_fetch_limit: config.track_fetch_limit,
        })
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> CatalogResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| CatalogError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::RequestStatus {
                path: path.to_string(),
                status,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| CatalogError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    async fn search(&self, query: &str) -> CatalogResult<Vec<AlbumSummary>> {
        let path = "search/album";
        let envelope: DataEnvelope<DeezerAlbum> =
            self.get_json(path, &[("q", query.to_string())]).await?;
        if let Some(error) = envelope.error {
            return Err(CatalogError::Api {
                path: path.into(),
                message: error.message,
            });
        }

        Ok(envelope
            .data
            .into_iter()
            .map(DeezerAlbum::into_summary)
            .collect())
    }

    async fn reference_albums(&self) -> CatalogResult<Vec<AlbumSummary>> {
        let path = format!("user/{}/tracks", self.reference_user_id);
        let envelope: DataEnvelope<DeezerTrack> = self
            .get_json(&path, &[("limit", self.track_fetch_limit.to_string())])
            .await?;
        if let Some(error) = envelope.error {
            return Err(CatalogError::Api {
                path,
                message: error.message,
            });
        }

        let tracks = envelope.data.len();
        let albums: Vec<AlbumSummary> = envelope
            .data
            .into_iter()
            .filter_map(DeezerTrack::into_album)
            .collect();
        info!(
            user = %self.reference_user_id,
            tracks,
            albums = albums.len(),
            "fetched reference listening history"
        );
        Ok(albums)
    }

    async fn track_count(&self, album_id: u64) -> CatalogResult<u32> {
        let path = format!("album/{album_id}");
        let details: DeezerAlbumDetails = self.get_json(&path, &[]).await?;
        if let Some(error) = details.error {
            debug!(album_id, message = %error.message, "album lookup rejected");
            return Err(CatalogError::Api {
                path,
                message: error.message,
            });
        }
        Ok(details.nb_tracks)
    }
}

impl Catalog for DeezerCatalog {
    fn search_albums(&self, query: String) -> BoxFuture<'static, CatalogResult<Vec<AlbumSummary>>> {
        let catalog = self.clone();
        Box::pin(async move { catalog.search(&query).await })
    }

    fn pool_candidates(&self) -> BoxFuture<'static, CatalogResult<Vec<AlbumSummary>>> {
        let catalog = self.clone();
        Box::pin(async move { catalog.reference_albums().await })
    }

    fn album_track_count(&self, album_id: u64) -> BoxFuture<'static, CatalogResult<u32>> {
        let catalog = self.clone();
        Box::pin(async move { catalog.track_count(album_id).await })
    }
}
