//! Wire models returned by the Deezer public API.

use serde::Deserialize;

use super::AlbumSummary;

/// Paginated envelope wrapping most list endpoints.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// Error object embedded in an otherwise successful response.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DeezerArtist {
    pub name: String,
}

/// Album entry returned by `/search/album`.
#[derive(Debug, Deserialize)]
pub struct DeezerAlbum {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub artist: Option<DeezerArtist>,
    #[serde(flatten)]
    pub covers: CoverSet,
}

/// Album fragment nested inside a track.
#[derive(Debug, Deserialize)]
pub struct DeezerTrackAlbum {
    pub id: u64,
    pub title: String,
    #[serde(flatten)]
    pub covers: CoverSet,
}

/// Track entry returned by `/user/{id}/tracks`.
#[derive(Debug, Deserialize)]
pub struct DeezerTrack {
    #[serde(default)]
    pub album: Option<DeezerTrackAlbum>,
    #[serde(default)]
    pub artist: Option<DeezerArtist>,
}

/// Album details returned by `/album/{id}`.
#[derive(Debug, Deserialize)]
pub struct DeezerAlbumDetails {
    #[serde(default)]
    pub nb_tracks: u32,
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// Cover image variants, from smallest to largest.
#[derive(Debug, Default, Deserialize)]
pub struct CoverSet {
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub cover_medium: Option<String>,
    #[serde(default)]
    pub cover_big: Option<String>,
    #[serde(default)]
    pub cover_xl: Option<String>,
}

impl CoverSet {
    /// Largest available cover.
    pub fn best(self) -> Option<String> {
        self.cover_xl
            .or(self.cover_big)
            .or(self.cover_medium)
            .or(self.cover)
    }
}

impl DeezerAlbum {
    pub fn into_summary(self) -> AlbumSummary {
        AlbumSummary {
            id: self.id,
            title: self.title,
            artist: self.artist.map(|artist| artist.name).unwrap_or_default(),
            cover: self.covers.best().unwrap_or_default(),
        }
    }
}

impl DeezerTrack {
    /// Album the track belongs to, if the track carries both album and artist.
    pub fn into_album(self) -> Option<AlbumSummary> {
        let album = self.album?;
        let artist = self.artist?;
        Some(AlbumSummary {
            id: album.id,
            title: album.title,
            artist: artist.name,
            cover: album.covers.best().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_prefers_largest_cover() {
        let track: DeezerTrack = serde_json::from_str(
            r#"{
                "id": 3135556,
                "album": {
                    "id": 302127,
                    "title": "Discovery",
                    "cover": "small.jpg",
                    "cover_big": "big.jpg"
                },
                "artist": { "id": 27, "name": "Daft Punk" }
            }"#,
        )
        .unwrap();

        let album = track.into_album().unwrap();
        assert_eq!(album.id, 302127);
        assert_eq!(album.artist, "Daft Punk");
        assert_eq!(album.cover, "big.jpg");
    }

    #[test]
    fn track_without_artist_is_skipped() {
        let track: DeezerTrack =
            serde_json::from_str(r#"{ "album": { "id": 1, "title": "Untitled" } }"#).unwrap();
        assert!(track.into_album().is_none());
    }

    #[test]
    fn envelope_tolerates_missing_data() {
        let envelope: DataEnvelope<DeezerTrack> =
            serde_json::from_str(r#"{ "error": { "type": "DataException", "message": "no data" } }"#)
                .unwrap();
        assert!(envelope.data.is_empty());
        assert_eq!(envelope.error.unwrap().message, "no data");
    }
}
