use std::collections::{HashSet, VecDeque};

use futures::future::join_all;
use rand::{Rng, seq::SliceRandom};
use tracing::{debug, info, warn};

use crate::{
    catalog::{AlbumSummary, Catalog},
    error::GameError,
};

/// Cover/answer pair played during one round. Immutable once drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTarget {
    /// Catalog identifier of the album.
    pub album_id: u64,
    /// Album title; guesses are matched against it.
    pub title: String,
    /// Display artist revealed at round end.
    pub artist: String,
    /// Cover image shown to players.
    pub image: String,
}

impl From<AlbumSummary> for RoundTarget {
    fn from(value: AlbumSummary) -> Self {
        Self {
            album_id: value.id,
            title: value.title,
            artist: value.artist,
            image: value.cover,
        }
    }
}

impl From<RoundTarget> for AlbumSummary {
    fn from(value: RoundTarget) -> Self {
        Self {
            id: value.album_id,
            title: value.title,
            artist: value.artist,
            cover: value.image,
        }
    }
}

/// Parameters controlling how a deck is drawn from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckSettings {
    /// Maximum number of rounds kept in the deck.
    pub max_rounds: usize,
    /// Number of shuffled candidates checked against the catalog.
    pub verification_window: usize,
    /// Minimum number of tracks an album needs to be playable.
    pub min_album_tracks: u32,
}

/// Ordered pool of round targets for one game, consumed front to back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundDeck {
    targets: VecDeque<RoundTarget>,
}

impl RoundDeck {
    /// Wrap an already ordered list of targets.
    pub fn from_targets(targets: impl IntoIterator<Item = RoundTarget>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
        }
    }

    /// Fetch, deduplicate, shuffle and verify candidates from the catalog.
    ///
    /// Fails with [`GameError::UpstreamUnavailable`] when the candidate list cannot be fetched
    /// and with [`GameError::NoContentAvailable`] when no candidate survives verification.
    pub async fn build(catalog: &dyn Catalog, settings: &DeckSettings) -> Result<Self, GameError> {
        let raw = catalog.pool_candidates().await.map_err(|err| {
            warn!(error = %err, "failed to fetch round pool candidates");
            GameError::UpstreamUnavailable
        })?;

        let candidates = {
            let mut rng = rand::rng();
            prepare_candidates(raw, &mut rng)
        };

        let min_tracks = settings.min_album_tracks;
        let checks = candidates
            .into_iter()
            .take(settings.verification_window)
            .map(|album| async move {
                match catalog.album_track_count(album.id).await {
                    Ok(count) if count >= min_tracks => Some(album),
                    Ok(count) => {
                        debug!(album_id = album.id, count, "skipping album with too few tracks");
                        None
                    }
                    Err(err) => {
                        debug!(album_id = album.id, error = %err, "album verification failed");
                        None
                    }
                }
            });

        let targets: VecDeque<RoundTarget> = join_all(checks)
            .await
            .into_iter()
            .flatten()
            .take(settings.max_rounds)
            .map(RoundTarget::from)
            .collect();

        if targets.is_empty() {
            return Err(GameError::NoContentAvailable);
        }

        info!(rounds = targets.len(), "round deck ready");
        Ok(Self { targets })
    }

    /// Draw the next target, or `None` once the deck is exhausted.
    pub fn next(&mut self) -> Option<RoundTarget> {
        self.targets.pop_front()
    }

    /// Remaining targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether every target was drawn.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Remaining targets in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &RoundTarget> {
        self.targets.iter()
    }
}

/// Keep the first occurrence of every album, then uniformly shuffle the whole set.
pub fn prepare_candidates<R>(raw: Vec<AlbumSummary>, rng: &mut R) -> Vec<AlbumSummary>
where
    R: Rng + ?Sized,
{
    let mut seen = HashSet::new();
    let mut unique: Vec<AlbumSummary> = raw
        .into_iter()
        .filter(|album| seen.insert(album.id))
        .collect();
    unique.shuffle(rng);
    unique
}
