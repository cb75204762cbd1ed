use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures_util::future::join_all;

use crate::platforms::Platform;

/// A game as it exists on one platform.
#[derive(Clone)]
pub struct PlatformGameRef {
    pub platform: Arc<dyn Platform>,
    pub id: String,
}

/// What the report keeps for a platform that supports cloud saves for a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformListing {
    pub publisher: String,
    pub install_size: u64,
    pub id: String,
}

/// A game IGDB lists on at least two platforms.
#[derive(Clone)]
pub struct CandidateGame {
    pub name: String,
    pub refs: Vec<PlatformGameRef>,
}

/// A candidate after every platform was asked about it. Only platforms that
/// affirmatively support cloud saves have a listing.
#[derive(Debug, Clone)]
pub struct EnrichedGame {
    pub name: String,
    listings: HashMap<&'static str, PlatformListing>,
}

impl PlatformGameRef {
    pub fn new(platform: Arc<dyn Platform>, id: String) -> Self {
        Self { platform, id }
    }

    /// Publisher and install size if the platform has the game and supports
    /// cloud saves for it. Fetch errors are absorbed here as absence.
    pub async fn resolve(&self) -> Option<PlatformListing> {
        let raw = match self.platform.fetch_raw(&self.id).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(game = %self, error = %format!("{:#}", e), "failed to fetch platform data");
                return None;
            }
        };

        let details = self.platform.decode(&raw);
        if !details.cloud_save {
            return None;
        }

        Some(PlatformListing {
            publisher: details.publisher,
            install_size: details.install_size,
            id: self.id.clone(),
        })
    }
}

impl fmt::Display for PlatformGameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.platform.name(), self.id)
    }
}

impl fmt::Debug for PlatformGameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl CandidateGame {
    /// `None` unless there are at least two refs to compare.
    pub fn new(name: String, refs: Vec<PlatformGameRef>) -> Option<Self> {
        if refs.len() < 2 {
            return None;
        }
        Some(Self { name, refs })
    }

    /// Asks every platform about this game at once.
    #[tracing::instrument(skip(self), fields(game = %self.name))]
    pub async fn enrich(&self) -> EnrichedGame {
        let resolved = join_all(self.refs.iter().map(|game_ref| game_ref.resolve())).await;

        let mut listings = HashMap::new();
        for (game_ref, listing) in self.refs.iter().zip(resolved) {
            if let Some(listing) = listing {
                listings.insert(game_ref.platform.name(), listing);
            }
        }

        EnrichedGame {
            name: self.name.clone(),
            listings,
        }
    }
}

impl fmt::Display for CandidateGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.name)?;
        for game_ref in &self.refs {
            write!(f, " {}", game_ref)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CandidateGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl EnrichedGame {
    pub fn listing(&self, platform: &dyn Platform) -> Option<&PlatformListing> {
        self.listings.get(platform.name())
    }

    pub fn resolved_count(&self) -> usize {
        self.listings.len()
    }
}
