//! Catalog provider seam and the day-indexed target selector.

use std::sync::Arc;

use async_trait::async_trait;
use game_core::{GameConfig, Profile};

use crate::catalog::Catalog;

/// Source of candidate profiles and of each round's target.
///
/// Selection must be deterministic and depend only on catalog order, so every
/// client picks the same target for the same input.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// All candidate profiles, in catalog order.
    async fn fetch_all(&self) -> anyhow::Result<Vec<Profile>>;

    /// Target profile for a round identifier.
    async fn target_for_round(&self, round: u64) -> anyhow::Result<Profile>;
}

/// Provider backed by a catalog already in memory.
#[derive(Debug, Clone)]
pub struct StaticCatalogProvider {
    catalog: Arc<Catalog>,
}

impl StaticCatalogProvider {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Whole days elapsed since the Unix epoch.
    pub fn day_index(unix_ms: u64) -> u64 {
        unix_ms / GameConfig::ROUND_LENGTH_MS
    }

    /// `catalog[day_index mod len]`.
    pub fn target_for_time(&self, unix_ms: u64) -> &Profile {
        self.pick(Self::day_index(unix_ms))
    }

    /// Target for the current UTC day.
    pub fn target_for_today(&self) -> &Profile {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        self.target_for_time(now)
    }

    fn pick(&self, index: u64) -> &Profile {
        let len = self.catalog.len() as u64;
        let slot = (index % len) as usize;
        // Catalog construction rejects empty catalogs
        &self.catalog.profiles()[slot]
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalogProvider {
    async fn fetch_all(&self) -> anyhow::Result<Vec<Profile>> {
        Ok(self.catalog.profiles().to_vec())
    }

    async fn target_for_round(&self, round: u64) -> anyhow::Result<Profile> {
        Ok(self.pick(round).clone())
    }
}
