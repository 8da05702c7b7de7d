// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! The sound bank: one decoded buffer (or nothing) per catalog entry.
//!
//! Every entry is loaded concurrently on the blocking pool. A failed entry only
//! leaves its own slot empty; an empty slot means the profile plays silently.

use std::fmt;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{info, span, warn, Instrument, Level};

use crate::catalog::Catalog;

pub mod assets;
pub mod decoder;
pub mod loader;

pub use assets::{AssetError, AssetSource, DirectoryAssets, MemoryAssets};
pub use loader::{LoadedSound, SoundLoader};

/// Decoded sounds in catalog order.
#[derive(Clone)]
pub struct SoundBank {
    catalog: Arc<Catalog>,
    slots: Vec<Option<LoadedSound>>,
}

impl SoundBank {
    /// A bank with every slot empty.
    pub fn empty(catalog: Arc<Catalog>) -> SoundBank {
        let slots = vec![None; catalog.len()];
        SoundBank { catalog, slots }
    }

    /// Stores a sound for the given profile. Unknown profiles are ignored.
    pub fn insert(&mut self, id: &str, sound: LoadedSound) {
        if let Some(index) = self.catalog.index_of(id) {
            self.slots[index] = Some(sound);
        }
    }

    /// The sound for the given profile, if it loaded.
    pub fn get(&self, id: &str) -> Option<&LoadedSound> {
        self.catalog
            .index_of(id)
            .and_then(|index| self.slots[index].as_ref())
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of slots holding a sound.
    pub fn loaded(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Number of slots, loaded or not.
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over (profile ID, sound) in catalog order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, Option<&LoadedSound>)> {
        self.catalog
            .profiles()
            .iter()
            .zip(self.slots.iter())
            .map(|(profile, slot)| (profile.id(), slot.as_ref()))
    }
}

impl fmt::Debug for SoundBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundBank")
            .field("loaded", &self.loaded())
            .field("total", &self.total())
            .finish()
    }
}

/// The outcome of loading a bank.
#[derive(Debug)]
pub struct LoadReport {
    pub bank: SoundBank,
    /// Per-profile failures, in catalog order.
    pub failures: Vec<(String, AssetError)>,
}

impl LoadReport {
    pub fn loaded(&self) -> usize {
        self.bank.loaded()
    }

    pub fn total(&self) -> usize {
        self.bank.total()
    }
}

/// Loads every catalog entry from the asset source, decoding to the target sample rate.
///
/// Completes once every entry has either loaded or failed. Never fails as a whole.
pub async fn load(
    catalog: Arc<Catalog>,
    assets: Arc<dyn AssetSource>,
    target_sample_rate: u32,
) -> LoadReport {
    let span = span!(Level::INFO, "load sound bank", source = %assets);

    async move {
        let mut bank = SoundBank::empty(catalog.clone());
        let mut failures = Vec::new();

        if !assets.is_available() {
            warn!(
                source = %assets,
                "Asset source is unavailable, no sounds will be loaded."
            );
            for profile in catalog.profiles() {
                failures.push((
                    profile.id().to_string(),
                    AssetError::NotFound(profile.asset().to_string()),
                ));
            }
            return LoadReport { bank, failures };
        }

        let loader = SoundLoader::new(target_sample_rate);
        let jobs = catalog.profiles().iter().map(|profile| {
            let assets = assets.clone();
            let asset = profile.asset().to_string();
            tokio::task::spawn_blocking(move || loader.load(assets.as_ref(), &asset))
        });
        let results = join_all(jobs).await;

        for (profile, result) in catalog.profiles().iter().zip(results) {
            let result = result.unwrap_or_else(|e| {
                Err(AssetError::Interrupted {
                    asset: profile.asset().to_string(),
                    reason: e.to_string(),
                })
            });
            match result {
                Ok(sound) => bank.insert(profile.id(), sound),
                Err(e) => {
                    warn!(profile = profile.id(), err = %e, "Unable to load sound");
                    failures.push((profile.id().to_string(), e));
                }
            }
        }

        info!(
            loaded = bank.loaded(),
            total = bank.total(),
            "Sound bank loaded."
        );
        LoadReport { bank, failures }
    }
    .instrument(span)
    .await
}
