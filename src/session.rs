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
use std::fmt;
use std::sync::Arc;

use crate::catalog::Catalog;

/// The default output volume.
pub const DEFAULT_VOLUME: f32 = 0.5;

/// The user-facing state of a session: which profile is selected, whether clicks
/// are enabled, and how loud they are.
///
/// The current profile is always a valid catalog ID and the volume always lies
/// within [0, 1]. Every mutation goes through this type so those hold.
#[derive(Clone)]
pub struct Session {
    catalog: Arc<Catalog>,
    profile: String,
    enabled: bool,
    volume: f32,
}

impl Session {
    /// Creates a session with the default profile, disabled, at the default volume.
    pub fn new(catalog: Arc<Catalog>) -> Session {
        let profile = catalog.default_profile().id().to_string();
        Session {
            catalog,
            profile,
            enabled: false,
            volume: DEFAULT_VOLUME,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The currently selected profile ID.
    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Selects the given profile. Unknown IDs leave the session untouched and return false.
    pub fn set_profile(&mut self, id: &str) -> bool {
        if !self.catalog.contains(id) {
            return false;
        }
        self.profile = id.to_string();
        true
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Flips the enabled flag and returns the new value.
    pub fn toggle_enabled(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Sets the volume, clamped into [0, 1]. NaN is ignored and returns false.
    pub fn set_volume(&mut self, volume: f32) -> bool {
        if volume.is_nan() {
            return false;
        }
        self.volume = volume.clamp(0.0, 1.0);
        true
    }

    /// Advances to the next profile in catalog order, wrapping around. Returns the new ID.
    pub fn next_profile(&mut self) -> &str {
        if let Some(next) = self.catalog.next(&self.profile) {
            self.profile = next.id().to_string();
        }
        &self.profile
    }

    /// Moves to the previous profile in catalog order, wrapping around. Returns the new ID.
    pub fn previous_profile(&mut self) -> &str {
        if let Some(previous) = self.catalog.previous(&self.profile) {
            self.profile = previous.id().to_string();
        }
        &self.profile
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("profile", &self.profile)
            .field("enabled", &self.enabled)
            .field("volume", &self.volume)
            .finish()
    }
}
