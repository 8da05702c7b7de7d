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

//! The fixed catalog of sound profiles.
//!
//! The order of the catalog matters: hotkey profile switching walks it circularly.

use std::error::Error;
use std::fmt;

/// The profile selected when nothing else is requested.
pub const DEFAULT_PROFILE: &str = "blue";

/// The family a sound profile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Classic,
    Mechanical,
    Vintage,
    Special,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Classic => "Classic",
            Category::Mechanical => "Mechanical",
            Category::Vintage => "Vintage",
            Category::Special => "Special",
        };
        write!(f, "{}", name)
    }
}

/// A named sound configuration backed by one audio asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundProfile {
    id: String,
    label: String,
    category: Category,
    asset: String,
}

impl SoundProfile {
    pub fn new(id: &str, label: &str, category: Category, asset: &str) -> SoundProfile {
        SoundProfile {
            id: id.to_string(),
            label: label.to_string(),
            category,
            asset: asset.to_string(),
        }
    }

    /// The unique profile ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The human readable description.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// The file name of the backing audio asset.
    pub fn asset(&self) -> &str {
        &self.asset
    }
}

impl fmt::Display for SoundProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.id, self.category, self.label)
    }
}

/// The built-in profiles as (id, label, category).
const BUILTIN: [(&str, &str, Category); 16] = [
    ("blue", "Cherry MX Blue style - Sharp, clicky", Category::Classic),
    ("brown", "Cherry MX Brown style - Tactile bump", Category::Classic),
    ("red", "Cherry MX Red style - Linear, quiet", Category::Classic),
    ("mechanical", "Heavy mechanical - Loud, satisfying", Category::Mechanical),
    ("creamy", "Lubed switches - Smooth, premium", Category::Mechanical),
    ("dry", "Unlubricated - Scratchy, raw", Category::Mechanical),
    ("thock", "Topre-style - Deep, muffled", Category::Mechanical),
    ("clicky", "Box Jade/Navy - Extra clicky", Category::Mechanical),
    ("silent", "Dampened switches - Quiet, subtle", Category::Mechanical),
    ("tactile", "Pronounced bump - Sharp tactile", Category::Mechanical),
    ("hard", "Extremely aggressive - Metal-on-metal violence", Category::Mechanical),
    ("typewriter", "Vintage typewriter - Metallic, classic", Category::Vintage),
    ("lofi", "Chill, warm - Nostalgic, soft", Category::Vintage),
    ("gx_feryn", "Gaming optimized - Smooth, precise", Category::Special),
    ("lee_sin", "Martial arts inspired - Sharp, precise strikes", Category::Special),
    ("hacker", "Retro terminal - Matrix-like, digital", Category::Special),
];

/// The asset file name used for a profile ID.
pub fn asset_file_name(id: &str) -> String {
    format!("keyboard_{}.wav", id)
}

/// An ordered, immutable list of sound profiles with unique IDs.
#[derive(Debug, Clone)]
pub struct Catalog {
    profiles: Vec<SoundProfile>,
}

impl Catalog {
    /// Creates a catalog from the given profiles. The list must be non-empty and the IDs unique.
    pub fn new(profiles: Vec<SoundProfile>) -> Result<Catalog, Box<dyn Error>> {
        if profiles.is_empty() {
            return Err("a catalog needs at least one profile".into());
        }
        for (i, profile) in profiles.iter().enumerate() {
            if profiles[..i].iter().any(|p| p.id == profile.id) {
                return Err(format!("duplicate profile id {}", profile.id).into());
            }
        }
        Ok(Catalog { profiles })
    }

    /// The sixteen built-in profiles.
    pub fn builtin() -> Catalog {
        Catalog {
            profiles: BUILTIN
                .iter()
                .map(|(id, label, category)| {
                    SoundProfile::new(id, label, *category, &asset_file_name(id))
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn profiles(&self) -> &[SoundProfile] {
        &self.profiles
    }

    /// Returns the position of the profile with the given ID.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.profiles.iter().position(|p| p.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&SoundProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    /// The first profile in catalog order.
    pub fn first(&self) -> &SoundProfile {
        &self.profiles[0]
    }

    /// The profile after the given one, wrapping from the last to the first.
    pub fn next(&self, id: &str) -> Option<&SoundProfile> {
        let index = self.index_of(id)?;
        Some(&self.profiles[(index + 1) % self.profiles.len()])
    }

    /// The profile before the given one, wrapping from the first to the last.
    pub fn previous(&self, id: &str) -> Option<&SoundProfile> {
        let index = self.index_of(id)?;
        let len = self.profiles.len();
        Some(&self.profiles[(index + len - 1) % len])
    }

    /// The default profile, falling back to the first entry when the default is absent.
    pub fn default_profile(&self) -> &SoundProfile {
        self.get(DEFAULT_PROFILE).unwrap_or_else(|| self.first())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::builtin()
    }
}

#[cfg(test)]
pub(crate) fn test_catalog(ids: &[&str]) -> Catalog {
    Catalog::new(
        ids.iter()
            .map(|id| SoundProfile::new(id, id, Category::Special, &asset_file_name(id)))
            .collect(),
    )
    .expect("valid test catalog")
}
