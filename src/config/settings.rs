// Copyright (C) 2024 Michael Wilson <mike@mdwn.dev>
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
use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::audio::Audio;
use super::controller::Controller;
use super::error::ConfigError;
use super::hotkeys::Hotkeys;
use crate::catalog::DEFAULT_PROFILE;
use crate::dispatcher;
use crate::session::{Session, DEFAULT_VOLUME};

const DEFAULT_ASSETS: &str = "assets";

fn default_assets() -> String {
    DEFAULT_ASSETS.to_string()
}

/// The configuration for kebord.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Settings {
    /// The audio output.
    #[serde(default)]
    audio: Audio,
    /// The directory holding the sound files. Relative paths are resolved against
    /// the configuration file's directory.
    #[serde(default = "default_assets")]
    assets: String,
    /// Where key events come from.
    #[serde(default)]
    controller: Controller,
    /// The profile to start with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile: Option<String>,
    /// Whether clicks start enabled.
    #[serde(default)]
    enabled: bool,
    /// The starting volume in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    volume: Option<f32>,
    #[serde(default)]
    hotkeys: Hotkeys,
}

impl Settings {
    /// Parse the settings from a YAML file.
    pub fn deserialize(path: &Path) -> Result<Settings, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    pub fn audio(&self) -> &Audio {
        &self.audio
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// The control hotkeys, with unset chords taken from the controller's defaults.
    ///
    /// A controller that sees keys typed into other applications refuses chords
    /// that fire while typing, since it can't keep them from reaching the application.
    pub fn hotkeys(&self) -> Result<dispatcher::Hotkeys, ConfigError> {
        let hotkeys = self
            .hotkeys
            .to_hotkeys(self.controller.default_hotkeys())?;
        if self.controller.sees_typing() {
            if let Some(chord) = hotkeys.typing_chord() {
                return Err(ConfigError::TypingHotkey(chord.to_string()));
            }
        }
        Ok(hotkeys)
    }

    /// The asset directory, resolved against the given base directory.
    pub fn assets(&self, base: &Path) -> PathBuf {
        let assets = PathBuf::from(&self.assets);
        if assets.is_absolute() {
            assets
        } else {
            base.join(assets)
        }
    }

    /// Applies the starting profile, enabled flag and volume to the session.
    /// Values the session rejects are logged and skipped.
    pub fn apply(&self, session: &mut Session) {
        if let Some(profile) = &self.profile {
            if !session.set_profile(profile) {
                warn!(profile, "Unknown profile in configuration, using the default");
            }
        }
        session.set_enabled(self.enabled);
        if let Some(volume) = self.volume {
            if !session.set_volume(volume) {
                warn!(volume, "Invalid volume in configuration, using the default");
            }
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        let controller = Controller::default();
        Settings {
            audio: Audio::default(),
            assets: default_assets(),
            hotkeys: Hotkeys::from(&controller.default_hotkeys()),
            controller,
            profile: Some(DEFAULT_PROFILE.to_string()),
            enabled: false,
            volume: Some(DEFAULT_VOLUME),
        }
    }
}
