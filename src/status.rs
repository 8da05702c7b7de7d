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

//! What the engine tells the presentation layer.

use std::fmt;

use crate::audio::route::Route;
use crate::util::percent;

/// One-shot messages about things that happened in the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The bank finished loading. Zero loaded means the session stays silent.
    AssetsReady { loaded: usize, total: usize },

    /// No audio output could be opened; the session runs silently.
    AudioUnavailable { reason: String },

    ProfileChanged { id: String, label: String },

    EnabledChanged(bool),

    VolumeChanged(f32),

    /// A test play was requested for a profile whose sound did not load.
    SoundUnavailable { id: String },

    /// The output moved between speakers and headphones and clicks now play at `gain`.
    RouteChanged { route: Route, gain: f32 },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::AssetsReady { loaded: 0, .. } => {
                write!(f, "No sound files found, running silently")
            }
            Notification::AssetsReady { loaded, total } => {
                write!(f, "Audio ready: loaded {}/{} sounds", loaded, total)
            }
            Notification::AudioUnavailable { reason } => {
                write!(f, "Audio unavailable: {}", reason)
            }
            Notification::ProfileChanged { id, label } => {
                write!(f, "Switched to {}: {}", id, label)
            }
            Notification::EnabledChanged(true) => write!(f, "Keyboard sounds enabled"),
            Notification::EnabledChanged(false) => write!(f, "Keyboard sounds disabled"),
            Notification::VolumeChanged(volume) => write!(f, "Volume {}", percent(*volume)),
            Notification::SoundUnavailable { id } => {
                write!(f, "Sound not available for {}", id)
            }
            Notification::RouteChanged { route, gain } => {
                write!(f, "Output on {}, clicks at {}", route, percent(*gain))
            }
        }
    }
}

/// Whether the bank has finished loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankStatus {
    Loading,
    Ready { loaded: usize, total: usize },
}

/// A snapshot of the session, republished after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub profile: String,
    pub enabled: bool,
    pub volume: f32,
    pub bank: BankStatus,
    /// True when there is no audio output.
    pub silent: bool,
    /// The detected output route, when route gain is on.
    pub route: Option<Route>,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "profile={} enabled={} volume={:.2}",
            self.profile, self.enabled, self.volume
        )?;
        match self.bank {
            BankStatus::Loading => write!(f, " bank=loading")?,
            BankStatus::Ready { loaded, total } => write!(f, " bank={}/{}", loaded, total)?,
        }
        if let Some(route) = self.route {
            write!(f, " route={}", route)?;
        }
        if self.silent {
            write!(f, " (silent)")?;
        }
        Ok(())
    }
}
