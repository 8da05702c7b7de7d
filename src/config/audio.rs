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
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::mixer::DEFAULT_MAX_VOICES;
use crate::audio::route::Route;

/// The sample rate used when neither the configuration nor a device dictates one.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// The device name that selects the host's default output.
pub const DEFAULT_DEVICE: &str = "default";

/// A YAML representation of the audio configuration.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Audio {
    /// The audio device. "default" picks the host's default output.
    device: String,

    /// Stream sample rate in Hz. Defaults to the device's native rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sample_rate: Option<u32>,

    /// Fixed stream buffer size in frames. Defaults to the backend's choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    buffer_size: Option<u32>,

    /// How many clicks may sound at once (default: 32).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_voices: Option<usize>,

    /// Scales clicks by whether the output goes to speakers or headphones. Off when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    route_gain: Option<RouteGain>,
}

/// The smallest allowed route polling interval.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn default_speakers() -> f32 {
    0.8
}

fn default_headphones() -> f32 {
    0.1
}

fn default_poll_interval_ms() -> u64 {
    5000
}

/// Output gain per route, applied on top of the session volume.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct RouteGain {
    #[serde(default = "default_speakers")]
    speakers: f32,
    #[serde(default = "default_headphones")]
    headphones: f32,
    /// How often to check for headphones.
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
}

impl RouteGain {
    /// The gain for the route, clamped into [0, 1].
    pub fn gain(&self, route: Route) -> f32 {
        let gain = match route {
            Route::Speakers => self.speakers,
            Route::Headphones => self.headphones,
        };
        if gain.is_nan() {
            1.0
        } else {
            gain.clamp(0.0, 1.0)
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms).max(MIN_POLL_INTERVAL)
    }
}

impl Default for RouteGain {
    fn default() -> Self {
        RouteGain {
            speakers: default_speakers(),
            headphones: default_headphones(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Audio {
    /// New will create a new Audio configuration.
    pub fn new(device: &str) -> Audio {
        Audio {
            device: device.to_string(),
            sample_rate: None,
            buffer_size: None,
            max_voices: None,
            route_gain: None,
        }
    }

    /// Returns the device from the configuration.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Returns the configured sample rate, if any.
    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    /// Returns the configured sample rate or 44100.
    pub fn sample_rate_or_default(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    pub fn buffer_size(&self) -> Option<u32> {
        self.buffer_size
    }

    /// Returns the voice cap, never less than one.
    pub fn max_voices(&self) -> usize {
        self.max_voices.unwrap_or(DEFAULT_MAX_VOICES).max(1)
    }

    pub fn route_gain(&self) -> Option<&RouteGain> {
        self.route_gain.as_ref()
    }
}

impl Default for Audio {
    fn default() -> Self {
        Audio::new(DEFAULT_DEVICE)
    }
}
