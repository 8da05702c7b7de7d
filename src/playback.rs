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

use tracing::{debug, warn};

use crate::audio::Output;
use crate::bank::LoadedSound;

/// Clamps a gain into [0, 1], treating NaN as silence.
fn clamp_gain(gain: f32) -> f32 {
    if gain.is_nan() {
        0.0
    } else {
        gain.clamp(0.0, 1.0)
    }
}

/// Plays sounds through the session's single shared output.
///
/// Without an output the session is in silent mode and every play is a no-op.
#[derive(Clone)]
pub struct Playback {
    output: Option<Arc<dyn Output>>,
    /// Scales every voice, e.g. down for headphones.
    output_gain: f32,
}

impl Playback {
    pub fn new(output: Arc<dyn Output>) -> Playback {
        Playback {
            output: Some(output),
            output_gain: 1.0,
        }
    }

    /// A playback engine with no output.
    pub fn silent() -> Playback {
        Playback {
            output: None,
            output_gain: 1.0,
        }
    }

    pub fn output_gain(&self) -> f32 {
        self.output_gain
    }

    /// Sets the gain applied on top of each play's own gain. Clamped into [0, 1].
    pub fn set_output_gain(&mut self, gain: f32) {
        self.output_gain = clamp_gain(gain);
    }

    pub fn is_silent(&self) -> bool {
        self.output.is_none()
    }

    /// The output sample rate, if there is an output.
    pub fn sample_rate(&self) -> Option<u32> {
        self.output.as_ref().map(|output| output.sample_rate())
    }

    /// Starts one independent voice of the sound. Returns true if a voice was started.
    ///
    /// Gain is clamped into [0, 1] and scaled by the output gain. Missing sounds,
    /// silent mode and output failures all result in no sound; failures are logged.
    pub fn play(&self, sound: Option<&LoadedSound>, gain: f32) -> bool {
        let (Some(output), Some(sound)) = (self.output.as_ref(), sound) else {
            return false;
        };

        let gain = clamp_gain(gain) * self.output_gain;
        match output.play(sound, gain) {
            Ok(()) => {
                debug!(gain, "Voice started.");
                true
            }
            Err(e) => {
                warn!(err = %e, output = %output, "Unable to start voice");
                false
            }
        }
    }
}

impl fmt::Debug for Playback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.output {
            Some(output) => write!(f, "Playback({})", output),
            None => write!(f, "Playback(silent)"),
        }
    }
}
