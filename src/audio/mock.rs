// Copyright (C) 2025 Michael Wilson <mike@mdwn.dev>
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
use std::{error::Error, fmt, sync::Arc};

use parking_lot::Mutex;
use tracing::debug;

use crate::bank::LoadedSound;

/// A single recorded play call.
#[derive(Debug, Clone, PartialEq)]
pub struct Play {
    pub frames: usize,
    pub channels: u16,
    pub gain: f32,
}

/// A mock output. Doesn't actually play anything, but records every voice it was handed.
#[derive(Clone)]
pub struct Output {
    name: String,
    sample_rate: u32,
    plays: Arc<Mutex<Vec<Play>>>,
}

impl Output {
    /// Gets the given mock output.
    pub fn get(name: &str, sample_rate: u32) -> Output {
        Output {
            name: name.to_string(),
            sample_rate,
            plays: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns every play call recorded so far.
    pub fn plays(&self) -> Vec<Play> {
        self.plays.lock().clone()
    }

    pub fn play_count(&self) -> usize {
        self.plays.lock().len()
    }
}

impl crate::audio::Output for Output {
    fn play(&self, sound: &LoadedSound, gain: f32) -> Result<(), Box<dyn Error>> {
        let play = Play {
            frames: sound.frames(),
            channels: sound.channel_count(),
            gain: gain.clamp(0.0, 1.0),
        };
        debug!(output = self.name, gain = play.gain, "Playing voice (mock).");
        self.plays.lock().push(play);
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
