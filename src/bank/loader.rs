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

//! Sound loading for click playback.
//!
//! Sounds are decoded entirely into memory at startup so a keystroke never waits on I/O.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::assets::{AssetError, AssetSource};
use super::decoder;

/// A decoded sound that can be played back any number of times.
/// The sample data is stored in an Arc so voices share it without copying.
#[derive(Clone, PartialEq)]
pub struct LoadedSound {
    /// Interleaved f32 samples.
    data: Arc<Vec<f32>>,
    channel_count: u16,
    sample_rate: u32,
}

impl LoadedSound {
    /// Creates a sound from interleaved samples.
    pub fn new(data: Vec<f32>, channel_count: u16, sample_rate: u32) -> LoadedSound {
        LoadedSound {
            data: Arc::new(data),
            channel_count: channel_count.max(1),
            sample_rate,
        }
    }

    pub fn data(&self) -> &Arc<Vec<f32>> {
        &self.data
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.data.len() / self.channel_count as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Returns the memory size in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }
}

impl std::fmt::Debug for LoadedSound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedSound")
            .field("channels", &self.channel_count)
            .field("sample_rate", &self.sample_rate)
            .field("frames", &self.frames())
            .finish()
    }
}

/// Loads sounds and brings them to the output sample rate.
#[derive(Debug, Clone, Copy)]
pub struct SoundLoader {
    /// Target sample rate for transcoding (matches audio output).
    target_sample_rate: u32,
}

impl SoundLoader {
    pub fn new(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }

    /// Fetches and decodes a single asset.
    pub fn load(&self, assets: &dyn AssetSource, asset: &str) -> Result<LoadedSound, AssetError> {
        debug!(asset, source = %assets, "Fetching sound");
        let bytes = assets.fetch(asset)?;

        let extension = Path::new(asset).extension().and_then(|ext| ext.to_str());
        let decoded = decoder::decode(bytes, extension).map_err(|e| AssetError::Decode {
            asset: asset.to_string(),
            source: e,
        })?;

        let channel_count = decoded.channels;
        let (samples, sample_rate) = if decoded.sample_rate != self.target_sample_rate {
            debug!(
                asset,
                source_rate = decoded.sample_rate,
                target_rate = self.target_sample_rate,
                "Transcoding sound"
            );
            (
                transcode_samples(
                    &decoded.samples,
                    channel_count,
                    decoded.sample_rate,
                    self.target_sample_rate,
                ),
                self.target_sample_rate,
            )
        } else {
            (decoded.samples, decoded.sample_rate)
        };

        let loaded = LoadedSound::new(samples, channel_count, sample_rate);
        info!(
            asset,
            channels = channel_count,
            sample_rate,
            duration_ms = loaded.duration().as_millis(),
            memory_kb = loaded.memory_size() / 1024,
            "Sound loaded"
        );
        Ok(loaded)
    }
}

/// Transcodes samples from one sample rate to another using linear interpolation,
/// which is plenty for short one-shot clicks.
pub(crate) fn transcode_samples(
    samples: &[f32],
    channel_count: u16,
    source_rate: u32,
    target_rate: u32,
) -> Vec<f32> {
    let channels = channel_count.max(1) as usize;
    if source_rate == 0 || target_rate == 0 || source_rate == target_rate {
        return samples.to_vec();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let source_frames = samples.len() / channels;
    let target_frames = (source_frames as f64 * ratio).ceil() as usize;

    let mut output = Vec::with_capacity(target_frames * channels);
    for target_frame in 0..target_frames {
        let source_pos = target_frame as f64 / ratio;
        let source_frame = source_pos.floor() as usize;
        let frac = source_pos.fract() as f32;

        for channel in 0..channels {
            let idx0 = source_frame * channels + channel;
            let idx1 = (source_frame + 1) * channels + channel;

            let s0 = samples.get(idx0).copied().unwrap_or(0.0);
            let s1 = samples.get(idx1).copied().unwrap_or(s0);
            output.push(s0 + (s1 - s0) * frac);
        }
    }

    output
}
