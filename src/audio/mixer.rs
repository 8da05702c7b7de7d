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
// Core voice mixing logic that can be used by both CPAL and test implementations
use std::collections::VecDeque;
use std::sync::Arc;

use crate::bank::LoadedSound;

/// Default maximum number of simultaneous voices.
pub const DEFAULT_MAX_VOICES: usize = 32;

/// One playing instance of a sound.
#[derive(Clone)]
pub struct Voice {
    /// Shared interleaved sample data.
    data: Arc<Vec<f32>>,
    /// Number of channels in the data.
    channels: usize,
    /// Next frame to play.
    position: usize,
    /// Gain applied to every sample of this voice.
    gain: f32,
}

impl Voice {
    /// Creates a voice for the given sound. Gain is clamped into [0, 1].
    pub fn new(sound: &LoadedSound, gain: f32) -> Voice {
        Voice {
            data: sound.data().clone(),
            channels: sound.channel_count().max(1) as usize,
            position: 0,
            gain: if gain.is_nan() { 0.0 } else { gain.clamp(0.0, 1.0) },
        }
    }

    fn frames(&self) -> usize {
        self.data.len() / self.channels
    }

    fn is_finished(&self) -> bool {
        self.position >= self.frames()
    }

    /// Adds this voice's next frame into the output frame and advances.
    #[inline]
    fn mix_frame(&mut self, frame: &mut [f32]) {
        let base = self.position * self.channels;
        for (output_channel, out) in frame.iter_mut().enumerate() {
            let source_channel = output_channel % self.channels;
            *out += self.data[base + source_channel] * self.gain;
        }
        self.position += 1;
    }
}

/// Sums all live voices into interleaved output frames.
///
/// The mixer is owned by the audio callback, so it needs no locking.
pub struct Mixer {
    voices: VecDeque<Voice>,
    num_channels: u16,
    max_voices: usize,
}

impl Mixer {
    /// Creates a new mixer.
    pub fn new(num_channels: u16, max_voices: usize) -> Self {
        Self {
            voices: VecDeque::with_capacity(max_voices.max(1)),
            num_channels: num_channels.max(1),
            max_voices: max_voices.max(1),
        }
    }

    /// Adds a voice, dropping the oldest voice when the cap is reached.
    pub fn add_voice(&mut self, voice: Voice) {
        if voice.is_finished() {
            return;
        }
        while self.voices.len() >= self.max_voices {
            self.voices.pop_front();
        }
        self.voices.push_back(voice);
    }

    /// Number of voices still playing.
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Mixes as many whole frames as fit into the interleaved output buffer.
    /// Samples past the last whole frame are zeroed.
    pub fn process_into(&mut self, output: &mut [f32]) {
        output.fill(0.0);
        let channels = self.num_channels as usize;

        for frame in output.chunks_exact_mut(channels) {
            if self.voices.is_empty() {
                break;
            }
            for voice in self.voices.iter_mut() {
                voice.mix_frame(frame);
            }
            self.voices.retain(|voice| !voice.is_finished());
            for sample in frame.iter_mut() {
                *sample = sample.clamp(-1.0, 1.0);
            }
        }
    }

    /// Processes the given number of frames and returns them.
    pub fn process_frames(&mut self, num_frames: usize) -> Vec<f32> {
        let mut frames = vec![0.0f32; num_frames * self.num_channels as usize];
        self.process_into(&mut frames);
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sound(samples: Vec<f32>, channels: u16) -> LoadedSound {
        LoadedSound::new(samples, channels, 44100)
    }

    #[test]
    fn test_mono_to_all_channels() {
        let mut mixer = Mixer::new(2, DEFAULT_MAX_VOICES);
        mixer.add_voice(Voice::new(&sound(vec![0.5, 0.25], 1), 1.0));

        let frames = mixer.process_frames(3);
        assert_eq!(vec![0.5, 0.5, 0.25, 0.25, 0.0, 0.0], frames);
        assert_eq!(0, mixer.active_voices());
    }

    #[test]
    fn test_overlapping_voices_sum() {
        let mut mixer = Mixer::new(2, DEFAULT_MAX_VOICES);
        mixer.add_voice(Voice::new(&sound(vec![0.5, 0.375], 2), 1.0));
        mixer.add_voice(Voice::new(&sound(vec![0.25, 0.125], 2), 1.0));

        let frame = mixer.process_frames(1);
        assert_eq!(vec![0.75, 0.5], frame);
    }

    #[test]
    fn test_per_voice_gain() {
        let mut mixer = Mixer::new(1, DEFAULT_MAX_VOICES);
        mixer.add_voice(Voice::new(&sound(vec![0.5, 0.5], 1), 0.5));
        mixer.add_voice(Voice::new(&sound(vec![0.5, 0.5], 1), 0.0));
        mixer.add_voice(Voice::new(&sound(vec![0.5], 1), 2.0));

        assert_eq!(vec![0.75, 0.25], mixer.process_frames(2));
    }

    #[test]
    fn test_hard_clip() {
        let mut mixer = Mixer::new(1, DEFAULT_MAX_VOICES);
        for _ in 0..3 {
            mixer.add_voice(Voice::new(&sound(vec![0.9, -0.9], 1), 1.0));
        }
        assert_eq!(vec![1.0, -1.0], mixer.process_frames(2));
    }

    #[test]
    fn test_source_channels_wrap() {
        let mut mixer = Mixer::new(4, DEFAULT_MAX_VOICES);
        mixer.add_voice(Voice::new(&sound(vec![0.1, 0.2], 2), 1.0));
        assert_eq!(vec![0.1, 0.2, 0.1, 0.2], mixer.process_frames(1));
    }

    #[test]
    fn test_finished_voices_dropped() {
        let mut mixer = Mixer::new(1, DEFAULT_MAX_VOICES);
        mixer.add_voice(Voice::new(&sound(vec![0.1], 1), 1.0));
        mixer.add_voice(Voice::new(&sound(vec![0.1, 0.1, 0.1], 1), 1.0));

        mixer.process_frames(1);
        assert_eq!(1, mixer.active_voices());
        mixer.process_frames(2);
        assert_eq!(0, mixer.active_voices());
    }

    #[test]
    fn test_voice_cap_drops_oldest() {
        let mut mixer = Mixer::new(1, 2);
        mixer.add_voice(Voice::new(&sound(vec![0.5; 4], 1), 1.0));
        mixer.add_voice(Voice::new(&sound(vec![0.25; 4], 1), 1.0));
        mixer.add_voice(Voice::new(&sound(vec![0.125; 4], 1), 1.0));

        assert_eq!(2, mixer.active_voices());
        assert_eq!(vec![0.375], mixer.process_frames(1));
    }
}
