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

//! Offline synthesis of the profile sounds.
//!
//! Every profile has a recipe built from exponentially decaying sines, noise and
//! gating windows. The frequencies of the physical components are jittered a little
//! on every run so regenerated sets don't sound identical.

use std::f32::consts::TAU;
use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use rand::Rng;
use tracing::{debug, info};

use crate::catalog::{Catalog, SoundProfile};

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_DURATION: f32 = 0.15;
pub const DEFAULT_FREQUENCY: f32 = 800.0;

/// Peak level after normalization, before the soft clip.
const PEAK: f32 = 0.7;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("no recipe for profile {0}")]
    UnknownProfile(String),

    #[error("duration must be positive, got {0}")]
    InvalidDuration(f32),

    #[error("frequency must be positive, got {0}")]
    InvalidFrequency(f32),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wav(#[from] hound::Error),
}

/// Random sources for the recipes.
struct Noise<'a, R: Rng> {
    rng: &'a mut R,
}

impl<R: Rng> Noise<'_, R> {
    /// A gaussian sample via the Box-Muller transform.
    fn normal(&mut self, mean: f32, std_dev: f32) -> f32 {
        // 1 - [0, 1) keeps ln away from zero.
        let u1: f32 = 1.0 - self.rng.gen::<f32>();
        let u2: f32 = self.rng.gen();
        mean + std_dev * (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
    }

    fn uniform(&mut self, amplitude: f32) -> f32 {
        self.rng.gen_range(-amplitude..=amplitude)
    }

    /// One of -step, 0 or step.
    fn step(&mut self, step: f32) -> f32 {
        match self.rng.gen_range(0..3) {
            0 => -step,
            1 => 0.0,
            _ => step,
        }
    }
}

fn sine(hz: f32, t: f32) -> f32 {
    (TAU * hz * t).sin()
}

fn decay(rate: f32, t: f32) -> f32 {
    (-t * rate).exp()
}

/// A decay with a soft attack.
fn swell(decay_rate: f32, attack_rate: f32, t: f32) -> f32 {
    decay(decay_rate, t) * (1.0 - decay(attack_rate, t))
}

/// 1 before the end of the window, 0 after.
fn before(end: f32, t: f32) -> f32 {
    if t < end {
        1.0
    } else {
        0.0
    }
}

/// 1 strictly inside the window, 0 outside.
fn between(start: f32, end: f32, t: f32) -> f32 {
    if t > start && t < end {
        1.0
    } else {
        0.0
    }
}

/// Renders sound sample by sample.
struct Render<'a, R: Rng> {
    sample_rate: f32,
    frames: usize,
    noise: Noise<'a, R>,
}

impl<R: Rng> Render<'_, R> {
    fn samples<F>(&mut self, mut f: F) -> Vec<f32>
    where
        F: FnMut(f32, &mut Noise<'_, R>) -> f32,
    {
        (0..self.frames)
            .map(|i| f(i as f32 / self.sample_rate, &mut self.noise))
            .collect()
    }
}

/// Synthesizes click sounds.
#[derive(Debug, Clone, Copy)]
pub struct Generator {
    sample_rate: u32,
    duration: f32,
    frequency: f32,
}

impl Default for Generator {
    fn default() -> Self {
        Generator {
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration: DEFAULT_DURATION,
            frequency: DEFAULT_FREQUENCY,
        }
    }
}

impl Generator {
    /// Creates a generator. Duration is in seconds, frequency is the base frequency
    /// used by the tonal recipes.
    pub fn new(
        sample_rate: u32,
        duration: f32,
        frequency: f32,
    ) -> Result<Generator, GenerateError> {
        if duration.is_nan() || duration <= 0.0 {
            return Err(GenerateError::InvalidDuration(duration));
        }
        if frequency.is_nan() || frequency <= 0.0 {
            return Err(GenerateError::InvalidFrequency(frequency));
        }
        Ok(Generator {
            sample_rate,
            duration,
            frequency,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        (self.sample_rate as f32 * self.duration) as usize
    }

    /// Synthesizes the sound for a profile, normalized and soft clipped.
    pub fn synthesize<R: Rng>(&self, id: &str, rng: &mut R) -> Result<Vec<f32>, GenerateError> {
        let mut sound = self.raw(id, rng)?;

        let peak = sound.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
        if peak > 0.0 {
            sound.iter_mut().for_each(|s| *s = *s / peak * PEAK);
        }
        sound.iter_mut().for_each(|s| *s = (*s * 1.2).tanh() * 0.8);

        Ok(sound)
    }

    fn raw<R: Rng>(&self, id: &str, rng: &mut R) -> Result<Vec<f32>, GenerateError> {
        let f = self.frequency;
        let mut render = Render {
            sample_rate: self.sample_rate as f32,
            frames: self.frames(),
            noise: Noise { rng },
        };

        let sound = match id {
            "blue" => {
                let impact = render.noise.normal(2000.0, 200.0);
                let spring = render.noise.normal(800.0, 50.0);
                let housing = render.noise.normal(300.0, 30.0);
                render.samples(|t, noise| {
                    0.6 * decay(80.0, t) * sine(impact, t) * before(0.005, t)
                        + 0.8 * decay(40.0, t) * sine(spring, t) * before(0.01, t)
                        + 0.3 * decay(12.0, t) * sine(housing, t)
                        + 0.2 * noise.normal(0.0, 0.1) * decay(25.0, t) * before(0.02, t)
                })
            }
            "brown" => {
                let bump = render.noise.normal(1200.0, 100.0);
                let slide = render.noise.normal(600.0, 40.0);
                let bottom = render.noise.normal(400.0, 50.0);
                render.samples(|t, noise| {
                    0.7 * decay(60.0, t) * sine(bump, t) * before(0.008, t)
                        + 0.4 * decay(20.0, t) * sine(slide, t)
                        + 0.5 * decay(30.0, t) * sine(bottom, t) * between(0.02, 0.035, t)
                        + 0.15 * noise.normal(0.0, 0.05) * decay(20.0, t)
                })
            }
            "red" => {
                let stem = render.noise.normal(500.0, 30.0);
                let bottom = render.noise.normal(350.0, 40.0);
                render.samples(|t, noise| {
                    0.4 * decay(15.0, t) * sine(stem, t)
                        + 0.6 * decay(40.0, t) * sine(bottom, t) * between(0.025, 0.04, t)
                        + 0.1 * noise.normal(0.0, 0.03) * decay(18.0, t)
                })
            }
            "mechanical" => {
                let spring = render.noise.normal(1800.0, 150.0);
                let metal = render.noise.normal(3000.0, 300.0);
                let keycap = render.noise.normal(800.0, 80.0);
                let plate = render.noise.normal(200.0, 20.0);
                render.samples(|t, noise| {
                    0.8 * decay(50.0, t) * sine(spring, t) * before(0.012, t)
                        + 0.4 * decay(100.0, t) * sine(metal, t) * before(0.003, t)
                        + 0.6 * decay(25.0, t) * sine(keycap, t)
                        + 0.3 * decay(8.0, t) * sine(plate, t)
                        + 0.3 * noise.normal(0.0, 0.15) * decay(30.0, t)
                })
            }
            "typewriter" => render.samples(|t, _| {
                sine(f * 0.5, t) * swell(20.0, 100.0, t) + 0.3 * sine(f * 4.0, t) * decay(50.0, t)
            }),
            "creamy" => render.samples(|t, _| {
                let envelope = swell(8.0, 20.0, t) * (1.0 + 0.1 * (t * 30.0).sin());
                (sine(f * 0.9, t) + 0.4 * sine(f * 1.5, t) + 0.2 * sine(f * 2.2, t)) * envelope
            }),
            "dry" => {
                let scratch = render.noise.normal(1500.0, 200.0);
                let impact = render.noise.normal(2500.0, 300.0);
                let rattle = render.noise.normal(700.0, 70.0);
                render.samples(|t, noise| {
                    0.6 * decay(35.0, t) * sine(scratch, t)
                        + 0.4 * noise.uniform(0.2) * decay(40.0, t)
                        + 0.3 * noise.uniform(0.1) * decay(25.0, t)
                        + 0.7 * decay(90.0, t) * sine(impact, t) * before(0.004, t)
                        + 0.4 * decay(20.0, t) * sine(rattle, t)
                })
            }
            "thock" => {
                let thock = render.noise.normal(250.0, 25.0);
                let dome = render.noise.normal(400.0, 30.0);
                let case = render.noise.normal(120.0, 15.0);
                let muffled = render.noise.normal(1000.0, 100.0);
                render.samples(|t, _| {
                    0.8 * decay(15.0, t) * sine(thock, t)
                        + 0.5 * decay(30.0, t) * sine(dome, t) * before(0.015, t)
                        + 0.6 * decay(5.0, t) * sine(case, t)
                        + 0.2 * decay(80.0, t) * sine(muffled, t) * before(0.005, t)
                })
            }
            "clicky" => render.samples(|t, _| {
                sine(f * 1.4, t) * swell(20.0, 80.0, t)
                    + 0.6 * sine(f * 4.0, t) * decay(100.0, t) * before(0.02, t)
                    + 0.4 * sine(f * 6.0, t) * decay(120.0, t) * before(0.015, t)
            }),
            "silent" => render.samples(|t, _| {
                let envelope = swell(12.0, 25.0, t);
                (sine(f * 0.7, t) + 0.1 * sine(f * 1.8, t)) * envelope * 0.5
            }),
            "tactile" => render.samples(|t, _| {
                let envelope = swell(10.0, 35.0, t);
                let bump = 1.0 + 0.8 * (-((t - 0.01) / 0.005).powi(2)).exp();
                sine(f * 0.85, t) * envelope * bump + 0.3 * sine(f * 2.3, t) * envelope
            }),
            "lofi" => render.samples(|t, _| {
                let envelope = swell(5.0, 12.0, t);
                let warm = sine(f * 0.6, t)
                    + 0.3 * sine(f * 1.2, t)
                    + 0.2 * sine(f * 0.8, t)
                    + 0.05 * sine(f * 0.3, t);
                // Tape saturation.
                (warm * envelope * 1.5).tanh() * 0.7
            }),
            "gx_feryn" => render.samples(|t, _| {
                let envelope = swell(10.0, 30.0, t);
                (sine(f, t) + 0.4 * sine(f * 2.1, t) + 0.2 * sine(f * 3.3, t)) * envelope
                    + 0.1 * sine(f * 5.0, t) * decay(50.0, t)
            }),
            "lee_sin" => render.samples(|t, _| {
                sine(f * 1.3, t) * swell(25.0, 100.0, t)
                    + 0.8 * sine(f * 4.0, t) * decay(80.0, t) * before(0.015, t)
                    + 0.2 * sine(f * 1.5, t) * decay(15.0, t) * between(0.02, f32::INFINITY, t)
            }),
            "hacker" => render.samples(|t, noise| {
                let envelope = swell(15.0, 45.0, t);
                (sine(f * 1.1, t) + 0.4 * sine(f * 2.7, t) + 0.3 * sine(f * 4.1, t)) * envelope
                    + noise.step(0.1) * envelope * 0.3
                    + 0.2 * sine(f * 6.0, t) * decay(60.0, t) * before(0.01, t)
            }),
            "hard" => {
                let impact = render.noise.normal(3500.0, 400.0);
                let spring = render.noise.normal(1200.0, 150.0);
                let bump = render.noise.normal(2000.0, 200.0);
                let bottom = render.noise.normal(800.0, 100.0);
                let plate = render.noise.normal(400.0, 50.0);
                let metal = render.noise.normal(4000.0, 500.0);
                let case = render.noise.normal(180.0, 20.0);
                render.samples(|t, noise| {
                    decay(120.0, t) * sine(impact, t) * before(0.003, t)
                        + 0.9 * decay(60.0, t) * sine(spring, t) * before(0.008, t)
                        + 0.8 * decay(80.0, t) * sine(bump, t) * before(0.006, t)
                        + 0.7 * decay(40.0, t) * sine(bottom, t) * between(0.015, 0.03, t)
                        + 0.6 * decay(20.0, t) * sine(plate, t)
                        + 0.5 * decay(100.0, t) * sine(metal, t) * before(0.004, t)
                        + 0.4 * noise.uniform(0.3) * decay(50.0, t)
                        + 0.5 * decay(12.0, t) * sine(case, t)
                })
            }
            _ => return Err(GenerateError::UnknownProfile(id.to_string())),
        };

        Ok(sound)
    }

    /// Writes a mono 16-bit WAV file of the given samples.
    pub fn write_wav(&self, path: &Path, sound: &[f32]) -> Result<(), GenerateError> {
        let mut writer = WavWriter::create(
            path,
            WavSpec {
                channels: 1,
                sample_rate: self.sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
        )?;
        for sample in sound {
            writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Synthesizes a profile and writes it into the directory under its asset name.
    pub fn generate(&self, profile: &SoundProfile, dir: &Path) -> Result<PathBuf, GenerateError> {
        fs::create_dir_all(dir)?;
        let sound = self.synthesize(profile.id(), &mut rand::thread_rng())?;
        let path = dir.join(profile.asset());
        self.write_wav(&path, &sound)?;
        debug!(profile = profile.id(), path = %path.display(), "Generated sound.");
        Ok(path)
    }

    /// Generates every profile in the catalog.
    pub fn generate_all(
        &self,
        catalog: &Catalog,
        dir: &Path,
    ) -> Result<Vec<PathBuf>, GenerateError> {
        let paths = catalog
            .profiles()
            .iter()
            .map(|profile| self.generate(profile, dir))
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            count = paths.len(),
            dir = %dir.display(),
            duration = self.duration,
            frequency = self.frequency,
            "Generated sounds."
        );
        Ok(paths)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::bank::{self, DirectoryAssets};

    #[test]
    fn test_every_profile_has_a_recipe() {
        let generator = Generator::default();
        let mut rng = StdRng::seed_from_u64(7);
        for profile in Catalog::builtin().profiles() {
            let sound = generator.synthesize(profile.id(), &mut rng).unwrap();
            assert_eq!(6615, sound.len(), "{}", profile.id());

            let peak = sound.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
            // tanh(0.7 * 1.2) * 0.8
            assert!((peak - 0.5486).abs() < 0.001, "{} peaks at {}", profile.id(), peak);
        }
    }

    #[test]
    fn test_unknown_profile() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            Generator::default().synthesize("kazoo", &mut rng),
            Err(GenerateError::UnknownProfile(_))
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Generator::new(44100, 0.0, 800.0).is_err());
        assert!(Generator::new(44100, f32::NAN, 800.0).is_err());
        assert!(Generator::new(44100, 0.1, -1.0).is_err());

        let generator = Generator::new(48000, 0.05, 400.0).unwrap();
        assert_eq!(2400, generator.frames());
        assert_eq!(48000, generator.sample_rate());
    }

    #[tokio::test]
    async fn test_generated_assets_load() {
        let tempdir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(Catalog::builtin());

        let paths = Generator::default()
            .generate_all(&catalog, tempdir.path())
            .unwrap();
        assert_eq!(16, paths.len());
        assert!(tempdir.path().join("keyboard_blue.wav").is_file());

        let report = bank::load(
            catalog,
            Arc::new(DirectoryAssets::new(tempdir.path())),
            DEFAULT_SAMPLE_RATE,
        )
        .await;
        assert_eq!(16, report.loaded());
        assert_eq!(16, report.total());
        assert!(report.failures.is_empty());
    }
}
