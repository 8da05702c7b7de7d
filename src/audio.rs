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

use crate::bank::LoadedSound;
use crate::config;

pub mod cpal;
pub mod mixer;
pub mod mock;
pub mod route;

/// A shared audio output that plays fire-and-forget voices.
pub trait Output: fmt::Display + Send + Sync {
    /// Starts one voice of the given sound at the given gain. Must not block.
    fn play(&self, sound: &LoadedSound, gain: f32) -> Result<(), Box<dyn Error>>;

    /// The sample rate sounds must be decoded to.
    fn sample_rate(&self) -> u32;
}

/// Lists output devices known to cpal.
pub fn list_devices() -> Result<Vec<cpal::DeviceInfo>, Box<dyn Error>> {
    cpal::list_devices()
}

/// Opens the output described by the configuration.
pub fn get_output(config: &config::Audio) -> Result<Arc<dyn Output>, Box<dyn Error>> {
    let device = config.device();
    if device.starts_with("mock") {
        return Ok(Arc::new(mock::Output::get(device, config.sample_rate_or_default())));
    };

    Ok(Arc::new(cpal::Output::get(config)?))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Audio;

    #[test]
    fn test_mock_output() {
        let output = get_output(&Audio::new("mock-device")).unwrap();
        assert_eq!("mock-device (Mock)", output.to_string());
        assert_eq!(44100, output.sample_rate());

        let sound = LoadedSound::new(vec![0.0; 8], 2, 44100);
        assert!(output.play(&sound, 0.5).is_ok());
    }
}
