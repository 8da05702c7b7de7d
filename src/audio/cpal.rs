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
use std::{
    error::Error,
    fmt,
    sync::{atomic::AtomicBool, mpsc, Arc},
    thread,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error, info, span, Level};

use crate::audio::mixer::{Mixer, Voice};
use crate::bank::LoadedSound;
use crate::config;
use crate::playsync::CancelHandle;

/// A description of an output device, used for listing.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    name: String,
    host: String,
    channels: u16,
    sample_rate: u32,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Channels={}, {}Hz) ({})",
            self.name, self.channels, self.sample_rate, self.host
        )
    }
}

/// A single shared cpal output stream. The stream lives on its own thread and
/// its callback owns the mixer; new voices reach it over a channel.
pub struct Output {
    /// The name of the device.
    name: String,
    /// The host ID of the device.
    host_id: cpal::HostId,
    /// Number of output channels.
    channels: u16,
    /// The stream sample rate.
    sample_rate: u32,
    /// Sends new voices to the stream callback.
    voice_tx: Sender<Voice>,
    /// Cancelling this stops the output thread.
    cancel_handle: CancelHandle,
    /// Handle to the thread that owns the stream.
    output_thread: Option<thread::JoinHandle<()>>,
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Channels={}, {}Hz) ({})",
            self.name,
            self.channels,
            self.sample_rate,
            self.host_id.name()
        )
    }
}

impl Drop for Output {
    fn drop(&mut self) {
        self.cancel_handle.cancel();
        if let Some(thread) = self.output_thread.take() {
            let _ = thread.join();
        }
    }
}

fn stream_error(err: cpal::StreamError) {
    error!(err = %err, "Output stream error");
}

/// Drains newly submitted voices into the mixer.
#[inline]
fn receive_voices(mixer: &mut Mixer, voice_rx: &Receiver<Voice>) {
    while let Ok(voice) = voice_rx.try_recv() {
        mixer.add_voice(voice);
    }
}

/// f32 callback: mix directly into the cpal buffer.
fn create_f32_callback(
    mut mixer: Mixer,
    voice_rx: Receiver<Voice>,
) -> impl FnMut(&mut [f32], &cpal::OutputCallbackInfo) + Send + 'static {
    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
        receive_voices(&mut mixer, &voice_rx);
        mixer.process_into(data);
    }
}

/// Other formats: mix into a scratch buffer and convert.
fn create_converting_callback<T>(
    mut mixer: Mixer,
    voice_rx: Receiver<Voice>,
) -> impl FnMut(&mut [T], &cpal::OutputCallbackInfo) + Send + 'static
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let mut scratch: Vec<f32> = Vec::new();
    move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
        receive_voices(&mut mixer, &voice_rx);

        // Only grows when the host hands us a larger buffer than before.
        if scratch.len() < data.len() {
            scratch.resize(data.len(), 0.0);
        }
        let buffer = &mut scratch[..data.len()];
        mixer.process_into(buffer);

        for (dst, &src) in data.iter_mut().zip(buffer.iter()) {
            *dst = T::from_sample(src);
        }
    }
}

/// Builds the output stream for the device's native sample format.
fn build_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
    mixer: Mixer,
    voice_rx: Receiver<Voice>,
) -> Result<cpal::Stream, Box<dyn Error>> {
    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_output_stream(
            config,
            create_f32_callback(mixer, voice_rx),
            stream_error,
            None,
        ),
        cpal::SampleFormat::F64 => device.build_output_stream(
            config,
            create_converting_callback::<f64>(mixer, voice_rx),
            stream_error,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_output_stream(
            config,
            create_converting_callback::<i16>(mixer, voice_rx),
            stream_error,
            None,
        ),
        cpal::SampleFormat::I32 => device.build_output_stream(
            config,
            create_converting_callback::<i32>(mixer, voice_rx),
            stream_error,
            None,
        ),
        cpal::SampleFormat::U16 => device.build_output_stream(
            config,
            create_converting_callback::<u16>(mixer, voice_rx),
            stream_error,
            None,
        ),
        cpal::SampleFormat::U8 => device.build_output_stream(
            config,
            create_converting_callback::<u8>(mixer, voice_rx),
            stream_error,
            None,
        ),
        other => return Err(format!("unsupported sample format {:?}", other).into()),
    }?;
    Ok(stream)
}

/// Finds the cpal device with the given name.
fn find_device(name: &str) -> Result<(cpal::Device, cpal::HostId), Box<dyn Error>> {
    // Suppress noisy output here.
    let _shh_stdout = shh::stdout()?;
    let _shh_stderr = shh::stderr()?;

    if name == config::DEFAULT_DEVICE {
        let host = cpal::default_host();
        return match host.default_output_device() {
            Some(device) => Ok((device, host.id())),
            None => Err("no default output device".into()),
        };
    }

    for host_id in cpal::available_hosts() {
        let devices = match cpal::host_from_id(host_id)?.output_devices() {
            Ok(devices) => devices,
            Err(e) => {
                error!(
                    err = e.to_string(),
                    host = host_id.name(),
                    "Unable to list devices for host"
                );
                continue;
            }
        };

        for device in devices {
            if device.name().is_ok_and(|device_name| device_name.trim() == name) {
                return Ok((device, host_id));
            }
        }
    }

    Err(format!("no device found with name {}", name).into())
}

/// Lists cpal output devices.
pub fn list_devices() -> Result<Vec<DeviceInfo>, Box<dyn Error>> {
    // Suppress noisy output here.
    let _shh_stdout = shh::stdout()?;
    let _shh_stderr = shh::stderr()?;

    let mut devices: Vec<DeviceInfo> = Vec::new();
    for host_id in cpal::available_hosts() {
        let host_devices = match cpal::host_from_id(host_id)?.output_devices() {
            Ok(host_devices) => host_devices,
            Err(e) => {
                error!(
                    err = e.to_string(),
                    host = host_id.name(),
                    "Unable to list devices for host"
                );
                continue;
            }
        };

        for device in host_devices {
            let Ok(config) = device.default_output_config() else {
                continue;
            };
            let Ok(name) = device.name() else {
                continue;
            };

            devices.push(DeviceInfo {
                name,
                host: host_id.name().to_string(),
                channels: config.channels(),
                sample_rate: config.sample_rate().0,
            });
        }
    }

    devices.sort_by_key(|device| device.name.to_string());
    Ok(devices)
}

impl Output {
    /// Opens the configured device and starts its output stream.
    pub fn get(config: &config::Audio) -> Result<Output, Box<dyn Error>> {
        let span = span!(Level::INFO, "open output (cpal)");
        let _enter = span.enter();

        let (device, host_id) = find_device(config.device())?;
        let name = device.name()?;
        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();
        let channels = supported.channels();
        let sample_rate = config.sample_rate().unwrap_or(supported.sample_rate().0);

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: match config.buffer_size() {
                Some(frames) => cpal::BufferSize::Fixed(frames),
                None => cpal::BufferSize::Default,
            },
        };

        let (voice_tx, voice_rx) = crossbeam_channel::unbounded();
        let mixer = Mixer::new(channels, config.max_voices());
        let cancel_handle = CancelHandle::new();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        // cpal streams can't move between threads, so the stream is built and
        // kept alive on its own thread until the output is dropped.
        let output_thread = {
            let cancel_handle = cancel_handle.clone();
            thread::Builder::new()
                .name("output-stream".to_string())
                .spawn(move || {
                    let span = span!(Level::INFO, "output stream (cpal)");
                    let _enter = span.enter();

                    let stream =
                        match build_stream(&device, &stream_config, sample_format, mixer, voice_rx)
                        {
                            Ok(stream) => stream,
                            Err(e) => {
                                let _ = ready_tx.send(Err(e.to_string()));
                                return;
                            }
                        };
                    if let Err(e) = stream.play() {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                    info!("Output stream started.");
                    let _ = ready_tx.send(Ok(()));

                    cancel_handle.wait(Arc::new(AtomicBool::new(false)));
                    drop(stream);
                    info!("Output stream stopped.");
                })?
        };

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = output_thread.join();
                return Err(format!("unable to start output stream on {}: {}", name, e).into());
            }
            Err(_) => {
                let _ = output_thread.join();
                return Err("output thread exited before the stream started".into());
            }
        }

        info!(
            device = name,
            host = host_id.name(),
            channels,
            sample_rate,
            format = ?sample_format,
            "Output opened."
        );

        Ok(Output {
            name,
            host_id,
            channels,
            sample_rate,
            voice_tx,
            cancel_handle,
            output_thread: Some(output_thread),
        })
    }
}

impl crate::audio::Output for Output {
    fn play(&self, sound: &LoadedSound, gain: f32) -> Result<(), Box<dyn Error>> {
        if sound.sample_rate() != self.sample_rate {
            debug!(
                sound_rate = sound.sample_rate(),
                output_rate = self.sample_rate,
                "Sound sample rate differs from output."
            );
        }
        self.voice_tx
            .send(Voice::new(sound, gain))
            .map_err(|_| "output stream is closed")?;
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
