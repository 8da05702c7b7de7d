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
use std::io::Cursor;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

/// Errors produced while decoding an in-memory asset.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported format: {0}")]
    Unsupported(String),

    #[error("no audio track found")]
    NoTrack,

    #[error("sample rate not specified")]
    NoSampleRate,

    #[error("decoded to zero frames")]
    Empty,

    #[error("audio decode error: {0}")]
    Audio(#[from] SymphoniaError),
}

/// Fully decoded audio: interleaved f32 samples in [-1, 1].
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }
}

/// Decodes a complete audio file held in memory. The extension, if known, helps
/// symphonia pick a format reader.
pub fn decode(bytes: Vec<u8>, extension: Option<&str>) -> Result<DecodedAudio, DecodeError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = extension {
        hint.with_extension(extension);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();
    let probed = get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoTrack)?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let sample_rate = params.sample_rate.ok_or(DecodeError::NoSampleRate)?;
    let mut channels = params.channels.map(|c| c.count() as u16).unwrap_or(0);

    let decoder_opts: DecoderOptions = Default::default();
    let mut decoder = get_codecs()
        .make(&params, &decoder_opts)
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

    let mut samples = Vec::new();
    while let Some((decoded, decoded_channels)) =
        read_and_decode_next_packet(format_reader.as_mut(), decoder.as_mut(), track_id)?
    {
        // Trust the decoded buffers over missing container metadata.
        if channels == 0 {
            channels = decoded_channels as u16;
        }
        samples.extend_from_slice(&decoded);
    }

    if channels == 0 || samples.len() < channels as usize {
        return Err(DecodeError::Empty);
    }

    Ok(DecodedAudio {
        samples,
        channels,
        sample_rate,
    })
}

/// Reads the next packet. End of stream is reported as None.
fn read_next_packet(
    format_reader: &mut dyn FormatReader,
) -> Result<Option<Packet>, SymphoniaError> {
    match format_reader.next_packet() {
        Ok(packet) => Ok(Some(packet)),
        Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Ok(None)
        }
        // Some readers report the end of the stream as a decode error.
        Err(SymphoniaError::DecodeError(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Reads and decodes the next packet for the given track, resetting the decoder when asked to.
fn read_and_decode_next_packet(
    format_reader: &mut dyn FormatReader,
    decoder: &mut dyn Decoder,
    track_id: u32,
) -> Result<Option<(Vec<f32>, usize)>, DecodeError> {
    loop {
        let packet = match read_next_packet(format_reader) {
            Ok(Some(packet)) => packet,
            Ok(None) => return Ok(None),
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                decoder.decode(&packet)?
            }
            Err(e) => return Err(e.into()),
        };
        let (samples, channels) = decode_buffer_to_f32(decoded);
        if channels > 0 && !samples.is_empty() {
            return Ok(Some((samples, channels)));
        }
    }
}

/// Converts a decoded buffer to interleaved f32 samples and its channel count.
fn decode_buffer_to_f32(decoded: AudioBufferRef) -> (Vec<f32>, usize) {
    match decoded {
        AudioBufferRef::F32(buf) => interleave_planar_samples(&buf, |sample| sample),
        AudioBufferRef::F64(buf) => interleave_planar_samples(&buf, |sample| sample as f32),
        AudioBufferRef::S8(buf) => interleave_planar_samples(&buf, scale_s8),
        AudioBufferRef::S16(buf) => interleave_planar_samples(&buf, scale_s16),
        AudioBufferRef::S24(buf) => interleave_planar_samples(&buf, |s| scale_s24(s.inner())),
        AudioBufferRef::S32(buf) => interleave_planar_samples(&buf, scale_s32),
        AudioBufferRef::U8(buf) => interleave_planar_samples(&buf, scale_u8),
        AudioBufferRef::U16(buf) => interleave_planar_samples(&buf, scale_u16),
        AudioBufferRef::U24(buf) => interleave_planar_samples(&buf, |s| scale_u24(s.inner())),
        AudioBufferRef::U32(buf) => interleave_planar_samples(&buf, scale_u32),
    }
}

fn interleave_planar_samples<T, F>(buf: &AudioBuffer<T>, convert: F) -> (Vec<f32>, usize)
where
    T: symphonia::core::sample::Sample,
    F: Fn(T) -> f32,
{
    let frames = buf.frames();
    let channels = buf.spec().channels.count();
    let planes = buf.planes();
    let mut samples = Vec::with_capacity(frames * channels);
    for frame_idx in 0..frames {
        for plane in planes.planes().iter().take(channels) {
            samples.push(convert(plane[frame_idx]));
        }
    }
    (samples, channels)
}

#[inline]
fn scale_s8(sample: i8) -> f32 {
    sample as f32 / (1i64 << 7) as f32
}

#[inline]
fn scale_s16(sample: i16) -> f32 {
    sample as f32 / (1i64 << 15) as f32
}

#[inline]
fn scale_s24(sample: i32) -> f32 {
    sample as f32 / (1i64 << 23) as f32
}

#[inline]
fn scale_s32(sample: i32) -> f32 {
    sample as f32 / (1i64 << 31) as f32
}

#[inline]
fn scale_u8(sample: u8) -> f32 {
    (sample as f32 / u8::MAX as f32) * 2.0 - 1.0
}

#[inline]
fn scale_u16(sample: u16) -> f32 {
    (sample as f32 / u16::MAX as f32) * 2.0 - 1.0
}

#[inline]
fn scale_u24(sample: u32) -> f32 {
    let max = (1u32 << 24) - 1;
    (sample as f32 / max as f32) * 2.0 - 1.0
}

#[inline]
fn scale_u32(sample: u32) -> f32 {
    (sample as f32 / u32::MAX as f32) * 2.0 - 1.0
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;
    use crate::testutil::write_wav;

    #[test]
    fn test_decode_mono_i16() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("click.wav");
        write_wav(path.clone(), vec![vec![0i16, 16384, -16384, 32767]], 44100, 16).unwrap();

        let decoded = decode(fs::read(&path).unwrap(), Some("wav")).unwrap();
        assert_eq!(1, decoded.channels);
        assert_eq!(44100, decoded.sample_rate);
        assert_eq!(4, decoded.frames());
        assert_eq!(0.0, decoded.samples[0]);
        assert_eq!(0.5, decoded.samples[1]);
        assert_eq!(-0.5, decoded.samples[2]);
        assert!((decoded.samples[3] - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_decode_stereo_interleaves() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("stereo.wav");
        write_wav(
            path.clone(),
            vec![vec![0.25f32, 0.5], vec![-0.25f32, -0.5]],
            48000,
            32,
        )
        .unwrap();

        let decoded = decode(fs::read(&path).unwrap(), None).unwrap();
        assert_eq!(2, decoded.channels);
        assert_eq!(48000, decoded.sample_rate);
        assert_eq!(vec![0.25, -0.25, 0.5, -0.5], decoded.samples);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode(b"definitely not audio".to_vec(), Some("wav")),
            Err(DecodeError::Unsupported(_))
        ));
    }

    #[test]
    fn test_decode_empty_wav() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("empty.wav");
        write_wav(path.clone(), vec![Vec::<i16>::new()], 44100, 16).unwrap();

        assert!(decode(fs::read(&path).unwrap(), Some("wav")).is_err());
    }

    #[test]
    fn test_scaling() {
        assert_eq!(-1.0, scale_s16(i16::MIN));
        assert_eq!(-1.0, scale_u8(0));
        assert_eq!(1.0, scale_u8(u8::MAX));
        assert_eq!(0.5, scale_s24(1 << 22));
    }
}
