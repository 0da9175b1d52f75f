//! Blocking fixed-duration microphone capture.
//!
//! Samples arrive on the cpal callback thread and are downmixed into a
//! shared mono buffer while the caller sleeps out the configured duration.
//! The buffer is then resampled to the target rate if the device captures
//! at a different one, sized to exactly `duration_secs * sample_rate_hz`
//! samples, and written as 16-bit PCM WAV.

use super::{resolve_input_device, wav, VoiceRecorder};
use crate::config::RecordingConfig;
use anyhow::{bail, Context, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use rubato::{FftFixedIn, Resampler};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Microphone recorder over the configured (or default) input device
pub struct MicRecorder {
    config: RecordingConfig,
}

impl MicRecorder {
    pub fn new(config: RecordingConfig) -> Self {
        Self { config }
    }

    /// Capture mono f32 samples at the device's native rate.
    ///
    /// Blocks for the full configured duration; the recording duration is
    /// the only timeout this program has.
    fn capture_mono(&self) -> Result<(Vec<f32>, u32)> {
        let device = resolve_input_device(self.config.device_name.as_deref())?;
        log::info!("Using audio device: {}", device.name()?);

        let supported = device
            .default_input_config()
            .context("Failed to get default input config")?;
        let device_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;

        log::debug!(
            "Device config: {} Hz, {} channels, format: {:?}",
            device_rate,
            channels,
            supported.sample_format()
        );

        let stream_config = StreamConfig {
            channels: channels as u16,
            sample_rate: cpal::SampleRate(device_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let buffer = Arc::new(Mutex::new(Vec::<f32>::new()));

        let stream = match supported.sample_format() {
            SampleFormat::F32 => {
                let sink = Arc::clone(&buffer);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &_| push_mono_f32(data, channels, &sink),
                    |err| log::error!("Capture stream error: {}", err),
                    None,
                )?
            }
            SampleFormat::I16 => {
                let sink = Arc::clone(&buffer);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &_| push_mono_i16(data, channels, &sink),
                    |err| log::error!("Capture stream error: {}", err),
                    None,
                )?
            }
            SampleFormat::U16 => {
                let sink = Arc::clone(&buffer);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[u16], _: &_| push_mono_u16(data, channels, &sink),
                    |err| log::error!("Capture stream error: {}", err),
                    None,
                )?
            }
            format => bail!("Unsupported sample format: {:?}", format),
        };

        stream.play().context("Failed to start capture stream")?;
        thread::sleep(Duration::from_secs(self.config.duration_secs as u64));
        drop(stream);

        let samples = std::mem::take(&mut *buffer.lock().unwrap());
        if samples.is_empty() {
            bail!("No samples captured from device");
        }

        Ok((samples, device_rate))
    }
}

impl VoiceRecorder for MicRecorder {
    fn record(&mut self, destination: &Path) -> Result<()> {
        log::info!(
            "Recording {} seconds at {} Hz -- speak now",
            self.config.duration_secs,
            self.config.sample_rate_hz
        );

        let (mut samples, device_rate) = self.capture_mono()?;

        let target_rate = self.config.sample_rate_hz;
        if device_rate != target_rate {
            log::info!("Resampling capture: {} Hz -> {} Hz", device_rate, target_rate);
            samples = resample_mono(&samples, device_rate, target_rate)?;
        }

        // Exactly duration * rate samples: pad a short capture, trim a long one
        samples.resize(self.config.samples_per_capture(), 0.0);

        wav::write_mono(destination, &samples, target_rate)?;
        log::info!("Recording saved to {}", destination.display());
        Ok(())
    }
}

fn push_mono_f32(data: &[f32], channels: usize, sink: &Arc<Mutex<Vec<f32>>>) {
    let mut buffer = sink.lock().unwrap();
    for frame in data.chunks(channels) {
        buffer.push(frame.iter().sum::<f32>() / channels as f32);
    }
}

fn push_mono_i16(data: &[i16], channels: usize, sink: &Arc<Mutex<Vec<f32>>>) {
    let mut buffer = sink.lock().unwrap();
    for frame in data.chunks(channels) {
        let avg: i32 = frame.iter().map(|&s| s as i32).sum::<i32>() / channels as i32;
        buffer.push(avg as f32 / i16::MAX as f32);
    }
}

fn push_mono_u16(data: &[u16], channels: usize, sink: &Arc<Mutex<Vec<f32>>>) {
    let mut buffer = sink.lock().unwrap();
    for frame in data.chunks(channels) {
        let avg: i32 = frame.iter().map(|&s| s as i32).sum::<i32>() / channels as i32;
        buffer.push((avg - 32768) as f32 / 32768.0);
    }
}

/// Resample a whole mono clip between rates
fn resample_mono(input: &[f32], from_hz: u32, to_hz: u32) -> Result<Vec<f32>> {
    const CHUNK: usize = 1024;

    let mut resampler = FftFixedIn::<f32>::new(from_hz as usize, to_hz as usize, CHUNK, 2, 1)?;
    let estimated = input.len() as u64 * to_hz as u64 / from_hz as u64;
    let mut output = Vec::with_capacity(estimated as usize + CHUNK);

    let mut pos = 0;
    while pos < input.len() {
        let needed = resampler.input_frames_next();
        let end = (pos + needed).min(input.len());
        let chunk = input[pos..end].to_vec();
        pos = end;

        let frames = if chunk.len() == needed {
            resampler.process(&[chunk], None)?
        } else {
            resampler.process_partial(Some(&[chunk]), None)?
        };
        output.extend_from_slice(&frames[0]);
    }

    Ok(output)
}
