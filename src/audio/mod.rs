pub mod capture;
pub mod wav;

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use std::path::Path;

/// Trait for microphone recorders.
///
/// This is the seam the flows are exercised through in tests; the production
/// implementation is [`capture::MicRecorder`].
pub trait VoiceRecorder {
    /// Capture one clip and write it to `destination` as a WAV file.
    ///
    /// On error the destination file may not exist and must not be read.
    fn record(&mut self, destination: &Path) -> Result<()>;
}

/// Resolve the preferred input device by name, falling back to the system
/// default when no name is configured or the named device is gone
pub fn resolve_input_device(name: Option<&str>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    if let Some(device_name) = name {
        log::debug!("Attempting to resolve device by name: {}", device_name);

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if device.name().ok().as_deref() == Some(device_name) {
                    log::info!("Resolved device by name: {}", device_name);
                    return Ok(device);
                }
            }
        }

        log::warn!(
            "Device name '{}' not found, falling back to default",
            device_name
        );
    }

    host.default_input_device()
        .context("No input device available")
}
