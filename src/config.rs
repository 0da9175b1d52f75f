use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Recording parameters shared by enrollment and authentication captures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Capture duration in seconds
    pub duration_secs: u32,
    /// Sample rate the recording is stored at
    pub sample_rate_hz: u32,
    /// Input device name; None selects the system default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            duration_secs: 5,
            sample_rate_hz: 44_100,
            device_name: None,
        }
    }
}

impl RecordingConfig {
    /// Number of samples a full-length capture holds
    pub fn samples_per_capture(&self) -> usize {
        (self.duration_secs * self.sample_rate_hz) as usize
    }
}

/// MFCC extraction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Cepstral coefficients kept per frame (the fingerprint dimension)
    pub num_coeffs: usize,
    /// Number of triangular mel filters
    pub num_filters: usize,
    /// Analysis window length (ms); scaled by the clip's own sample rate
    pub window_ms: u32,
    /// Hop between consecutive windows (ms)
    pub hop_ms: u32,
    /// Pre-emphasis coefficient applied before windowing
    pub pre_emphasis: f64,
    /// Lower edge of the mel filterbank (Hz); the upper edge is Nyquist
    pub low_freq_hz: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            num_coeffs: 13,
            num_filters: 26,
            window_ms: 25,
            hop_ms: 10,
            pre_emphasis: 0.97,
            low_freq_hz: 20.0,
        }
    }
}

/// Authentication decision parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Cosine similarity a fresh capture must exceed to be granted access
    pub threshold: f32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { threshold: 0.85 }
    }
}

/// Where captures and fingerprint records are kept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for per-user WAV captures and fingerprint records
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub recording: RecordingConfig,
    pub features: FeatureConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load config from file or create default
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: AppConfig = toml::from_str(&content)?;
            log::info!("Config loaded from: {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            let toml_str = toml::to_string_pretty(&config)?;
            fs::write(path, toml_str)?;
            log::info!("Default config created at: {}", path.display());
            Ok(config)
        }
    }
}
