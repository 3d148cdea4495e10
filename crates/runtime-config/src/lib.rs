//! Configuration types for `rpm-upload`.
//!
//! The CLI reads `rpm-upload.toml` into [`UploaderConfig`] and then applies
//! command-line overrides; everything the upload pipeline needs to know
//! about the endpoint family and polling behavior lives here so it can be
//! passed down explicitly.

use rpm_upload_core::{AddressingMode, DEFAULT_CHUNK_SIZE};
use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "rpm-upload.toml";

/// Default content-sources API root.
pub const DEFAULT_SERVER_URL: &str = "https://console.redhat.com/api/content-sources/v1.0";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UploaderConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub upload: UploadSettings,
    #[serde(default)]
    pub poll: PollSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    #[serde(default = "default_server_url")]
    pub url: String,
    /// Request timeout for every API call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadSettings {
    #[serde(default)]
    pub mode: AddressingMode,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,
    /// Commit each upload and attach the resulting artifacts instead of the
    /// raw uploads.
    #[serde(default)]
    pub finalize: bool,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            mode: AddressingMode::default(),
            chunk_size: default_chunk_size(),
            finalize: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    /// Upper bound on task status requests; `None` polls until the task
    /// reaches a terminal state.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            max_attempts: None,
        }
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_chunk_size() -> u64 {
    DEFAULT_CHUNK_SIZE
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

/// Replace unusable values (blank URL, zero sizes/intervals) with defaults.
/// Returns `true` when anything changed.
pub fn apply_fallbacks(config: &mut UploaderConfig) -> bool {
    let mut changed = false;

    if config.server.url.trim().is_empty() {
        config.server.url = default_server_url();
        changed = true;
    }
    let trimmed = config.server.url.trim_end_matches('/');
    if trimmed.len() != config.server.url.len() {
        config.server.url = trimmed.to_string();
        changed = true;
    }
    if config.server.timeout_secs == 0 {
        config.server.timeout_secs = default_timeout_secs();
        changed = true;
    }
    if config.upload.chunk_size == 0 {
        config.upload.chunk_size = default_chunk_size();
        changed = true;
    }
    if config.poll.interval_ms == 0 {
        config.poll.interval_ms = default_poll_interval_ms();
        changed = true;
    }
    if config.poll.max_attempts == Some(0) {
        config.poll.max_attempts = None;
        changed = true;
    }

    changed
}

/// Parse a config document and apply [`apply_fallbacks`].
pub fn parse_config(content: &str) -> Result<UploaderConfig, toml::de::Error> {
    let mut config: UploaderConfig = toml::from_str(content)?;
    apply_fallbacks(&mut config);
    Ok(config)
}
