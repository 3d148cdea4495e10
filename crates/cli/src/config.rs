use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rpm_upload_api_client::Credential;
use rpm_upload_core::AddressingMode;
use rpm_upload_runtime_config::{CONFIG_FILE_NAME, UploaderConfig, apply_fallbacks, parse_config};
use std::path::PathBuf;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server: Option<String>,
    pub mode: Option<AddressingMode>,
    pub chunk_size: Option<u64>,
    pub finalize: bool,
    pub poll_interval_ms: Option<u64>,
    pub max_polls: Option<u32>,
}

impl Overrides {
    /// Apply on top of a loaded config. An explicit `--chunk-size 0` is kept
    /// so the upload rejects it; a zero poll interval is ignored.
    pub fn apply(self, config: &mut UploaderConfig) {
        if let Some(url) = self.server {
            config.server.url = url.trim_end_matches('/').to_string();
        }
        if let Some(mode) = self.mode {
            config.upload.mode = mode;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.upload.chunk_size = chunk_size;
        }
        if self.finalize {
            config.upload.finalize = true;
        }
        if let Some(interval) = self.poll_interval_ms.filter(|ms| *ms > 0) {
            config.poll.interval_ms = interval;
        }
        if let Some(max) = self.max_polls {
            config.poll.max_attempts = (max > 0).then_some(max);
        }
    }
}

/// Get the config directory path (~/.config/rpm-upload/)
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("rpm-upload"))
}

/// Canonical config file path.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load config from disk, returning defaults if the file does not exist.
pub fn load_config() -> Result<UploaderConfig> {
    let path = config_path()?;
    if !path.exists() {
        let mut config = UploaderConfig::default();
        apply_fallbacks(&mut config);
        return Ok(config);
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse config at {}", path.display()))
}

/// Pick the request credential from environment-style lookups.
///
/// Bearer token first, then basic auth, then a raw identity header.
pub fn credential_from<F>(lookup: F) -> Option<Credential>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = non_empty("RPM_UPLOAD_TOKEN").or_else(|| non_empty("BEARER_TOKEN")) {
        return Some(Credential {
            header: "Authorization".to_string(),
            value: format!("Bearer {}", token.trim()),
        });
    }
    if let (Some(user), Some(password)) = (non_empty("USERNAME"), non_empty("PASSWORD")) {
        let encoded = STANDARD.encode(format!("{user}:{password}"));
        return Some(Credential {
            header: "Authorization".to_string(),
            value: format!("Basic {encoded}"),
        });
    }
    non_empty("IDENTITY_HEADER").map(|identity| Credential {
        header: "x-rh-identity".to_string(),
        value: identity.trim().to_string(),
    })
}

pub fn credential_from_env() -> Option<Credential> {
    credential_from(|key| std::env::var(key).ok())
}

fn describe_credential(credential: Option<&Credential>) -> &'static str {
    match credential {
        None => "(not set)",
        Some(c) if c.header == "x-rh-identity" => "identity header",
        Some(c) if c.value.starts_with("Basic ") => "basic auth",
        Some(_) => "bearer token",
    }
}

/// Print current config.
pub fn show_config() -> Result<()> {
    let config = load_config()?;
    let path = config_path()?;
    println!("Config file: {}", path.display());
    println!();
    println!("[server]");
    println!("  url          = {}", config.server.url);
    println!("  timeout_secs = {}", config.server.timeout_secs);
    println!(
        "  credential   = {}",
        describe_credential(credential_from_env().as_ref())
    );
    println!();
    println!("[upload]");
    println!("  mode       = {}", config.upload.mode);
    println!("  chunk_size = {}", config.upload.chunk_size);
    println!("  finalize   = {}", config.upload.finalize);
    println!();
    println!("[poll]");
    println!("  interval_ms  = {}", config.poll.interval_ms);
    match config.poll.max_attempts {
        Some(max) => println!("  max_attempts = {max}"),
        None => println!("  max_attempts = (unbounded)"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn bearer_token_wins_over_other_credentials() {
        let cred = credential_from(env(&[
            ("BEARER_TOKEN", "tok"),
            ("USERNAME", "alice"),
            ("PASSWORD", "pw"),
            ("IDENTITY_HEADER", "eyJ"),
        ]))
        .expect("credential");
        assert_eq!(cred.header, "Authorization");
        assert_eq!(cred.value, "Bearer tok");

        let cred = credential_from(env(&[("RPM_UPLOAD_TOKEN", "a"), ("BEARER_TOKEN", "b")]))
            .expect("credential");
        assert_eq!(cred.value, "Bearer a");
    }

    #[test]
    fn basic_auth_needs_both_halves() {
        let cred = credential_from(env(&[("USERNAME", "admin"), ("PASSWORD", "password")]))
            .expect("credential");
        assert_eq!(cred.value, "Basic YWRtaW46cGFzc3dvcmQ=");

        assert!(credential_from(env(&[("USERNAME", "admin")])).is_none());
    }

    #[test]
    fn identity_header_is_passed_through() {
        let cred = credential_from(env(&[("IDENTITY_HEADER", " eyJpZGVudGl0eSI6e319 ")]))
            .expect("credential");
        assert_eq!(cred.header, "x-rh-identity");
        assert_eq!(cred.value, "eyJpZGVudGl0eSI6e319");
        assert_eq!(describe_credential(Some(&cred)), "identity header");
    }

    #[test]
    fn blank_values_are_ignored() {
        assert!(credential_from(env(&[("BEARER_TOKEN", "  "), ("IDENTITY_HEADER", "")])).is_none());
        assert_eq!(describe_credential(None), "(not set)");
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = UploaderConfig::default();
        config.poll.max_attempts = Some(3);
        Overrides {
            server: Some("http://localhost:8000/api/v1/".to_string()),
            mode: Some(AddressingMode::ResourceLocator),
            chunk_size: Some(0),
            finalize: true,
            poll_interval_ms: Some(250),
            max_polls: Some(0),
        }
        .apply(&mut config);

        assert_eq!(config.server.url, "http://localhost:8000/api/v1");
        assert_eq!(config.upload.mode, AddressingMode::ResourceLocator);
        assert_eq!(config.upload.chunk_size, 0);
        assert!(config.upload.finalize);
        assert_eq!(config.poll.interval_ms, 250);
        assert_eq!(config.poll.max_attempts, None);
    }

    #[test]
    fn zero_poll_interval_keeps_configured_delay() {
        let mut config = UploaderConfig::default();
        Overrides {
            poll_interval_ms: Some(0),
            ..Overrides::default()
        }
        .apply(&mut config);
        assert_eq!(config.poll.interval_ms, 1_000);
    }

    #[test]
    fn empty_overrides_keep_config() {
        let mut config = UploaderConfig::default();
        config.upload.finalize = true;
        let before = config.clone();
        Overrides::default().apply(&mut config);
        assert_eq!(config, before);
    }
}
