//! RON configuration for the `listing-extract` binary.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use listing_core::ExtractorSettings;
use listing_engine::{FetchSettings, DEFAULT_USER_AGENT};
use listing_logging::{listing_info, listing_warn};
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_CONFIG_FILENAME: &str = "listing.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub extractor: ExtractorSettings,
    pub fetch: FetchConfig,
    /// Pause between consecutive batch imports.
    pub pacing_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorSettings::default(),
            fetch: FetchConfig::default(),
            pacing_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FetchConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub settle_delay_ms: u64,
    pub user_agent: String,
    pub max_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let defaults = FetchSettings::default();
        Self {
            request_timeout_secs: defaults.request_timeout.as_secs(),
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            settle_delay_ms: 0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_bytes: defaults.max_bytes,
        }
    }
}

impl FetchConfig {
    pub(crate) fn to_settings(&self) -> FetchSettings {
        FetchSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            user_agent: self.user_agent.clone(),
            max_bytes: self.max_bytes,
            ..FetchSettings::default()
        }
    }
}

/// Reads `path`, falling back to defaults when the file does not exist.
pub(crate) fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            listing_warn!("No config at {:?}, using defaults", path);
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {}", path.display()))
        }
    };

    let config = ron::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    listing_info!("Loaded config from {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_core::{ExtractionProfile, TitlePolicy};
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join(DEFAULT_CONFIG_FILENAME)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(
            &path,
            "(pacing_ms: 250, fetch: (settle_delay_ms: 1500), extractor: (profile: Static, title_policy: Required))",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.pacing_ms, 250);
        assert_eq!(config.fetch.settle_delay_ms, 1_500);
        assert_eq!(config.fetch.request_timeout_secs, 30);
        assert_eq!(config.extractor.profile, ExtractionProfile::Static);
        assert_eq!(config.extractor.title_policy, TitlePolicy::Required);
        assert_eq!(
            config.extractor.marketplace_token,
            ExtractorSettings::default().marketplace_token
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(&path, "(pacing_ms: \"soon\"").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn fetch_config_maps_to_settings() {
        let settings = FetchConfig {
            settle_delay_ms: 800,
            ..FetchConfig::default()
        }
        .to_settings();
        assert_eq!(settings.settle_delay, Duration::from_millis(800));
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.redirect_limit, 5);
    }
}
