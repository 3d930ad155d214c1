//! Settings file plus environment and command-line overrides

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::SettingsError;
use crate::presence::{ApplicationId, StatusRecord};

const SETTINGS_DIR: &str = "dm-presence";
const SETTINGS_FILE: &str = "settings.json";

/// Everything needed to announce one status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Identifies this process to the presence service
    pub application_id: Option<String>,
    pub state: String,
    pub details: String,
    pub large_image_key: Option<String>,
    pub large_image_text: String,
    pub party_id: String,
    /// Grants join authorization to whoever holds it
    pub join_secret: String,
    /// Seconds to keep the presence up before disconnecting
    pub hold_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            application_id: None,
            state: "Listening to DM's".to_string(),
            details: "DM To Get Help".to_string(),
            large_image_key: None,
            large_image_text: "Numbani".to_string(),
            party_id: String::new(),
            join_secret: String::new(),
            hold_secs: 0,
        }
    }
}

/// Values that replace whatever the settings file says. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub application_id: Option<String>,
    pub state: Option<String>,
    pub details: Option<String>,
    pub large_image_key: Option<String>,
    pub large_image_text: Option<String>,
    pub party_id: Option<String>,
    pub join_secret: Option<String>,
    pub hold_secs: Option<u64>,
}

/// `<config dir>/dm-presence/settings.json`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

impl Settings {
    /// Load settings from `path`, or from the default location when `path` is `None`.
    /// An explicit path must exist; a missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match default_settings_path() {
                Some(path) => (path, false),
                None => {
                    tracing::debug!("No config directory on this platform, using defaults");
                    return Ok(Self::default().normalized());
                }
            },
        };

        if !required && !path.exists() {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default().normalized());
        }

        tracing::debug!("Loading settings from {}", path.display());
        let contents = fs::read_to_string(&path).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|source| SettingsError::Parse { path, source })?;

        Ok(settings.normalized())
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        tracing::debug!("Saving settings to {}", path.display());
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;

        fs::write(path, contents).map_err(io_err)
    }

    /// Layer `overrides` on top of these settings
    pub fn apply(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(id) = overrides.application_id {
            self.application_id = Some(id);
        }
        if let Some(state) = overrides.state {
            self.state = state;
        }
        if let Some(details) = overrides.details {
            self.details = details;
        }
        if let Some(key) = overrides.large_image_key {
            self.large_image_key = Some(key);
        }
        if let Some(text) = overrides.large_image_text {
            self.large_image_text = text;
        }
        if let Some(party_id) = overrides.party_id {
            self.party_id = party_id;
        }
        if let Some(secret) = overrides.join_secret {
            self.join_secret = secret;
        }
        if let Some(secs) = overrides.hold_secs {
            self.hold_secs = secs;
        }
        self.normalized()
    }

    /// Trim surrounding whitespace from every value; blank optional values become `None`
    fn normalized(mut self) -> Self {
        fn trim_optional(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        self.application_id = trim_optional(self.application_id);
        self.large_image_key = trim_optional(self.large_image_key);
        for field in [
            &mut self.state,
            &mut self.details,
            &mut self.large_image_text,
            &mut self.party_id,
            &mut self.join_secret,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
        self
    }

    pub fn application_id(&self) -> Result<ApplicationId, SettingsError> {
        let raw = self
            .application_id
            .as_deref()
            .ok_or(SettingsError::MissingApplicationId)?;
        Ok(raw.parse()?)
    }

    pub fn status_record(&self) -> StatusRecord {
        let mut builder = StatusRecord::builder()
            .state(self.state.as_str())
            .details(self.details.as_str())
            .large_image_text(self.large_image_text.as_str())
            .party_id(self.party_id.as_str())
            .join_secret(self.join_secret.as_str());

        if let Some(key) = &self.large_image_key {
            builder = builder.large_image_key(key.as_str());
        }

        builder.build()
    }

    pub fn hold(&self) -> Duration {
        Duration::from_secs(self.hold_secs)
    }
}
