//! Command-line arguments. Every presence option can also come from the
//! environment; flags win over environment variables, which win over the settings file.

use std::path::PathBuf;

use clap::Parser;

use crate::session::Hold;
use crate::settings::{Settings, SettingsOverrides};

#[derive(Parser, Debug)]
#[command(
    name = "dm-presence",
    version,
    about = "Announce the DM help desk as a Discord Rich Presence status",
    long_about = None,
)]
pub struct Cli {
    /// Settings file (default: <config dir>/dm-presence/settings.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Identifies this process to the presence service
    #[arg(long, env = "DM_PRESENCE_APP_ID", value_name = "ID")]
    pub app_id: Option<String>,

    /// Primary activity line
    #[arg(long, env = "DM_PRESENCE_STATE")]
    pub state: Option<String>,

    /// Secondary detail line
    #[arg(long, env = "DM_PRESENCE_DETAILS")]
    pub details: Option<String>,

    /// Uploaded art asset the caption is attached to
    #[arg(long, env = "DM_PRESENCE_LARGE_IMAGE_KEY", value_name = "KEY")]
    pub large_image_key: Option<String>,

    /// Caption shown on the large image
    #[arg(long, env = "DM_PRESENCE_LARGE_IMAGE_TEXT", value_name = "TEXT")]
    pub large_image_text: Option<String>,

    /// Groups related sessions together
    #[arg(long, env = "DM_PRESENCE_PARTY_ID", value_name = "ID")]
    pub party_id: Option<String>,

    /// Grants join authorization to whoever holds it
    #[arg(long, env = "DM_PRESENCE_JOIN_SECRET", value_name = "SECRET", hide_env_values = true)]
    pub join_secret: Option<String>,

    /// Seconds to keep the presence up before disconnecting
    #[arg(long, env = "DM_PRESENCE_HOLD_SECS", value_name = "SECS")]
    pub hold_secs: Option<u64>,

    /// Keep the presence up until Ctrl-C; takes precedence over any hold duration
    #[arg(long)]
    pub wait: bool,

    /// Log the announcement instead of contacting Discord
    #[arg(long)]
    pub dry_run: bool,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    pub write_config: bool,

    /// Debug-level logging unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            application_id: self.app_id.clone(),
            state: self.state.clone(),
            details: self.details.clone(),
            large_image_key: self.large_image_key.clone(),
            large_image_text: self.large_image_text.clone(),
            party_id: self.party_id.clone(),
            join_secret: self.join_secret.clone(),
            hold_secs: self.hold_secs,
        }
    }

    pub fn hold(&self, settings: &Settings) -> Hold {
        if self.wait {
            Hold::UntilInterrupted
        } else if settings.hold_secs > 0 {
            Hold::For(settings.hold())
        } else {
            Hold::None
        }
    }
}
