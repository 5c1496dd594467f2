#![forbid(unsafe_code)]

//! Widget configuration.
//!
//! Every size default and layout constant the renderer uses lives here so
//! a host can tune them from a config document instead of code.
//!
//! # Example
//!
//! ```
//! use hostdialog::config::DialogConfig;
//!
//! let config = DialogConfig::from_json_str(r#"{ "alert": { "width": 640 } }"#).unwrap();
//! assert_eq!(config.alert.width, 640);
//! assert_eq!(config.alert.height, 250);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Width, height and padding in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32, padding: u32) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(500, 250, 20)
    }
}

/// The fixed "loading" preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingPreset {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for LoadingPreset {
    fn default() -> Self {
        Self {
            title: "Loading...".to_owned(),
            width: 230,
            height: 115,
        }
    }
}

/// Configuration for a [`ModalDialog`](crate::ModalDialog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// Defaults for plain alerts.
    pub alert: Dimensions,
    /// Defaults for embedded URLs and resources.
    pub embedded: Dimensions,
    /// Defaults for workflow dialogs.
    pub workflow: Dimensions,
    pub loading: LoadingPreset,
    /// Heights above this get top-aligned content.
    pub tall_content_threshold: u32,
    /// Space reserved for the footer when buttons are present.
    pub footer_height: u32,
    /// Space reserved for the title when one is set.
    pub title_height: u32,
    /// Subtracted from the message area when sizing embedded frames.
    pub frame_height_correction: u32,
    /// Path segment under the client URL where named resources live.
    pub resource_path: String,
    /// Path of the host's dialog runner, relative to the client URL.
    pub workflow_runner_path: String,
    /// Prefix of the element id derived from a button's internal id.
    pub button_id_prefix: String,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            alert: Dimensions::new(500, 250, 20),
            embedded: Dimensions::new(800, 600, 0),
            workflow: Dimensions::new(615, 480, 0),
            loading: LoadingPreset::default(),
            tall_content_threshold: 250,
            footer_height: 44,
            title_height: 32,
            frame_height_correction: 4,
            resource_path: "WebResources".to_owned(),
            workflow_runner_path: "cs/dialog/rundialog.aspx".to_owned(),
            button_id_prefix: "hostdialog-button-".to_owned(),
        }
    }
}

impl DialogConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(input).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Parse a TOML document; missing fields keep their defaults.
    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}
