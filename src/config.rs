use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::{Encoding, LoadOptions, NullDatePolicy};
use crate::report::layout::{Layout, Preset};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "RUSTY_WINGS_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "rusty-wings.json";

/// Dataset tried at startup when neither the command line nor the config
/// names one.
pub const DEFAULT_DATA_FILE: &str = "Aviation_Data.csv";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// User configuration, read from JSON.  Every field is optional.
///
/// ```json
/// { "data_path": "Aviation_Data.csv", "preset": "explorer", "null_dates": "keep" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset opened at startup.  Unlike the built-in default, a file named
    /// here is reported when it cannot be opened.
    pub data_path: Option<PathBuf>,
    pub preset: Preset,
    /// Overrides the preset's encoding.
    pub encoding: Option<Encoding>,
    pub null_dates: NullDatePolicy,
    /// Overrides the preset's bar chart truncation; `0` keeps every value.
    pub top_n: Option<usize>,
    /// Overrides the preset's preview length; `0` shows every row.
    pub preview_rows: Option<usize>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            preset: Preset::default(),
            encoding: None,
            null_dates: NullDatePolicy::default(),
            top_n: None,
            preview_rows: None,
        }
    }
}

impl DashboardConfig {
    /// Load from `$RUSTY_WINGS_CONFIG`, else `./rusty-wings.json`, else
    /// defaults.  A broken file is logged and ignored.
    pub fn load() -> Self {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let path = match explicit {
            Some(p) => p,
            None => {
                let local = PathBuf::from(CONFIG_FILE_NAME);
                if !local.exists() {
                    log::debug!("No {CONFIG_FILE_NAME} found, using defaults");
                    return Self::default();
                }
                local
            }
        };

        match Self::from_path(&path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring configuration {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).context("reading config file")?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing config JSON")
    }

    /// The preset layout with this config's overrides applied.
    pub fn layout(&self) -> Layout {
        let mut layout = Layout::for_preset(self.preset);
        if let Some(enc) = self.encoding {
            layout.encoding = enc;
        }
        if let Some(n) = self.top_n {
            layout.top_n = (n > 0).then_some(n);
        }
        if let Some(n) = self.preview_rows {
            layout.preview_rows = (n > 0).then_some(n);
        }
        layout
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            encoding: self.layout().encoding,
            null_dates: self.null_dates,
        }
    }
}
