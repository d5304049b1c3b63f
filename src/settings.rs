use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::WavenumberRange;
use crate::data::peaks::PeakParams;

/// Environment variable naming a JSON settings file.
pub const CONFIG_ENV: &str = "IR_SPECTRA_CONFIG";
/// Settings file looked up in the working directory when the variable is unset.
pub const CONFIG_FILE: &str = "ir-spectra.json";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Startup defaults for the viewer. Missing keys fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Left edge of the chart (usually the higher wavenumber).
    pub start_wavenumber: f64,
    /// Right edge of the chart.
    pub end_wavenumber: f64,
    /// Drag step of the range inputs.
    pub range_step: f64,
    pub show_peaks: bool,
    pub peaks: PeakParams,
    /// Colours handed out to uploads in order, cycling.
    pub palette: Vec<String>,
    pub export_width: u32,
    pub export_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_wavenumber: 4000.0,
            end_wavenumber: 600.0,
            range_step: 10.0,
            show_peaks: true,
            peaks: PeakParams::default(),
            palette: ["blue", "green", "red", "purple", "orange", "brown", "cyan", "magenta"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            export_width: 3000,
            export_height: 1800,
        }
    }
}

impl Settings {
    pub fn range(&self) -> WavenumberRange {
        WavenumberRange::new(self.start_wavenumber, self.end_wavenumber)
    }

    /// Where settings are read from: `$IR_SPECTRA_CONFIG`, else
    /// `./ir-spectra.json`.
    pub fn path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// unusable.
    pub fn load() -> Self {
        let path = Self::path();
        if !path.exists() {
            log::debug!("No settings file at {}; using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {e:#}");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(text)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("serialising settings")?;
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
