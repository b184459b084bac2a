//! Runtime configuration.
//!
//! Values are layered:
//!
//! 1. built-in defaults,
//! 2. a TOML file, either passed explicitly or found at
//!    `{config_dir}/dashboard-report/config.toml`,
//! 3. environment overrides (`DASHBOARD_REPORT_API_URL`, `DASHBOARD_REPORT_FONTS_DIR`).
//!
//! Missing keys in the file keep their defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::DEFAULT_MARGIN_MM;
use crate::error::Result;
use crate::fonts::FONTS_DIR_ENV;
use crate::palette::Palette;

/// Directory name used under the platform config directory.
pub const APP_DIR: &str = "dashboard-report";

/// Environment variable overriding [`ReportConfig::api_base_url`].
pub const API_URL_ENV: &str = "DASHBOARD_REPORT_API_URL";

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Settings for exports and the rules client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Base URL of the dashboard API, without a trailing `/api`.
    pub api_base_url: String,
    /// JSON file holding the client-side token.  Defaults to `storage.json` next to the config.
    pub storage_path: Option<PathBuf>,
    /// Directory exports are written to.
    pub output_dir: PathBuf,
    /// Directory searched first for the Roboto fonts.
    pub fonts_dir: Option<PathBuf>,
    /// Chart colors as `#RRGGBB`; empty means the built-in palette.
    pub palette: Vec<String>,
    /// PDF page margins.
    pub margins_mm: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            storage_path: None,
            output_dir: PathBuf::from("."),
            fonts_dir: None,
            palette: Vec::new(),
            margins_mm: DEFAULT_MARGIN_MM,
        }
    }
}

impl ReportConfig {
    /// `{config_dir}/dashboard-report/config.toml`, when the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Parses a TOML document on top of the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads the configuration and applies environment overrides.
    ///
    /// An explicit `path` must exist.  Without one, the default location is used when present
    /// and the built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_str(&fs::read_to_string(path)?)?,
            None => match Self::default_path().filter(|path| path.is_file()) {
                Some(path) => {
                    log::debug!("loading configuration from {}", path.display());
                    Self::from_toml_str(&fs::read_to_string(&path)?)?
                }
                None => Self::default(),
            },
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Applies overrides read through `lookup`; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|value| !value.is_empty()) {
            self.api_base_url = url;
        }
        if let Some(dir) = lookup(FONTS_DIR_ENV).filter(|value| !value.is_empty()) {
            self.fonts_dir = Some(PathBuf::from(dir));
        }
    }

    /// Storage file holding the auth token.
    pub fn storage_path(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("storage.json")
        })
    }

    /// Chart palette built from [`ReportConfig::palette`].
    pub fn palette(&self) -> Palette {
        if self.palette.is_empty() {
            Palette::default()
        } else {
            Palette::from_hex(&self.palette)
        }
    }
}
