//! Pipeline settings with persistence
//!
//! Settings are saved to `~/.config/modelhub/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use modelhub_assets::UploadPolicy;
use modelhub_delivery::{LazyImageConfig, OverlayConfig};
use modelhub_viewer::{LoadStrategy, LoaderConfig};

/// All pipeline settings
///
/// `upload` and `viewer` drive the CLI commands. `overlay` and `images` are
/// only carried here so the web front end reads its timings from the same
/// file; no command consumes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub upload: UploadPolicy,
    pub viewer: ViewerSettings,
    /// Loading overlay timings for the viewer front end
    pub overlay: OverlayConfig,
    /// Lazy preview image behavior for the front end
    pub images: LazyImageConfig,
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("modelhub"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let Some(path) = Self::settings_path() else {
            anyhow::bail!("Could not determine config directory");
        };
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Viewer library settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Where the viewer library script is served from
    pub library_url: String,
    /// How background loads are scheduled
    pub strategy: LoadStrategy,
    pub loader: LoaderConfig,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            library_url: "https://ajax.googleapis.com/ajax/libs/model-viewer/3.5.0/model-viewer.min.js".to_string(),
            strategy: LoadStrategy::Idle,
            loader: LoaderConfig::default(),
        }
    }
}
