//! Application settings storage
//!
//! Stores the analysis service URL, organizer thresholds and extraction layout
//! in a JSON file in the config directory.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use crate::analysis_client::DEFAULT_API_BASE;
use crate::error::{PaperError, Result};
use crate::papers::pdf_extractor::PageLayout;
use crate::papers::section_classifier::MAX_HEADING_CHARS;
use crate::papers::section_parser::{OrganizerConfig, MIN_SECTION_CHARS};

/// Global settings instance
static SETTINGS: RwLock<Option<Settings>> = RwLock::new(None);

/// Path to config file (set during init)
static CONFIG_PATH: RwLock<Option<PathBuf>> = RwLock::new(None);

const API_URL_ENV: &str = "PAPERSPLIT_API_URL";
const CONFIG_DIR_ENV: &str = "PAPERSPLIT_CONFIG_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Sections with this many trimmed characters or fewer are dropped
    #[serde(default = "default_min_section_chars")]
    pub min_section_chars: usize,
    /// Heading candidates must be shorter than this
    #[serde(default = "default_max_heading_chars")]
    pub max_heading_chars: usize,
    /// 0 disables the timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub page_layout: PageLayout,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_min_section_chars() -> usize {
    MIN_SECTION_CHARS
}

fn default_max_heading_chars() -> usize {
    MAX_HEADING_CHARS
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            min_section_chars: default_min_section_chars(),
            max_heading_chars: default_max_heading_chars(),
            request_timeout_secs: default_request_timeout(),
            page_layout: PageLayout::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk or create default
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Settings::default();
        }

        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| Settings::parse(&content));

        match parsed {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    "[Settings] could not read {}, using defaults: {}",
                    path.display(),
                    e
                );
                Settings::default()
            }
        }
    }

    /// Parse a settings file; missing fields take their defaults
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| PaperError::Settings(format!("Failed to serialize settings: {}", e)))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    pub fn organizer_config(&self) -> OrganizerConfig {
        OrganizerConfig {
            min_section_chars: self.min_section_chars,
            max_heading_chars: self.max_heading_chars,
        }
    }
}

/// Config directory: `$PAPERSPLIT_CONFIG_DIR`, else the platform config dir
pub fn default_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::config_dir()
        .map(|p| p.join("papersplit"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Initialize settings from `<config_dir>/settings.json`
pub fn init(config_dir: PathBuf) {
    let config_path = config_dir.join("settings.json");
    let settings = Settings::load(&config_path);

    if let Ok(mut guard) = CONFIG_PATH.write() {
        *guard = Some(config_path);
    }
    if let Ok(mut guard) = SETTINGS.write() {
        *guard = Some(settings);
    }
}

pub fn config_path() -> Option<PathBuf> {
    CONFIG_PATH.read().ok()?.clone()
}

/// Snapshot of the current settings (defaults if not initialized)
pub fn current() -> Settings {
    SETTINGS
        .read()
        .ok()
        .and_then(|guard| guard.clone())
        .unwrap_or_default()
}

/// Apply a change and persist it
fn update(change: impl FnOnce(&mut Settings)) -> Result<()> {
    let mut settings_guard = SETTINGS
        .write()
        .map_err(|_| PaperError::Settings("Failed to acquire settings lock".to_string()))?;

    let settings = settings_guard.get_or_insert_with(Settings::default);
    change(settings);

    let config_path = config_path()
        .ok_or_else(|| PaperError::Settings("Settings not initialized".to_string()))?;

    settings.save(&config_path)
}

/// Get the analysis API base URL (checks env var first, then stored setting)
pub fn get_api_base_url() -> String {
    if let Ok(url) = std::env::var(API_URL_ENV) {
        if !url.is_empty() {
            return url;
        }
    }
    current().api_base_url
}

/// Set and save the analysis API base URL
pub fn set_api_base_url(url: String) -> Result<()> {
    let url = if url.trim().is_empty() {
        default_api_base_url()
    } else {
        url.trim().to_string()
    };
    update(|s| s.api_base_url = url.clone())?;
    info!("[Settings] API base URL set to {}", url);
    Ok(())
}

pub fn get_organizer_config() -> OrganizerConfig {
    current().organizer_config()
}

/// Override either threshold; `None` leaves it unchanged
pub fn set_organizer_thresholds(min_section_chars: Option<usize>, max_heading_chars: Option<usize>) -> Result<()> {
    update(|s| {
        if let Some(min) = min_section_chars {
            s.min_section_chars = min;
        }
        if let Some(max) = max_heading_chars {
            s.max_heading_chars = max;
        }
    })
}

pub fn get_request_timeout() -> Option<Duration> {
    match current().request_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    }
}

pub fn get_page_layout() -> PageLayout {
    current().page_layout
}

pub fn set_page_layout(layout: PageLayout) -> Result<()> {
    update(|s| s.page_layout = layout)
}
