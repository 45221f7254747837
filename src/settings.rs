use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};

use crate::gallery::{DEFAULT_LOOKAHEAD_STEPS, DEFAULT_MAX_EDGE, DEFAULT_TICK_MS, DEFAULT_WORKERS};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "gallerat";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Pictures kept loaded on each side of the current one
    #[serde(default = "default_lookahead_steps")]
    pub lookahead_steps: usize,

    /// Longest edge of a loaded picture in pixels
    #[serde(default = "default_max_edge")]
    pub max_edge: u32,

    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_lookahead_steps() -> usize {
    DEFAULT_LOOKAHEAD_STEPS
}

fn default_max_edge() -> u32 {
    DEFAULT_MAX_EDGE
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            lookahead_steps: default_lookahead_steps(),
            max_edge: default_max_edge(),
            workers: default_workers(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl Settings {
    /// Bring out-of-range values back to something usable
    pub fn sanitized(mut self) -> Self {
        self.max_edge = self.max_edge.max(1);
        self.workers = self.workers.max(1);
        self.tick_ms = self.tick_ms.max(1);
        self
    }
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

pub fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

/// Load the settings file, creating it with defaults when missing
pub fn load_settings() {
    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default settings");
        return;
    };
    load_settings_from(&path);
}

/// Load settings from an explicit path; a missing file is created with defaults
pub fn load_settings_from(path: &Path) {
    if path.exists() {
        if let Some(settings) = read_settings_file(path) {
            if let Ok(mut global) = SETTINGS.write() {
                *global = settings;
            }
        }
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        if let Ok(settings) = SETTINGS.read() {
            save_settings_to_file(&settings, path);
        }
    }
}

fn read_settings_file(path: &Path) -> Option<Settings> {
    match fs::read_to_string(path) {
        Ok(content) => match parse_settings(&content) {
            Ok(mut settings) => {
                debug!("Loaded settings from {path:?}");

                if settings.version < CURRENT_VERSION {
                    migrate_settings(&mut settings);
                    save_settings_to_file(&settings, path);
                }
                Some(settings)
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
                None
            }
        },
        Err(e) => {
            error!("Failed to read settings file {path:?}: {e}");
            None
        }
    }
}

pub fn parse_settings(content: &str) -> Result<Settings, serde_yaml::Error> {
    serde_yaml::from_str::<Settings>(content).map(Settings::sanitized)
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    // Future migrations go here:
    // if settings.version < 2 {
    //     migrate_v1_to_v2(settings);
    // }

    settings.version = CURRENT_VERSION;
}

fn save_settings_to_file(settings: &Settings, path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory {parent:?}: {e}");
                return;
            }
        }
    }

    let content = generate_settings_yaml(settings);

    match fs::write(path, content) {
        Ok(()) => debug!("Saved settings to {path:?}"),
        Err(e) => error!("Failed to save settings to {path:?}: {e}"),
    }
}

fn generate_settings_yaml(settings: &Settings) -> String {
    let mut content = String::new();

    content.push_str(&format!("version: {}\n", settings.version));
    content.push_str("# Pictures kept loaded ahead of and behind the current one\n");
    content.push_str(&format!("lookahead_steps: {}\n", settings.lookahead_steps));
    content.push_str("# Pictures are shrunk so their longest edge fits this many pixels\n");
    content.push_str(&format!("max_edge: {}\n", settings.max_edge));
    content.push_str("# Background decoding threads\n");
    content.push_str(&format!("workers: {}\n", settings.workers));
    content.push_str("# How often (ms) the display checks for newly loaded pictures\n");
    content.push_str(&format!("tick_ms: {}\n", settings.tick_ms));

    content
}

// Public API for accessing settings

pub fn current() -> Settings {
    SETTINGS
        .read()
        .map(|s| s.clone())
        .unwrap_or_default()
}

pub fn get_tick_ms() -> u64 {
    SETTINGS
        .read()
        .map(|s| s.tick_ms)
        .unwrap_or_else(|_| default_tick_ms())
}

/// Replace the in-memory settings for this process without saving
pub fn override_settings(settings: Settings) {
    if let Ok(mut global) = SETTINGS.write() {
        *global = settings.sanitized();
    }
}
