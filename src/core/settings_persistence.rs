//! Settings persistence
//!
//! Saves and loads [`EngineSettings`] to/from a JSON file.
//!
//! # File Location
//!
//! Settings are stored in `settings.json` in the platform configuration
//! directory, e.g. `~/.config/chess-rules/settings.json` on Linux. An explicit
//! path (the CLI's `--settings`) overrides it.
//!
//! # Error Handling
//!
//! Loading never fails: a missing or invalid file falls back to defaults with
//! a warning. Saving reports errors to the caller.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::CoreResult;

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// User-tunable engine options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Publish per-piece moves/threats/attacks change events
    pub emit_derived_events: bool,
    /// Print events as JSON lines
    pub json_events: bool,
    /// Print the board after replaying moves
    pub show_board: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_string(),
            emit_derived_events: false,
            json_events: false,
            show_board: true,
        }
    }
}

/// Resolve the settings file path
///
/// Returns `settings.json` in the user's configuration directory, or in the
/// current directory if no config dir can be determined.
pub fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "trilltino", "chess-rules") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        // Fallback to current directory
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Load settings from `path`, or the default location when `None`
pub fn load_settings(path: Option<&Path>) -> EngineSettings {
    let settings_path = path.map(Path::to_path_buf).unwrap_or_else(settings_path);

    if !settings_path.exists() {
        info!("[SETTINGS] No settings file found at {:?}. Using defaults.", settings_path);
        return EngineSettings::default();
    }

    match fs::read_to_string(&settings_path) {
        Ok(contents) => match serde_json::from_str::<EngineSettings>(&contents) {
            Ok(settings) => {
                info!("[SETTINGS] Loaded settings from {:?}", settings_path);
                settings
            }
            Err(e) => {
                warn!(
                    "[SETTINGS] Failed to parse settings file at {:?}: {}. Using defaults.",
                    settings_path, e
                );
                EngineSettings::default()
            }
        },
        Err(e) => {
            warn!(
                "[SETTINGS] Failed to read settings file at {:?}: {}. Using defaults.",
                settings_path, e
            );
            EngineSettings::default()
        }
    }
}

/// Write `settings` as pretty JSON, creating the parent directory if needed
pub fn save_settings(settings: &EngineSettings, path: &Path) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    info!("[SETTINGS] Saved settings to {:?}", path);
    Ok(())
}
