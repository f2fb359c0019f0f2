//! Path management utilities for bridge storage.

use std::env;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "a2a-mcp-bridge";

/// Environment variable overriding the registry storage directory.
pub const STORAGE_DIR_ENV: &str = "A2A_BRIDGE_STORAGE_DIR";

/// Returns the default directory for agent record files.
///
/// Honors `A2A_BRIDGE_STORAGE_DIR` when set, otherwise uses the
/// platform-specific data directory:
/// - Linux: `~/.local/share/a2a-mcp-bridge/servers`
/// - macOS: `~/Library/Application Support/a2a-mcp-bridge/servers`
/// - Windows: `%LOCALAPPDATA%\a2a-mcp-bridge\servers`
///
/// The directory is not created here; the registry does that on `init`.
pub fn default_storage_dir() -> PathBuf {
    if let Ok(dir) = env::var(STORAGE_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    data_dir().join(APP_DIR_NAME).join("servers")
}

fn data_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        if let Ok(xdg) = env::var("XDG_DATA_HOME") {
            if !xdg.is_empty() {
                return PathBuf::from(xdg);
            }
        }
        let home = env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(".local").join("share")
    } else if cfg!(target_os = "macos") {
        let home = env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home)
            .join("Library")
            .join("Application Support")
    } else if cfg!(target_os = "windows") {
        let local_app_data = env::var("LOCALAPPDATA")
            .unwrap_or_else(|_| env::var("APPDATA").unwrap_or_else(|_| "C:\\tmp".to_string()));
        PathBuf::from(local_app_data)
    } else {
        PathBuf::from("/tmp")
    }
}
