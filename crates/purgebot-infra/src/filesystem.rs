//! Data directory resolution.

use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PURGEBOT_DATA_DIR";

/// Resolve the data directory: `PURGEBOT_DATA_DIR`, else `~/.purgebot`,
/// else `./.purgebot`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".purgebot");
    }

    // Last resort: current directory
    PathBuf::from(".purgebot")
}
