//! Where Quire stores its own data (config).
//!
//! The catalog file stays wherever the crawler wrote it. We only store app state here.

use std::path::PathBuf;

/// Returns the directory where Quire stores its config.
/// On macOS: `~/Library/Application Support/Quire/`.
/// Creates the directory if it doesn't exist; returns `None` if we can't determine the path.
pub fn app_data_dir() -> Option<PathBuf> {
    let dir = directories::ProjectDirs::from("app", "Quire", "Quire")?
        .data_local_dir()
        .to_path_buf();
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}
