use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Write `value` as pretty JSON, creating parent directories as needed.
pub fn export_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("serialize JSON")?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Default log file for TUI sessions, under the user cache directory.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("legal-consult").join("client.log"))
}
