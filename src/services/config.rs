use crate::domain::models::{ComplyError, ConfigFile};
use std::path::{Path, PathBuf};

/// Resolve the scan configuration: an explicit `--config` path (missing or
/// unparseable is fatal), then `<root>/.comply.toml`, then
/// `$HOME/.config/comply/config.toml`, then embedded defaults.
pub fn load_config(explicit: Option<&Path>, root: &Path) -> Result<ConfigFile, ComplyError> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    for candidate in candidates(root) {
        if candidate.exists() {
            return read_config(&candidate);
        }
    }
    Ok(ConfigFile::default())
}

fn read_config(path: &Path) -> Result<ConfigFile, ComplyError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ComplyError::Config(format!("{}: {}", path.display(), e)))?;
    toml::from_str(&raw).map_err(|e| ComplyError::Config(format!("{}: {}", path.display(), e)))
}

fn candidates(root: &Path) -> Vec<PathBuf> {
    let mut out = vec![root.join(".comply.toml")];
    if let Ok(home) = std::env::var("HOME") {
        out.push(PathBuf::from(home).join(".config/comply/config.toml"));
    }
    out
}
