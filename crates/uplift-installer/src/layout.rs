use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixLayout {
    prefix: PathBuf,
}

impl PrefixLayout {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn catalogs_dir(&self) -> PathBuf {
        self.prefix.join("catalogs")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.prefix.join("state")
    }

    pub fn installed_state_dir(&self) -> PathBuf {
        self.state_dir().join("installed")
    }

    pub fn pins_dir(&self) -> PathBuf {
        self.state_dir().join("pins")
    }

    pub fn pin_path(&self, id: &str) -> PathBuf {
        self.pins_dir().join(format!("{id}.pin"))
    }

    pub fn receipt_path(&self, id: &str) -> PathBuf {
        self.installed_state_dir().join(format!("{id}.receipt"))
    }

    pub fn ensure_base_dirs(&self) -> Result<()> {
        for dir in [
            self.state_dir(),
            self.installed_state_dir(),
            self.pins_dir(),
        ] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}

pub fn default_user_prefix() -> Result<PathBuf> {
    if let Some(prefix) = std::env::var_os("UPLIFT_PREFIX").filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(prefix));
    }

    if cfg!(windows) {
        let app_data = std::env::var("LOCALAPPDATA")
            .context("LOCALAPPDATA is not set; cannot resolve Windows user prefix")?;
        return Ok(PathBuf::from(app_data).join("Uplift"));
    }

    let home = std::env::var("HOME").context("HOME is not set; cannot resolve user prefix")?;
    Ok(PathBuf::from(home).join(".uplift"))
}

// Package ids become file names under the state directory.
pub(crate) fn validate_package_id(id: &str) -> Result<()> {
    let invalid = id.is_empty()
        || id == "."
        || id == ".."
        || id
            .chars()
            .any(|ch| matches!(ch, '/' | '\\' | ':') || ch.is_control());
    if invalid {
        anyhow::bail!("invalid package id for state file: '{id}'");
    }
    Ok(())
}
