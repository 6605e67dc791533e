use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use uplift_core::{PackageManifest, Version};

// One catalog on disk: `<root>/index/<package id>/<version>.toml`.
#[derive(Debug, Clone)]
pub struct RegistryIndex {
    root: PathBuf,
}

// A manifest file known only by the version in its file name until it is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub version: Version,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct ConfiguredRegistryIndex {
    catalogs: Vec<(String, RegistryIndex)>,
}

impl RegistryIndex {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn index_root(&self) -> PathBuf {
        self.root.join("index")
    }

    pub fn package_ids(&self) -> Result<Vec<String>> {
        let index_root = self.index_root();
        if !index_root.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&index_root)
            .with_context(|| format!("failed to read registry index: {}", index_root.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                ids.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        ids.sort();
        Ok(ids)
    }

    // Newest first. Files whose name is not a version are skipped.
    pub fn package_entries(&self, package: &str) -> Result<Vec<ManifestEntry>> {
        let package_dir = self.index_root().join(package);
        if !package_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&package_dir)
            .with_context(|| format!("failed to read package directory: {}", package_dir.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|v| v.to_str()) != Some("toml") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|v| v.to_str()) else {
                continue;
            };
            match Version::parse(stem) {
                Ok(version) if !version.is_unknown() => {
                    entries.push(ManifestEntry { version, path });
                }
                _ => warn!(
                    package,
                    manifest = %path.display(),
                    "manifest file name is not a version; skipping"
                ),
            }
        }

        entries.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(entries)
    }
}

impl ManifestEntry {
    pub fn load(&self, package: &str) -> Result<PackageManifest> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed reading manifest: {}", self.path.display()))?;
        let manifest = PackageManifest::from_toml_str(&content)
            .with_context(|| format!("failed parsing manifest: {}", self.path.display()))?;
        if manifest.id != package {
            anyhow::bail!(
                "manifest {} declares id '{}' but is filed under '{package}'",
                self.path.display(),
                manifest.id
            );
        }
        if manifest.version != self.version {
            anyhow::bail!(
                "manifest {} declares version {} but is filed as {}",
                self.path.display(),
                manifest.version,
                self.version
            );
        }
        Ok(manifest)
    }
}

impl ConfiguredRegistryIndex {
    // Each root is named after its directory; earlier roots take priority on equal versions.
    pub fn from_roots(roots: impl IntoIterator<Item = PathBuf>) -> Result<Self> {
        let mut names = BTreeSet::new();
        let mut catalogs = Vec::new();
        for root in roots {
            let name = root
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .with_context(|| format!("catalog root has no name: {}", root.display()))?;
            if !names.insert(name.clone()) {
                anyhow::bail!("more than one catalog root is named '{name}'");
            }

            if !root.join("index").is_dir() {
                warn!(
                    catalog = %name,
                    location = %root.display(),
                    "catalog has no index directory; skipping"
                );
                continue;
            }
            catalogs.push((name, RegistryIndex::open(root)));
        }
        Ok(Self { catalogs })
    }

    // Every subdirectory of `catalogs_dir`, in name order.
    pub fn discover(catalogs_dir: &Path) -> Result<Self> {
        if !catalogs_dir.exists() {
            debug!(dir = %catalogs_dir.display(), "no catalogs directory");
            return Ok(Self::default());
        }

        let mut roots = Vec::new();
        for entry in fs::read_dir(catalogs_dir).with_context(|| {
            format!("failed to read catalogs directory: {}", catalogs_dir.display())
        })? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                roots.push(entry.path());
            }
        }
        roots.sort();
        Self::from_roots(roots)
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    pub fn package_ids(&self) -> Result<Vec<String>> {
        let mut ids = BTreeSet::new();
        for (_, index) in &self.catalogs {
            ids.extend(index.package_ids()?);
        }
        Ok(ids.into_iter().collect())
    }

    // Case-insensitive, preferring an exact match.
    pub fn canonical_id(&self, query: &str) -> Result<Option<String>> {
        let ids = self.package_ids()?;
        if ids.iter().any(|id| id == query) {
            return Ok(Some(query.to_string()));
        }
        Ok(ids.into_iter().find(|id| id.eq_ignore_ascii_case(query)))
    }

    pub fn package_entries_by_source(
        &self,
        package: &str,
    ) -> Result<Vec<(String, Vec<ManifestEntry>)>> {
        let mut found = Vec::new();
        for (name, index) in &self.catalogs {
            let entries = index
                .package_entries(package)
                .with_context(|| format!("failed listing package '{package}' in catalog '{name}'"))?;
            if !entries.is_empty() {
                found.push((name.clone(), entries));
            }
        }
        Ok(found)
    }
}
