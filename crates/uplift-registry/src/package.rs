use anyhow::Result;
use uplift_core::{InstalledPackageVersion, Package, PackageVersion, PinRule, PinState, VersionKey};

use crate::ManifestEntry;

#[derive(Debug, Clone)]
pub struct RegistryPackage {
    id: String,
    entries: Vec<(VersionKey, ManifestEntry)>,
    installed: Option<InstalledPackageVersion>,
}

impl RegistryPackage {
    // `by_source` is in catalog priority order, which equal versions keep.
    pub fn new(
        id: impl Into<String>,
        by_source: Vec<(String, Vec<ManifestEntry>)>,
        installed: Option<InstalledPackageVersion>,
        pin: Option<&PinRule>,
    ) -> Self {
        let mut entries = Vec::new();
        for (source_id, manifests) in by_source {
            for entry in manifests {
                let pin_state = pin.map_or(PinState::None, |rule| rule.classify(&entry.version));
                let key = VersionKey {
                    version: entry.version.clone(),
                    source_id: source_id.clone(),
                    pin_state,
                };
                entries.push((key, entry));
            }
        }
        entries.sort_by(|(left, _), (right, _)| right.version.cmp(&left.version));

        Self {
            id: id.into(),
            entries,
            installed,
        }
    }

    pub fn is_available(&self) -> bool {
        !self.entries.is_empty()
    }
}

impl Package for RegistryPackage {
    fn id(&self) -> &str {
        &self.id
    }

    fn available_version_keys(&self) -> Vec<VersionKey> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    fn available_version(&self, key: &VersionKey) -> Result<PackageVersion> {
        let Some((_, entry)) = self
            .entries
            .iter()
            .find(|(candidate, _)| {
                candidate.version == key.version && candidate.source_id == key.source_id
            })
        else {
            anyhow::bail!(
                "version {} of '{}' is not available from source '{}'",
                key.version,
                self.id,
                key.source_id
            );
        };

        Ok(PackageVersion {
            manifest: entry.load(&self.id)?,
            source_id: key.source_id.clone(),
        })
    }

    fn installed_version(&self) -> Option<InstalledPackageVersion> {
        self.installed.clone()
    }
}
