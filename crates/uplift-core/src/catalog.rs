use std::collections::BTreeMap;
use std::fmt;

use crate::installer::Scope;
use crate::installer_type::InstallerType;
use crate::manifest::PackageManifest;
use crate::pin::PinState;
use crate::version::Version;

pub mod metadata {
    pub const PINNED_STATE: &str = "pinned_state";
    pub const INSTALLED_TYPE: &str = "installed_type";
    pub const INSTALLED_SCOPE: &str = "installed_scope";
    pub const INSTALLED_ARCHITECTURE: &str = "installed_architecture";
    pub const SOURCE_IDENTIFIER: &str = "source_identifier";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionKey {
    pub version: Version,
    pub source_id: String,
    pub pin_state: PinState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion {
    pub manifest: PackageManifest,
    pub source_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackageVersion {
    pub version: Version,
    pub metadata: BTreeMap<String, String>,
}

impl InstalledPackageVersion {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn pin_state(&self) -> PinState {
        self.metadata
            .get(metadata::PINNED_STATE)
            .and_then(|value| PinState::parse(value))
            .unwrap_or_default()
    }

    pub fn installed_type(&self) -> Option<InstallerType> {
        self.metadata
            .get(metadata::INSTALLED_TYPE)
            .and_then(|value| InstallerType::parse(value))
    }

    pub fn installed_scope(&self) -> Option<Scope> {
        self.metadata
            .get(metadata::INSTALLED_SCOPE)
            .and_then(|value| Scope::parse(value))
    }

}

// `available_version_keys` must be sorted newest-first; resolution stops at the first
// non-applicable version.
pub trait Package: fmt::Debug + Send + Sync {
    fn id(&self) -> &str;

    fn available_version_keys(&self) -> Vec<VersionKey>;

    fn available_version(&self, key: &VersionKey) -> anyhow::Result<PackageVersion>;

    fn installed_version(&self) -> Option<InstalledPackageVersion>;
}
