use anyhow::{Context, Result};
use uplift_core::{
    metadata, Architecture, InstalledPackageVersion, InstallerType, PinState, Scope, Version,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReceipt {
    pub id: String,
    pub version: String,
    pub source: Option<String>,
    pub installer_type: Option<InstallerType>,
    pub scope: Option<Scope>,
    pub architecture: Option<Architecture>,
    pub installer_url: Option<String>,
    pub require_explicit_upgrade: bool,
    pub installed_at_unix: u64,
}

impl InstallReceipt {
    pub fn to_installed_version(&self) -> Result<InstalledPackageVersion> {
        let version = Version::parse(&self.version)
            .with_context(|| format!("invalid installed version for '{}'", self.id))?;

        let mut installed = InstalledPackageVersion::new(version);
        if self.require_explicit_upgrade {
            installed = installed.with_metadata(
                metadata::PINNED_STATE,
                PinState::PinnedByManifest.as_str(),
            );
        }
        if let Some(installer_type) = self.installer_type {
            installed = installed.with_metadata(metadata::INSTALLED_TYPE, installer_type.as_str());
        }
        if let Some(scope) = self.scope {
            installed = installed.with_metadata(metadata::INSTALLED_SCOPE, scope.as_str());
        }
        if let Some(architecture) = self.architecture {
            installed =
                installed.with_metadata(metadata::INSTALLED_ARCHITECTURE, architecture.as_str());
        }
        if let Some(source) = &self.source {
            installed = installed.with_metadata(metadata::SOURCE_IDENTIFIER, source.as_str());
        }
        Ok(installed)
    }
}
