use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing::info;
use uplift_core::Version;
use uplift_workflow::{InstallStage, ResolvedTarget, TerminationCode};

use crate::{read_install_receipt, write_install_receipt, InstallReceipt, PrefixLayout};

#[derive(Debug, Clone)]
pub struct ReceiptInstallStage {
    layout: PrefixLayout,
}

impl ReceiptInstallStage {
    pub fn new(layout: PrefixLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &PrefixLayout {
        &self.layout
    }
}

impl InstallStage for ReceiptInstallStage {
    fn install(&self, target: ResolvedTarget<'_>) -> Result<Option<TerminationCode>> {
        let manifest = target.manifest;

        // Installed state may have moved since resolution; re-check right before recording.
        if let Some(existing) = read_install_receipt(&self.layout, &manifest.id)? {
            let installed = Version::parse(&existing.version).with_context(|| {
                format!("invalid installed version for '{}'", manifest.id)
            })?;
            if !installed.is_unknown() && installed >= manifest.version {
                info!(
                    package = %manifest.id,
                    installed = %installed,
                    version = %manifest.version,
                    "installed version is already current"
                );
                return Ok(Some(TerminationCode::UpdateNotApplicable));
            }
        }

        let installed_at_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock is before the unix epoch")?
            .as_secs();
        let receipt = InstallReceipt {
            id: manifest.id.clone(),
            version: manifest.version.to_string(),
            source: Some(target.package_version.source_id.clone()),
            installer_type: Some(target.installer.effective_type()?),
            scope: target.installer.scope,
            architecture: Some(target.installer.architecture),
            installer_url: Some(target.installer.url.clone()),
            require_explicit_upgrade: manifest.require_explicit_upgrade,
            installed_at_unix,
        };
        let path = write_install_receipt(&self.layout, &receipt)?;
        info!(
            package = %manifest.id,
            version = %manifest.version,
            source = %target.package_version.source_id,
            receipt = %path.display(),
            "recorded installation"
        );
        Ok(None)
    }
}
