use std::sync::Arc;

use anyhow::{anyhow, Context as _};
use tracing::{info, warn};
use uplift_core::Version;
use uplift_resolver::{evaluate_pin, PinDecision};

use crate::codes::TerminationCode;
use crate::context::{ContextFlag, ExecutionContext};
use crate::data;
use crate::messages::Message;
use crate::pipeline::{Pipeline, Step};
use crate::search::{
    EnsureOneMatchFromSearchResult, HandleSearchResultFailures, SearchSourceForSingle,
};
use crate::select_version::{
    EnsureUpdateVersionApplicable, GetInstalledPackageVersion, SelectLatestApplicableVersion,
};

pub struct GetManifestFromPackage {
    pub consider_pins: bool,
}

impl Step for GetManifestFromPackage {
    fn name(&self) -> &'static str {
        "get-manifest-from-package"
    }

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()> {
        let package = Arc::clone(context.get::<data::Package>()?);
        let requested = context
            .args()
            .version
            .clone()
            .ok_or_else(|| anyhow!("no version was requested"))?;
        let requested_version = Version::parse(&requested)
            .with_context(|| format!("invalid requested version for '{}'", package.id()))?;

        let Some(key) = package
            .available_version_keys()
            .into_iter()
            .find(|key| key.version == requested_version)
        else {
            context.report(Message::NoManifestFound { version: requested });
            context.terminate(TerminationCode::NoManifestFound);
            return Ok(());
        };

        if self.consider_pins
            && evaluate_pin(key.pin_state, true, context.args().force) == PinDecision::Reject
        {
            info!(
                package = package.id(),
                version = %key.version,
                pin = key.pin_state.as_str(),
                "requested version is pinned"
            );
            context.report(Message::VersionIsPinned { version: requested });
            context.terminate(TerminationCode::PackageIsPinned);
            return Ok(());
        }

        let package_version = package.available_version(&key)?;
        context.add::<data::Manifest>(package_version.manifest.clone())?;
        context.add::<data::PackageVersion>(package_version)?;
        Ok(())
    }
}

pub struct SelectInstaller;

impl Step for SelectInstaller {
    fn name(&self) -> &'static str {
        "select-installer"
    }

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()> {
        let installed = if context.has_flag(ContextFlag::InstallerExecutionUseUpdate) {
            context.get_optional::<data::InstalledPackageVersion>()
        } else {
            None
        };
        let selection = context
            .ambient()
            .selector
            .select_preferred_installer(context.get::<data::Manifest>()?, installed);

        if let Some(installer) = selection.installer {
            context
                .get_mut::<data::Manifest>()?
                .apply_locale(installer.locale.as_deref());
            context.add::<data::Installer>(installer)?;
        } else if selection.only_installed_type_mismatch() {
            context.report(Message::UpgradeDifferentInstallTechnologyInNewerVersions);
        }
        Ok(())
    }
}

pub struct EnsureApplicableInstaller;

impl Step for EnsureApplicableInstaller {
    fn name(&self) -> &'static str {
        "ensure-applicable-installer"
    }

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()> {
        if !context.contains::<data::Installer>() {
            context.report(Message::NoApplicableInstallers);
            context.terminate(TerminationCode::NoApplicableInstaller);
        }
        Ok(())
    }
}

pub struct SelectSinglePackageVersionForInstallOrUpgrade {
    pub is_upgrade: bool,
}

impl Step for SelectSinglePackageVersionForInstallOrUpgrade {
    fn name(&self) -> &'static str {
        "select-single-package-version"
    }

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()> {
        let mut is_upgrade = self.is_upgrade;

        context.run(&HandleSearchResultFailures);
        context.run(&EnsureOneMatchFromSearchResult { is_upgrade });
        context.run(&GetInstalledPackageVersion);
        if context.is_terminated() {
            return Ok(());
        }

        if is_upgrade {
            context.set_flag(ContextFlag::InstallerExecutionUseUpdate);
        } else if context.contains::<data::InstalledPackageVersion>() {
            if context.args().no_upgrade {
                warn!("found installed package, exiting installation");
                context.report(Message::PackageAlreadyInstalled);
                context.terminate(TerminationCode::PackageAlreadyInstalled);
                return Ok(());
            }

            info!("found installed package, converting to upgrade flow");
            context.report(Message::ConvertInstallFlowToUpgrade);
            context.set_flag(ContextFlag::InstallerExecutionUseUpdate);
            is_upgrade = true;
        }

        if context.args().version.is_some() {
            context.run(&GetManifestFromPackage {
                consider_pins: true,
            });
            if is_upgrade {
                context.run(&EnsureUpdateVersionApplicable);
            }
            context.run(&SelectInstaller);
        } else {
            context.run(&SelectLatestApplicableVersion::single_package());
        }

        context.run(&EnsureApplicableInstaller);
        Ok(())
    }
}

pub struct InstallSinglePackage;

impl Step for InstallSinglePackage {
    fn name(&self) -> &'static str {
        "install-single-package"
    }

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()> {
        let stage = Arc::clone(&context.ambient().install_stage);
        let target = context
            .resolved_target()
            .ok_or_else(|| anyhow!("no resolved target to install"))?;

        match stage.install(target) {
            Ok(None) => {}
            Ok(Some(code)) => context.terminate(code),
            Err(err) => {
                context.terminate_with_detail(TerminationCode::InstallFailed, format!("{err:#}"))
            }
        }
        Ok(())
    }
}

pub struct InstallOrUpgradeSinglePackage {
    pub is_upgrade: bool,
}

impl InstallOrUpgradeSinglePackage {
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new()
            .then(SearchSourceForSingle)
            .then(SelectSinglePackageVersionForInstallOrUpgrade {
                is_upgrade: self.is_upgrade,
            })
            .then(InstallSinglePackage)
    }
}

impl Step for InstallOrUpgradeSinglePackage {
    fn name(&self) -> &'static str {
        "install-or-upgrade-single-package"
    }

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()> {
        self.pipeline().run(context);
        Ok(())
    }
}
