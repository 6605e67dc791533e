use std::sync::Arc;

use anyhow::anyhow;
use tracing::info;
use uplift_core::Version;
use uplift_resolver::{evaluate_pin, is_update_version_applicable, pin_restricts, PinDecision};

use crate::codes::TerminationCode;
use crate::context::{ContextFlag, ExecutionContext};
use crate::data;
use crate::messages::Message;
use crate::pipeline::Step;

pub struct GetInstalledPackageVersion;

impl Step for GetInstalledPackageVersion {
    fn name(&self) -> &'static str {
        "get-installed-package-version"
    }

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()> {
        let installed = context.get::<data::Package>()?.installed_version();
        if let Some(installed) = installed {
            context.add::<data::InstalledPackageVersion>(installed)?;
        }
        Ok(())
    }
}

pub struct SelectLatestApplicableVersion {
    is_single_package: bool,
}

impl SelectLatestApplicableVersion {
    pub fn single_package() -> Self {
        Self {
            is_single_package: true,
        }
    }

    pub fn batch() -> Self {
        Self {
            is_single_package: false,
        }
    }
}

impl Step for SelectLatestApplicableVersion {
    fn name(&self) -> &'static str {
        "select-latest-applicable-version"
    }

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()> {
        let package = Arc::clone(context.get::<data::Package>()?);
        let report_failure_detail = self.is_single_package;
        let is_upgrade = context.has_flag(ContextFlag::InstallerExecutionUseUpdate);

        let installed = if is_upgrade {
            let installed = context
                .get_optional::<data::InstalledPackageVersion>()
                .cloned()
                .ok_or_else(|| {
                    anyhow!(
                        "upgrade of '{}' requested but it has no installed version",
                        package.id()
                    )
                })?;
            Some(installed)
        } else {
            None
        };
        let installed_version: Option<&Version> = installed.as_ref().map(|i| &i.version);

        if installed_version.is_some_and(Version::is_unknown) && !context.args().include_unknown
        {
            if report_failure_detail {
                context.report(Message::UpgradeUnknownVersionExplanation);
            }
            context.terminate(TerminationCode::UpdateNotApplicable);
            return Ok(());
        }

        let include_pinned = self.is_single_package || context.args().include_pinned;
        let force = context.args().force;
        let selector = Arc::clone(&context.ambient().selector);

        let mut installed_type_inapplicable = false;
        let mut package_pinned = false;

        for key in package.available_version_keys() {
            if let Some(installed_version) = installed_version {
                // Keys are newest-first, so nothing after this one is applicable either.
                if !is_update_version_applicable(installed_version, &key.version) {
                    break;
                }
            }

            if pin_restricts(key.pin_state, include_pinned) {
                info!(
                    package = package.id(),
                    version = %key.version,
                    source = %key.source_id,
                    pin = key.pin_state.as_str(),
                    "candidate version is pinned"
                );
                if evaluate_pin(key.pin_state, include_pinned, force) == PinDecision::Reject {
                    package_pinned = true;
                    continue;
                }
                info!(package = package.id(), "ignoring pin due to --force");
            }

            let package_version = package.available_version(&key)?;
            let selection =
                selector.select_preferred_installer(&package_version.manifest, installed.as_ref());
            let Some(installer) = selection.installer else {
                if selection.only_installed_type_mismatch() {
                    installed_type_inapplicable = true;
                }
                continue;
            };

            info!(
                package = %package_version.manifest.id,
                version = %package_version.manifest.version,
                source = %package_version.source_id,
                architecture = installer.architecture.as_str(),
                url = %installer.url,
                "selected installer"
            );

            let mut manifest = package_version.manifest.clone();
            manifest.apply_locale(installer.locale.as_deref());
            context.add::<data::Manifest>(manifest)?;
            context.add::<data::PackageVersion>(package_version)?;
            context.add::<data::Installer>(installer)?;
            return Ok(());
        }

        if report_failure_detail {
            // A technology mismatch takes message precedence, but only the pinned branch
            // changes the termination code.
            if installed_type_inapplicable {
                context.report(Message::UpgradeDifferentInstallTechnologyInNewerVersions);
            } else if package_pinned {
                context.report(Message::UpgradeIsPinned);
                context.terminate(TerminationCode::PackageIsPinned);
                return Ok(());
            } else if is_upgrade {
                context.report(Message::UpdateNotApplicable);
            } else {
                context.report(Message::NoApplicableInstallers);
            }
        }

        context.terminate(if is_upgrade {
            TerminationCode::UpdateNotApplicable
        } else {
            TerminationCode::NoApplicableInstaller
        });
        Ok(())
    }
}

pub struct EnsureUpdateVersionApplicable;

impl Step for EnsureUpdateVersionApplicable {
    fn name(&self) -> &'static str {
        "ensure-update-version-applicable"
    }

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()> {
        let installed = &context.get::<data::InstalledPackageVersion>()?.version;
        let update = &context.get::<data::Manifest>()?.version;

        if !is_update_version_applicable(installed, update) {
            context.report(Message::UpdateNotApplicable);
            context.terminate(TerminationCode::UpdateNotApplicable);
        }
        Ok(())
    }
}
