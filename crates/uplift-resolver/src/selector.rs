use std::collections::BTreeSet;

use tracing::debug;
use uplift_core::{Architecture, InstalledPackageVersion, Installer, PackageManifest, Scope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Inapplicability {
    Architecture,
    InstalledType,
    InstalledScope,
    RequiredScope,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallerSelection {
    pub installer: Option<Installer>,
    pub inapplicabilities: Vec<BTreeSet<Inapplicability>>,
}

impl InstallerSelection {
    pub fn only_installed_type_mismatch(&self) -> bool {
        self.inapplicabilities.iter().any(|reasons| {
            reasons.len() == 1 && reasons.contains(&Inapplicability::InstalledType)
        })
    }
}

pub trait InstallerSelector: Send + Sync {
    fn select_preferred_installer(
        &self,
        manifest: &PackageManifest,
        installed: Option<&InstalledPackageVersion>,
    ) -> InstallerSelection;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorConfig {
    pub architectures: Vec<Architecture>,
    pub required_scope: Option<Scope>,
    pub preferred_scope: Option<Scope>,
    pub preferred_locales: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            architectures: Architecture::host_preference(),
            required_scope: None,
            preferred_scope: None,
            preferred_locales: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ManifestComparator {
    config: SelectorConfig,
}

impl ManifestComparator {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    fn inapplicabilities(
        &self,
        installer: &Installer,
        installed: Option<&InstalledPackageVersion>,
    ) -> BTreeSet<Inapplicability> {
        let mut reasons = BTreeSet::new();

        if !self.config.architectures.contains(&installer.architecture) {
            reasons.insert(Inapplicability::Architecture);
        }

        if let Some(installed) = installed {
            if let (Some(installed_type), Ok(candidate_type)) =
                (installed.installed_type(), installer.effective_type())
            {
                if !candidate_type.is_compatible_with(installed_type) {
                    reasons.insert(Inapplicability::InstalledType);
                }
            }
            if let (Some(installed_scope), Some(candidate_scope)) =
                (installed.installed_scope(), installer.scope)
            {
                if installed_scope != candidate_scope {
                    reasons.insert(Inapplicability::InstalledScope);
                }
            }
        }

        if let (Some(required), Some(candidate_scope)) =
            (self.config.required_scope, installer.scope)
        {
            if required != candidate_scope {
                reasons.insert(Inapplicability::RequiredScope);
            }
        }

        reasons
    }

    // Lower ranks are preferred; ties keep manifest order.
    fn rank(
        &self,
        installer: &Installer,
        installed: Option<&InstalledPackageVersion>,
    ) -> (usize, usize, usize, usize) {
        let architecture_rank = self
            .config
            .architectures
            .iter()
            .position(|arch| *arch == installer.architecture)
            .unwrap_or(usize::MAX);

        let exact_type_rank = match (
            installed.and_then(InstalledPackageVersion::installed_type),
            installer.effective_type().ok(),
        ) {
            (Some(installed_type), Some(candidate_type)) if installed_type == candidate_type => 0,
            _ => 1,
        };

        let scope_rank = match (self.config.preferred_scope, installer.scope) {
            (Some(preferred), Some(scope)) if preferred == scope => 0,
            (Some(_), None) => 1,
            (Some(_), Some(_)) => 2,
            (None, _) => 0,
        };

        let locale_rank = installer
            .locale
            .as_deref()
            .and_then(|locale| {
                self.config
                    .preferred_locales
                    .iter()
                    .position(|preferred| preferred.eq_ignore_ascii_case(locale))
            })
            .unwrap_or(self.config.preferred_locales.len());

        (architecture_rank, exact_type_rank, scope_rank, locale_rank)
    }
}

impl InstallerSelector for ManifestComparator {
    fn select_preferred_installer(
        &self,
        manifest: &PackageManifest,
        installed: Option<&InstalledPackageVersion>,
    ) -> InstallerSelection {
        let mut selection = InstallerSelection::default();
        let mut applicable = Vec::new();

        for installer in &manifest.installers {
            let reasons = self.inapplicabilities(installer, installed);
            if reasons.is_empty() {
                applicable.push(installer);
            } else {
                debug!(
                    package = %manifest.id,
                    version = %manifest.version,
                    architecture = installer.architecture.as_str(),
                    ?reasons,
                    "installer is not applicable"
                );
                selection.inapplicabilities.push(reasons);
            }
        }

        selection.installer = applicable
            .into_iter()
            .min_by_key(|installer| self.rank(installer, installed))
            .cloned();
        selection
    }
}
