#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    UpgradeUnknownVersionExplanation,
    UpgradeDifferentInstallTechnologyInNewerVersions,
    UpgradeIsPinned,
    UpdateNotApplicable,
    NoApplicableInstallers,
    PackageAlreadyInstalled,
    ConvertInstallFlowToUpgrade,
    NoPackageFound,
    NoInstalledPackageFound,
    MultiplePackagesFound(Vec<String>),
    NoManifestFound { version: String },
    VersionIsPinned { version: String },
    UpgradeUnknownVersionCount(usize),
    UpgradeRequireExplicitCount(usize),
}

impl Message {
    pub fn level(&self) -> Level {
        match self {
            Self::NoApplicableInstallers
            | Self::NoPackageFound
            | Self::NoInstalledPackageFound
            | Self::MultiplePackagesFound(_)
            | Self::NoManifestFound { .. } => Level::Error,
            Self::PackageAlreadyInstalled | Self::VersionIsPinned { .. } => Level::Warn,
            _ => Level::Info,
        }
    }
}
