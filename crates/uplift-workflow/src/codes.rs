use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TerminationCode {
    UpdateNotApplicable,
    NoApplicableInstaller,
    PackageIsPinned,
    PackageAlreadyInstalled,
    UpdateAllPartialFailure,
    NoPackageFound,
    MultiplePackagesFound,
    NoManifestFound,
    InstallFailed,
    InternalError,
}

impl TerminationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpdateNotApplicable => "update-not-applicable",
            Self::NoApplicableInstaller => "no-applicable-installer",
            Self::PackageIsPinned => "package-is-pinned",
            Self::PackageAlreadyInstalled => "package-already-installed",
            Self::UpdateAllPartialFailure => "update-all-partial-failure",
            Self::NoPackageFound => "no-package-found",
            Self::MultiplePackagesFound => "multiple-packages-found",
            Self::NoManifestFound => "no-manifest-found",
            Self::InstallFailed => "install-failed",
            Self::InternalError => "internal-error",
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Self::InternalError => 1,
            Self::NoPackageFound => 10,
            Self::MultiplePackagesFound => 11,
            Self::NoManifestFound => 12,
            Self::NoApplicableInstaller => 20,
            Self::UpdateNotApplicable => 21,
            Self::PackageIsPinned => 22,
            Self::PackageAlreadyInstalled => 23,
            Self::UpdateAllPartialFailure => 30,
            Self::InstallFailed => 31,
        }
    }
}

impl fmt::Display for TerminationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
