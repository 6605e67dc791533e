mod catalog;
mod installer;
mod installer_type;
mod manifest;
mod pin;
mod version;

pub use catalog::{metadata, InstalledPackageVersion, Package, PackageVersion, VersionKey};
pub use installer::{Architecture, Installer, Scope};
pub use installer_type::InstallerType;
pub use manifest::{Localization, PackageManifest};
pub use pin::{PinRule, PinState};
pub use version::{Version, UNKNOWN_VERSION};

#[cfg(test)]
mod tests;
