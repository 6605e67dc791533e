mod catalog_source;
mod package;
mod registry_index;

pub use catalog_source::RegistrySource;
pub use package::RegistryPackage;
pub use registry_index::{ConfiguredRegistryIndex, ManifestEntry, RegistryIndex};
