mod applicability;
mod pin_policy;
mod selector;

pub use applicability::is_update_version_applicable;
pub use pin_policy::{evaluate_pin, pin_restricts, PinDecision};
pub use selector::{
    Inapplicability, InstallerSelection, InstallerSelector, ManifestComparator, SelectorConfig,
};

#[cfg(test)]
mod tests;
