use uplift_core::{
    metadata, Architecture, InstalledPackageVersion, PackageManifest, PinState, Scope, Version,
};

use super::*;

fn manifest(input: &str) -> PackageManifest {
    PackageManifest::from_toml_str(input).expect("manifest must parse")
}

fn version(input: &str) -> Version {
    Version::parse(input).expect("version must parse")
}

fn x64_only() -> ManifestComparator {
    ManifestComparator::new(SelectorConfig {
        architectures: vec![Architecture::X64, Architecture::X86, Architecture::Neutral],
        ..SelectorConfig::default()
    })
}

const TWO_INSTALLERS: &str = r#"
id = "Contoso.Tool"
version = "2.0.0"

[default_localization]
locale = "en-US"
package_name = "Tool"

[[installers]]
architecture = "x86"
type = "msi"
scope = "machine"
url = "https://example.test/tool-x86.msi"
sha256 = "x86"

[[installers]]
architecture = "x64"
type = "msi"
scope = "machine"
url = "https://example.test/tool-x64.msi"
sha256 = "x64"
"#;

#[test]
fn pin_policy_matrix() {
    // (state, default, include_pinned, force)
    let expected = [
        (PinState::None, true, true, true),
        (PinState::UserPin, false, true, true),
        (PinState::Gating, false, false, true),
        (PinState::Blocking, false, false, true),
        (PinState::PinnedByManifest, true, true, true),
    ];

    for (state, default, include_pinned, force) in expected {
        let admitted = |decision: PinDecision| decision == PinDecision::Admit;
        assert_eq!(
            admitted(evaluate_pin(state, false, false)),
            default,
            "{state:?} default"
        );
        assert_eq!(
            admitted(evaluate_pin(state, true, false)),
            include_pinned,
            "{state:?} include_pinned"
        );
        assert_eq!(
            admitted(evaluate_pin(state, false, true)),
            force,
            "{state:?} force"
        );
    }
    assert_eq!(PinState::ALL.len(), expected.len());
}

#[test]
fn hard_pins_are_not_admitted_by_inclusion_alone() {
    for state in [PinState::Gating, PinState::Blocking] {
        assert!(pin_restricts(state, true));
        assert_eq!(evaluate_pin(state, true, false), PinDecision::Reject);
        assert_eq!(evaluate_pin(state, true, true), PinDecision::Admit);
    }
}

#[test]
fn update_applicability_is_strict() {
    assert!(is_update_version_applicable(&version("1.0"), &version("1.0.1")));
    assert!(!is_update_version_applicable(&version("1.0"), &version("1.0.0")));
    assert!(!is_update_version_applicable(&version("2.0"), &version("1.9")));
    assert!(!is_update_version_applicable(&version("1.0"), &version("1.0.0.0")));
    assert!(!is_update_version_applicable(&version("1.2.3"), &version("1.2.3.0")));
    assert!(!is_update_version_applicable(&version("1.2.3"), &version("1.2.3+build7")));
    assert!(is_update_version_applicable(&version("1.2.3"), &version("1.2.3.1")));
    assert!(is_update_version_applicable(&Version::Unknown, &version("0.1")));
}

#[test]
fn selects_most_preferred_architecture() {
    let selection = x64_only().select_preferred_installer(&manifest(TWO_INSTALLERS), None);
    let installer = selection.installer.expect("an installer must be selected");
    assert_eq!(installer.architecture, Architecture::X64);
    assert!(selection.inapplicabilities.is_empty());
}

#[test]
fn records_reasons_for_every_rejected_installer() {
    let comparator = ManifestComparator::new(SelectorConfig {
        architectures: vec![Architecture::Arm64],
        required_scope: Some(Scope::User),
        ..SelectorConfig::default()
    });

    let selection = comparator.select_preferred_installer(&manifest(TWO_INSTALLERS), None);
    assert!(selection.installer.is_none());
    assert_eq!(selection.inapplicabilities.len(), 2);
    for reasons in &selection.inapplicabilities {
        assert!(reasons.contains(&Inapplicability::Architecture));
        assert!(reasons.contains(&Inapplicability::RequiredScope));
    }
    assert!(!selection.only_installed_type_mismatch());
}

#[test]
fn installed_type_mismatch_alone_is_distinguishable() {
    let installed = InstalledPackageVersion::new(version("1.0"))
        .with_metadata(metadata::INSTALLED_TYPE, "msix");

    let selection = x64_only().select_preferred_installer(&manifest(TWO_INSTALLERS), Some(&installed));
    assert!(selection.installer.is_none());
    assert!(selection.only_installed_type_mismatch());
}

#[test]
fn installed_type_mismatch_mixed_with_other_reasons_is_generic() {
    let installed = InstalledPackageVersion::new(version("1.0"))
        .with_metadata(metadata::INSTALLED_TYPE, "msix")
        .with_metadata(metadata::INSTALLED_SCOPE, "user");

    let selection = x64_only().select_preferred_installer(&manifest(TWO_INSTALLERS), Some(&installed));
    assert!(selection.installer.is_none());
    assert!(!selection.only_installed_type_mismatch());
}

#[test]
fn compatible_installed_family_is_accepted_and_exact_type_preferred() {
    let input = r#"
id = "Contoso.Tool"
version = "2.0.0"

[default_localization]
locale = "en-US"
package_name = "Tool"

[[installers]]
architecture = "x64"
type = "msi"
url = "https://example.test/tool.msi"
sha256 = "msi"

[[installers]]
architecture = "x64"
type = "wix"
url = "https://example.test/tool-wix.msi"
sha256 = "wix"
"#;
    let installed = InstalledPackageVersion::new(version("1.0"))
        .with_metadata(metadata::INSTALLED_TYPE, "wix");

    let selection = x64_only().select_preferred_installer(&manifest(input), Some(&installed));
    let installer = selection.installer.expect("an installer must be selected");
    assert_eq!(installer.sha256, "wix");
}

#[test]
fn locale_preference_breaks_ties() {
    let input = r#"
id = "Contoso.Tool"
version = "2.0.0"

[default_localization]
locale = "en-US"
package_name = "Tool"

[[installers]]
architecture = "x64"
type = "exe"
locale = "en-US"
url = "https://example.test/tool-en.exe"
sha256 = "en"

[[installers]]
architecture = "x64"
type = "exe"
locale = "de-DE"
url = "https://example.test/tool-de.exe"
sha256 = "de"
"#;
    let comparator = ManifestComparator::new(SelectorConfig {
        architectures: vec![Architecture::X64],
        preferred_locales: vec!["de-DE".to_string()],
        ..SelectorConfig::default()
    });

    let selection = comparator.select_preferred_installer(&manifest(input), None);
    assert_eq!(
        selection.installer.expect("must select").locale.as_deref(),
        Some("de-DE")
    );
}

#[test]
fn selection_is_deterministic() {
    let parsed = manifest(TWO_INSTALLERS);
    let first = x64_only().select_preferred_installer(&parsed, None);
    let second = x64_only().select_preferred_installer(&parsed, None);
    assert_eq!(first, second);
}
