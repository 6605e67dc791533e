use super::*;

fn manifest(input: &str) -> PackageManifest {
    PackageManifest::from_toml_str(input).expect("manifest must parse")
}

#[test]
fn parse_manifest() {
    let parsed = manifest(
        r#"
id = "BurntSushi.ripgrep"
version = "14.1.0"
license = "MIT"

[default_localization]
locale = "en-US"
package_name = "ripgrep"
publisher = "Andrew Gallant"

[[localizations]]
locale = "de-DE"
package_name = "ripgrep (de)"

[[installers]]
architecture = "x64"
type = "zip"
scope = "user"
url = "https://example.test/ripgrep-14.1.0-x64.zip"
sha256 = "abc"
"#,
    );

    assert_eq!(parsed.id, "BurntSushi.ripgrep");
    assert_eq!(parsed.version.to_string(), "14.1.0");
    assert!(!parsed.require_explicit_upgrade);
    assert_eq!(parsed.installers.len(), 1);
    assert_eq!(parsed.installers[0].architecture, Architecture::X64);
    assert_eq!(parsed.installers[0].scope, Some(Scope::User));
    assert_eq!(parsed.package_name(), "ripgrep");
}

#[test]
fn manifest_rejects_unknown_version() {
    let err = PackageManifest::from_toml_str(
        r#"
id = "tool"
version = "unknown"

[default_localization]
locale = "en-US"
package_name = "tool"
"#,
    )
    .expect_err("unknown version must be rejected");
    assert!(err.to_string().contains("concrete version"));
}

#[test]
fn manifest_rejects_duplicate_localization() {
    let err = PackageManifest::from_toml_str(
        r#"
id = "tool"
version = "1.0.0"

[default_localization]
locale = "en-US"
package_name = "tool"

[[localizations]]
locale = "EN-us"
package_name = "tool again"
"#,
    )
    .expect_err("duplicate locale must be rejected");
    assert!(err.to_string().contains("duplicate localization"));
}

#[test]
fn manifest_rejects_installer_without_inferable_type() {
    let err = PackageManifest::from_toml_str(
        r#"
id = "tool"
version = "1.0.0"

[default_localization]
locale = "en-US"
package_name = "tool"

[[installers]]
architecture = "x64"
url = "https://example.test/tool.bin.gz"
sha256 = "abc"
"#,
    )
    .expect_err("installer type must be inferable");
    assert!(format!("{err:#}").contains("could not infer installer type"));
}

#[test]
fn apply_locale_prefers_exact_then_language() {
    let mut parsed = manifest(
        r#"
id = "tool"
version = "1.0.0"

[default_localization]
locale = "en-US"
package_name = "Tool"

[[localizations]]
locale = "fr-CA"
package_name = "Outil (CA)"

[[localizations]]
locale = "fr-FR"
package_name = "Outil"
"#,
    );

    parsed.apply_locale(Some("fr-FR"));
    assert_eq!(parsed.package_name(), "Outil");

    parsed.apply_locale(Some("fr-BE"));
    assert_eq!(parsed.package_name(), "Outil (CA)");

    parsed.apply_locale(Some("ja-JP"));
    assert_eq!(parsed.package_name(), "Tool");

    parsed.apply_locale(None);
    assert_eq!(parsed.package_name(), "Tool");
}

#[test]
fn version_orders_unknown_below_everything() {
    let unknown = Version::parse("Unknown").expect("must parse");
    let zero = Version::parse("0.0.1").expect("must parse");
    assert!(unknown.is_unknown());
    assert!(unknown < zero);
    assert_eq!(unknown.to_string(), UNKNOWN_VERSION);
}

#[test]
fn version_accepts_lenient_shapes() {
    let short = Version::parse("v1.2").expect("must parse");
    let full = Version::parse("1.2.0").expect("must parse");
    assert_eq!(short, full);
    assert_eq!(short.to_string(), "v1.2");

    let four = Version::parse("1.2.3.4").expect("must parse");
    let three = Version::parse("1.2.3").expect("must parse");
    let four_higher = Version::parse("1.2.3.10").expect("must parse");
    assert!(three < four);
    assert!(four < four_higher);

    let pre = Version::parse("2.0-beta").expect("must parse");
    let release = Version::parse("2.0").expect("must parse");
    assert!(pre < release);
}

#[test]
fn version_equality_ignores_trailing_zeros_and_build_metadata() {
    let version = |input: &str| Version::parse(input).expect("must parse");

    assert_eq!(version("1.0"), version("1.0.0.0"));
    assert_eq!(version("1.2.3"), version("1.2.3.0"));
    assert_eq!(version("1.2.3.4"), version("1.2.3.4.0"));
    assert_eq!(version("1.2.3"), version("1.2.3+build7"));
    assert!(version("1.2.3.0.1") > version("1.2.3"));
    assert!(version("1.2.3.1-beta") > version("1.2.3"));
    assert!(version("1.2.3.1-beta") < version("1.2.3.1"));
}

#[test]
fn version_rejects_garbage() {
    let err = Version::parse("one.two").expect_err("non-numeric version must fail");
    assert!(format!("{err:#}").contains("invalid package version"));
}

#[test]
fn pin_state_tokens_round_trip() {
    for state in PinState::ALL {
        assert_eq!(PinState::parse(state.as_str()), Some(state));
    }
    assert_eq!(PinState::parse(""), Some(PinState::None));
    assert_eq!(PinState::parse("sometimes"), None);
    assert!(PinState::Blocking.is_hard());
    assert!(PinState::Gating.is_hard());
    assert!(!PinState::UserPin.is_hard());
}

#[test]
fn pin_rule_classifies_catalog_versions() {
    let version = |input: &str| Version::parse(input).expect("must parse");
    let gating = PinRule::gating(semver::VersionReq::parse("^1.2").expect("must parse"));

    assert_eq!(gating.classify(&version("1.4.0")), PinState::None);
    assert_eq!(gating.classify(&version("2.0.0")), PinState::Gating);
    assert_eq!(gating.classify(&Version::Unknown), PinState::Gating);
    assert_eq!(
        PinRule::new(PinState::Gating).classify(&version("1.0")),
        PinState::Gating
    );
    assert_eq!(
        PinRule::new(PinState::Blocking).classify(&version("0.1")),
        PinState::Blocking
    );
    assert_eq!(
        PinRule::new(PinState::UserPin).classify(&version("9.0")),
        PinState::UserPin
    );
    assert_eq!(
        PinRule::new(PinState::PinnedByManifest).classify(&version("9.0")),
        PinState::None
    );
}

#[test]
fn installed_metadata_accessors_parse_fixed_fields() {
    let installed = InstalledPackageVersion::new(Version::parse("1.0").expect("must parse"))
        .with_metadata(metadata::PINNED_STATE, "pinned-by-manifest")
        .with_metadata(metadata::INSTALLED_TYPE, "wix")
        .with_metadata(metadata::INSTALLED_SCOPE, "machine")
        .with_metadata(metadata::INSTALLED_ARCHITECTURE, "x86_64")
        .with_metadata(metadata::SOURCE_IDENTIFIER, "main");

    assert_eq!(installed.pin_state(), PinState::PinnedByManifest);
    assert_eq!(installed.installed_type(), Some(InstallerType::Wix));
    assert_eq!(installed.installed_scope(), Some(Scope::Machine));
    assert_eq!(
        installed.metadata.get(metadata::SOURCE_IDENTIFIER).map(String::as_str),
        Some("main")
    );

    let bare = InstalledPackageVersion::new(Version::Unknown);
    assert_eq!(bare.pin_state(), PinState::None);
    assert_eq!(bare.installed_type(), None);
}

#[test]
fn installer_type_compatibility_follows_registration_family() {
    assert!(InstallerType::Wix.is_compatible_with(InstallerType::Msi));
    assert!(InstallerType::Inno.is_compatible_with(InstallerType::Exe));
    assert!(!InstallerType::Msix.is_compatible_with(InstallerType::Msi));
    assert_eq!(
        InstallerType::infer_from_url("https://example.test/Setup.EXE"),
        Some(InstallerType::Exe)
    );
}
