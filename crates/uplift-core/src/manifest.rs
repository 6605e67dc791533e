use std::collections::HashSet;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::installer::Installer;
use crate::version::Version;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Localization {
    pub locale: String,
    pub package_name: String,
    pub publisher: Option<String>,
    pub short_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageManifest {
    pub id: String,
    pub version: Version,
    pub homepage: Option<String>,
    pub license: Option<String>,
    #[serde(default)]
    pub require_explicit_upgrade: bool,
    pub default_localization: Localization,
    #[serde(default)]
    pub localizations: Vec<Localization>,
    #[serde(default)]
    pub installers: Vec<Installer>,
    #[serde(skip)]
    applied_locale: Option<usize>,
}

impl PackageManifest {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let manifest: Self = toml::from_str(input).context("failed to parse uplift manifest")?;
        if manifest.id.trim().is_empty() {
            return Err(anyhow!("manifest id must not be empty"));
        }
        if manifest.version.is_unknown() {
            return Err(anyhow!(
                "manifest '{}' must declare a concrete version",
                manifest.id
            ));
        }

        let mut seen_locales = HashSet::new();
        seen_locales.insert(manifest.default_localization.locale.to_ascii_lowercase());
        for localization in &manifest.localizations {
            if !seen_locales.insert(localization.locale.to_ascii_lowercase()) {
                return Err(anyhow!(
                    "duplicate localization '{}' in manifest '{}'",
                    localization.locale,
                    manifest.id
                ));
            }
        }

        for installer in &manifest.installers {
            installer.effective_type().with_context(|| {
                format!(
                    "invalid installer in manifest '{}' version {}",
                    manifest.id, manifest.version
                )
            })?;
        }
        Ok(manifest)
    }

    pub fn apply_locale(&mut self, locale: Option<&str>) {
        self.applied_locale = locale.and_then(|wanted| {
            let wanted = wanted.to_ascii_lowercase();
            let language = wanted.split('-').next().unwrap_or(&wanted).to_string();
            self.localizations
                .iter()
                .position(|l| l.locale.eq_ignore_ascii_case(&wanted))
                .or_else(|| {
                    self.localizations.iter().position(|l| {
                        l.locale
                            .split('-')
                            .next()
                            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&language))
                    })
                })
        });
    }

    pub fn localization(&self) -> &Localization {
        self.applied_locale
            .and_then(|index| self.localizations.get(index))
            .unwrap_or(&self.default_localization)
    }

    pub fn package_name(&self) -> &str {
        &self.localization().package_name
    }
}
