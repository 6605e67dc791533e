use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};
use uplift_core::{InstalledPackageVersion, PinRule};
use uplift_workflow::{PackageSource, SearchMatch, SearchRequest, SearchResult};

use crate::{ConfiguredRegistryIndex, RegistryPackage};

#[derive(Debug, Default)]
pub struct RegistrySource {
    index: ConfiguredRegistryIndex,
    installed: BTreeMap<String, InstalledPackageVersion>,
    pins: BTreeMap<String, PinRule>,
}

impl RegistrySource {
    pub fn new(index: ConfiguredRegistryIndex) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn with_installed(
        mut self,
        installed: impl IntoIterator<Item = (String, InstalledPackageVersion)>,
    ) -> Self {
        self.installed.extend(installed);
        self
    }

    pub fn with_pins(mut self, pins: impl IntoIterator<Item = (String, PinRule)>) -> Self {
        self.pins.extend(pins);
        self
    }

    // `None` when the package is neither in a catalog nor installed.
    pub fn package(&self, id: &str) -> Result<Option<RegistryPackage>> {
        let by_source = self.index.package_entries_by_source(id)?;
        let installed = self.installed.get(id).cloned();
        if by_source.is_empty() && installed.is_none() {
            return Ok(None);
        }

        let package = RegistryPackage::new(id, by_source, installed, self.pins.get(id));
        debug!(
            package = id,
            available = package.is_available(),
            installed = self.installed.contains_key(id),
            "loaded package"
        );
        Ok(Some(package))
    }

    fn resolve_query(&self, query: &str) -> Result<Option<String>> {
        if let Some(id) = self.index.canonical_id(query)? {
            return Ok(Some(id));
        }
        Ok(self
            .installed
            .keys()
            .find(|id| id.eq_ignore_ascii_case(query))
            .cloned())
    }
}

impl PackageSource for RegistrySource {
    fn search(&self, request: &SearchRequest) -> Result<SearchResult> {
        let ids: Vec<String> = match (&request.query, request.installed_only) {
            (Some(query), _) => self.resolve_query(query)?.into_iter().collect(),
            (None, true) => self.installed.keys().cloned().collect(),
            (None, false) => {
                let mut ids: BTreeSet<String> = self.index.package_ids()?.into_iter().collect();
                ids.extend(self.installed.keys().cloned());
                ids.into_iter().collect()
            }
        };

        let mut matches = Vec::new();
        for id in ids {
            if request.installed_only && !self.installed.contains_key(&id) {
                continue;
            }
            let package = match self.package(&id) {
                Ok(package) => package,
                // A catalog problem with one package must not hide the others from bulk runs.
                Err(err) if request.query.is_none() => {
                    warn!(package = %id, error = %format!("{err:#}"), "skipping package");
                    continue;
                }
                Err(err) => return Err(err),
            };
            if let Some(package) = package {
                matches.push(SearchMatch {
                    package: Arc::new(package),
                });
            }
        }

        debug!(
            query = ?request.query,
            installed_only = request.installed_only,
            matches = matches.len(),
            "searched catalog"
        );
        Ok(SearchResult { matches })
    }
}
