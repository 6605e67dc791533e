use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use uplift_core::{Architecture, InstalledPackageVersion, InstallerType, Scope};

use crate::layout::validate_package_id;
use crate::{InstallReceipt, PrefixLayout};

pub fn write_install_receipt(layout: &PrefixLayout, receipt: &InstallReceipt) -> Result<PathBuf> {
    validate_package_id(&receipt.id)?;

    let mut payload = String::new();
    payload.push_str(&format!("id={}\n", receipt.id));
    payload.push_str(&format!("version={}\n", receipt.version));
    if let Some(source) = &receipt.source {
        payload.push_str(&format!("source={}\n", source));
    }
    if let Some(installer_type) = receipt.installer_type {
        payload.push_str(&format!("installer_type={}\n", installer_type.as_str()));
    }
    if let Some(scope) = receipt.scope {
        payload.push_str(&format!("scope={}\n", scope.as_str()));
    }
    if let Some(architecture) = receipt.architecture {
        payload.push_str(&format!("architecture={}\n", architecture.as_str()));
    }
    if let Some(url) = &receipt.installer_url {
        payload.push_str(&format!("installer_url={}\n", url));
    }
    if receipt.require_explicit_upgrade {
        payload.push_str("require_explicit_upgrade=true\n");
    }
    payload.push_str(&format!(
        "installed_at_unix={}\n",
        receipt.installed_at_unix
    ));

    let path = layout.receipt_path(&receipt.id);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create install state dir: {}", parent.display()))?;
    }
    fs::write(&path, payload.as_bytes())
        .with_context(|| format!("failed to write install receipt: {}", path.display()))?;
    Ok(path)
}

pub fn read_install_receipt(layout: &PrefixLayout, id: &str) -> Result<Option<InstallReceipt>> {
    validate_package_id(id)?;
    let path = layout.receipt_path(id);
    if !path.exists() {
        return Ok(None);
    }

    load_receipt(&path).map(Some)
}

pub fn read_install_receipts(layout: &PrefixLayout) -> Result<Vec<InstallReceipt>> {
    let mut receipts = Vec::new();
    for path in receipt_paths(layout)? {
        receipts.push(load_receipt(&path)?);
    }

    receipts.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(receipts)
}

// Unreadable receipts are skipped with a warning so one damaged entry does not hide every
// other installed package from bulk upgrades.
pub fn read_installed_versions(
    layout: &PrefixLayout,
) -> Result<BTreeMap<String, InstalledPackageVersion>> {
    let mut installed = BTreeMap::new();
    for path in receipt_paths(layout)? {
        let loaded = load_receipt(&path).and_then(|receipt| {
            let version = receipt.to_installed_version()?;
            Ok((receipt.id, version))
        });
        match loaded {
            Ok((id, version)) => {
                installed.insert(id, version);
            }
            Err(err) => warn!(
                receipt = %path.display(),
                error = %format!("{err:#}"),
                "skipping unreadable install receipt"
            ),
        }
    }
    Ok(installed)
}

fn receipt_paths(layout: &PrefixLayout) -> Result<Vec<PathBuf>> {
    let dir = layout.installed_state_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(&dir)
        .with_context(|| format!("failed to read install state directory: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|v| v.to_str()) == Some("receipt") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn load_receipt(path: &Path) -> Result<InstallReceipt> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read install receipt: {}", path.display()))?;
    parse_receipt(&raw)
        .with_context(|| format!("failed to parse install receipt: {}", path.display()))
}

pub(crate) fn parse_receipt(raw: &str) -> Result<InstallReceipt> {
    let mut id = None;
    let mut version = None;
    let mut source = None;
    let mut installer_type = None;
    let mut scope = None;
    let mut architecture = None;
    let mut installer_url = None;
    let mut require_explicit_upgrade = false;
    let mut installed_at_unix = None;

    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        match k {
            "id" => id = Some(v.to_string()),
            "version" => version = Some(v.to_string()),
            "source" => source = Some(v.to_string()),
            "installer_type" => {
                installer_type = Some(
                    InstallerType::parse(v)
                        .with_context(|| format!("unknown installer_type '{v}'"))?,
                )
            }
            "scope" => {
                scope = Some(Scope::parse(v).with_context(|| format!("unknown scope '{v}'"))?)
            }
            "architecture" => {
                architecture = Some(
                    Architecture::parse(v)
                        .with_context(|| format!("unknown architecture '{v}'"))?,
                )
            }
            "installer_url" => installer_url = Some(v.to_string()),
            "require_explicit_upgrade" => {
                require_explicit_upgrade = v
                    .parse()
                    .context("require_explicit_upgrade must be true or false")?
            }
            "installed_at_unix" => {
                installed_at_unix = Some(v.parse().context("installed_at_unix must be u64")?)
            }
            _ => {}
        }
    }

    Ok(InstallReceipt {
        id: id.context("missing id")?,
        version: version.context("missing version")?,
        source,
        installer_type,
        scope,
        architecture,
        installer_url,
        require_explicit_upgrade,
        installed_at_unix: installed_at_unix.context("missing installed_at_unix")?,
    })
}
