use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use uplift_core::{PinRule, PinState};

use crate::layout::validate_package_id;
use crate::PrefixLayout;

pub fn write_pin(layout: &PrefixLayout, id: &str, rule: &PinRule) -> Result<PathBuf> {
    validate_package_id(id)?;
    if !matches!(
        rule.state,
        PinState::UserPin | PinState::Gating | PinState::Blocking
    ) {
        anyhow::bail!("cannot record a '{}' pin", rule.state.as_str());
    }

    let mut payload = format!("state={}\n", rule.state.as_str());
    if let Some(range) = &rule.gated_range {
        payload.push_str(&format!("range={range}\n"));
    }

    let pin_path = layout.pin_path(id);
    if let Some(parent) = pin_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create pin dir: {}", parent.display()))?;
    }
    fs::write(&pin_path, payload.as_bytes())
        .with_context(|| format!("failed to write pin: {}", pin_path.display()))?;
    Ok(pin_path)
}

pub fn read_pin(layout: &PrefixLayout, id: &str) -> Result<Option<PinRule>> {
    validate_package_id(id)?;
    let pin_path = layout.pin_path(id);
    if !pin_path.exists() {
        return Ok(None);
    }

    let value = fs::read_to_string(&pin_path)
        .with_context(|| format!("failed to read pin: {}", pin_path.display()))?;
    parse_pin(&value).with_context(|| format!("failed to parse pin: {}", pin_path.display()))
}

pub fn read_all_pins(layout: &PrefixLayout) -> Result<BTreeMap<String, PinRule>> {
    let dir = layout.pins_dir();
    if !dir.exists() {
        return Ok(BTreeMap::new());
    }

    let mut pins = BTreeMap::new();
    for entry in fs::read_dir(&dir)
        .with_context(|| format!("failed to read pin state directory: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|v| v.to_str()) != Some("pin") {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|v| v.to_str()) else {
            continue;
        };
        let value = fs::read_to_string(&path)
            .with_context(|| format!("failed to read pin: {}", path.display()))?;
        let parsed = parse_pin(&value)
            .with_context(|| format!("failed to parse pin: {}", path.display()))?;
        if let Some(rule) = parsed {
            pins.insert(stem.to_string(), rule);
        }
    }

    Ok(pins)
}

pub fn remove_pin(layout: &PrefixLayout, id: &str) -> Result<bool> {
    validate_package_id(id)?;
    let pin_path = layout.pin_path(id);
    if !pin_path.exists() {
        return Ok(false);
    }

    fs::remove_file(&pin_path)
        .with_context(|| format!("failed to remove pin: {}", pin_path.display()))?;
    Ok(true)
}

// An empty pin file is treated as absent.
fn parse_pin(raw: &str) -> Result<Option<PinRule>> {
    let mut state = None;
    let mut range = None;
    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        match k {
            "state" => {
                state = Some(
                    PinState::parse(v).with_context(|| format!("unknown pin state '{v}'"))?,
                )
            }
            "range" => {
                range = Some(
                    semver::VersionReq::parse(v)
                        .with_context(|| format!("invalid gating range '{v}'"))?,
                )
            }
            _ => {}
        }
    }

    let Some(state) = state else {
        return Ok(None);
    };
    Ok(Some(PinRule {
        state,
        gated_range: range,
    }))
}
