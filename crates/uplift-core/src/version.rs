use std::cmp::Ordering;
use std::fmt;

use anyhow::{anyhow, Context};
use semver::Prerelease;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_VERSION: &str = "unknown";

// Catalog versions are always known. Installed versions may be the `unknown` sentinel, which
// sorts below every known version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Version {
    Unknown,
    Known {
        raw: String,
        parsed: semver::Version,
        revision: Vec<u64>,
    },
}

impl Version {
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNKNOWN_VERSION) {
            return Ok(Self::Unknown);
        }

        let (parsed, revision) = parse_lenient(trimmed)
            .with_context(|| format!("invalid package version '{trimmed}'"))?;
        Ok(Self::Known {
            raw: trimmed.to_string(),
            parsed,
            revision,
        })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn semver(&self) -> Option<&semver::Version> {
        match self {
            Self::Unknown => None,
            Self::Known { parsed, .. } => Some(parsed),
        }
    }
}

// Accepts plain semver plus a leading `v`, one or two numeric components, and numeric
// components past the third. Those are returned separately as the revision with trailing
// zeros trimmed, so `1.2.3.0` equals `1.2.3` and `1.2.3.4` orders above it.
fn parse_lenient(input: &str) -> anyhow::Result<(semver::Version, Vec<u64>)> {
    let stripped = input
        .strip_prefix('v')
        .or_else(|| input.strip_prefix('V'))
        .unwrap_or(input);

    if let Ok(version) = semver::Version::parse(stripped) {
        return Ok((version, Vec::new()));
    }

    let (core, pre) = match stripped.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (stripped, None),
    };

    let mut components = Vec::new();
    for part in core.split('.') {
        let value: u64 = part
            .parse()
            .map_err(|_| anyhow!("version component '{part}' is not numeric"))?;
        components.push(value);
    }
    if components.is_empty() {
        return Err(anyhow!("version has no numeric components"));
    }

    let mut version = semver::Version::new(
        components[0],
        components.get(1).copied().unwrap_or(0),
        components.get(2).copied().unwrap_or(0),
    );
    if let Some(pre) = pre {
        version.pre =
            Prerelease::new(pre).map_err(|err| anyhow!("invalid pre-release '{pre}': {err}"))?;
    }

    let mut revision = components.get(3..).map(<[u64]>::to_vec).unwrap_or_default();
    while revision.last() == Some(&0) {
        revision.pop();
    }
    Ok((version, revision))
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Unknown, Self::Unknown) => Ordering::Equal,
            (Self::Unknown, Self::Known { .. }) => Ordering::Less,
            (Self::Known { .. }, Self::Unknown) => Ordering::Greater,
            (
                Self::Known {
                    parsed: left,
                    revision: left_revision,
                    ..
                },
                Self::Known {
                    parsed: right,
                    revision: right_revision,
                    ..
                },
            ) => (left.major, left.minor, left.patch)
                .cmp(&(right.major, right.minor, right.patch))
                .then_with(|| left_revision.cmp(right_revision))
                // Build metadata never affects precedence.
                .then_with(|| left.pre.cmp(&right.pre)),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str(UNKNOWN_VERSION),
            Self::Known { raw, .. } => f.write_str(raw),
        }
    }
}

impl TryFrom<String> for Version {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.to_string()
    }
}
