use serde::{Deserialize, Serialize};

use crate::Version;

// Gating and Blocking are hard pins that only force overrides. PinnedByManifest only has
// meaning on installed metadata.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PinState {
    #[default]
    None,
    #[serde(rename = "pinning")]
    UserPin,
    Gating,
    Blocking,
    PinnedByManifest,
}

impl PinState {
    pub const ALL: [PinState; 5] = [
        Self::None,
        Self::UserPin,
        Self::Gating,
        Self::Blocking,
        Self::PinnedByManifest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::UserPin => "pinning",
            Self::Gating => "gating",
            Self::Blocking => "blocking",
            Self::PinnedByManifest => "pinned-by-manifest",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Some(Self::None),
            "pinning" | "user" | "user-pin" => Some(Self::UserPin),
            "gating" => Some(Self::Gating),
            "blocking" => Some(Self::Blocking),
            "pinned-by-manifest" | "pinnedbymanifest" => Some(Self::PinnedByManifest),
            _ => None,
        }
    }

    pub fn is_hard(self) -> bool {
        matches!(self, Self::Gating | Self::Blocking)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRule {
    pub state: PinState,
    pub gated_range: Option<semver::VersionReq>,
}

impl PinRule {
    pub fn new(state: PinState) -> Self {
        Self {
            state,
            gated_range: None,
        }
    }

    pub fn gating(range: semver::VersionReq) -> Self {
        Self {
            state: PinState::Gating,
            gated_range: Some(range),
        }
    }

    pub fn classify(&self, version: &Version) -> PinState {
        match self.state {
            PinState::Gating => match (&self.gated_range, version.semver()) {
                (Some(range), Some(parsed)) if range.matches(parsed) => PinState::None,
                _ => PinState::Gating,
            },
            PinState::PinnedByManifest => PinState::None,
            state => state,
        }
    }
}
