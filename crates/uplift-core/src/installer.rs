use serde::{Deserialize, Serialize};

use crate::installer_type::InstallerType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    Neutral,
    X86,
    X64,
    Arm,
    Arm64,
}

impl Architecture {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::X86 => "x86",
            Self::X64 => "x64",
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "neutral" => Some(Self::Neutral),
            "x86" | "i686" => Some(Self::X86),
            "x64" | "x86_64" | "amd64" => Some(Self::X64),
            "arm" => Some(Self::Arm),
            "arm64" | "aarch64" => Some(Self::Arm64),
            _ => None,
        }
    }

    pub fn host_preference() -> Vec<Self> {
        match std::env::consts::ARCH {
            "x86_64" => vec![Self::X64, Self::X86, Self::Neutral],
            "aarch64" => vec![Self::Arm64, Self::X64, Self::Arm, Self::X86, Self::Neutral],
            "x86" => vec![Self::X86, Self::Neutral],
            "arm" => vec![Self::Arm, Self::Neutral],
            _ => vec![Self::Neutral],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    User,
    Machine,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Machine => "machine",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Self::User),
            "machine" | "system" => Some(Self::Machine),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Installer {
    pub architecture: Architecture,
    #[serde(rename = "type")]
    pub installer_type: Option<InstallerType>,
    pub scope: Option<Scope>,
    pub locale: Option<String>,
    pub url: String,
    pub sha256: String,
}

impl Installer {
    pub fn effective_type(&self) -> anyhow::Result<InstallerType> {
        if let Some(installer_type) = self.installer_type {
            return Ok(installer_type);
        }

        InstallerType::infer_from_url(&self.url).ok_or_else(|| {
            anyhow::anyhow!(
                "could not infer installer type from URL '{}' for architecture '{}'; set installer.type explicitly",
                self.url,
                self.architecture.as_str()
            )
        })
    }
}
