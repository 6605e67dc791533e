use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallerType {
    Msi,
    Wix,
    Msix,
    Exe,
    Inno,
    Nullsoft,
    Burn,
    Portable,
    Zip,
    Pkg,
    Dmg,
    AppImage,
}

impl InstallerType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Msi => "msi",
            Self::Wix => "wix",
            Self::Msix => "msix",
            Self::Exe => "exe",
            Self::Inno => "inno",
            Self::Nullsoft => "nullsoft",
            Self::Burn => "burn",
            Self::Portable => "portable",
            Self::Zip => "zip",
            Self::Pkg => "pkg",
            Self::Dmg => "dmg",
            Self::AppImage => "appimage",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "msi" => Some(Self::Msi),
            "wix" => Some(Self::Wix),
            "msix" | "appx" => Some(Self::Msix),
            "exe" => Some(Self::Exe),
            "inno" => Some(Self::Inno),
            "nullsoft" | "nsis" => Some(Self::Nullsoft),
            "burn" => Some(Self::Burn),
            "portable" | "bin" => Some(Self::Portable),
            "zip" => Some(Self::Zip),
            "pkg" => Some(Self::Pkg),
            "dmg" => Some(Self::Dmg),
            "appimage" => Some(Self::AppImage),
            _ => None,
        }
    }

    pub fn infer_from_url(url: &str) -> Option<Self> {
        let lower = url.to_ascii_lowercase();
        if lower.ends_with(".msi") {
            return Some(Self::Msi);
        }
        if lower.ends_with(".msix") || lower.ends_with(".appx") {
            return Some(Self::Msix);
        }
        if lower.ends_with(".exe") {
            return Some(Self::Exe);
        }
        if lower.ends_with(".zip") {
            return Some(Self::Zip);
        }
        if lower.ends_with(".pkg") {
            return Some(Self::Pkg);
        }
        if lower.ends_with(".dmg") {
            return Some(Self::Dmg);
        }
        if lower.ends_with(".appimage") {
            return Some(Self::AppImage);
        }
        None
    }

    // Installer technologies that register the package the same way can upgrade each other.
    fn family(self) -> u8 {
        match self {
            Self::Msi | Self::Wix => 0,
            Self::Exe | Self::Inno | Self::Nullsoft | Self::Burn => 1,
            Self::Msix => 2,
            Self::Portable | Self::Zip => 3,
            Self::Pkg => 4,
            Self::Dmg => 5,
            Self::AppImage => 6,
        }
    }

    pub fn is_compatible_with(self, installed: InstallerType) -> bool {
        self.family() == installed.family()
    }
}
