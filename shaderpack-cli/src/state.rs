use std::path::PathBuf;

use clap::ValueEnum;

// ─── Variant ─────────────────────────────────────────────────────────

/// Which generation of the default shader sources is being packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Single `default.metal` with a separate debug build for macOS.
    Legacy,
    /// `master_source.metal` pulling in the split shader files.
    Master,
}

impl Variant {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Master => "master",
        }
    }

    pub fn has_debug_flavor(&self) -> bool {
        matches!(self, Self::Legacy)
    }

    pub fn preprocesses_source(&self) -> bool {
        matches!(self, Self::Master)
    }
}

// ─── Target ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderTarget {
    MacOs,
    IosDevice,
    IosSimulator,
}

impl ShaderTarget {
    /// Compilation order.
    pub const BUILD_ORDER: [ShaderTarget; 3] = [Self::MacOs, Self::IosDevice, Self::IosSimulator];

    /// Order of the branches in the generated `#if` ladder.
    pub const HEADER_ORDER: [ShaderTarget; 3] = [Self::MacOs, Self::IosSimulator, Self::IosDevice];

    pub fn label(&self) -> &'static str {
        match self {
            Self::MacOs => "macos",
            Self::IosDevice => "ios",
            Self::IosSimulator => "ios simulator",
        }
    }

    pub fn sdk(&self) -> &'static str {
        match self {
            Self::MacOs => "macosx",
            Self::IosDevice => "iphoneos",
            Self::IosSimulator => "iphonesimulator",
        }
    }

    pub fn target_macro(&self) -> &'static str {
        match self {
            Self::MacOs => "TARGET_OS_OSX",
            Self::IosDevice => "TARGET_OS_IOS",
            Self::IosSimulator => "TARGET_OS_SIMULATOR",
        }
    }

    pub fn artifact_suffix(&self) -> &'static str {
        match self {
            Self::MacOs => "",
            Self::IosDevice => ".ios",
            Self::IosSimulator => ".ios_sim",
        }
    }

    /// Minimum OS version flag, if the target takes one.
    pub fn min_version_flag(&self, versions: &MinVersions) -> Option<String> {
        match self {
            Self::MacOs => Some(format!("-mmacosx-version-min={}", versions.macos)),
            Self::IosDevice => Some(format!("-mios-version-min={}", versions.ios)),
            Self::IosSimulator => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinVersions {
    pub macos: String,
    pub ios: String,
}

impl Default for MinVersions {
    fn default() -> Self {
        Self {
            macos: "10.13".to_string(),
            ios: "8.0".to_string(),
        }
    }
}

// ─── Flavor ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Release,
    Debug,
}

impl Flavor {
    pub fn artifact_suffix(&self) -> &'static str {
        match self {
            Self::Release => "",
            Self::Debug => ".debug",
        }
    }
}

// ─── Failure policy ──────────────────────────────────────────────────

/// What to do when an external tool exits unsuccessfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    Abort,
    /// Log and carry on with whatever the tool left behind.
    Ignore,
}

// ─── Tool status ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    Found { version: String, path: PathBuf },
    NotFound,
}

impl ToolStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ToolSet {
    pub xcrun: ToolStatus,
    pub cpp: ToolStatus,
}

impl Default for ToolSet {
    fn default() -> Self {
        Self {
            xcrun: ToolStatus::NotFound,
            cpp: ToolStatus::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_order_puts_simulator_before_device() {
        let macros: Vec<_> = ShaderTarget::HEADER_ORDER
            .iter()
            .map(|t| t.target_macro())
            .collect();
        assert_eq!(
            macros,
            ["TARGET_OS_OSX", "TARGET_OS_SIMULATOR", "TARGET_OS_IOS"]
        );
    }

    #[test]
    fn simulator_has_no_min_version() {
        let versions = MinVersions::default();
        assert_eq!(
            ShaderTarget::MacOs.min_version_flag(&versions).as_deref(),
            Some("-mmacosx-version-min=10.13")
        );
        assert_eq!(
            ShaderTarget::IosDevice.min_version_flag(&versions).as_deref(),
            Some("-mios-version-min=8.0")
        );
        assert_eq!(ShaderTarget::IosSimulator.min_version_flag(&versions), None);
    }

    #[test]
    fn only_legacy_builds_debug_flavor() {
        assert!(Variant::Legacy.has_debug_flavor());
        assert!(!Variant::Master.has_debug_flavor());
        assert!(Variant::Master.preprocesses_source());
    }
}
