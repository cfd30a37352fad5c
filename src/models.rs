//! Data models for managed tools and their check/install results

use std::fmt;
use std::path::PathBuf;

use crate::installer::InstallError;
use crate::platform::PlatformInfo;

/// Where the newest published version of a tool can be looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatestSource {
    /// HashiCorp checkpoint API (`current_version` field)
    Checkpoint { product: &'static str },
    /// GitHub "latest release" endpoint (`tag_name` field)
    GithubRelease { repo: &'static str },
}

/// Shape of the downloaded release artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Zip archive containing the binary at its root
    Zip,
    /// The executable itself
    Binary,
}

/// Download location template for a tool's release artifact
///
/// The template may contain `{version}`, `{os}` and `{arch}` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Artifact {
    pub url_template: &'static str,
    pub kind: ArtifactKind,
}

/// Static descriptor of a managed external CLI tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    /// Display name (e.g., "terraform")
    pub name: &'static str,
    /// Executable name looked up on the search path
    pub binary: &'static str,
    /// Lowest version considered usable
    pub min_version: &'static str,
    /// Version we nudge users towards, if any
    pub recommended_version: Option<&'static str>,
    /// Arguments that make the tool print its version
    pub version_args: &'static [&'static str],
    /// Metadata endpoint for the latest release
    pub latest: LatestSource,
    /// Version used when the metadata endpoint cannot be reached
    pub fallback_version: &'static str,
    pub artifact: Artifact,
    /// Homebrew formula preferred on macOS
    pub brew_formula: Option<&'static str>,
}

impl ToolSpec {
    /// Expand the artifact template for a platform and version
    pub fn download_url(&self, platform: &PlatformInfo, version: &str) -> String {
        self.artifact
            .url_template
            .replace("{version}", version)
            .replace("{os}", platform.os.vendor_token())
            .replace("{arch}", platform.arch.vendor_token())
    }
}

/// Outcome class of a version check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolState {
    /// Meets the minimum and the recommended version
    Ok,
    /// Meets the minimum but not the recommended version
    BelowRecommended,
    /// Older than the minimum version
    Outdated,
    /// Not found on the search path
    Missing,
    /// Found, but no version could be parsed from its output
    Unknown,
}

impl ToolState {
    /// Get the display icon for this state
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Ok => "✓",
            Self::BelowRecommended => "!",
            Self::Outdated => "↑",
            Self::Missing => "✗",
            Self::Unknown => "?",
        }
    }

    /// Short label used in status lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::BelowRecommended => "below recommended",
            Self::Outdated => "outdated",
            Self::Missing => "missing",
            Self::Unknown => "unknown version",
        }
    }

    /// Whether this state calls for an install or upgrade
    ///
    /// Unknown versions are left alone: there is nothing to compare against.
    pub fn needs_install(&self) -> bool {
        matches!(self, Self::Missing | Self::Outdated | Self::BelowRecommended)
    }

    /// Whether the detected version satisfies the tool's minimum
    pub fn satisfies_minimum(&self) -> bool {
        matches!(self, Self::Ok | Self::BelowRecommended)
    }
}

impl fmt::Display for ToolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of checking one tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub state: ToolState,
    /// Detected version, `None` when missing or unparseable
    pub version: Option<String>,
}

impl ToolStatus {
    pub fn missing() -> Self {
        Self {
            state: ToolState::Missing,
            version: None,
        }
    }

    pub fn unknown() -> Self {
        Self {
            state: ToolState::Unknown,
            version: None,
        }
    }

    pub fn detected(state: ToolState, version: impl Into<String>) -> Self {
        Self {
            state,
            version: Some(version.into()),
        }
    }

    /// Detected version or an empty string
    pub fn version_str(&self) -> &str {
        self.version.as_deref().unwrap_or("")
    }
}

/// How a tool ended up on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallMethod {
    /// Installed or upgraded through Homebrew
    Homebrew,
    /// Downloaded and placed into a directory
    Download { path: PathBuf, on_path: bool },
}

/// Result of one install attempt
#[derive(Debug)]
pub enum InstallOutcome {
    Installed {
        tool: &'static str,
        version: String,
        method: InstallMethod,
    },
    Failed {
        tool: &'static str,
        error: InstallError,
    },
}

impl InstallOutcome {
    pub fn tool(&self) -> &'static str {
        match self {
            Self::Installed { tool, .. } | Self::Failed { tool, .. } => tool,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
