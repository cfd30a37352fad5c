//! Run configuration
//!
//! Everything a run needs from flags and the environment is gathered here once
//! and passed down explicitly.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::Duration;

/// Bound on metadata (latest version) lookups
pub const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Bound on artifact downloads
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// System-wide directory preferred for installs
pub const SYSTEM_BIN_DIR: &str = "/usr/local/bin";

/// How the run treats tools that need installing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Ask before installing
    Interactive,
    /// Install without asking
    Auto,
    /// Report status only
    CheckOnly,
}

#[derive(Debug, Clone)]
pub struct SetupConfig {
    pub mode: RunMode,
    /// Emit ANSI colors
    pub color: bool,
    pub metadata_timeout: Duration,
    pub download_timeout: Duration,
    pub system_bin_dir: PathBuf,
    /// Per-user fallback, `None` when no home directory is known
    pub user_bin_dir: Option<PathBuf>,
    /// Try `sudo -n` when the system directory is not writable
    pub allow_sudo: bool,
}

impl SetupConfig {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            color: !no_color_requested(std::env::var_os("NO_COLOR").as_deref()),
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            system_bin_dir: PathBuf::from(SYSTEM_BIN_DIR),
            user_bin_dir: dirs::home_dir().map(|home| home.join(".local").join("bin")),
            allow_sudo: true,
        }
    }
}

/// Any non-empty `NO_COLOR` disables color (no-color.org)
pub fn no_color_requested(value: Option<&OsStr>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}
