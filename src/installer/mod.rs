//! Tool installation
//!
//! Downloads a release artifact into a scratch directory, extracts or marks the
//! binary executable, and places it into the first usable install directory.
//! On macOS Homebrew is tried first when it is available.
//!
//! Every failure ends up as an [`InstallOutcome::Failed`] carrying an
//! [`InstallError`] that names its class: download, extract, permission, or
//! interrupted when Ctrl-C cut the attempt short.

mod brew;
mod download;
mod extract;
mod target;

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::SetupConfig;
use crate::http;
use crate::interrupt::Interrupt;
use crate::models::{ArtifactKind, InstallMethod, InstallOutcome, ToolSpec};
use crate::platform::{Os, PlatformInfo};

pub use target::InstallDirs;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("download failed for {url}: {reason}")]
    Download { url: String, reason: String },
    #[error("could not extract {binary}: {reason}")]
    Extract { binary: String, reason: String },
    #[error("permission denied for {}: {reason}", .dir.display())]
    Permission { dir: PathBuf, reason: String },
    #[error("interrupted")]
    Interrupted,
}

impl InstallError {
    /// Failure class shown in the summary
    pub fn class(&self) -> &'static str {
        match self {
            Self::Download { .. } => "download",
            Self::Extract { .. } => "extract",
            Self::Permission { .. } => "permission",
            Self::Interrupted => "interrupted",
        }
    }

    fn permission(dir: &Path, reason: impl ToString) -> Self {
        Self::Permission {
            dir: dir.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Something that can put a tool version onto the machine
pub trait ToolInstaller {
    fn install(&self, spec: &ToolSpec, platform: &PlatformInfo, version: &str) -> InstallOutcome;
}

/// Installs via Homebrew or direct download
pub struct Installer {
    agent: ureq::Agent,
    dirs: InstallDirs,
    prefer_brew: bool,
    /// Parent for scratch directories, system temp dir when `None`
    scratch_root: Option<PathBuf>,
    interrupt: Interrupt,
}

impl Installer {
    pub fn new(config: &SetupConfig) -> Self {
        Self::with_dirs(config.download_timeout, InstallDirs::from_config(config))
    }

    pub fn with_dirs(download_timeout: Duration, dirs: InstallDirs) -> Self {
        Self {
            agent: http::agent(download_timeout),
            dirs,
            prefer_brew: true,
            scratch_root: None,
            interrupt: Interrupt::new(),
        }
    }

    /// Never go through Homebrew
    pub fn without_brew(mut self) -> Self {
        self.prefer_brew = false;
        self
    }

    /// Create scratch directories under `root`
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Abort downloads when `interrupt` is raised
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    fn scratch_dir(&self) -> Result<tempfile::TempDir, InstallError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("tfsetup-");
        match &self.scratch_root {
            Some(root) => builder
                .tempdir_in(root)
                .map_err(|e| InstallError::permission(root, e)),
            None => builder
                .tempdir()
                .map_err(|e| InstallError::permission(&std::env::temp_dir(), e)),
        }
    }

    /// Download, unpack and place the binary
    ///
    /// The scratch directory is removed when `scratch` drops, on success and on
    /// every early return. It is also tracked so a forced exit after Ctrl-C
    /// removes it.
    fn install_direct(
        &self,
        spec: &ToolSpec,
        platform: &PlatformInfo,
        version: &str,
    ) -> Result<InstallMethod, InstallError> {
        let url = spec.download_url(platform, version);
        let scratch = self.scratch_dir()?;
        let _tracked = self.interrupt.track(scratch.path());
        debug!(tool = spec.name, scratch = %scratch.path().display(), "created scratch directory");

        let binary = match spec.artifact.kind {
            ArtifactKind::Zip => {
                let archive = scratch.path().join(format!("{}.zip", spec.binary));
                download::download(&self.agent, &url, &archive, &self.interrupt)?;
                extract::extract_binary(&archive, spec.binary, &scratch.path().join("unpacked"))?
            }
            ArtifactKind::Binary => {
                let raw = scratch.path().join(spec.binary);
                download::download(&self.agent, &url, &raw, &self.interrupt)?;
                raw
            }
        };
        extract::make_executable(&binary)?;
        if self.interrupt.is_raised() {
            return Err(InstallError::Interrupted);
        }

        let path = self.dirs.place(&binary, spec.binary, &self.interrupt)?;
        debug!(tool = spec.name, path = %path.display(), "installed");

        Ok(InstallMethod::Download {
            on_path: path.parent().is_some_and(target::dir_on_path),
            path,
        })
    }
}

impl ToolInstaller for Installer {
    fn install(&self, spec: &ToolSpec, platform: &PlatformInfo, version: &str) -> InstallOutcome {
        if self.interrupt.is_raised() {
            return InstallOutcome::Failed {
                tool: spec.name,
                error: InstallError::Interrupted,
            };
        }

        if self.prefer_brew
            && platform.os == Os::MacOs
            && let Some(formula) = spec.brew_formula
            && brew::is_available()
        {
            match brew::install_formula(formula) {
                Ok(()) => {
                    return InstallOutcome::Installed {
                        tool: spec.name,
                        version: version.to_string(),
                        method: InstallMethod::Homebrew,
                    };
                }
                Err(e) => warn!(
                    tool = spec.name,
                    error = %format!("{:#}", e),
                    "Homebrew install failed, falling back to direct download"
                ),
            }
        }

        match self.install_direct(spec, platform, version) {
            Ok(method) => InstallOutcome::Installed {
                tool: spec.name,
                version: version.to_string(),
                method,
            },
            Err(error) => InstallOutcome::Failed {
                tool: spec.name,
                error,
            },
        }
    }
}
