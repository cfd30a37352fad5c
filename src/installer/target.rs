//! Install directory resolution and binary placement

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use super::InstallError;
use crate::config::SetupConfig;
use crate::interrupt::Interrupt;

/// Candidate install directories, in preference order
#[derive(Debug, Clone)]
pub struct InstallDirs {
    pub system: PathBuf,
    pub user: Option<PathBuf>,
    pub allow_sudo: bool,
}

/// Directory chosen for an install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub dir: PathBuf,
    /// Placement goes through `sudo -n`
    pub elevated: bool,
}

impl InstallDirs {
    pub fn from_config(config: &SetupConfig) -> Self {
        Self {
            system: config.system_bin_dir.clone(),
            user: config.user_bin_dir.clone(),
            allow_sudo: config.allow_sudo,
        }
    }

    /// Pick the system directory when writable (directly or through
    /// non-interactive sudo), otherwise the per-user directory, creating it
    pub fn resolve(&self) -> Result<InstallTarget, InstallError> {
        if is_writable(&self.system) {
            return Ok(InstallTarget {
                dir: self.system.clone(),
                elevated: false,
            });
        }

        if self.allow_sudo && self.system.is_dir() && sudo_available() {
            debug!(dir = %self.system.display(), "using sudo for system directory");
            return Ok(InstallTarget {
                dir: self.system.clone(),
                elevated: true,
            });
        }

        self.user_target()
    }

    fn user_target(&self) -> Result<InstallTarget, InstallError> {
        let Some(user) = &self.user else {
            return Err(InstallError::permission(
                &self.system,
                "not writable and no home directory for a per-user fallback",
            ));
        };

        fs::create_dir_all(user).map_err(|e| InstallError::permission(user, e))?;
        if !is_writable(user) {
            return Err(InstallError::permission(user, "directory is not writable"));
        }

        debug!(dir = %user.display(), "falling back to per-user directory");
        Ok(InstallTarget {
            dir: user.clone(),
            elevated: false,
        })
    }

    /// Place `src` as `name` in the resolved directory
    ///
    /// When the system directory was chosen but placement there fails (a
    /// `sudo install` that is refused, say), the per-user directory is tried
    /// before giving up.
    pub fn place(
        &self,
        src: &Path,
        name: &str,
        interrupt: &Interrupt,
    ) -> Result<PathBuf, InstallError> {
        let target = self.resolve()?;
        let err = match place_binary(src, &target, name, interrupt) {
            Ok(path) => return Ok(path),
            Err(err) => err,
        };

        let has_fallback = self.user.as_ref().is_some_and(|user| user != &target.dir);
        if target.dir != self.system || !has_fallback {
            return Err(err);
        }

        warn!(
            dir = %target.dir.display(),
            error = %err,
            "placement failed, trying per-user directory"
        );
        let user = self.user_target()?;
        place_binary(src, &user, name, interrupt)
    }
}

/// Whether the current user can create files in `dir`
pub fn is_writable(dir: &Path) -> bool {
    dir.is_dir()
        && tempfile::Builder::new()
            .prefix(".tfsetup-probe-")
            .tempfile_in(dir)
            .is_ok()
}

/// Whether `sudo` works without a password prompt
fn sudo_available() -> bool {
    which::which("sudo").is_ok()
        && Command::new("sudo")
            .args(["-n", "true"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
}

/// Copy `src` into the target directory as `name` with mode 0755
///
/// Direct placement stages a file in the target directory and renames it over
/// the destination, so an existing binary is never left half-written.
pub fn place_binary(
    src: &Path,
    target: &InstallTarget,
    name: &str,
    interrupt: &Interrupt,
) -> Result<PathBuf, InstallError> {
    let dest = target.dir.join(name);
    let perm = |e: io::Error| InstallError::permission(&target.dir, e);

    if target.elevated {
        let output = Command::new("sudo")
            .args(["-n", "install", "-m", "0755"])
            .arg(src)
            .arg(&dest)
            .stdin(Stdio::null())
            .output()
            .map_err(perm)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InstallError::permission(
                &target.dir,
                format!("sudo install failed: {}", stderr.trim()),
            ));
        }
        return Ok(dest);
    }

    let prefix = format!(".{}-", name);
    let mut staged = tempfile::Builder::new()
        .prefix(&prefix)
        .tempfile_in(&target.dir)
        .map_err(perm)?;
    let _tracked = interrupt.track(staged.path());
    let mut input = File::open(src).map_err(perm)?;
    io::copy(&mut input, staged.as_file_mut()).map_err(perm)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staged.path(), fs::Permissions::from_mode(0o755)).map_err(perm)?;
    }

    staged.persist(&dest).map_err(|e| perm(e.error))?;
    Ok(dest)
}

/// Whether `dir` is listed in the current `PATH`
pub fn dir_on_path(dir: &Path) -> bool {
    std::env::var_os("PATH").is_some_and(|path| path_contains(&path, dir))
}

/// Whether a `PATH`-style list contains `dir`
pub fn path_contains(path_var: &OsStr, dir: &Path) -> bool {
    std::env::split_paths(path_var).any(|entry| entry == dir)
}
