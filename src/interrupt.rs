//! Ctrl-C handling
//!
//! The first Ctrl-C only raises a flag. Downloads and the install loop poll it
//! and unwind, so scratch directories drop through their normal guards. If the
//! process is still alive after [`GRACE_PERIOD`] (a read stuck on a stalled
//! connection, say), the handler removes every tracked path itself and exits.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

/// Exit status after an interrupt (128 + SIGINT)
pub const EXIT_INTERRUPTED: u8 = 130;

/// How long the handler waits for the run to unwind on its own
pub const GRACE_PERIOD: Duration = Duration::from_secs(3);

#[derive(Debug, Default)]
struct State {
    raised: AtomicBool,
    tracked: Mutex<Vec<PathBuf>>,
}

/// Shared interrupt flag plus the temporary paths to remove on a forced exit
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    state: Arc<State>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route Ctrl-C to this flag for the rest of the process
    pub fn install_handler(&self) -> Result<(), ctrlc::Error> {
        let interrupt = self.clone();
        ctrlc::set_handler(move || interrupt.on_signal())
    }

    /// Runs on ctrlc's own thread, so sleeping here leaves the run going
    fn on_signal(&self) {
        if self.state.raised.swap(true, Ordering::SeqCst) {
            return;
        }
        eprintln!("Interrupted, cleaning up...");
        std::thread::sleep(GRACE_PERIOD);
        debug!("grace period over, forcing exit");
        self.remove_tracked();
        std::process::exit(i32::from(EXIT_INTERRUPTED));
    }

    pub fn trigger(&self) {
        self.state.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.state.raised.load(Ordering::SeqCst)
    }

    /// Register `path` for removal on a forced exit until the guard drops
    pub fn track(&self, path: &Path) -> Tracked {
        self.tracked().push(path.to_path_buf());
        Tracked {
            interrupt: self.clone(),
            path: path.to_path_buf(),
        }
    }

    fn tracked(&self) -> std::sync::MutexGuard<'_, Vec<PathBuf>> {
        self.state
            .tracked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Delete every tracked file or directory, ignoring errors
    pub(crate) fn remove_tracked(&self) {
        for path in self.tracked().drain(..) {
            let result = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            if let Err(e) = result {
                debug!(path = %path.display(), error = %e, "cleanup failed");
            }
        }
    }
}

/// Keeps a path registered with an [`Interrupt`]
#[derive(Debug)]
pub struct Tracked {
    interrupt: Interrupt,
    path: PathBuf,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.interrupt.tracked().retain(|p| p != &self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_flag() {
        let interrupt = Interrupt::new();
        let handle = interrupt.clone();
        assert!(!interrupt.is_raised());

        handle.trigger();
        assert!(interrupt.is_raised());
    }

    #[test]
    fn test_remove_tracked_deletes_files_and_dirs() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("tfsetup-scratch");
        std::fs::create_dir_all(dir.join("unpacked")).unwrap();
        std::fs::write(dir.join("unpacked").join("terraform"), b"partial").unwrap();
        let file = root.path().join(".terraform-staged");
        std::fs::write(&file, b"partial").unwrap();

        let interrupt = Interrupt::new();
        let _dir_guard = interrupt.track(&dir);
        let _file_guard = interrupt.track(&file);
        interrupt.remove_tracked();

        assert!(!dir.exists());
        assert!(!file.exists());
    }

    #[test]
    fn test_dropped_guard_untracks() {
        let root = tempfile::tempdir().unwrap();
        let keep = root.path().join("installed");
        std::fs::write(&keep, b"binary").unwrap();

        let interrupt = Interrupt::new();
        drop(interrupt.track(&keep));
        interrupt.remove_tracked();

        assert!(keep.exists());
    }
}
