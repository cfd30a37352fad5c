//! Homebrew install path (macOS)

use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use tracing::debug;

/// Whether `brew` is on the search path
pub fn is_available() -> bool {
    which::which("brew").is_ok()
}

/// Install the formula, or upgrade it when Homebrew already manages it
pub fn install_formula(formula: &str) -> Result<()> {
    let installed = Command::new("brew")
        .args(["list", "--formula", formula])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success());
    let action = action_for(installed);

    debug!(formula, action, "running brew");
    let output = Command::new("brew")
        .args([action, formula])
        .output()
        .with_context(|| format!("Failed to run brew {} {}", action, formula))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("brew {} {} failed: {}", action, formula, stderr.trim());
    }

    Ok(())
}

fn action_for(installed: bool) -> &'static str {
    if installed { "upgrade" } else { "install" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_for() {
        assert_eq!(action_for(true), "upgrade");
        assert_eq!(action_for(false), "install");
    }
}
