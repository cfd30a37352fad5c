//! Installed tool detection and version checking

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::models::{ToolSpec, ToolState, ToolStatus};
use crate::version::{extract_version, version_gte};

/// Something that can report the installed state of a tool
pub trait StatusCheck {
    fn check(&self, spec: &ToolSpec) -> ToolStatus;
}

/// Checks tools by running them from the search path
pub struct SystemChecker;

impl StatusCheck for SystemChecker {
    fn check(&self, spec: &ToolSpec) -> ToolStatus {
        check_tool(spec)
    }
}

/// Check a tool found on `PATH`
pub fn check_tool(spec: &ToolSpec) -> ToolStatus {
    match which::which(spec.binary) {
        Ok(path) => check_executable(spec, &path),
        Err(_) => {
            debug!(tool = spec.name, "not found on PATH");
            ToolStatus::missing()
        }
    }
}

/// Run an executable with the tool's version arguments and classify the result
pub fn check_executable(spec: &ToolSpec, path: &Path) -> ToolStatus {
    // Keeps `terraform version` from phoning home for its own update check
    let output = match Command::new(path)
        .args(spec.version_args)
        .env("CHECKPOINT_DISABLE", "1")
        .output()
    {
        Ok(out) => out,
        Err(e) => {
            debug!(tool = spec.name, path = %path.display(), error = %e, "failed to run");
            return ToolStatus::missing();
        }
    };

    // Some tools print their version to stderr
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push('\n');
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    classify_output(spec, &text)
}

/// Classify free-form version output against the tool's constraints
pub fn classify_output(spec: &ToolSpec, output: &str) -> ToolStatus {
    let Some(version) = extract_version(output) else {
        return ToolStatus::unknown();
    };

    let state = if !version_gte(&version, spec.min_version) {
        ToolState::Outdated
    } else if spec
        .recommended_version
        .is_some_and(|recommended| !version_gte(&version, recommended))
    {
        ToolState::BelowRecommended
    } else {
        ToolState::Ok
    };

    ToolStatus::detected(state, version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::TERRAFORM;

    fn spec(min: &'static str, recommended: Option<&'static str>) -> ToolSpec {
        ToolSpec {
            min_version: min,
            recommended_version: recommended,
            ..TERRAFORM
        }
    }

    #[test]
    fn test_classify_minimum_boundary_is_ok() {
        let status = classify_output(&spec("1.0.0", None), "tool v1.0.0");
        assert_eq!(status, ToolStatus::detected(ToolState::Ok, "1.0.0"));
    }

    #[test]
    fn test_classify_below_minimum_is_outdated() {
        let status = classify_output(&spec("1.0.0", Some("1.6.0")), "tool v0.9.9");
        assert_eq!(status.state, ToolState::Outdated);
        assert_eq!(status.version_str(), "0.9.9");
    }

    #[test]
    fn test_classify_below_recommended() {
        let status = classify_output(&spec("1.0.0", Some("1.6.0")), "Terraform v1.5.9");
        assert_eq!(status.state, ToolState::BelowRecommended);
    }

    #[test]
    fn test_classify_at_recommended_is_ok() {
        let status = classify_output(&spec("1.0.0", Some("1.6.0")), "Terraform v1.6.0");
        assert_eq!(status.state, ToolState::Ok);
    }

    #[test]
    fn test_classify_without_version_token_is_unknown() {
        let status = classify_output(&spec("1.0.0", None), "usage: tool [options]");
        assert_eq!(status, ToolStatus::unknown());
    }

    #[test]
    fn test_missing_binary_is_missing() {
        let missing = ToolSpec {
            binary: "tfsetup-definitely-not-installed-4f1c",
            ..TERRAFORM
        };
        assert_eq!(check_tool(&missing), ToolStatus::missing());
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_check_executable_reads_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(dir.path(), "terraform", "echo 'Terraform v1.9.8'");
        let status = check_executable(&TERRAFORM, &path);
        assert_eq!(status, ToolStatus::detected(ToolState::Ok, "1.9.8"));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_executable_reads_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(dir.path(), "terraform", "echo 'Terraform v1.4.0' >&2");
        let status = check_executable(&TERRAFORM, &path);
        assert_eq!(status.state, ToolState::Outdated);
    }

    #[cfg(unix)]
    #[test]
    fn test_check_executable_garbage_output_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(dir.path(), "terraform", "echo 'no idea'; exit 3");
        assert_eq!(check_executable(&TERRAFORM, &path), ToolStatus::unknown());
    }

    #[test]
    fn test_check_executable_nonexistent_path_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let status = check_executable(&TERRAFORM, &dir.path().join("terraform"));
        assert_eq!(status, ToolStatus::missing());
    }
}
