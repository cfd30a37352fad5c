//! Host platform detection
//!
//! Only macOS and Linux on amd64 or arm64 are supported. Anything else is a
//! startup failure: there is no artifact to download for it.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    MacOs,
    Linux,
}

impl Os {
    /// Token used in vendor download URLs
    pub fn vendor_token(&self) -> &'static str {
        match self {
            Self::MacOs => "darwin",
            Self::Linux => "linux",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacOs => f.write_str("macos"),
            Self::Linux => f.write_str("linux"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
}

impl Arch {
    /// Token used in vendor download URLs
    pub fn vendor_token(&self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.vendor_token())
    }
}

/// Resolved operating system and CPU architecture of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformInfo {
    pub os: Os,
    pub arch: Arch,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("unsupported operating system '{0}' (supported: macos, linux)")]
    UnsupportedOs(String),
    #[error("unsupported architecture '{0}' (supported: amd64, arm64)")]
    UnsupportedArch(String),
}

impl PlatformInfo {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Map Rust's `std::env::consts` names onto the supported set
    pub fn from_parts(os: &str, arch: &str) -> Result<Self, PlatformError> {
        let os = match os {
            "macos" => Os::MacOs,
            "linux" => Os::Linux,
            other => return Err(PlatformError::UnsupportedOs(other.to_string())),
        };
        let arch = match arch {
            "x86_64" | "amd64" => Arch::Amd64,
            "aarch64" | "arm64" => Arch::Arm64,
            other => return Err(PlatformError::UnsupportedArch(other.to_string())),
        };
        Ok(Self { os, arch })
    }
}

impl fmt::Display for PlatformInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Detect the platform this binary runs on
pub fn detect_platform() -> Result<PlatformInfo, PlatformError> {
    PlatformInfo::from_parts(std::env::consts::OS, std::env::consts::ARCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_supported() {
        let p = PlatformInfo::from_parts("macos", "aarch64").unwrap();
        assert_eq!(p, PlatformInfo::new(Os::MacOs, Arch::Arm64));
        assert_eq!(p.os.vendor_token(), "darwin");
        assert_eq!(p.arch.vendor_token(), "arm64");

        let p = PlatformInfo::from_parts("linux", "x86_64").unwrap();
        assert_eq!(p, PlatformInfo::new(Os::Linux, Arch::Amd64));
        assert_eq!(p.to_string(), "linux/amd64");
    }

    #[test]
    fn test_from_parts_unsupported_os() {
        assert_eq!(
            PlatformInfo::from_parts("windows", "x86_64"),
            Err(PlatformError::UnsupportedOs("windows".to_string()))
        );
    }

    #[test]
    fn test_from_parts_unsupported_arch() {
        assert_eq!(
            PlatformInfo::from_parts("linux", "riscv64"),
            Err(PlatformError::UnsupportedArch("riscv64".to_string()))
        );
    }
}
