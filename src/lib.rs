//! tfsetup - check and install the terraform toolchain
//!
//! Detects installed `terraform` and `terragrunt`, compares them against
//! minimum and recommended versions, and installs or upgrades whatever is
//! missing or too old.

pub mod checker;
pub mod cli;
pub mod commands;
pub mod config;
pub mod http;
pub mod installer;
pub mod interrupt;
pub mod models;
pub mod orchestrator;
pub mod platform;
pub mod remote;
pub mod tools;
pub mod version;

pub use config::{RunMode, SetupConfig};
pub use models::{InstallOutcome, ToolSpec, ToolState, ToolStatus};
pub use platform::{PlatformInfo, detect_platform};
