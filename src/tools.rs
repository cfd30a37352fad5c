//! Catalog of managed tools
//!
//! The order of [`MANAGED_TOOLS`] is the order tools are checked and installed in.
//! Fallback versions are a snapshot and need bumping when new releases ship.

use crate::models::{Artifact, ArtifactKind, LatestSource, ToolSpec};

pub const TERRAFORM: ToolSpec = ToolSpec {
    name: "terraform",
    binary: "terraform",
    min_version: "1.5.0",
    recommended_version: Some("1.6.0"),
    version_args: &["version"],
    latest: LatestSource::Checkpoint {
        product: "terraform",
    },
    fallback_version: "1.9.8",
    artifact: Artifact {
        url_template: "https://releases.hashicorp.com/terraform/{version}/terraform_{version}_{os}_{arch}.zip",
        kind: ArtifactKind::Zip,
    },
    brew_formula: Some("hashicorp/tap/terraform"),
};

pub const TERRAGRUNT: ToolSpec = ToolSpec {
    name: "terragrunt",
    binary: "terragrunt",
    min_version: "0.50.0",
    recommended_version: None,
    version_args: &["--version"],
    latest: LatestSource::GithubRelease {
        repo: "gruntwork-io/terragrunt",
    },
    fallback_version: "0.68.1",
    artifact: Artifact {
        url_template: "https://github.com/gruntwork-io/terragrunt/releases/download/v{version}/terragrunt_{os}_{arch}",
        kind: ArtifactKind::Binary,
    },
    brew_formula: Some("terragrunt"),
};

/// Every tool this installer manages, in install order
pub const MANAGED_TOOLS: &[ToolSpec] = &[TERRAFORM, TERRAGRUNT];
