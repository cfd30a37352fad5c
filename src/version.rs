//! Version extraction and comparison
//!
//! Versions are read leniently into [`semver::Version`]: a leading `v` is
//! dropped, each segment keeps its leading digits, and missing segments count
//! as zero. Only `major.minor.patch` take part in comparisons, so
//! `1.6.0-beta1` compares equal to `1.6.0`.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

static VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+(?:\.\d+)?").expect("valid regex"));

/// Pull the first `major.minor[.patch]` token out of free-form text
///
/// `"Terraform v1.9.8\non linux_amd64"` -> `"1.9.8"`
pub fn extract_version(text: &str) -> Option<String> {
    VERSION_TOKEN.find(text).map(|m| m.as_str().to_string())
}

/// Compare two dotted numeric versions
///
/// Missing trailing segments count as zero, so `1.2` equals `1.2.0`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    parse_version(a).cmp(&parse_version(b))
}

/// `a >= b` under [`compare_versions`]
pub fn version_gte(a: &str, b: &str) -> bool {
    compare_versions(a, b) != Ordering::Less
}

fn parse_version(version: &str) -> Version {
    let version = version.trim();
    let version = version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version);

    // Leading digits only: "3-beta" -> 3
    let mut parts = version.split('.').map(|part| {
        let end = part
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(part.len());
        part[..end].parse::<u64>().unwrap_or(0)
    });
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    let patch = parts.next().unwrap_or(0);
    Version::new(major, minor, patch)
}

/// Which segment an upgrade from `current` to `target` moves: "major",
/// "minor" or "patch", and "update" when it is not a step forward
pub fn change_kind(current: &str, target: &str) -> &'static str {
    let (from, to) = (parse_version(current), parse_version(target));
    if to <= from {
        "update"
    } else if to.major != from.major {
        "major"
    } else if to.minor != from.minor {
        "minor"
    } else {
        "patch"
    }
}
