//! Latest-version lookup against vendor metadata endpoints
//!
//! One attempt per tool and run, no retries. Any failure falls back to the
//! tool's pinned fallback version so a download URL always has a version.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::http::{self, USER_AGENT};
use crate::models::{LatestSource, ToolSpec};
use crate::version::extract_version;

#[derive(Debug, Deserialize)]
struct CheckpointResponse {
    current_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubRelease {
    tag_name: Option<String>,
}

impl LatestSource {
    /// Metadata endpoint for this source
    pub fn metadata_url(&self) -> String {
        match self {
            Self::Checkpoint { product } => {
                format!("https://checkpoint-api.hashicorp.com/v1/check/{}", product)
            }
            Self::GithubRelease { repo } => {
                format!("https://api.github.com/repos/{}/releases/latest", repo)
            }
        }
    }

    /// Pull the version out of the endpoint's JSON body
    ///
    /// Returns the first version-like token of the expected field.
    pub fn parse_body(&self, body: &str) -> Option<String> {
        let field = match self {
            Self::Checkpoint { .. } => {
                serde_json::from_str::<CheckpointResponse>(body)
                    .ok()?
                    .current_version?
            }
            Self::GithubRelease { .. } => {
                serde_json::from_str::<GithubRelease>(body).ok()?.tag_name?
            }
        };
        extract_version(&field)
    }
}

/// Source of "latest published version" answers
pub trait VersionLookup {
    fn latest_version(&self, spec: &ToolSpec) -> Option<String>;
}

/// Looks up versions over HTTP
pub struct RemoteResolver {
    agent: ureq::Agent,
}

impl RemoteResolver {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: http::agent(timeout),
        }
    }

    fn fetch(&self, url: &str, source: &LatestSource) -> Result<String> {
        debug!(%url, "fetching latest version");

        let mut request = self.agent.get(url).header("User-Agent", USER_AGENT);
        if let LatestSource::GithubRelease { .. } = source {
            request = request.header("Accept", "application/vnd.github+json");
            if let Some(token) = http::github_token() {
                request = request.header("Authorization", format!("Bearer {}", token));
            }
        }

        let mut response = request
            .call()
            .with_context(|| format!("Failed to fetch {}", url))?;
        response
            .body_mut()
            .read_to_string()
            .with_context(|| format!("Failed to read response from {}", url))
    }

    /// Query `url` and parse the body the way the tool's metadata source answers
    fn lookup_at(&self, url: &str, spec: &ToolSpec) -> Option<String> {
        match self.fetch(url, &spec.latest) {
            Ok(body) => {
                let version = spec.latest.parse_body(&body);
                if version.is_none() {
                    debug!(tool = spec.name, "no version in metadata response");
                }
                version
            }
            Err(e) => {
                debug!(tool = spec.name, error = %format!("{:#}", e), "latest version lookup failed");
                None
            }
        }
    }
}

impl VersionLookup for RemoteResolver {
    fn latest_version(&self, spec: &ToolSpec) -> Option<String> {
        self.lookup_at(&spec.latest.metadata_url(), spec)
    }
}

/// Where a resolved version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOrigin {
    Remote,
    Fallback,
}

/// Version chosen for an install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: String,
    pub origin: VersionOrigin,
}

/// Resolve the version to install, substituting the fallback on any lookup failure
pub fn resolve_version(lookup: &dyn VersionLookup, spec: &ToolSpec) -> ResolvedVersion {
    match lookup.latest_version(spec).filter(|v| !v.is_empty()) {
        Some(version) => ResolvedVersion {
            version,
            origin: VersionOrigin::Remote,
        },
        None => {
            info!(
                tool = spec.name,
                fallback = spec.fallback_version,
                "using fallback version"
            );
            ResolvedVersion {
                version: spec.fallback_version.to_string(),
                origin: VersionOrigin::Fallback,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{TERRAFORM, TERRAGRUNT};

    struct FixedLookup(Option<&'static str>);

    impl VersionLookup for FixedLookup {
        fn latest_version(&self, _spec: &ToolSpec) -> Option<String> {
            self.0.map(String::from)
        }
    }

    #[test]
    fn test_metadata_urls() {
        assert_eq!(
            TERRAFORM.latest.metadata_url(),
            "https://checkpoint-api.hashicorp.com/v1/check/terraform"
        );
        assert_eq!(
            TERRAGRUNT.latest.metadata_url(),
            "https://api.github.com/repos/gruntwork-io/terragrunt/releases/latest"
        );
    }

    #[test]
    fn test_parse_checkpoint_body() {
        let body = r#"{"product":"terraform","current_version":"1.9.8","current_release":1730000000,"outdated":false}"#;
        assert_eq!(
            TERRAFORM.latest.parse_body(body),
            Some("1.9.8".to_string())
        );
    }

    #[test]
    fn test_parse_github_release_strips_prefix() {
        let body = r#"{"tag_name":"v0.68.1","name":"v0.68.1","draft":false}"#;
        assert_eq!(
            TERRAGRUNT.latest.parse_body(body),
            Some("0.68.1".to_string())
        );
    }

    #[test]
    fn test_parse_body_rejects_unexpected_payloads() {
        assert_eq!(TERRAFORM.latest.parse_body(""), None);
        assert_eq!(TERRAFORM.latest.parse_body("<html>rate limited</html>"), None);
        assert_eq!(TERRAFORM.latest.parse_body(r#"{"current_version":""}"#), None);
        assert_eq!(
            TERRAGRUNT.latest.parse_body(r#"{"message":"API rate limit exceeded"}"#),
            None
        );
    }

    #[test]
    fn test_resolve_version_prefers_remote() {
        let resolved = resolve_version(&FixedLookup(Some("1.10.0")), &TERRAFORM);
        assert_eq!(resolved.version, "1.10.0");
        assert_eq!(resolved.origin, VersionOrigin::Remote);
    }

    #[test]
    fn test_resolve_version_falls_back_on_failure() {
        let resolved = resolve_version(&FixedLookup(None), &TERRAGRUNT);
        assert_eq!(resolved.version, TERRAGRUNT.fallback_version);
        assert_eq!(resolved.origin, VersionOrigin::Fallback);
        assert!(!resolved.version.is_empty());
    }

    #[test]
    fn test_resolve_version_never_uses_empty_answer() {
        let resolved = resolve_version(&FixedLookup(Some("")), &TERRAFORM);
        assert_eq!(resolved.version, TERRAFORM.fallback_version);
    }

    /// Serve one connection on loopback with `respond`, returning the URL
    fn serve_once(respond: impl FnOnce(std::net::TcpStream) + Send + 'static) -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                respond(stream);
            }
        });
        format!("http://{}/v1/check/terraform", addr)
    }

    #[test]
    fn test_lookup_unparseable_body_yields_none() {
        use std::io::{Read, Write};

        let url = serve_once(|mut stream| {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot json!",
            );
        });

        let resolver = RemoteResolver::new(Duration::from_secs(5));
        assert_eq!(resolver.lookup_at(&url, &TERRAFORM), None);
    }

    #[test]
    fn test_lookup_parses_served_checkpoint_body() {
        use std::io::{Read, Write};

        let url = serve_once(|mut stream| {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let body = r#"{"current_version":"1.10.2"}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        });

        let resolver = RemoteResolver::new(Duration::from_secs(5));
        assert_eq!(
            resolver.lookup_at(&url, &TERRAFORM),
            Some("1.10.2".to_string())
        );
    }

    #[test]
    fn test_lookup_timeout_yields_none() {
        let url = serve_once(|stream| {
            // Hold the connection open without answering
            std::thread::sleep(Duration::from_secs(3));
            drop(stream);
        });

        let resolver = RemoteResolver::new(Duration::from_millis(300));
        assert_eq!(resolver.lookup_at(&url, &TERRAFORM), None);
    }

    #[test]
    fn test_lookup_http_error_yields_none() {
        use std::io::{Read, Write};

        let url = serve_once(|mut stream| {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        });

        let resolver = RemoteResolver::new(Duration::from_secs(5));
        assert_eq!(resolver.lookup_at(&url, &TERRAFORM), None);
    }
}
