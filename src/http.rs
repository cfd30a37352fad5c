//! Shared HTTP client setup

use std::time::Duration;

/// User-Agent sent with every request (GitHub rejects requests without one)
pub const USER_AGENT: &str = concat!("tfsetup/", env!("CARGO_PKG_VERSION"));

/// Build an agent whose whole request, body included, is bounded by `timeout`
pub fn agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

/// GitHub token from the environment, if one is set
pub fn github_token() -> Option<String> {
    std::env::var("GITHUB_TOKEN")
        .or_else(|_| std::env::var("GH_TOKEN"))
        .ok()
        .filter(|token| !token.is_empty())
}
