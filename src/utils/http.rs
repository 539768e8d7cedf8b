//! Blocking HTTP client construction shared by all collaborators.

use reqwest::blocking::Client;
use std::time::Duration;

/// Build a client with a request timeout for every host in `base_urls`.
///
/// Proxies are bypassed when any of the bases is a loopback address.
pub fn http_client(timeout_secs: u64, base_urls: &[&str]) -> reqwest::Result<Client> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .user_agent(concat!("repo-audit/", env!("CARGO_PKG_VERSION")));
    if bypasses_proxy(base_urls) {
        builder = builder.no_proxy();
    }
    builder.build()
}

fn bypasses_proxy(base_urls: &[&str]) -> bool {
    base_urls.iter().any(|base| is_loopback_base_url(base))
}

fn is_loopback_base_url(base_url: &str) -> bool {
    let lower = base_url.to_ascii_lowercase();
    lower.contains("://127.0.0.1") || lower.contains("://localhost") || lower.contains("://[::1]")
}

/// Cap error bodies echoed into messages.
pub fn truncate_body(body: &str) -> String {
    super::truncate_chars(body, 300, "...")
}
