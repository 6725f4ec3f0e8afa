//! HTTP client pool maintaining one persistent reqwest client per base URL.
//!
//! Reusing a client per endpoint keeps TCP connections and TLS sessions alive
//! across the many sequential requests a conversation makes. The clients are
//! configured with:
//! - `pool_idle_timeout`: idle connections kept alive for 90 seconds
//! - `pool_max_idle_per_host`: up to 10 idle connections per host
//! - `tcp_keepalive`: keepalive probes every 60 seconds
//! - `timeout`: a 300 second hard ceiling per request (the conversation loop
//!   applies its own, shorter per-call timeout on top)

use once_cell::sync::Lazy;
use reqwest::header::HeaderMap;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Global HTTP client pool, lazily initialized on first access.
static HTTP_CLIENT_POOL: Lazy<Mutex<HashMap<String, reqwest::Client>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Get or create the shared HTTP client for the given base URL.
pub fn get_http_client(base_url: &str) -> reqwest::Client {
    get_http_client_with_headers(base_url, HeaderMap::new())
}

/// Get or create the shared HTTP client for the given base URL, attaching
/// the supplied default headers when the client is first built.
///
/// Headers only apply on first construction; subsequent lookups for the same
/// base URL return the already-built client.
pub fn get_http_client_with_headers(base_url: &str, headers: HeaderMap) -> reqwest::Client {
    let mut pool = HTTP_CLIENT_POOL
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(client) = pool.get(base_url) {
        return client.clone();
    }

    let client = reqwest::ClientBuilder::new()
        .default_headers(headers)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .pool_max_idle_per_host(10)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .timeout(Duration::from_secs(300))
        .build()
        .expect("Failed to build HTTP client");

    pool.insert(base_url.to_string(), client.clone());
    client
}
