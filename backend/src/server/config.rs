//! Application configuration loaded from the environment.

use std::env;
use std::net::SocketAddr;

use tracing::warn;
use uuid::Uuid;

use crate::inbound::http::api_key::ApiKey;
use crate::inbound::http::rate_limit::RateLimitConfig;

/// Default listen address when `BIND_ADDR` is unset.
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);

/// Everything the server needs at startup.
///
/// Read once from the environment in `main` and passed explicitly into the
/// collaborators that need it; the core logic never reads ambient state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Secret protecting the read endpoints.
    pub api_key: ApiKey,
    /// Submission rate-limit policy.
    pub rate_limit: RateLimitConfig,
    /// PostgreSQL connection string; absent selects the in-memory store.
    pub database_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `API_KEY` is mandatory in release builds. Debug builds (or
    /// `API_KEY_ALLOW_EPHEMERAL=1`) fall back to a random ephemeral key so
    /// local runs work out of the box; the key's fingerprint is logged so
    /// the protected endpoints remain reachable deliberately, not by
    /// accident.
    ///
    /// # Errors
    ///
    /// Returns an [`std::io::Error`] when `BIND_ADDR` is unparseable or the
    /// API key is missing outside debug builds.
    pub fn from_env() -> std::io::Result<Self> {
        let bind_addr = match env::var("BIND_ADDR") {
            Ok(raw) => raw
                .parse()
                .map_err(|err| std::io::Error::other(format!("invalid BIND_ADDR {raw}: {err}")))?,
            Err(_) => SocketAddr::from(DEFAULT_BIND_ADDR),
        };

        let api_key = match env::var("API_KEY") {
            Ok(secret) if !secret.trim().is_empty() => ApiKey::new(secret),
            _ => {
                let allow_dev = env::var("API_KEY_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
                if cfg!(debug_assertions) || allow_dev {
                    let key = ApiKey::new(Uuid::new_v4().to_string());
                    warn!(
                        fingerprint = %key.fingerprint(),
                        "API_KEY not set; using an ephemeral key (dev only)"
                    );
                    key
                } else {
                    return Err(std::io::Error::other(
                        "API_KEY must be set for the protected endpoints",
                    ));
                }
            }
        };

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        Ok(Self {
            bind_addr,
            api_key,
            rate_limit: RateLimitConfig::from_env(),
            database_url,
        })
    }
}
