// Shared transport configuration for building the reqwest::Client.
//
// The router needs one client with a cookie jar it can also read back out
// of (the login handshake echoes the `preSession` cookie into the form), so
// the jar is owned here and handed to both the builder and the router.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;

use crate::error::Error;

/// Transport settings for the device connection.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout for every HTTP call against the device.
    pub timeout: Duration,
    /// Accept self-signed certificates. Firmwares that expose HTTPS at all
    /// ship a baked-in cert, so this defaults to on.
    pub accept_invalid_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            accept_invalid_certs: true,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` using `jar` as its cookie store.
    ///
    /// The caller keeps the `Arc<Jar>` so the pre-session cookie can be read
    /// back during login.
    pub fn build_client(&self, jar: &Arc<Jar>) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("hitron-exporter/0.1.0")
            .cookie_provider(Arc::clone(jar));

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder.build().map_err(Error::Transport)
    }
}
