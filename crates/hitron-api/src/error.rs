use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `hitron-api` crate.
///
/// Covers every failure mode of one scrape attempt: gate contention,
/// the device's lockout protocol, transport, and per-endpoint decode
/// problems. `hitron-collector` decides which of these abort a scrape
/// and which only cost a single resource.
#[derive(Debug, Error)]
pub enum Error {
    // ── Session gate ────────────────────────────────────────────────
    /// The session permit could not be acquired in time -- another scrape
    /// holds it, or a device lockout window is still open.
    #[error("device session unavailable: backing off")]
    BackingOff,

    /// The device refused the login and declared a cool-down window.
    /// The permit stays consumed until `wait` elapses.
    #[error("device lockout after {attempts} failed attempts: retry in {wait:?}")]
    Lockout { attempts: u32, wait: Duration },

    // ── Authentication ──────────────────────────────────────────────
    /// Login response body matched neither the success marker nor the
    /// lockout marker. Carries the raw body for diagnostics.
    #[error("unrecognized login answer: {body:?}")]
    LoginAnswerUnrecognized { body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, per-request timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL construction error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data endpoints ──────────────────────────────────────────────
    /// The endpoint answered with the vendor error marker instead of JSON.
    #[error("{endpoint} reported a device-side error: {body:?}")]
    DeviceError { endpoint: &'static str, body: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("decoding {endpoint}: {message}")]
    Deserialization {
        endpoint: &'static str,
        message: String,
        body: String,
    },

    /// A fixed-shape endpoint returned the wrong number of records.
    #[error("{endpoint} returned {count} records, expected exactly one")]
    MalformedResponse { endpoint: &'static str, count: usize },
}

impl Error {
    /// Returns `true` if this is a backoff-class login failure: either
    /// local gate contention or a device-declared lockout. Both mean
    /// "do not retry now"; only `Lockout` carries device diagnostics.
    pub fn is_backoff(&self) -> bool {
        matches!(self, Self::BackingOff | Self::Lockout { .. })
    }

    /// Returns `true` if the failure is scoped to a single resource
    /// fetch and must not abort the rest of the scrape.
    pub fn is_resource_local(&self) -> bool {
        matches!(
            self,
            Self::DeviceError { .. } | Self::Deserialization { .. } | Self::MalformedResponse { .. }
        )
    }
}
