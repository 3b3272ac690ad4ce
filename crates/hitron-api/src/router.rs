// Login handshake
//
// The device's login protocol, reverse engineered:
//   1. GET /index.html            -> sets a `preSession` cookie
//   2. POST /goform/login         -> form with credentials + that cookie
// and the POST body is one of three literals:
//   "success"                       authenticated, session cookie is live
//   "LoginProtect=<n>|<min>|<sec>"  lockout: n failed attempts, cool-down
//   anything else                   unrecognized (wrong credentials, new fw)
//
// The lockout is enforced by the device, not by us: the session permit is
// parked for the declared window so this process cannot hammer the login
// endpoint and extend its own ban.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::gate::SessionGate;
use crate::session::Session;
use crate::transport::TransportConfig;

/// Exact body of a successful login response.
const LOGIN_OK: &str = "success";
/// Prefix of a lockout response: `LoginProtect=<attempts>|<minutes>|<seconds>`.
const LOCKOUT_PREFIX: &str = "LoginProtect=";
/// Name of the cookie the priming request sets.
const PRE_SESSION_COOKIE: &str = "preSession";

/// Connection parameters, supplied once at construction.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Device root, e.g. `http://192.168.0.1`.
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
    /// How long `login()` may wait on the session gate.
    pub acquire_timeout: Duration,
}

/// Handle to one Hitron device.
///
/// Owns the HTTP client, its cookie jar, and the [`SessionGate`] that
/// limits the process to a single live session. Construct once and share
/// via `Arc`; `login()` yields a [`Session`] scoped to the jar's cookies.
#[derive(Debug)]
pub struct HitronRouter {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
    username: String,
    password: SecretString,
    gate: SessionGate,
}

impl HitronRouter {
    /// Create a router handle from connection and transport settings.
    pub fn new(config: RouterConfig, transport: &TransportConfig) -> Result<Self, Error> {
        let jar = Arc::new(Jar::default());
        let http = transport.build_client(&jar)?;
        Ok(Self {
            http,
            jar,
            base_url: config.base_url,
            username: config.username,
            password: config.password,
            gate: SessionGate::new(config.acquire_timeout),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Build a full URL for a device path.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    /// Read a cookie back out of the shared jar.
    fn cookie_value(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let raw = header.to_str().ok()?;
        raw.split("; ").find_map(|pair| {
            pair.split_once('=')
                .filter(|(key, _)| *key == name)
                .map(|(_, value)| value.to_owned())
        })
    }

    /// Authenticate and open the process's one [`Session`].
    ///
    /// Acquires the session gate first; contention fails fast with
    /// [`Error::BackingOff`] and never touches the device. On a device
    /// lockout the permit stays parked for the declared window (see
    /// [`SessionGate::release_after`]) and [`Error::Lockout`] is returned.
    /// Any other failure releases the permit immediately.
    pub async fn login(self: &Arc<Self>) -> Result<Session, Error> {
        let permit = self.gate.acquire().await?;

        // Priming request; the device answers with the preSession cookie.
        // The permit is dropped (and the slot freed) on any early return.
        self.http.get(self.url("/index.html")?).send().await?;

        let pre_session = self.cookie_value(PRE_SESSION_COOKIE).unwrap_or_default();
        debug!(pre_session = !pre_session.is_empty(), "priming request done");

        let form = [
            ("usr", self.username.as_str()),
            ("pwd", self.password.expose_secret()),
            ("forcelogoff", "1"),
            ("preSession", pre_session.as_str()),
        ];
        let resp = self
            .http
            .post(self.url("/goform/login")?)
            .form(&form)
            .send()
            .await?;
        let body = resp.text().await?;

        match body.as_str() {
            LOGIN_OK => {
                debug!("login successful");
                Ok(Session::new(Arc::clone(self), permit))
            }
            lockout if lockout.starts_with(LOCKOUT_PREFIX) => {
                let Some((attempts, wait)) = parse_lockout(lockout) else {
                    // Marker present but the payload didn't parse; treat it
                    // like any other unrecognized answer.
                    return Err(Error::LoginAnswerUnrecognized { body });
                };
                warn!(attempts, ?wait, "device lockout, parking session slot");
                self.gate.release_after(permit, wait);
                Err(Error::Lockout { attempts, wait })
            }
            _ => Err(Error::LoginAnswerUnrecognized { body }),
        }
    }
}

/// Parse `LoginProtect=<attempts>|<minutes>|<seconds>`.
fn parse_lockout(body: &str) -> Option<(u32, Duration)> {
    let rest = body.trim().strip_prefix(LOCKOUT_PREFIX)?;
    let mut fields = rest.split('|');
    let attempts: u32 = fields.next()?.parse().ok()?;
    let minutes: u64 = fields.next()?.parse().ok()?;
    let seconds: u64 = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((attempts, Duration::from_secs(minutes * 60 + seconds)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lockout_line_parses() {
        let (attempts, wait) = parse_lockout("LoginProtect=9|58|21").expect("should parse");
        assert_eq!(attempts, 9);
        assert_eq!(wait, Duration::from_secs(58 * 60 + 21));
    }

    #[test]
    fn lockout_rejects_garbage_fields() {
        assert!(parse_lockout("LoginProtect=9|58").is_none());
        assert!(parse_lockout("LoginProtect=9|58|21|7").is_none());
        assert!(parse_lockout("LoginProtect=a|b|c").is_none());
        assert!(parse_lockout("success").is_none());
    }
}
