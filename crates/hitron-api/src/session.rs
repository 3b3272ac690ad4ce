// Authenticated session
//
// A `Session` is proof that login succeeded: it holds the gate permit, and
// the transport's cookie jar holds the device's session cookie. Fetches
// borrow the session immutably, so a scrape may run them concurrently --
// the cookies are read-only from the fetchers' point of view.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::Error;
use crate::gate::SessionPermit;
use crate::models::{
    endpoint, CmDocsisWan, CmInit, ConnectedDevice, DownstreamChannel, SysInfo, UpstreamChannel,
};
use crate::router::HitronRouter;

/// Body prefix some firmwares answer with on a data endpoint when the
/// session has gone away mid-scrape. Not JSON, and not a decode bug.
const DATA_ERROR_MARKER: &str = "Fail to get the data";

/// One authenticated interaction window with the device.
///
/// At most one `Session` is live process-wide; the permit it holds enforces
/// that. Dropping the session (or calling [`Session::logout`]) releases the
/// permit exactly once.
#[derive(Debug)]
pub struct Session {
    router: Arc<HitronRouter>,
    _permit: SessionPermit,
}

impl Session {
    pub(crate) fn new(router: Arc<HitronRouter>, permit: SessionPermit) -> Self {
        Self {
            router,
            _permit: permit,
        }
    }

    /// Fetch one named resource and decode it as a JSON array of `T`.
    ///
    /// Table-shaped endpoints go through this directly; any length is
    /// valid, including zero rows.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
    ) -> Result<Vec<T>, Error> {
        let url = self.router.url(&format!("/data/get{endpoint}.asp"))?;
        debug!(%url, "GET");

        let resp = self.router.http().get(url).send().await?;
        let body = resp.text().await?;

        if body.trim_start().starts_with(DATA_ERROR_MARKER) {
            return Err(Error::DeviceError { endpoint, body });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            endpoint,
            message: e.to_string(),
            body,
        })
    }

    /// Fetch a fixed-shape resource: the array must hold exactly one record
    /// (device quirk -- single objects still arrive wrapped in an array).
    pub async fn fetch_one<T: DeserializeOwned>(&self, endpoint: &'static str) -> Result<T, Error> {
        let mut records = self.fetch::<T>(endpoint).await?;
        let count = records.len();
        match records.pop() {
            Some(record) if count == 1 => Ok(record),
            _ => Err(Error::MalformedResponse { endpoint, count }),
        }
    }

    // ── Data endpoints ──────────────────────────────────────────────

    pub async fn sys_info(&self) -> Result<SysInfo, Error> {
        self.fetch_one(endpoint::SYS_INFO).await
    }

    pub async fn cm_init(&self) -> Result<CmInit, Error> {
        self.fetch_one(endpoint::CM_INIT).await
    }

    pub async fn docsis_wan(&self) -> Result<CmDocsisWan, Error> {
        self.fetch_one(endpoint::DOCSIS_WAN).await
    }

    pub async fn connected_devices(&self) -> Result<Vec<ConnectedDevice>, Error> {
        self.fetch(endpoint::CONNECT_INFO).await
    }

    pub async fn upstream_channels(&self) -> Result<Vec<UpstreamChannel>, Error> {
        self.fetch(endpoint::UPSTREAM).await
    }

    pub async fn downstream_channels(&self) -> Result<Vec<DownstreamChannel>, Error> {
        self.fetch(endpoint::DOWNSTREAM).await
    }

    // ── Teardown ────────────────────────────────────────────────────

    /// End the session: tell the device goodbye, then release the permit.
    ///
    /// The logout request is best-effort -- the device forgets sessions on
    /// its own eventually, and the permit is released on drop regardless.
    pub async fn logout(self) {
        let url = match self.router.url("/goform/logout") {
            Ok(url) => url,
            Err(err) => {
                warn!(%err, "skipping logout request");
                return;
            }
        };

        // The device expects this exact sentinel payload.
        let form = [("data", "byebye")];
        match self.router.http().post(url).form(&form).send().await {
            Ok(_) => debug!("logout complete"),
            Err(err) => warn!(%err, "logout request failed"),
        }
        // `self` drops here, releasing the session permit.
    }
}
