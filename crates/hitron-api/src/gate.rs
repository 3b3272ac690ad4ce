// Session gate
//
// The device accepts exactly one authenticated session. Overlapping scrape
// attempts (e.g. two Prometheus servers pulling at once) must serialize on
// this gate rather than clobber each other's session cookies. The gate is a
// field on `HitronRouter`, constructed once per process -- no globals.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::error::Error;

/// Single-slot permit controlling how many authenticated sessions may be
/// open against the device at once: exactly one.
#[derive(Debug)]
pub struct SessionGate {
    slot: Arc<Semaphore>,
    acquire_timeout: Duration,
}

/// Owned permit for the gate's single slot.
///
/// Dropping the permit restores the slot, so release is exactly-once and
/// survives early returns and panics in whatever holds it.
#[derive(Debug)]
pub struct SessionPermit {
    inner: OwnedSemaphorePermit,
}

impl SessionGate {
    /// Create a gate with one free slot.
    ///
    /// `acquire_timeout` bounds how long an `acquire` call may wait. It is
    /// kept short (a few seconds) so a scrape that cannot get exclusive
    /// access fails fast instead of hanging the metrics pull.
    pub fn new(acquire_timeout: Duration) -> Self {
        Self {
            slot: Arc::new(Semaphore::new(1)),
            acquire_timeout,
        }
    }

    /// Wait for the slot, up to the configured timeout.
    ///
    /// Contention -- a concurrent scrape holding the permit, or a lockout
    /// window during which the permit is parked -- yields
    /// [`Error::BackingOff`] without touching the device.
    pub async fn acquire(&self) -> Result<SessionPermit, Error> {
        let acquired =
            tokio::time::timeout(self.acquire_timeout, Arc::clone(&self.slot).acquire_owned())
                .await;
        match acquired {
            Ok(Ok(inner)) => Ok(SessionPermit { inner }),
            // The semaphore is never closed; treat it like contention anyway.
            Ok(Err(_)) | Err(_) => Err(Error::BackingOff),
        }
    }

    /// Park the permit for the duration of a device-declared lockout.
    ///
    /// The permit is forgotten now and the slot restored by a detached task
    /// once `wait` elapses -- exactly once, independent of any in-flight
    /// scrape. Until then every `acquire` fails fast.
    pub fn release_after(&self, permit: SessionPermit, wait: Duration) {
        permit.inner.forget();
        let slot = Arc::clone(&self.slot);
        tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            slot.add_permits(1);
            debug!(?wait, "lockout window elapsed, session slot restored");
        });
    }
}
