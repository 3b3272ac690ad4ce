// Scrape coordinator
//
// One `scrape()` call per external metrics pull: login, fan out one task
// per data endpoint, join, log out. Resource failures are isolated -- they
// cost their own observations and nothing else. The session permit rides
// inside the `Session`, so the single release happens on every path out of
// the fan-out, panics included.

use std::sync::Arc;
use std::time::Instant;

use prometheus::Registry;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use hitron_api::models::endpoint;
use hitron_api::{HitronRouter, Session};

use crate::metrics::{ScrapeMetrics, COMPONENT_ALL, COMPONENT_LOGIN};

/// Drives one full login -> fan-out-fetch -> logout cycle per call.
pub struct Collector {
    router: Arc<HitronRouter>,
}

impl Collector {
    pub fn new(router: Arc<HitronRouter>) -> Self {
        Self { router }
    }

    /// Run one scrape and return its registry, ready for exposition.
    ///
    /// Always emits the login indicator and the total elapsed time, even
    /// when the login fails and no fetches run.
    pub async fn scrape(&self) -> Result<Registry, prometheus::Error> {
        let registry = Registry::new();
        let metrics = Arc::new(ScrapeMetrics::register(&registry)?);

        let scrape_start = Instant::now();
        match self.router.login().await {
            Err(err) if err.is_backoff() => {
                info!(%err, "scrape aborted");
                metrics.login_success(false);
            }
            Err(err) => {
                warn!(%err, "login failed");
                metrics.login_success(false);
            }
            Ok(session) => {
                metrics.login_success(true);
                metrics.observe_time(COMPONENT_LOGIN, scrape_start.elapsed());
                self.fan_out(session, &metrics).await;
            }
        }
        metrics.observe_time(COMPONENT_ALL, scrape_start.elapsed());
        debug!("scrape done");

        Ok(registry)
    }

    /// Fetch all six resources concurrently, then end the session.
    async fn fan_out(&self, session: Session, metrics: &Arc<ScrapeMetrics>) {
        let session = Arc::new(session);

        let mut tasks = JoinSet::new();
        tasks.spawn(collect_sys_info(Arc::clone(&session), Arc::clone(metrics)));
        tasks.spawn(collect_cm_init(Arc::clone(&session), Arc::clone(metrics)));
        tasks.spawn(collect_docsis_wan(Arc::clone(&session), Arc::clone(metrics)));
        tasks.spawn(collect_connected_devices(Arc::clone(&session), Arc::clone(metrics)));
        tasks.spawn(collect_upstream(Arc::clone(&session), Arc::clone(metrics)));
        tasks.spawn(collect_downstream(Arc::clone(&session), Arc::clone(metrics)));

        // Barrier: a panicked task loses its observations, nothing more.
        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                warn!(%err, "resource task failed to join");
            }
        }

        // All tasks have joined, so this is the last reference. If it ever
        // were not, dropping the Arc still releases the permit.
        if let Some(session) = Arc::into_inner(session) {
            session.logout().await;
        }
    }
}

// ── Per-resource tasks ──────────────────────────────────────────────
//
// Each records its own wall time under the endpoint's name, success or
// not, and reports mapping problems without touching its siblings.

async fn collect_sys_info(session: Arc<Session>, metrics: Arc<ScrapeMetrics>) {
    let start = Instant::now();
    match session.sys_info().await {
        Ok(ref record) => {
            if let Err(err) = metrics.record_sys_info(record) {
                warn!(%err, "recording SysInfo metrics");
            }
        }
        Err(err) => warn!(%err, "SysInfo fetch failed"),
    }
    metrics.observe_time(endpoint::SYS_INFO, start.elapsed());
}

async fn collect_cm_init(session: Arc<Session>, metrics: Arc<ScrapeMetrics>) {
    let start = Instant::now();
    match session.cm_init().await {
        Ok(ref record) => {
            if let Err(err) = metrics.record_cm_init(record) {
                warn!(%err, "recording CMInit metrics");
            }
        }
        Err(err) => warn!(%err, "CMInit fetch failed"),
    }
    metrics.observe_time(endpoint::CM_INIT, start.elapsed());
}

async fn collect_docsis_wan(session: Arc<Session>, metrics: Arc<ScrapeMetrics>) {
    let start = Instant::now();
    match session.docsis_wan().await {
        Ok(ref record) => {
            if let Err(err) = metrics.record_docsis_wan(record) {
                warn!(%err, "recording CmDocsisWan metrics");
            }
        }
        Err(err) => warn!(%err, "CmDocsisWan fetch failed"),
    }
    metrics.observe_time(endpoint::DOCSIS_WAN, start.elapsed());
}

async fn collect_connected_devices(session: Arc<Session>, metrics: Arc<ScrapeMetrics>) {
    let start = Instant::now();
    match session.connected_devices().await {
        Ok(ref rows) => {
            if let Err(err) = metrics.record_connected_devices(rows) {
                warn!(%err, "recording ConnectInfo metrics");
            }
        }
        Err(err) => warn!(%err, "ConnectInfo fetch failed"),
    }
    metrics.observe_time(endpoint::CONNECT_INFO, start.elapsed());
}

async fn collect_upstream(session: Arc<Session>, metrics: Arc<ScrapeMetrics>) {
    let start = Instant::now();
    match session.upstream_channels().await {
        Ok(ref rows) => {
            if let Err(err) = metrics.record_upstream(rows) {
                warn!(%err, "recording usinfo metrics");
            }
        }
        Err(err) => warn!(%err, "usinfo fetch failed"),
    }
    metrics.observe_time(endpoint::UPSTREAM, start.elapsed());
}

async fn collect_downstream(session: Arc<Session>, metrics: Arc<ScrapeMetrics>) {
    let start = Instant::now();
    match session.downstream_channels().await {
        Ok(ref rows) => {
            if let Err(err) = metrics.record_downstream(rows) {
                warn!(%err, "recording dsinfo metrics");
            }
        }
        Err(err) => warn!(%err, "dsinfo fetch failed"),
    }
    metrics.observe_time(endpoint::DOWNSTREAM, start.elapsed());
}
