// Metric families for one scrape
//
// Mirrors the Prometheus convention of a fresh registry per pull: the two
// families every scrape emits (the login indicator and the per-component
// timings) are registered up front; everything else is created at record
// time, so a failed resource contributes no families at all instead of a
// misleading zero.

use std::time::Duration;

use prometheus::{Gauge, GaugeVec, Opts, Registry};

use hitron_api::models::{
    CmDocsisWan, CmInit, ConnectedDevice, DownstreamChannel, SysInfo, UpstreamChannel,
    CONNECT_TYPE_DHCP, CONNECT_TYPE_STATIC, DEVICE_ONLINE, NETWORK_ACCESS_PERMITTED,
    STATUS_SUCCESS,
};

use crate::parse::{parse_byte_count, parse_duration, parse_float};

const NAMESPACE: &str = "hitron";

/// Timing component for the whole scrape.
pub const COMPONENT_ALL: &str = "all";
/// Timing component for the login exchange.
pub const COMPONENT_LOGIN: &str = "login";

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<Gauge, prometheus::Error> {
    let metric = Gauge::with_opts(Opts::new(name, help).namespace(NAMESPACE))?;
    registry.register(Box::new(metric.clone()))?;
    Ok(metric)
}

fn gauge_vec(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<GaugeVec, prometheus::Error> {
    let metric = GaugeVec::new(Opts::new(name, help).namespace(NAMESPACE), labels)?;
    registry.register(Box::new(metric.clone()))?;
    Ok(metric)
}

fn bool_value(expected: &str, actual: &str) -> f64 {
    if expected == actual { 1.0 } else { 0.0 }
}

/// All observations of a single scrape, bound to its registry.
pub struct ScrapeMetrics {
    registry: Registry,
    login_success: Gauge,
    scrape_time: GaugeVec,
}

impl ScrapeMetrics {
    /// Register the always-emitted families on `registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        Ok(Self {
            login_success: gauge(registry, "login_success_bool", "1 if the login was successful")?,
            scrape_time: gauge_vec(
                registry,
                "scrape_time",
                "Time the scrape run took, per component",
                &["component"],
            )?,
            registry: registry.clone(),
        })
    }

    pub fn login_success(&self, success: bool) {
        self.login_success.set(if success { 1.0 } else { 0.0 });
    }

    /// Record one component's wall time. Emitted for every resource task
    /// whether or not the fetch succeeded.
    pub fn observe_time(&self, component: &str, elapsed: Duration) {
        self.scrape_time
            .with_label_values(&[component])
            .set(elapsed.as_secs_f64());
    }

    // ── Per-resource mappings ───────────────────────────────────────
    //
    // Each method creates its families on first (and only) use within a
    // scrape; they exist in the output only if the resource decoded.

    pub fn record_sys_info(&self, info: &SysInfo) -> Result<(), prometheus::Error> {
        gauge(&self.registry, "info_uptime", "System uptime in seconds")?
            .set(parse_duration(&info.system_uptime));

        gauge_vec(
            &self.registry,
            "version",
            "Versions in labels",
            &["hw_version", "sw_version", "serial"],
        )?
        .with_label_values(&[
            info.hw_version.as_str(),
            info.sw_version.as_str(),
            info.serial_number.as_str(),
        ])
        .set(1.0);

        gauge_vec(
            &self.registry,
            "address",
            "Hardware and IP addresses in labels",
            &["wan_ip", "lan_ip", "rf_mac"],
        )?
        .with_label_values(&[info.wan_ip.as_str(), info.lan_ip.as_str(), info.rf_mac.as_str()])
        .set(1.0);

        let traffic = gauge_vec(
            &self.registry,
            "traffic",
            "Basic traffic counters. if=wan/lan, dir=send/recv.",
            &["if", "dir"],
        )?;
        traffic
            .with_label_values(&["lan", "recv"])
            .set(parse_byte_count(&info.lan_recv));
        traffic
            .with_label_values(&["lan", "send"])
            .set(parse_byte_count(&info.lan_send));
        traffic
            .with_label_values(&["wan", "recv"])
            .set(parse_byte_count(&info.wan_recv));
        traffic
            .with_label_values(&["wan", "send"])
            .set(parse_byte_count(&info.wan_send));
        Ok(())
    }

    pub fn record_cm_init(&self, init: &CmInit) -> Result<(), prometheus::Error> {
        let steps = [
            ("cm_hwinit_success", "DOCSIS Provisioning HWInit Status", &init.hw_init),
            (
                "cm_find_downstream_success",
                "DOCSIS Provisioning Lock Downstream Status",
                &init.find_downstream,
            ),
            ("cm_ranging_success", "DOCSIS Provisioning Ranging Status", &init.ranging),
            ("cm_dhcp_success", "DOCSIS Provisioning DHCP Status", &init.dhcp),
            (
                "cm_download_config_success",
                "DOCSIS Provisioning Download CM Config File Status",
                &init.download_cfg,
            ),
            (
                "cm_registration_success",
                "DOCSIS Provisioning Registration Status",
                &init.registration,
            ),
        ];
        for (name, help, status) in steps {
            gauge(&self.registry, name, help)?.set(bool_value(STATUS_SUCCESS, status));
        }

        gauge(
            &self.registry,
            "cm_network_access_status",
            "DOCSIS Network Access Permission",
        )?
        .set(bool_value(NETWORK_ACCESS_PERMITTED, &init.network_access));

        // bpiStatus is a flat "AUTH:authorized, TEK:operational" string.
        let mut auth = "";
        let mut tek = "";
        for pair in init.bpi_status.split(", ") {
            match pair.split_once(':') {
                Some(("AUTH", value)) => auth = value,
                Some(("TEK", value)) => tek = value,
                _ => {}
            }
        }
        gauge_vec(
            &self.registry,
            "cm_bpi_status",
            "DOCSIS Provisioning BPI Status",
            &["auth", "tek"],
        )?
        .with_label_values(&[auth, tek])
        .set(1.0);
        Ok(())
    }

    pub fn record_docsis_wan(&self, wan: &CmDocsisWan) -> Result<(), prometheus::Error> {
        gauge_vec(
            &self.registry,
            "cm_docsis_addr",
            "DOCSIS IP addresses",
            &["ip", "netmask", "gateway"],
        )?
        .with_label_values(&[wan.ip_address.as_str(), wan.net_mask.as_str(), wan.gateway.as_str()])
        .set(bool_value(NETWORK_ACCESS_PERMITTED, &wan.network_access));

        gauge(
            &self.registry,
            "cm_dhcp_lease_duration",
            "DOCSIS DHCP lease duration in seconds",
        )?
        .set(parse_duration(&wan.ip_lease_duration));
        Ok(())
    }

    pub fn record_connected_devices(
        &self,
        devices: &[ConnectedDevice],
    ) -> Result<(), prometheus::Error> {
        let lan_device = gauge_vec(
            &self.registry,
            "lan_device",
            "LAN device table, 1=online",
            &["id", "ip", "ip_version", "mac", "ip_type", "interface", "comnum"],
        )?;
        for device in devices {
            let connect_type = match device.connect_type.as_str() {
                CONNECT_TYPE_DHCP => "dhcp",
                CONNECT_TYPE_STATIC => "static",
                other => other,
            };
            let id = device.id.to_string();
            let comnum = device.comnum.to_string();
            lan_device
                .with_label_values(&[
                    id.as_str(),
                    device.ip_addr.as_str(),
                    device.ip_type.as_str(),
                    device.mac_addr.as_str(),
                    connect_type,
                    device.interface.as_str(),
                    comnum.as_str(),
                ])
                .set(bool_value(DEVICE_ONLINE, &device.online));
        }
        Ok(())
    }

    pub fn record_upstream(&self, channels: &[UpstreamChannel]) -> Result<(), prometheus::Error> {
        let signal = gauge_vec(
            &self.registry,
            "upstream_signal_strength_dbmv",
            "Upstream channel signal strength",
            &["port", "channel", "frequency"],
        )?;
        let bandwidth = gauge_vec(
            &self.registry,
            "upstream_bandwidth_hz",
            "Upstream channel bandwidth",
            &["port", "channel"],
        )?;
        for ch in channels {
            signal
                .with_label_values(&[ch.port_id.as_str(), ch.channel_id.as_str(), ch.frequency.as_str()])
                .set(parse_float(&ch.signal_strength));
            bandwidth
                .with_label_values(&[ch.port_id.as_str(), ch.channel_id.as_str()])
                .set(parse_float(&ch.bandwidth));
        }
        Ok(())
    }

    pub fn record_downstream(
        &self,
        channels: &[DownstreamChannel],
    ) -> Result<(), prometheus::Error> {
        let signal = gauge_vec(
            &self.registry,
            "downstream_signal_strength_dbmv",
            "Downstream channel signal strength",
            &["port", "channel", "frequency"],
        )?;
        let snr = gauge_vec(
            &self.registry,
            "downstream_snr_db",
            "Downstream channel signal-to-noise ratio",
            &["port", "channel", "frequency"],
        )?;
        for ch in channels {
            let labels = [ch.port_id.as_str(), ch.channel_id.as_str(), ch.frequency.as_str()];
            signal.with_label_values(&labels).set(parse_float(&ch.signal_strength));
            snr.with_label_values(&labels).set(parse_float(&ch.snr));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn failed_resources_leave_no_families_behind() {
        let registry = Registry::new();
        let metrics = ScrapeMetrics::register(&registry).unwrap();
        metrics.login_success(true);

        // Only the always-on indicator carries a sample; per-resource
        // families appear only once their record_* method ran.
        let names: Vec<String> = registry
            .gather()
            .iter()
            .filter(|family| !family.get_metric().is_empty())
            .map(|family| family.get_name().to_owned())
            .collect();

        assert_eq!(names, vec!["hitron_login_success_bool".to_owned()]);
    }

    #[test]
    fn bpi_status_pairs_are_split() {
        let registry = Registry::new();
        let metrics = ScrapeMetrics::register(&registry).unwrap();
        metrics
            .record_cm_init(&CmInit {
                hw_init: "Success".into(),
                find_downstream: "Success".into(),
                ranging: "Success".into(),
                dhcp: "Success".into(),
                download_cfg: "Success".into(),
                registration: "Success".into(),
                bpi_status: "AUTH:authorized, TEK:operational".into(),
                network_access: "Permitted".into(),
            })
            .unwrap();

        let families = registry.gather();
        let bpi = families
            .iter()
            .find(|family| family.get_name() == "hitron_cm_bpi_status")
            .unwrap();
        let labels = bpi.get_metric()[0].get_label();
        assert!(labels
            .iter()
            .any(|l| l.get_name() == "auth" && l.get_value() == "authorized"));
        assert!(labels
            .iter()
            .any(|l| l.get_name() == "tek" && l.get_value() == "operational"));
    }
}
