#![allow(clippy::unwrap_used)]
// End-to-end scrape tests against a wiremock stand-in for the device.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use prometheus::proto::MetricFamily;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hitron_api::{HitronRouter, RouterConfig, TransportConfig};
use hitron_collector::Collector;

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Collector) {
    let server = MockServer::start().await;
    let config = RouterConfig {
        base_url: Url::parse(&server.uri()).unwrap(),
        username: "admin".into(),
        password: SecretString::from("hunter2".to_string()),
        acquire_timeout: Duration::from_millis(100),
    };
    let router = HitronRouter::new(config, &TransportConfig::default()).unwrap();
    (server, Collector::new(Arc::new(router)))
}

async fn mount_login(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/index.html"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("Set-Cookie", "preSession=deadbeef; Path=/"),
        )
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/goform/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/goform/logout"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

async fn mount_data(server: &MockServer, endpoint: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/data/get{endpoint}.asp")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_all_endpoints(server: &MockServer) {
    mount_data(
        server,
        "SysInfo",
        json!([{
            "hwVersion": "1A",
            "swVersion": "4.12.34.567-XX-YYY",
            "serialNumber": "VCAP12345678",
            "rfMac": "68:8F:12:34:12:34",
            "wanIp": "84.12.34.56/21",
            "systemUptime": "05 Days,21 Hours,33 Minutes,44 Seconds",
            "systemTime": "Sat Apr 03, 2021, 14:16:41",
            "WRecPkt": "815.00M Bytes",
            "WSendPkt": "527.44M Bytes",
            "lanIp": "192.168.0.1/24",
            "LRecPkt": "1.61G Bytes",
            "LSendPkt": "1.15G Bytes"
        }]),
    )
    .await;
    mount_data(
        server,
        "CMInit",
        json!([{
            "hwInit": "Success",
            "findDownstream": "Success",
            "ranging": "Success",
            "dhcp": "Success",
            "downloadCfg": "Success",
            "registration": "Success",
            "bpiStatus": "AUTH:authorized, TEK:operational",
            "networkAccess": "Permitted"
        }]),
    )
    .await;
    mount_data(
        server,
        "CmDocsisWan",
        json!([{
            "networkAccess": "Permitted",
            "cmIpAddress": "10.43.0.8",
            "cmNetMask": "255.255.252.0",
            "cmGateway": "10.43.0.1",
            "cmIpLeaseDuration": "00 Days,05 Hours,42 Minutes,18 Seconds"
        }]),
    )
    .await;
    mount_data(
        server,
        "ConnectInfo",
        json!([
            {
                "id": 1,
                "hostName": "desk",
                "ipAddr": "192.168.0.10",
                "ipType": "IPv4",
                "macAddr": "AA:BB:CC:00:11:22",
                "connectType": "DHCP-IP",
                "online": "active",
                "interface": "LAN",
                "comnum": 1
            },
            {
                "id": 2,
                "hostName": "nas",
                "ipAddr": "192.168.0.20",
                "ipType": "IPv4",
                "macAddr": "AA:BB:CC:00:33:44",
                "connectType": "Self-assigned IP",
                "online": "inactive",
                "interface": "LAN",
                "comnum": 1
            }
        ]),
    )
    .await;
    mount_data(
        server,
        "usinfo",
        json!([{
            "portId": "1",
            "frequency": "36300000",
            "bandwidth": "6400000",
            "scdmaMode": "ATDMA",
            "signalStrength": "36.750",
            "channelId": "3"
        }]),
    )
    .await;
    mount_data(
        server,
        "dsinfo",
        json!([{
            "portId": "1",
            "frequency": "474000000",
            "modulation": "QAM256",
            "signalStrength": "-8.200",
            "snr": "38.605",
            "channelId": "9"
        }]),
    )
    .await;
}

fn gauge_value(families: &[MetricFamily], name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    let family = families.iter().find(|f| f.get_name() == name)?;
    family
        .get_metric()
        .iter()
        .find(|metric| {
            labels.iter().all(|(key, value)| {
                metric
                    .get_label()
                    .iter()
                    .any(|l| l.get_name() == *key && l.get_value() == *value)
            })
        })
        .map(|metric| metric.get_gauge().get_value())
}

fn has_family(families: &[MetricFamily], name: &str) -> bool {
    families
        .iter()
        .any(|f| f.get_name() == name && !f.get_metric().is_empty())
}

// ── Scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn full_scrape_maps_every_resource() {
    let (server, collector) = setup().await;
    mount_login(&server, "success").await;
    mount_all_endpoints(&server).await;

    let registry = collector.scrape().await.unwrap();
    let families = registry.gather();

    assert_eq!(
        gauge_value(&families, "hitron_login_success_bool", &[]),
        Some(1.0)
    );
    assert_eq!(
        gauge_value(&families, "hitron_info_uptime", &[]),
        Some(509_624.0)
    );

    let lan_recv =
        gauge_value(&families, "hitron_traffic", &[("if", "lan"), ("dir", "recv")]).unwrap();
    assert!((lan_recv - 1_728_724_336.64).abs() < 0.01);

    assert_eq!(
        gauge_value(&families, "hitron_cm_hwinit_success", &[]),
        Some(1.0)
    );
    assert_eq!(
        gauge_value(
            &families,
            "hitron_cm_bpi_status",
            &[("auth", "authorized"), ("tek", "operational")]
        ),
        Some(1.0)
    );
    assert_eq!(
        gauge_value(&families, "hitron_cm_dhcp_lease_duration", &[]),
        Some(5.0 * 3600.0 + 42.0 * 60.0 + 18.0)
    );

    // Online device maps to 1, offline to 0; connect types are folded.
    assert_eq!(
        gauge_value(
            &families,
            "hitron_lan_device",
            &[("mac", "AA:BB:CC:00:11:22"), ("ip_type", "dhcp")]
        ),
        Some(1.0)
    );
    assert_eq!(
        gauge_value(
            &families,
            "hitron_lan_device",
            &[("mac", "AA:BB:CC:00:33:44"), ("ip_type", "static")]
        ),
        Some(0.0)
    );

    assert_eq!(
        gauge_value(
            &families,
            "hitron_upstream_signal_strength_dbmv",
            &[("port", "1"), ("channel", "3")]
        ),
        Some(36.75)
    );
    assert_eq!(
        gauge_value(
            &families,
            "hitron_downstream_snr_db",
            &[("port", "1"), ("channel", "9"), ("frequency", "474000000")]
        ),
        Some(38.605)
    );

    // One timing per component: the six endpoints, login, and the total.
    for component in ["all", "login", "SysInfo", "CMInit", "CmDocsisWan", "ConnectInfo", "usinfo", "dsinfo"] {
        assert!(
            gauge_value(&families, "hitron_scrape_time", &[("component", component)]).is_some(),
            "missing timing for {component}"
        );
    }
}

#[tokio::test]
async fn failed_login_emits_indicator_and_total_time_only() {
    let (server, collector) = setup().await;
    mount_login(&server, "garbage").await;

    let registry = collector.scrape().await.unwrap();
    let families = registry.gather();

    assert_eq!(
        gauge_value(&families, "hitron_login_success_bool", &[]),
        Some(0.0)
    );
    assert!(
        gauge_value(&families, "hitron_scrape_time", &[("component", "all")]).is_some()
    );
    // No fetches ran: no login timing, no resource families.
    assert!(
        gauge_value(&families, "hitron_scrape_time", &[("component", "login")]).is_none()
    );
    assert!(!has_family(&families, "hitron_info_uptime"));
    assert!(!has_family(&families, "hitron_lan_device"));
}

#[tokio::test]
async fn lockout_login_reports_failure_without_fetches() {
    let (server, collector) = setup().await;
    mount_login(&server, "LoginProtect=9|58|21").await;

    let registry = collector.scrape().await.unwrap();
    let families = registry.gather();

    assert_eq!(
        gauge_value(&families, "hitron_login_success_bool", &[]),
        Some(0.0)
    );

    // The permit is parked for the lockout window, so the next scrape
    // fails fast on the gate and still reports its indicator.
    let registry = collector.scrape().await.unwrap();
    let families = registry.gather();
    assert_eq!(
        gauge_value(&families, "hitron_login_success_bool", &[]),
        Some(0.0)
    );
}

#[tokio::test]
async fn all_resources_failing_still_logs_out_once() {
    let (server, collector) = setup().await;

    Mock::given(method("GET"))
        .and(path("/index.html"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("Set-Cookie", "preSession=deadbeef; Path=/"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/goform/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("success"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/goform/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;
    // Every data endpoint answers the vendor error marker.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Fail to get the data"))
        .mount(&server)
        .await;

    let registry = collector.scrape().await.unwrap();
    let families = registry.gather();

    assert_eq!(
        gauge_value(&families, "hitron_login_success_bool", &[]),
        Some(1.0)
    );
    assert!(
        gauge_value(&families, "hitron_scrape_time", &[("component", "all")]).is_some()
    );
    assert!(!has_family(&families, "hitron_info_uptime"));

    // Timings are emitted for failed resources too.
    for component in ["SysInfo", "CMInit", "CmDocsisWan", "ConnectInfo", "usinfo", "dsinfo"] {
        assert!(
            gauge_value(&families, "hitron_scrape_time", &[("component", component)]).is_some(),
            "missing timing for {component}"
        );
    }

    // The permit was released exactly once: a second scrape logs in again
    // instead of timing out on the gate. (The logout mock expects 2 calls.)
    let registry = collector.scrape().await.unwrap();
    let families = registry.gather();
    assert_eq!(
        gauge_value(&families, "hitron_login_success_bool", &[]),
        Some(1.0)
    );
}

#[tokio::test]
async fn wrong_record_count_only_costs_that_resource() {
    let (server, collector) = setup().await;
    mount_login(&server, "success").await;
    mount_all_endpoints(&server).await;

    // Override SysInfo with a 2-element array; fixed-shape endpoints
    // require exactly one record.
    let record = json!({
        "hwVersion": "1A",
        "swVersion": "4.12.34.567-XX-YYY",
        "serialNumber": "VCAP12345678",
        "rfMac": "68:8F:12:34:12:34",
        "wanIp": "84.12.34.56/21",
        "systemUptime": "05 Days,21 Hours,33 Minutes,44 Seconds",
        "WRecPkt": "815.00M Bytes",
        "WSendPkt": "527.44M Bytes",
        "lanIp": "192.168.0.1/24",
        "LRecPkt": "1.61G Bytes",
        "LSendPkt": "1.15G Bytes"
    });
    Mock::given(method("GET"))
        .and(path("/data/getSysInfo.asp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record.clone(), record])))
        .with_priority(1)
        .mount(&server)
        .await;

    let registry = collector.scrape().await.unwrap();
    let families = registry.gather();

    assert!(!has_family(&families, "hitron_info_uptime"));
    // Siblings are unaffected.
    assert_eq!(
        gauge_value(&families, "hitron_cm_hwinit_success", &[]),
        Some(1.0)
    );
    assert!(has_family(&families, "hitron_lan_device"));
}
