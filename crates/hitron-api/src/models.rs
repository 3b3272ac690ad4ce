// Record shapes for the `/data/get<Name>.asp` endpoints.
//
// The device has no schema; these shapes were lifted from live payloads.
// Every numeric-looking value arrives as a string (uptimes, byte counters,
// frequencies), so fields stay `String` here and the collector decides how
// to read them. Unknown fields are ignored by serde's default behavior.

use serde::Deserialize;

/// Endpoint names as they appear in the device URL, `/data/get<Name>.asp`.
///
/// Casing is the device's, not ours: the channel tables are lowercase.
pub mod endpoint {
    pub const SYS_INFO: &str = "SysInfo";
    pub const CM_INIT: &str = "CMInit";
    pub const DOCSIS_WAN: &str = "CmDocsisWan";
    pub const CONNECT_INFO: &str = "ConnectInfo";
    pub const UPSTREAM: &str = "usinfo";
    pub const DOWNSTREAM: &str = "dsinfo";
}

/// Provisioning step state reported in [`CmInit`] fields.
pub const STATUS_SUCCESS: &str = "Success";
/// Network access state in [`CmInit`] and [`CmDocsisWan`].
pub const NETWORK_ACCESS_PERMITTED: &str = "Permitted";
/// `online` value for a currently-connected LAN device.
pub const DEVICE_ONLINE: &str = "active";
/// `connectType` for a DHCP lease.
pub const CONNECT_TYPE_DHCP: &str = "DHCP-IP";
/// `connectType` for a statically configured address.
pub const CONNECT_TYPE_STATIC: &str = "Self-assigned IP";

/// `getSysInfo.asp` -- exactly one record.
#[derive(Debug, Clone, Deserialize)]
pub struct SysInfo {
    #[serde(rename = "hwVersion")]
    pub hw_version: String, // "1A"
    #[serde(rename = "swVersion")]
    pub sw_version: String, // "4.12.34.567-XX-YYY"
    #[serde(rename = "serialNumber")]
    pub serial_number: String, // "VCAP12345678"
    #[serde(rename = "rfMac")]
    pub rf_mac: String, // "68:8F:12:34:12:34"
    #[serde(rename = "wanIp")]
    pub wan_ip: String, // "84.12.34.56/21"
    #[serde(rename = "systemUptime")]
    pub system_uptime: String, // "04 Days,22 Hours,23 Minutes,48 Seconds"
    #[serde(rename = "systemTime", default)]
    pub system_time: String, // "Sat Apr 03, 2021, 14:16:41"
    #[serde(rename = "WRecPkt")]
    pub wan_recv: String, // "815.00M Bytes"
    #[serde(rename = "WSendPkt")]
    pub wan_send: String, // "527.44M Bytes"
    #[serde(rename = "lanIp")]
    pub lan_ip: String, // "192.168.0.1/24"
    #[serde(rename = "LRecPkt")]
    pub lan_recv: String, // "779.79M Bytes"
    #[serde(rename = "LSendPkt")]
    pub lan_send: String, // "1.15G Bytes"
}

/// `getCMInit.asp` -- DOCSIS provisioning state, exactly one record.
///
/// Step fields carry `"Success"` (see [`STATUS_SUCCESS`]) or a failure word;
/// `bpi` is a flat `"AUTH:authorized, TEK:operational"` string.
#[derive(Debug, Clone, Deserialize)]
pub struct CmInit {
    #[serde(rename = "hwInit")]
    pub hw_init: String,
    #[serde(rename = "findDownstream")]
    pub find_downstream: String,
    pub ranging: String,
    pub dhcp: String,
    #[serde(rename = "downloadCfg")]
    pub download_cfg: String,
    pub registration: String,
    #[serde(rename = "bpiStatus")]
    pub bpi_status: String,
    #[serde(rename = "networkAccess")]
    pub network_access: String,
}

/// `getCmDocsisWan.asp` -- DOCSIS WAN addressing, exactly one record.
#[derive(Debug, Clone, Deserialize)]
pub struct CmDocsisWan {
    #[serde(rename = "networkAccess")]
    pub network_access: String,
    #[serde(rename = "cmIpAddress")]
    pub ip_address: String,
    #[serde(rename = "cmNetMask")]
    pub net_mask: String,
    #[serde(rename = "cmGateway")]
    pub gateway: String,
    #[serde(rename = "cmIpLeaseDuration")]
    pub ip_lease_duration: String, // same grammar as the uptime string
}

/// One row of `getConnectInfo.asp` -- the connected-device table.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectedDevice {
    pub id: i64,
    #[serde(rename = "hostName", default)]
    pub host_name: String,
    #[serde(rename = "ipAddr")]
    pub ip_addr: String,
    #[serde(rename = "ipType")]
    pub ip_type: String, // "IPv4" / "IPv6"
    #[serde(rename = "macAddr")]
    pub mac_addr: String,
    #[serde(rename = "connectType")]
    pub connect_type: String, // see CONNECT_TYPE_*
    pub online: String, // see DEVICE_ONLINE
    pub interface: String, // "LAN", "WIFI", ...
    pub comnum: i64,
}

/// One row of `getusinfo.asp` -- the upstream channel table.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamChannel {
    #[serde(rename = "portId")]
    pub port_id: String,
    pub frequency: String, // Hz, as a bare integer string
    pub bandwidth: String, // Hz
    #[serde(rename = "scdmaMode", default)]
    pub scdma_mode: String,
    #[serde(rename = "signalStrength")]
    pub signal_strength: String, // dBmV
    #[serde(rename = "channelId")]
    pub channel_id: String,
}

/// One row of `getdsinfo.asp` -- the downstream channel table.
#[derive(Debug, Clone, Deserialize)]
pub struct DownstreamChannel {
    #[serde(rename = "portId")]
    pub port_id: String,
    pub frequency: String, // Hz
    #[serde(default)]
    pub modulation: String, // "QAM256"
    #[serde(rename = "signalStrength")]
    pub signal_strength: String, // dBmV
    pub snr: String, // dB
    #[serde(rename = "channelId")]
    pub channel_id: String,
}
