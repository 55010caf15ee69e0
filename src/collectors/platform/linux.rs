//! Linux adapter probes
//!
//! Link type, operational state and link speed come from
//! `/sys/class/net/<iface>`, the default-route table from `/proc/net/route`.

use log::{debug, trace};
use std::fs;
use std::path::{Path, PathBuf};

use super::routes::{GatewayTable, parse_proc_net_route};
use crate::collectors::adapters::{CatalogError, LinkType, OperationalStatus};

const SYSFS_NET: &str = "/sys/class/net";
const PROC_NET_ROUTE: &str = "/proc/net/route";

/// ARPHRD_ETHER from linux/if_arp.h
const ARPHRD_ETHER: u32 = 1;
/// ARPHRD_LOOPBACK from linux/if_arp.h
const ARPHRD_LOOPBACK: u32 = 772;

fn sysfs_path(interface_name: &str) -> PathBuf {
    Path::new(SYSFS_NET).join(interface_name)
}

/// Reads the IPv4 default-route table
pub fn read_gateway_table() -> Result<GatewayTable, CatalogError> {
    let contents = fs::read_to_string(PROC_NET_ROUTE)?;
    let table = parse_proc_net_route(&contents);
    debug!("Parsed {} default-route table: {:?}", PROC_NET_ROUTE, table);
    Ok(table)
}

/// Link type from the ARP hardware type, `None` when sysfs has no entry
pub fn sysfs_link_type(interface_name: &str) -> Option<LinkType> {
    let base = sysfs_path(interface_name);
    let hardware_type: u32 = fs::read_to_string(base.join("type"))
        .ok()?
        .trim()
        .parse()
        .ok()?;

    let link_type = match hardware_type {
        ARPHRD_LOOPBACK => LinkType::Loopback,
        ARPHRD_ETHER if base.join("wireless").exists() || base.join("phy80211").exists() => {
            LinkType::Wireless
        }
        ARPHRD_ETHER => LinkType::Wired,
        _ => LinkType::Other,
    };

    trace!(
        "sysfs link type for '{}': arphrd={} -> {}",
        interface_name, hardware_type, link_type
    );
    Some(link_type)
}

/// Operational state from `operstate`
///
/// Drivers that do not track carrier report `unknown`; those fall back to the
/// administrative flag.
pub fn sysfs_operstate(interface_name: &str, administratively_up: bool) -> Option<OperationalStatus> {
    let operstate = fs::read_to_string(sysfs_path(interface_name).join("operstate")).ok()?;
    let status = match operstate.trim() {
        "up" => OperationalStatus::Up,
        "unknown" if administratively_up => OperationalStatus::Up,
        _ => OperationalStatus::Down,
    };
    Some(status)
}

/// Negotiated link speed from `speed`
///
/// Reading the file fails with EINVAL while the link is down, and virtual
/// drivers report -1; both give `None`.
pub fn sysfs_link_speed(interface_name: &str) -> Option<u64> {
    let contents = fs::read_to_string(sysfs_path(interface_name).join("speed")).ok()?;
    let speed = parse_sysfs_speed(&contents);
    trace!("sysfs link speed for '{}': {:?} Mb/s", interface_name, speed);
    speed
}

fn parse_sysfs_speed(contents: &str) -> Option<u64> {
    match contents.trim().parse::<i64>().ok()? {
        mbps if mbps > 0 => u64::try_from(mbps).ok(),
        _ => None,
    }
}
