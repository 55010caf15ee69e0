//! IPv4 default-route table parsing
//!
//! Each platform exposes its routing table in a different text format. The
//! parsers here turn that text into a `GatewayTable` telling which adapters an
//! IPv4 default route leaves through. They are pure so every format is tested
//! on every platform.

use log::trace;
use std::collections::HashSet;
use std::net::Ipv4Addr;

/// RTF_UP from linux/route.h
const RTF_UP: u16 = 0x0001;
/// RTF_GATEWAY from linux/route.h
const RTF_GATEWAY: u16 = 0x0002;

/// Adapters reachable through an IPv4 default gateway
///
/// Unix tables name the outgoing interface; the Windows table names the local
/// address of the interface instead, so both keys are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayTable {
    interfaces: HashSet<String>,
    local_addresses: HashSet<Ipv4Addr>,
}

impl GatewayTable {
    pub fn insert_interface(&mut self, name: impl Into<String>) {
        self.interfaces.insert(name.into());
    }

    pub fn insert_local_address(&mut self, address: Ipv4Addr) {
        self.local_addresses.insert(address);
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty() && self.local_addresses.is_empty()
    }

    /// Whether a default route leaves through the adapter `name` owning `addresses`
    pub fn covers(&self, name: &str, addresses: &[Ipv4Addr]) -> bool {
        self.interfaces.contains(name)
            || addresses.iter().any(|addr| self.local_addresses.contains(addr))
    }
}

/// Parses Linux `/proc/net/route`
///
/// ```text
/// Iface   Destination Gateway  Flags RefCnt Use Metric Mask     MTU Window IRTT
/// eth0    00000000    0101A8C0 0003  0      0   100    00000000 0   0      0
/// ```
pub fn parse_proc_net_route(contents: &str) -> GatewayTable {
    let mut table = GatewayTable::default();

    for line in contents.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 {
            continue;
        }

        let Ok(flags) = u16::from_str_radix(fields[3], 16) else {
            trace!("Skipping route line with unreadable flags: {}", line);
            continue;
        };

        let is_default = fields[1] == "00000000" && fields[7] == "00000000";
        if is_default && flags & RTF_UP != 0 && flags & RTF_GATEWAY != 0 {
            table.insert_interface(fields[0]);
        }
    }

    table
}

/// Parses BSD/macOS `netstat -rn -f inet`
///
/// The `Netif` column position differs between releases, so it is located
/// from the header row.
pub fn parse_netstat_routes(output: &str) -> GatewayTable {
    let mut table = GatewayTable::default();
    let mut columns: Option<(usize, usize)> = None;

    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.first() == Some(&"Destination") {
            let flags = fields.iter().position(|f| *f == "Flags");
            let netif = fields.iter().position(|f| *f == "Netif");
            columns = flags.zip(netif);
            continue;
        }

        let Some((flags_col, netif_col)) = columns else {
            continue;
        };
        if fields.first() != Some(&"default") {
            continue;
        }

        let has_gateway_flag = fields.get(flags_col).is_some_and(|f| f.contains('G'));
        if let (true, Some(netif)) = (has_gateway_flag, fields.get(netif_col)) {
            table.insert_interface(*netif);
        }
    }

    table
}

/// Parses Windows `route print -4`
///
/// Default routes read `0.0.0.0 0.0.0.0 <gateway> <interface address> <metric>`;
/// on-link defaults have no gateway and are ignored.
pub fn parse_route_print(output: &str) -> GatewayTable {
    let mut table = GatewayTable::default();

    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 || fields[0] != "0.0.0.0" || fields[1] != "0.0.0.0" {
            continue;
        }
        if fields[2].parse::<Ipv4Addr>().is_err() {
            continue;
        }
        if let Ok(local) = fields[3].parse::<Ipv4Addr>() {
            table.insert_local_address(local);
        }
    }

    table
}
