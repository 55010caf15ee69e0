//! Primary adapter selection
//!
//! Picks the single adapter whose counters represent "the" connection. The
//! adapter carrying the IPv4 default route wins; virtual, tunnel and capture
//! adapters are skipped because they double-count or never count traffic.

use log::{debug, trace};

use crate::collectors::adapters::AdapterDescriptor;

/// Case-insensitive substrings that disqualify an adapter by name or description
pub const DEFAULT_DENYLIST: &[&str] = &[
    // Tunneling pseudo-interfaces
    "teredo",
    "isatap",
    "tunnel",
    "loopback",
    // Hypervisors and container networking
    "hyper-v",
    "hyperv",
    "vmware",
    "virtualbox",
    "virtual",
    "vboxnet",
    "vmnet",
    "virbr",
    "docker",
    "veth",
    "br-",
    // VPN clients
    "vpn",
    // Packet-capture drivers
    "npcap",
    // Personal-area networking
    "bluetooth",
];

/// Chooses the primary adapter from an enumeration
#[derive(Debug, Clone)]
pub struct AdapterSelector {
    /// Lowercased denylist substrings
    denylist: Vec<String>,
}

impl Default for AdapterSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterSelector {
    /// Creates a selector using `DEFAULT_DENYLIST`
    pub fn new() -> Self {
        Self {
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Creates a selector using `DEFAULT_DENYLIST` plus `extra` substrings
    pub fn with_extra_denylist<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selector = Self::new();
        selector.denylist.extend(
            extra
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        );
        selector
    }

    pub fn denylist(&self) -> &[String] {
        &self.denylist
    }

    /// Whether the adapter's name or description contains a denylisted substring
    pub fn is_denied(&self, adapter: &AdapterDescriptor) -> bool {
        let name = adapter.name.to_lowercase();
        let description = adapter.description.to_lowercase();

        self.denylist
            .iter()
            .any(|banned| name.contains(banned.as_str()) || description.contains(banned.as_str()))
    }

    /// Selects the primary adapter, first match wins:
    ///
    /// 1. up, wired or wireless adapters are eligible
    /// 2. eligible adapters not on the denylist with an IPv4 default gateway
    /// 3. otherwise the first eligible adapter, denylisted or not
    pub fn select<'a>(&self, adapters: &'a [AdapterDescriptor]) -> Option<&'a AdapterDescriptor> {
        let eligible: Vec<&AdapterDescriptor> = adapters
            .iter()
            .filter(|adapter| adapter.is_up() && adapter.link_type.is_physical())
            .collect();

        trace!(
            "{} of {} adapters are up and physical",
            eligible.len(),
            adapters.len()
        );

        let with_gateway = eligible
            .iter()
            .copied()
            .filter(|adapter| !self.is_denied(adapter))
            .find(|adapter| adapter.has_ipv4_gateway);

        if let Some(adapter) = with_gateway {
            debug!("Selected '{}' (IPv4 default gateway)", adapter.id);
            return Some(adapter);
        }

        let fallback = eligible.first().copied();
        match fallback {
            Some(adapter) => debug!("Selected '{}' (fallback, no gateway-bearing adapter)", adapter.id),
            None => debug!("No adapter qualifies for selection"),
        }
        fallback
    }
}
