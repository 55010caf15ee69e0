//! Host adapter catalog
//!
//! Combines three OS views of the network adapters:
//! - `pnet::datalink` for names, descriptions, flags, hardware and IPv4 addresses
//! - the platform probes for link type, operational state and default routes
//! - `sysinfo::Networks` for the cumulative byte counters
//!
//! All of them block, so every call runs on the blocking thread pool.

use async_trait::async_trait;
use log::{debug, trace, warn};
use pnet::datalink::{self, NetworkInterface};
use pnet::util::MacAddr;
use std::net::IpAddr;
use sysinfo::Networks;

use super::{AdapterCatalog, AdapterDescriptor, AdapterId, ByteCounters, CatalogError};
use crate::collectors::platform::{self, GatewayTable};

/// Adapter catalog reading the live host state
#[derive(Debug, Default, Clone)]
pub struct SystemCatalog;

impl SystemCatalog {
    pub fn new() -> Self {
        Self
    }

    fn enumerate() -> Result<Vec<AdapterDescriptor>, CatalogError> {
        let interfaces = datalink::interfaces();

        // A missing route table only costs the gateway preference
        let gateways = platform::read_gateway_table().unwrap_or_else(|e| {
            warn!(
                "Default-route detection failed, treating every adapter as gateway-less: {}",
                e
            );
            GatewayTable::default()
        });

        let adapters: Vec<AdapterDescriptor> = interfaces
            .iter()
            .map(|iface| describe(iface, &gateways))
            .collect();

        debug!(
            "Enumerated {} adapters ({} with an IPv4 default gateway)",
            adapters.len(),
            adapters.iter().filter(|a| a.has_ipv4_gateway).count()
        );
        Ok(adapters)
    }

    fn counters(adapter: &AdapterDescriptor) -> Result<ByteCounters, CatalogError> {
        let networks = Networks::new_with_refreshed_list();
        let list = networks.list();

        // Interface names differ between facilities on some platforms; the
        // hardware address is the tie-breaker.
        let data = list.get(adapter.id.as_str()).or_else(|| {
            let mac = adapter.mac_address.as_deref()?;
            list.values()
                .find(|data| data.mac_address().to_string().eq_ignore_ascii_case(mac))
        });

        let Some(data) = data else {
            return Err(CatalogError::AdapterNotFound(adapter.id.clone()));
        };

        let counters = ByteCounters::new(data.total_received(), data.total_transmitted());
        trace!(
            "Counters for '{}': rx={} bytes, tx={} bytes",
            adapter.id, counters.received, counters.sent
        );
        Ok(counters)
    }
}

fn describe(iface: &NetworkInterface, gateways: &GatewayTable) -> AdapterDescriptor {
    let ipv4_addresses: Vec<_> = iface
        .ips
        .iter()
        .filter_map(|network| match network.ip() {
            IpAddr::V4(address) => Some(address),
            IpAddr::V6(_) => None,
        })
        .collect();

    let link_type = platform::probe_link_type(&iface.name, &iface.description, iface.is_loopback());
    let status = platform::probe_status(&iface.name, iface.is_up());
    let has_ipv4_gateway = gateways.covers(&iface.name, &ipv4_addresses);
    let link_speed_mbps = platform::read_link_speed(&iface.name);

    AdapterDescriptor {
        id: AdapterId::new(iface.name.clone()),
        name: iface.name.clone(),
        description: iface.description.clone(),
        link_type,
        status,
        has_ipv4_gateway,
        mac_address: iface
            .mac
            .filter(|mac| *mac != MacAddr::zero())
            .map(|mac| mac.to_string()),
        link_speed_mbps,
        ipv4_addresses,
    }
}

#[async_trait]
impl AdapterCatalog for SystemCatalog {
    async fn list_adapters(&self) -> Result<Vec<AdapterDescriptor>, CatalogError> {
        tokio::task::spawn_blocking(Self::enumerate).await?
    }

    async fn read_counters(&self, adapter: &AdapterDescriptor) -> Result<ByteCounters, CatalogError> {
        let adapter = adapter.clone();
        tokio::task::spawn_blocking(move || Self::counters(&adapter)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_catalog_enumerates() {
        let catalog = SystemCatalog::new();

        // Sandboxed test hosts may expose nothing beyond loopback; enumeration
        // must still succeed.
        let adapters = catalog.list_adapters().await.expect("enumeration should succeed");
        for adapter in &adapters {
            assert!(!adapter.id.as_str().is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_adapter_counters() {
        let catalog = SystemCatalog::new();
        let ghost = AdapterDescriptor::new(
            "nsw-does-not-exist0",
            crate::collectors::adapters::LinkType::Wired,
        );

        assert!(matches!(
            catalog.read_counters(&ghost).await,
            Err(CatalogError::AdapterNotFound(_))
        ));
    }
}
