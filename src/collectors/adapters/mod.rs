//! Network adapter catalog
//!
//! This module defines the adapter descriptors handed to the selector, the
//! cumulative byte counters read from the selected adapter, and the
//! `AdapterCatalog` trait that abstracts the OS facility providing both.
//!
//! ## Module Organization
//!
//! - `system`: `SystemCatalog`, the host implementation (pnet + sysinfo)
//! - `static_catalog`: `StaticCatalog`, an in-memory catalog for tests and embedding

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

pub mod static_catalog;
pub mod system;

pub use static_catalog::StaticCatalog;
pub use system::SystemCatalog;

/// Identifier of a network adapter, stable for the lifetime of a boot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdapterId(String);

impl AdapterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AdapterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Physical link type of an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Ethernet and other wired links
    Wired,
    /// 802.11 wireless links
    Wireless,
    /// Loopback interface (localhost only)
    Loopback,
    /// Tunnels, point-to-point links and anything unclassified
    Other,
}

impl LinkType {
    /// Wired and wireless links carry real host traffic; everything else is ignored
    pub fn is_physical(self) -> bool {
        matches!(self, LinkType::Wired | LinkType::Wireless)
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LinkType::Wired => "wired",
            LinkType::Wireless => "wireless",
            LinkType::Loopback => "loopback",
            LinkType::Other => "other",
        };
        f.write_str(label)
    }
}

/// Operational state of an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationalStatus {
    Up,
    Down,
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationalStatus::Up => f.write_str("up"),
            OperationalStatus::Down => f.write_str("down"),
        }
    }
}

/// One enumerated network adapter
///
/// Descriptors are rebuilt on every enumeration call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterDescriptor {
    /// Stable identifier used to detect adapter switches between samples
    pub id: AdapterId,
    /// Display name (e.g. "eth0", "Wi-Fi")
    pub name: String,
    /// Driver or vendor description, empty when the platform has none
    pub description: String,
    /// Physical link type
    pub link_type: LinkType,
    /// Current operational state
    pub status: OperationalStatus,
    /// Whether an IPv4 default route leaves through this adapter
    pub has_ipv4_gateway: bool,
    /// Hardware address, used to match counters when names differ across facilities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    /// Negotiated link speed in megabits per second, when the platform reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_speed_mbps: Option<u64>,
    /// IPv4 addresses assigned to the adapter
    pub ipv4_addresses: Vec<Ipv4Addr>,
}

impl AdapterDescriptor {
    /// Creates an up adapter without gateway, description or addresses
    pub fn new(id: impl Into<String>, link_type: LinkType) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: AdapterId(id),
            description: String::new(),
            link_type,
            status: OperationalStatus::Up,
            has_ipv4_gateway: false,
            mac_address: None,
            link_speed_mbps: None,
            ipv4_addresses: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: OperationalStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_gateway(mut self, has_ipv4_gateway: bool) -> Self {
        self.has_ipv4_gateway = has_ipv4_gateway;
        self
    }

    pub fn with_link_speed(mut self, mbps: u64) -> Self {
        self.link_speed_mbps = Some(mbps);
        self
    }

    pub fn with_ipv4(mut self, address: Ipv4Addr) -> Self {
        self.ipv4_addresses.push(address);
        self
    }

    pub fn is_up(&self) -> bool {
        self.status == OperationalStatus::Up
    }
}

/// Cumulative byte counters of one adapter since it was brought up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteCounters {
    pub received: u64,
    pub sent: u64,
}

impl ByteCounters {
    pub fn new(received: u64, sent: u64) -> Self {
        Self { received, sent }
    }
}

/// Failures of the adapter-listing facility
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("adapter enumeration unavailable: {0}")]
    Enumeration(String),

    #[error("adapter '{0}' not found")]
    AdapterNotFound(AdapterId),

    #[error("failed to read counters for adapter '{adapter}': {reason}")]
    CounterRead { adapter: AdapterId, reason: String },

    #[error("routing table unavailable: {0}")]
    RouteTable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Source of adapter descriptors and cumulative counters
///
/// Implementations may block on the OS; async callers get the results without
/// stalling the executor.
#[async_trait]
pub trait AdapterCatalog: Send + Sync {
    /// Lists the adapters currently present on the host
    async fn list_adapters(&self) -> Result<Vec<AdapterDescriptor>, CatalogError>;

    /// Reads the cumulative counters of one adapter
    async fn read_counters(&self, adapter: &AdapterDescriptor) -> Result<ByteCounters, CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_link_types() {
        assert!(LinkType::Wired.is_physical());
        assert!(LinkType::Wireless.is_physical());
        assert!(!LinkType::Loopback.is_physical());
        assert!(!LinkType::Other.is_physical());
    }

    #[test]
    fn test_descriptor_builder() {
        let adapter = AdapterDescriptor::new("eth0", LinkType::Wired)
            .with_description("Intel Ethernet")
            .with_gateway(true)
            .with_ipv4(Ipv4Addr::new(192, 168, 1, 10));

        assert_eq!(adapter.id.as_str(), "eth0");
        assert_eq!(adapter.name, "eth0");
        assert!(adapter.is_up());
        assert!(adapter.has_ipv4_gateway);
        assert_eq!(adapter.ipv4_addresses, vec![Ipv4Addr::new(192, 168, 1, 10)]);
    }

    #[test]
    fn test_descriptor_serializes_lowercase_enums() {
        let adapter = AdapterDescriptor::new("wlan0", LinkType::Wireless)
            .with_status(OperationalStatus::Down);
        let json = serde_json::to_value(&adapter).unwrap();

        assert_eq!(json["id"], "wlan0");
        assert_eq!(json["link_type"], "wireless");
        assert_eq!(json["status"], "down");
        assert!(json.get("mac_address").is_none());
        assert!(json.get("link_speed_mbps").is_none());
    }

    #[test]
    fn test_descriptor_without_link_speed_deserializes() {
        let json = r#"{"id":"eth0","name":"eth0","description":"","link_type":"wired",
            "status":"up","has_ipv4_gateway":true,"ipv4_addresses":[]}"#;
        let adapter: AdapterDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(adapter.link_speed_mbps, None);
        assert_eq!(adapter, AdapterDescriptor::new("eth0", LinkType::Wired).with_gateway(true));
    }
}
