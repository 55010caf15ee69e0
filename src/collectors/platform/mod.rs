//! Platform-specific adapter probes
//!
//! Provides the link type, operational state, link speed and default-route
//! information that the cross-platform interface listing does not carry.

use crate::collectors::adapters::{CatalogError, LinkType, OperationalStatus};

/// Name and description based link type detection
pub mod link_classifier;

/// Default-route table parsers for every supported platform
pub mod routes;

/// Linux probes via sysfs and procfs
#[cfg(target_os = "linux")]
pub mod linux;

/// macOS probes via netstat
#[cfg(target_os = "macos")]
pub mod macos;

/// Windows probes via route print
#[cfg(target_os = "windows")]
pub mod windows;

pub use routes::GatewayTable;

/// Reads the table of adapters an IPv4 default route leaves through
pub fn read_gateway_table() -> Result<GatewayTable, CatalogError> {
    #[cfg(target_os = "linux")]
    {
        linux::read_gateway_table()
    }

    #[cfg(target_os = "macos")]
    {
        macos::read_gateway_table()
    }

    #[cfg(target_os = "windows")]
    {
        windows::read_gateway_table()
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        Err(CatalogError::RouteTable(
            "Unsupported platform for default-route detection".to_string(),
        ))
    }
}

/// Determines the link type of an adapter
pub fn probe_link_type(name: &str, description: &str, is_loopback: bool) -> LinkType {
    #[cfg(target_os = "linux")]
    {
        if let Some(link_type) = linux::sysfs_link_type(name) {
            return link_type;
        }
    }

    link_classifier::classify_link(name, description, is_loopback)
}

/// Determines the operational state of an adapter
#[cfg_attr(not(target_os = "linux"), allow(unused_variables))]
pub fn probe_status(name: &str, administratively_up: bool) -> OperationalStatus {
    #[cfg(target_os = "linux")]
    {
        if let Some(status) = linux::sysfs_operstate(name, administratively_up) {
            return status;
        }
    }

    if administratively_up {
        OperationalStatus::Up
    } else {
        OperationalStatus::Down
    }
}

/// Negotiated link speed in Mb/s, `None` when the platform does not report it
#[cfg_attr(not(target_os = "linux"), allow(unused_variables))]
pub fn read_link_speed(name: &str) -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        linux::sysfs_link_speed(name)
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}
