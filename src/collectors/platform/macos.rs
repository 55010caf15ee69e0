//! macOS adapter probes

use anyhow::Context;
use log::debug;
use std::process::Command;

use super::routes::{GatewayTable, parse_netstat_routes};
use crate::collectors::adapters::CatalogError;

/// Reads the IPv4 default-route table from `netstat -rn -f inet`
pub fn read_gateway_table() -> Result<GatewayTable, CatalogError> {
    let output = Command::new("netstat")
        .args(["-rn", "-f", "inet"])
        .output()
        .context("Failed to run netstat")
        .map_err(|e| CatalogError::RouteTable(format!("{e:#}")))?;

    if !output.status.success() {
        return Err(CatalogError::RouteTable(format!(
            "netstat exited with {}",
            output.status
        )));
    }

    let table = parse_netstat_routes(&String::from_utf8_lossy(&output.stdout));
    debug!("Parsed netstat default-route table: {:?}", table);
    Ok(table)
}
