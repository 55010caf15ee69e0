//! Windows adapter probes

use anyhow::Context;
use log::debug;
use std::process::Command;

use super::routes::{GatewayTable, parse_route_print};
use crate::collectors::adapters::CatalogError;

/// Reads the IPv4 default-route table from `route print -4`
pub fn read_gateway_table() -> Result<GatewayTable, CatalogError> {
    let output = Command::new("route")
        .args(["print", "-4"])
        .output()
        .context("Failed to run route print")
        .map_err(|e| CatalogError::RouteTable(format!("{e:#}")))?;

    if !output.status.success() {
        return Err(CatalogError::RouteTable(format!(
            "route print exited with {}",
            output.status
        )));
    }

    let table = parse_route_print(&String::from_utf8_lossy(&output.stdout));
    debug!("Parsed route print default-route table: {:?}", table);
    Ok(table)
}
