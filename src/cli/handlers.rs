use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

use crate::collectors::adapters::AdapterDescriptor;
use crate::collectors::throughput::{
    ThroughputEngine, ThroughputRate, UnitMode, format_speed, tooltip_text,
};

/// One `watch` sample as printed with `--json`
#[derive(Debug, Clone, Serialize)]
pub struct SampleRecord {
    pub timestamp: DateTime<Utc>,
    /// Adapter the reading was taken from, if any
    pub adapter: Option<String>,
    pub down_bps: u64,
    pub up_bps: u64,
    /// Download rate formatted in the selected unit
    pub down: String,
    /// Upload rate formatted in the selected unit
    pub up: String,
}

impl SampleRecord {
    pub fn new(rate: ThroughputRate, adapter: Option<String>, unit: UnitMode) -> Self {
        Self {
            timestamp: Utc::now(),
            adapter,
            down_bps: rate.down,
            up_bps: rate.up,
            down: format_speed(rate.down, unit),
            up: format_speed(rate.up, unit),
        }
    }
}

/// One row of the `adapters` listing
#[derive(Debug, Clone, Serialize)]
pub struct AdapterRow<'a> {
    #[serde(flatten)]
    pub adapter: &'a AdapterDescriptor,
    /// Whether the selector picks this adapter for sampling
    pub selected: bool,
}

/// Runs the non-interactive subcommands against a shared engine
pub struct CommandHandler {
    engine: Arc<ThroughputEngine>,
}

impl CommandHandler {
    pub fn new(engine: Arc<ThroughputEngine>) -> Self {
        Self { engine }
    }

    /// Prints one sample per tick until `count` samples were printed or Ctrl+C
    pub async fn handle_watch(
        &self,
        unit: UnitMode,
        period: Duration,
        count: Option<u64>,
        json: bool,
    ) -> Result<()> {
        info!(
            "Watching throughput every {}s in unit '{}'{}",
            period.as_secs(),
            unit,
            count.map(|n| format!(" for {} samples", n)).unwrap_or_default()
        );

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut printed = 0u64;
        let mut stdout = io::stdout();
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            if count.is_some_and(|limit| printed >= limit) {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    let Some(report) = self.engine.try_sample_once_detailed().await else {
                        continue;
                    };
                    let adapter = report.adapter.map(|id| id.to_string());

                    write_sample(&mut stdout, report.rate, adapter, unit, json)?;
                    printed += 1;
                }
                _ = &mut shutdown => {
                    debug!("Ctrl+C received, stopping watch after {} samples", printed);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Lists every enumerated adapter, marking the one the selector picks
    pub async fn handle_adapters(&self, json: bool) -> Result<()> {
        let adapters = self
            .engine
            .catalog()
            .list_adapters()
            .await
            .context("Failed to enumerate network adapters")?;
        let selected = self.engine.selector().select(&adapters).map(|a| a.id.clone());

        let mut stdout = io::stdout().lock();
        if json {
            let rows: Vec<AdapterRow> = adapters
                .iter()
                .map(|adapter| AdapterRow {
                    adapter,
                    selected: selected.as_ref() == Some(&adapter.id),
                })
                .collect();
            serde_json::to_writer_pretty(&mut stdout, &rows).context("Failed to serialize adapters")?;
            writeln!(stdout)?;
        } else {
            write_adapter_table(&mut stdout, &adapters, selected.as_ref().map(|id| id.as_str()))?;
        }

        Ok(())
    }
}

/// Writes one sample as a tooltip line or a JSON record
pub fn write_sample<W: Write>(
    out: &mut W,
    rate: ThroughputRate,
    adapter: Option<String>,
    unit: UnitMode,
    json: bool,
) -> Result<()> {
    if json {
        let record = SampleRecord::new(rate, adapter, unit);
        serde_json::to_writer(&mut *out, &record).context("Failed to serialize sample")?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", tooltip_text(rate, unit))?;
    }
    out.flush()?;
    Ok(())
}

/// Writes the human-readable adapter table
pub fn write_adapter_table<W: Write>(
    out: &mut W,
    adapters: &[AdapterDescriptor],
    selected: Option<&str>,
) -> Result<()> {
    if adapters.is_empty() {
        writeln!(out, "No network adapters found")?;
        return Ok(());
    }

    writeln!(
        out,
        "  {:<16} {:<9} {:<5} {:<10} {:<8} {}",
        "ADAPTER", "LINK", "STATE", "SPEED", "GATEWAY", "IPV4"
    )?;
    for adapter in adapters {
        let marker = if Some(adapter.id.as_str()) == selected { "*" } else { " " };
        let addresses = adapter
            .ipv4_addresses
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        writeln!(
            out,
            "{} {:<16} {:<9} {:<5} {:<10} {:<8} {}",
            marker,
            adapter.name,
            adapter.link_type.to_string(),
            adapter.status.to_string(),
            link_speed_label(adapter.link_speed_mbps),
            if adapter.has_ipv4_gateway { "yes" } else { "no" },
            if addresses.is_empty() { "-" } else { addresses.as_str() }
        )?;
    }

    match selected {
        Some(id) => writeln!(out, "\n* sampled adapter: {}", id)?,
        None => writeln!(out, "\nNo adapter qualifies for sampling")?,
    }
    Ok(())
}

/// Link speed as shown in the adapter table and dashboard, `-` when unknown
pub fn link_speed_label(mbps: Option<u64>) -> String {
    mbps.map(|mbps| format!("{} Mbps", mbps)).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::adapters::{LinkType, OperationalStatus, StaticCatalog};
    use crate::collectors::throughput::SpeedUnit;
    use std::net::Ipv4Addr;

    #[test]
    fn test_text_sample_is_tooltip_line() {
        let mut out = Vec::new();
        write_sample(&mut out, ThroughputRate::new(1_500_000, 35_000), None, UnitMode::Auto, false)
            .expect("write should succeed");

        assert_eq!(String::from_utf8(out).unwrap(), "↓1.50 MB/s ↑35.0 kB/s\n");
    }

    #[test]
    fn test_json_sample_record() {
        let mut out = Vec::new();
        write_sample(
            &mut out,
            ThroughputRate::new(125_000, 0),
            Some("eth0".to_string()),
            UnitMode::Fixed(SpeedUnit::MegabitsPerSec),
            true,
        )
        .expect("write should succeed");

        let value: serde_json::Value = serde_json::from_slice(&out).expect("output should be JSON");
        assert_eq!(value["adapter"], "eth0");
        assert_eq!(value["down_bps"], 125_000);
        assert_eq!(value["up_bps"], 0);
        assert_eq!(value["down"], "1.00 Mb/s");
        assert_eq!(value["up"], "0.00 Mb/s");
        assert!(value["timestamp"].is_string());
    }

    #[tokio::test(start_paused = true)]
    async fn test_json_record_has_null_adapter_after_enumeration_failure() {
        let catalog = Arc::new(StaticCatalog::new(vec![
            AdapterDescriptor::new("eth0", LinkType::Wired).with_gateway(true),
        ]));
        let engine = ThroughputEngine::new(catalog.clone());
        engine.sample_once().await;

        catalog.set_enumeration_failure(Some("facility offline"));
        tokio::time::advance(Duration::from_secs(1)).await;
        let report = engine.sample_once_detailed().await;

        let mut out = Vec::new();
        write_sample(
            &mut out,
            report.rate,
            report.adapter.map(|id| id.to_string()),
            UnitMode::Auto,
            true,
        )
        .expect("write should succeed");

        let value: serde_json::Value = serde_json::from_slice(&out).expect("output should be JSON");
        assert!(value["adapter"].is_null(), "stale adapter reported: {}", value["adapter"]);
        assert_eq!(value["down_bps"], 0);
    }

    #[test]
    fn test_adapter_table_marks_selection() {
        let adapters = vec![
            AdapterDescriptor::new("lo", LinkType::Loopback).with_ipv4(Ipv4Addr::LOCALHOST),
            AdapterDescriptor::new("eth0", LinkType::Wired)
                .with_gateway(true)
                .with_link_speed(1_000)
                .with_ipv4(Ipv4Addr::new(192, 168, 1, 20)),
            AdapterDescriptor::new("wlan0", LinkType::Wireless).with_status(OperationalStatus::Down),
        ];

        let mut out = Vec::new();
        write_adapter_table(&mut out, &adapters, Some("eth0")).expect("write should succeed");
        let text = String::from_utf8(out).unwrap();

        let eth_line = text.lines().find(|l| l.contains("eth0 ")).expect("eth0 row present");
        assert!(eth_line.starts_with('*'), "selected adapter should be marked: {}", eth_line);
        assert!(eth_line.contains("192.168.1.20"));
        assert!(eth_line.contains("1000 Mbps"), "link speed should be listed: {}", eth_line);

        let wlan_line = text.lines().find(|l| l.contains("wlan0")).expect("wlan0 row present");
        assert!(wlan_line.starts_with(' '));
        assert!(wlan_line.contains("down"));
        assert!(wlan_line.contains(" - "), "unknown link speed should be a dash: {}", wlan_line);
        assert!(text.contains("sampled adapter: eth0"));
    }

    #[test]
    fn test_link_speed_label() {
        assert_eq!(link_speed_label(Some(100)), "100 Mbps");
        assert_eq!(link_speed_label(Some(10_000)), "10000 Mbps");
        assert_eq!(link_speed_label(None), "-");
    }

    #[test]
    fn test_adapter_table_without_selection() {
        let adapters = vec![AdapterDescriptor::new("lo", LinkType::Loopback)];
        let mut out = Vec::new();
        write_adapter_table(&mut out, &adapters, None).expect("write should succeed");

        assert!(String::from_utf8(out).unwrap().contains("No adapter qualifies"));
    }

    #[test]
    fn test_adapter_row_json_flattens_descriptor() {
        let adapter = AdapterDescriptor::new("eth0", LinkType::Wired)
            .with_gateway(true)
            .with_link_speed(2_500);
        let row = AdapterRow { adapter: &adapter, selected: true };

        let value = serde_json::to_value(&row).expect("row should serialize");
        assert_eq!(value["id"], "eth0");
        assert_eq!(value["link_speed_mbps"], 2_500);
        assert_eq!(value["link_type"], "wired");
        assert_eq!(value["has_ipv4_gateway"], true);
        assert_eq!(value["selected"], true);
    }
}
