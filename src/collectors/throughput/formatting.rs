//! Formatting utilities for throughput values
//!
//! All units are decimal (SI), matching browsers and download managers:
//! 1 kB = 1000 B, 1 MB = 1,000,000 B, 1 Mb = 1,000,000 bits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::collectors::throughput::sampler::ThroughputRate;

const KILO: u128 = 1_000;
const MEGA: u128 = 1_000_000;

/// A fixed display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedUnit {
    /// Bytes per second, integer
    BytesPerSec,
    /// Kilobytes per second, one decimal
    KilobytesPerSec,
    /// Megabytes per second, two decimals
    MegabytesPerSec,
    /// Megabits per second, two decimals
    MegabitsPerSec,
}

impl SpeedUnit {
    pub const ALL: [SpeedUnit; 4] = [
        SpeedUnit::BytesPerSec,
        SpeedUnit::KilobytesPerSec,
        SpeedUnit::MegabytesPerSec,
        SpeedUnit::MegabitsPerSec,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SpeedUnit::BytesPerSec => "B/s",
            SpeedUnit::KilobytesPerSec => "kB/s",
            SpeedUnit::MegabytesPerSec => "MB/s",
            SpeedUnit::MegabitsPerSec => "Mb/s",
        }
    }
}

/// Unit selection: automatic by magnitude, or one fixed unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UnitMode {
    #[default]
    Auto,
    Fixed(SpeedUnit),
}

impl UnitMode {
    /// Next mode in the order Auto, B/s, kB/s, MB/s, Mb/s, Auto
    pub fn next(self) -> Self {
        match self {
            UnitMode::Auto => UnitMode::Fixed(SpeedUnit::BytesPerSec),
            UnitMode::Fixed(SpeedUnit::BytesPerSec) => UnitMode::Fixed(SpeedUnit::KilobytesPerSec),
            UnitMode::Fixed(SpeedUnit::KilobytesPerSec) => UnitMode::Fixed(SpeedUnit::MegabytesPerSec),
            UnitMode::Fixed(SpeedUnit::MegabytesPerSec) => UnitMode::Fixed(SpeedUnit::MegabitsPerSec),
            UnitMode::Fixed(SpeedUnit::MegabitsPerSec) => UnitMode::Auto,
        }
    }
}

impl fmt::Display for UnitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitMode::Auto => f.write_str("auto"),
            UnitMode::Fixed(unit) => f.write_str(unit.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown unit '{0}', expected one of: auto, B/s, kB/s, MB/s, Mb/s")]
pub struct UnitParseError(String);

impl FromStr for UnitMode {
    type Err = UnitParseError;

    /// `MB/s` and `Mb/s` differ only by case, so unit labels are matched exactly
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Ok(UnitMode::Auto);
        }

        let unit = match trimmed {
            "B/s" => SpeedUnit::BytesPerSec,
            "kB/s" | "KB/s" => SpeedUnit::KilobytesPerSec,
            "MB/s" => SpeedUnit::MegabytesPerSec,
            "Mb/s" | "Mbps" => SpeedUnit::MegabitsPerSec,
            _ => return Err(UnitParseError(trimmed.to_string())),
        };
        Ok(UnitMode::Fixed(unit))
    }
}

impl TryFrom<String> for UnitMode {
    type Error = UnitParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UnitMode> for String {
    fn from(mode: UnitMode) -> Self {
        mode.to_string()
    }
}

/// `numerator / denominator` to `places` decimals, ties rounded away from zero
fn fixed_point(numerator: u128, denominator: u128, places: u32) -> String {
    let scale = 10u128.pow(places);
    let scaled = (numerator * scale + denominator / 2) / denominator;
    format!(
        "{}.{:0width$}",
        scaled / scale,
        scaled % scale,
        width = places as usize
    )
}

/// Formats a throughput in one fixed unit
pub fn format_in_unit(bytes_per_second: u64, unit: SpeedUnit) -> String {
    let value = u128::from(bytes_per_second);
    match unit {
        SpeedUnit::BytesPerSec => format!("{} B/s", bytes_per_second),
        SpeedUnit::KilobytesPerSec => format!("{} kB/s", fixed_point(value, KILO, 1)),
        SpeedUnit::MegabytesPerSec => format!("{} MB/s", fixed_point(value, MEGA, 2)),
        SpeedUnit::MegabitsPerSec => format!("{} Mb/s", fixed_point(value * 8, MEGA, 2)),
    }
}

/// Formats a throughput for display
///
/// # Examples
///
/// ```
/// use netspeed_watcher::collectors::throughput::formatting::{format_speed, SpeedUnit, UnitMode};
///
/// assert_eq!(format_speed(999, UnitMode::Auto), "999 B/s");
/// assert_eq!(format_speed(1_000, UnitMode::Auto), "1.0 kB/s");
/// assert_eq!(format_speed(1_500_000, UnitMode::Auto), "1.50 MB/s");
/// assert_eq!(format_speed(125_000, UnitMode::Fixed(SpeedUnit::MegabitsPerSec)), "1.00 Mb/s");
/// ```
pub fn format_speed(bytes_per_second: u64, mode: UnitMode) -> String {
    let unit = match mode {
        UnitMode::Fixed(unit) => unit,
        // Auto never switches to bits
        UnitMode::Auto if bytes_per_second >= 1_000_000 => SpeedUnit::MegabytesPerSec,
        UnitMode::Auto if bytes_per_second >= 1_000 => SpeedUnit::KilobytesPerSec,
        UnitMode::Auto => SpeedUnit::BytesPerSec,
    };
    format_in_unit(bytes_per_second, unit)
}

/// Short form that fits a 16x16 tray icon: whole megabytes or kilobytes
///
/// Anything under 1 MB/s shows at least `1K` so an idle link still renders.
pub fn format_compact(bytes_per_second: u64) -> String {
    if bytes_per_second >= 1_000_000 {
        format!("{}M", bytes_per_second / 1_000_000)
    } else {
        format!("{}K", (bytes_per_second / 1_000).max(1))
    }
}

/// Tooltip text for a rate, e.g. `↓1.2 MB/s ↑35.0 kB/s`
pub fn tooltip_text(rate: ThroughputRate, mode: UnitMode) -> String {
    format!("↓{} ↑{}", format_speed(rate.down, mode), format_speed(rate.up, mode))
}

/// Compact tray label for a rate, e.g. `↓12M ↑1K`
pub fn tray_label(rate: ThroughputRate) -> String {
    format!("↓{} ↑{}", format_compact(rate.down), format_compact(rate.up))
}
