use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::collectors::throughput::UnitMode;

/// Main CLI structure for the netspeed-watcher application
/// Uses clap's derive macros for automatic CLI generation
#[derive(Parser)]
#[command(version)] // Automatically uses version from Cargo.toml
#[command(about = "Network speed watcher - live download/upload throughput of the primary adapter")]
#[command(long_about = "Netspeed Watcher samples the byte counters of the adapter that carries your \
internet traffic and reports one smoothed download/upload figure per tick. The primary adapter is \
the first physical, up adapter with an IPv4 default gateway; virtual, VPN and capture adapters are \
skipped. Settings are read from netspeed-watcher.toml and NSW_* environment variables.")]
pub struct Cli {
    /// Settings file; defaults to netspeed-watcher.toml in the working directory
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Interactive terminal dashboard with the current speed and adapter list
    #[command(about = "Show live throughput in an interactive dashboard")]
    #[command(long_about = "Launches a terminal dashboard showing the smoothed throughput of the \
primary adapter, the compact tray label and every enumerated adapter.\n\n\
Keys:\n  \
u          cycle the display unit (auto, B/s, kB/s, MB/s, Mb/s)\n  \
r          refresh the adapter list\n  \
q / ESC    quit\n\n\
Examples:\n  \
nsw live                  # Auto units, 1 second ticks\n  \
nsw live --unit Mb/s      # Fixed megabits per second")]
    Live {
        /// Display unit
        #[arg(short, long, help = "Display unit: auto, B/s, kB/s, MB/s, Mb/s")]
        unit: Option<UnitMode>,

        /// Seconds between samples
        #[arg(short = 'i', long, help = "Update interval in seconds")]
        interval: Option<u64>,
    },

    /// Print one line per sample tick
    #[command(about = "Print throughput samples to stdout")]
    #[command(long_about = "Prints one line per tick in tooltip form, e.g. '↓1.50 MB/s ↑35.0 kB/s'. \
The first line is always zero while the counter baseline is established.\n\n\
Examples:\n  \
nsw watch --count 10             # Ten samples, then exit\n  \
nsw watch --json --interval 5    # JSON records every 5 seconds")]
    Watch {
        /// Display unit
        #[arg(short, long, help = "Display unit: auto, B/s, kB/s, MB/s, Mb/s")]
        unit: Option<UnitMode>,

        /// Seconds between samples
        #[arg(short = 'i', long, help = "Update interval in seconds")]
        interval: Option<u64>,

        /// Stop after this many samples
        #[arg(short = 'n', long, help = "Number of samples to print (default: until Ctrl+C)")]
        count: Option<u64>,

        /// Emit JSON records instead of text
        #[arg(long, help = "Print one JSON object per sample")]
        json: bool,
    },

    /// List enumerated adapters and mark the primary one
    #[command(about = "List network adapters and show which one is sampled")]
    Adapters {
        /// Emit JSON instead of a table
        #[arg(long, help = "Print adapters as a JSON array")]
        json: bool,
    },
}
