//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Baby activity tracker.
///
/// Records feedings, diaper changes and sleep in a plain-text log and derives
/// daily and rolling statistics from it.
#[derive(Debug, Parser)]
#[command(name = "bt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record an activity (feeding, wet diaper, poo diaper, mixed diaper, asleep, awake).
    Record {
        /// The activity; anything outside the known set is kept as free text.
        activity: String,

        /// Free-text notes, e.g. "120 mL".
        #[arg(short, long, default_value = "")]
        notes: String,

        /// When it happened (YYYY-MM-DDTHH:MM, "now", or e.g. "20 minutes ago").
        #[arg(short, long, default_value = "now")]
        time: String,
    },

    /// Show the log.
    Log {
        /// Newest entries first.
        #[arg(short, long)]
        reverse: bool,

        /// Include archived entries.
        #[arg(short, long)]
        all: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Replace the active log with text read from stdin.
    Edit,

    /// Show statistics for one day.
    Day {
        /// The day (YYYY-MM-DD, "today", "yesterday"). Defaults to today.
        #[arg(short, long)]
        date: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show one row of statistics per day.
    History {
        /// Only the most recent N days.
        #[arg(short, long)]
        days: Option<u32>,

        /// Leave naps bounded by unpaired sleep markers out of nap statistics.
        #[arg(long)]
        exclude_anomalies: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show how often the baby is asleep at each time of day.
    Histogram {
        /// Only naps from the most recent N days.
        #[arg(short, long)]
        days: Option<u32>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List naps and unpaired sleep markers.
    Naps {
        /// Only naps starting on this day (YYYY-MM-DD, "today", "yesterday").
        #[arg(short, long)]
        date: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show storage locations and sizes.
    Status,
}
