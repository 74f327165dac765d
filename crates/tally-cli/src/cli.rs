//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// One-button time tracker.
///
/// Start a timer, stop it, and review the month's sessions with daily,
/// weekly and monthly totals.
#[derive(Debug, Parser)]
#[command(name = "tally", version, about, long_about = None)]
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
    /// Start a new session.
    Start {
        /// Start time (ISO 8601 or relative, e.g. "10 minutes ago").
        #[arg(long)]
        at: Option<String>,
    },

    /// Stop the running session.
    Stop {
        /// End time (ISO 8601 or relative, e.g. "10 minutes ago").
        #[arg(long)]
        at: Option<String>,
    },

    /// Stop the running session, or start one if none is running.
    Toggle {
        /// Time to apply (ISO 8601 or relative).
        #[arg(long)]
        at: Option<String>,
    },

    /// Show the running session and its elapsed time.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the sessions of one month.
    List {
        /// Month number (1-12). Defaults to the current month.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Year. Defaults to the current year.
        #[arg(long)]
        year: Option<i32>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show today, this week and this month totals.
    Stats {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Delete a session by ID.
    Delete {
        /// The entry ID.
        id: String,
    },

    /// Show a live elapsed-time display for the running session.
    Watch {
        /// Stop after this many refreshes.
        #[arg(long)]
        ticks: Option<u64>,
    },
}
