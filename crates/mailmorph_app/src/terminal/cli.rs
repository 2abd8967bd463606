use std::time::Duration;

use clap::{Parser, Subcommand};
use mailmorph_client::{ExtractContract, TransportSettings};
use mailmorph_core::ViewKind;

use super::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(
    name = "mailmorph",
    version,
    about = "Turn email text into structured JSON and inspect backend telemetry"
)]
pub struct Cli {
    /// Backend base URL for this run; overrides MAILMORPH_API_BASE_URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Seconds to wait for a connection. Waits indefinitely when unset.
    #[arg(long, global = true)]
    pub connect_timeout: Option<u64>,

    /// Seconds to wait for a whole request. Waits indefinitely when unset.
    #[arg(long, global = true)]
    pub request_timeout: Option<u64>,

    /// Where log output goes.
    #[arg(long, global = true, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send email text to the extraction endpoint and print the returned JSON.
    Extract {
        /// Email text; read from stdin when omitted.
        text: Option<String>,

        /// Use the legacy request body, which carries a word limit.
        #[arg(long)]
        legacy: bool,

        /// Word limit for the legacy request body (default 10).
        #[arg(long, requires = "legacy", value_parser = clap::value_parser!(u32).range(1..))]
        max_words: Option<u32>,
    },
    /// Show the per-request metrics table.
    Metrics,
    /// Show the per-request log table.
    Logs,
    /// Check that the backend is up.
    Health,
}

impl Cli {
    pub fn transport(&self) -> TransportSettings {
        TransportSettings {
            connect_timeout: self.connect_timeout.map(Duration::from_secs),
            request_timeout: self.request_timeout.map(Duration::from_secs),
        }
    }

    pub fn contract(&self) -> ExtractContract {
        match self.command {
            Command::Extract { legacy: true, .. } => ExtractContract::Legacy,
            _ => ExtractContract::Current,
        }
    }

    pub fn max_words(&self) -> Option<u32> {
        match self.command {
            Command::Extract { max_words, .. } => max_words,
            _ => None,
        }
    }
}

impl Command {
    pub fn view(&self) -> Option<ViewKind> {
        match self {
            Command::Extract { .. } => Some(ViewKind::Extract),
            Command::Metrics => Some(ViewKind::Metrics),
            Command::Logs => Some(ViewKind::Logs),
            Command::Health => None,
        }
    }
}
