//! Command-line arguments.

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use devtrack_core::{
    ReconnectPolicy, TrackerConfig,
    table::{DroidTable, IosTable},
};
use url::Url;

/// Which device table to track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Android devices (`goog-device-list`).
    Droid,
    /// iOS devices (`appl-device-list`).
    Ios,
}

impl Variant {
    /// Id of the table this variant draws.
    pub fn table_id(self) -> &'static str {
        match self {
            Self::Droid => DroidTable::TABLE_ID,
            Self::Ios => IosTable::TABLE_ID,
        }
    }
}

/// `devtrack` arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "devtrack")]
#[command(about = "Track devices reported by a device server and render them as an HTML table")]
pub struct Args {
    /// WebSocket base URL of the device server.
    #[arg(long, default_value = "ws://localhost:8000/")]
    pub server: Url,

    /// Device table to track.
    #[arg(long, value_enum, default_value_t = Variant::Droid)]
    pub variant: Variant,

    /// File the rendered page is written to after every change.
    #[arg(long, default_value = "devices.html")]
    pub out: PathBuf,

    /// Delay before reconnecting after a close, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    pub reconnect_ms: u64,

    /// Switch to jittered exponential backoff capped at this many milliseconds.
    #[arg(long)]
    pub backoff_max_ms: Option<u64>,

    /// Page URL deep links are built against.
    #[arg(long, default_value = "http://localhost:8000/")]
    pub page_url: Url,

    /// Decoder named in Android stream links.
    #[arg(long, default_value = DroidTable::DEFAULT_DECODER)]
    pub decoder: String,
}

impl Args {
    /// Retry policy selected by the flags.
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        let initial = Duration::from_millis(self.reconnect_ms);
        match self.backoff_max_ms {
            Some(max) => ReconnectPolicy::Exponential {
                initial,
                max: Duration::from_millis(max).max(initial),
                jitter: true,
            },
            None => ReconnectPolicy::Fixed(initial),
        }
    }

    /// Tracker configuration selected by the flags.
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig { reconnect: self.reconnect_policy(), ..TrackerConfig::default() }
    }
}
