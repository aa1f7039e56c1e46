//! `devtrack` binary
//!
//! Tracks one device list over WebSocket until interrupted, rewriting the
//! output page on every change.

use std::process::ExitCode;

use clap::Parser;
use devtrack_cli::{Args, CliError, Runtime, Variant, WsDriver};
use devtrack_core::{
    DeviceTable, DeviceTracker, TableRegistry, TrackerConfig,
    table::{DroidTable, IosTable},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "devtrack failed");
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    info!(server = %args.server, variant = ?args.variant, out = %args.out.display(), "starting");

    let driver = WsDriver::new(args.server.clone(), args.page_url.clone(), args.out.clone());
    let config = args.tracker_config();
    match args.variant {
        Variant::Droid => {
            let table = DroidTable::new().with_decoder(args.decoder.clone());
            track(driver, config, args.variant, table).await
        },
        Variant::Ios => track(driver, config, args.variant, IosTable::new()).await,
    }
}

async fn track<T: DeviceTable>(
    driver: WsDriver,
    config: TrackerConfig,
    variant: Variant,
    table: T,
) -> Result<(), CliError> {
    let mut registry = TableRegistry::new();
    let handle = registry.claim(variant.table_id())?;
    let (tracker, initial) = DeviceTracker::new(config, handle, table);
    let mut runtime = Runtime::new(driver, tracker, initial);

    let interrupted = tokio::select! {
        () = runtime.run() => false,
        result = tokio::signal::ctrl_c() => {
            result.map_err(CliError::Signal)?;
            true
        },
    };

    if interrupted {
        info!("interrupted, shutting down");
        runtime.shutdown();
    }
    Ok(())
}
