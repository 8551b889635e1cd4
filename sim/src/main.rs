// Copyright (c) 2022-2023 The MobileCoin Foundation

use clap::Parser;
use log::{error, info, warn, LevelFilter};

use ledger_fil_sim::*;

/// Filecoin app emulator launcher
///
/// Starts the Filecoin ledger app under speculos (docker or local) or
/// the built-in mock, then serves APDUs until the emulator exits or
/// the launcher is interrupted. Point `ledger-fil-cli --port` or the
/// conformance harness at the reported APDU socket.
#[derive(Clone, Debug, PartialEq, Parser)]
pub struct Args {
    /// Filecoin app ELF (not required for the mock driver)
    #[clap(long, env = "APP", default_value = "bin/app.elf")]
    app: String,

    /// Emulator backend
    #[clap(long, value_enum, env = "DRIVER", default_value = "mock")]
    driver: DriverMode,

    #[clap(flatten)]
    opts: Options,

    /// Log level
    #[clap(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut c = simplelog::ConfigBuilder::new();
    for m in ["bollard", "hyper", "reqwest"] {
        c.add_filter_ignore_str(m);
    }
    let _ = simplelog::SimpleLogger::init(args.log_level, c.build());

    info!(
        "Starting {} emulator ({}, {})",
        args.driver, args.opts.model, args.app
    );

    let d = GenericDriver::new(args.driver)?;
    serve(d, &args.app, args.opts).await
}

/// Launch the emulator and hold it until exit or interrupt
async fn serve(driver: GenericDriver, app: &str, opts: Options) -> anyhow::Result<()> {
    let http_port = opts.http_port;
    let mut h = driver.run(app, opts).await?;

    info!("APDU socket: {}", h.apdu_addr());
    if driver.mode() != DriverMode::Mock {
        info!("Speculos API: http://127.0.0.1:{http_port}");
    }

    tokio::select! {
        r = driver.wait(&mut h) => match r {
            Ok(()) => warn!("Emulator exited"),
            Err(e) => {
                error!("Emulator failed: {e:#}");
                return Err(e);
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping emulator");
            driver.exit(h).await?;
        }
    }

    Ok(())
}
