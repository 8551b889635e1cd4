// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command line utility for interacting with the Ledger Filecoin NanoApp

use std::{path::Path, time::Duration};

use clap::Parser;
use log::{debug, error, info, LevelFilter};
use serde::Serialize;

use ledger_fil::{apdu::DerivationPath, transport::TcpOptions, TcpHandle};

mod helpers;
use helpers::*;

/// Ledger command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Simulator / device connection
    #[clap(flatten)]
    tcp: TcpOptions,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Timeout for on-device approval (seconds)
    #[clap(long, default_value = "60")]
    approval_timeout_s: u64,

    /// Enable verbose logging
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Clone, PartialEq, Debug, Parser)]
#[non_exhaustive]
enum Actions {
    /// Fetch application version
    Version,

    /// Fetch device info
    DeviceInfo,

    /// Fetch address and public key
    Address {
        /// BIP-44 derivation path
        #[clap(long, default_value = "m/44'/461'/0'/0/0")]
        path: DerivationPath,

        /// Display address on the device for confirmation
        #[clap(long)]
        show: bool,
    },

    /// Sign a CBOR encoded transaction
    Sign {
        /// BIP-44 derivation path
        #[clap(long, default_value = "m/44'/461'/0'/0/0")]
        path: DerivationPath,

        /// Hex encoded transaction (or `@FILE` to load from a file)
        #[clap(long)]
        tx: String,

        /// Write signature to a `.json` file
        #[clap(long)]
        output: Option<String>,
    },
}

/// Signature output format
#[derive(Clone, Debug, Serialize)]
struct SignatureOutput {
    path: String,
    r: String,
    s: String,
    v: u8,
    der: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    let _ = simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default());

    debug!("Connecting to {}:{}", args.tcp.addr, args.tcp.port);

    // Connect to device
    let t = match TcpHandle::connect(args.tcp.clone()).await {
        Ok(v) => v.with_user_timeout(Duration::from_secs(args.approval_timeout_s)),
        Err(e) => {
            error!("Failed to connect to device: {}:{}", args.tcp.addr, args.tcp.port);
            return Err(e.into());
        }
    };

    // Execute command
    execute(t, args.cmd, Duration::from_secs(args.approval_timeout_s)).await?;

    Ok(())
}

/// Execute a command with the provided handle
async fn execute(t: TcpHandle, cmd: Actions, approval_timeout: Duration) -> anyhow::Result<()> {
    debug!("Executing command: {:?}", cmd);

    match cmd {
        Actions::Version => {
            let v = t.version().await?.into_payload()?;

            info!("app version: {:#?}", v);
        }
        Actions::DeviceInfo => {
            let i = t.device_info().await?.into_payload()?;

            info!("device info: {:#?}", i);
        }
        Actions::Address { path, show } => {
            info!("requesting address for path: {}", path);

            let r = match show {
                true => {
                    info!("confirm address on device");
                    t.show_address(&path)?.join(approval_timeout).await?
                }
                false => t.address(&path).await?,
            };
            let a = r.into_payload()?;

            info!("address: {}", a.address);
            info!("public key: {}", hex::encode(&a.public_key));
        }
        Actions::Sign { path, tx, output } => {
            let tx = load_hex(&tx).await?;

            info!("signing {} byte transaction with path: {}", tx.0.len(), path);
            info!("confirm transaction on device");

            let s = t
                .sign(&path, tx.as_ref())?
                .join(approval_timeout)
                .await?
                .into_payload()?;

            let o = SignatureOutput {
                path: path.to_string(),
                r: hex::encode(s.r),
                s: hex::encode(s.s),
                v: s.v,
                der: hex::encode(&s.der),
            };

            info!("signature: {}", o.der);

            if let Some(f) = output {
                write_output(&f, &o).await?;
            }
        }
    }

    Ok(())
}

/// Helper to write output files if `--output` argument is provided
async fn write_output(file_name: &str, value: &impl Serialize) -> anyhow::Result<()> {
    debug!("Writing output to '{}'", file_name);

    // Determine format from file name
    let p = Path::new(file_name);
    match p.extension().and_then(|e| e.to_str()) {
        // Encode to JSON for `.json` files
        Some("json") => {
            let s = serde_json::to_string_pretty(value)?;
            tokio::fs::write(p, s).await?;
        }
        _ => return Err(anyhow::anyhow!("unsupported output file format")),
    }

    Ok(())
}
