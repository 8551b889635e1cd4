// Copyright (c) 2022-2023 The MobileCoin Foundation

use clap::{Parser, Subcommand};
use log::{debug, info, LevelFilter};
use strum::IntoEnumIterator;

use ledger_fil_sim::GenericDriver;
use ledger_fil_tests::{
    config::Config,
    scenario::{Scenario, ScenarioRunner},
};

/// Test CLI arguments
#[derive(Clone, Debug, Parser)]
pub struct Opts {
    #[clap(subcommand)]
    pub command: Command,

    #[clap(flatten)]
    pub config: Config,

    /// Log level
    #[clap(long, default_value = "info", env)]
    pub log_level: LevelFilter,

    /// Enable logging for transports
    #[clap(long)]
    pub log_transports: bool,
}

/// Harness commands
#[derive(Clone, PartialEq, Debug, Subcommand)]
pub enum Command {
    /// Run scenarios (all scenarios where none are specified)
    Run {
        /// Scenarios to run
        scenarios: Vec<Scenario>,
    },
    /// List available scenarios
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load command line options
    let opts = Opts::parse();

    // Setup logging
    let mut c = simplelog::ConfigBuilder::new();
    c.add_filter_ignore_str("bollard");
    c.add_filter_ignore_str("reqwest");
    c.add_filter_ignore_str("hyper");
    if !opts.log_transports {
        c.add_filter_ignore_str("ledger_fil::transport");
    }

    let _ = simplelog::SimpleLogger::init(opts.log_level, c.build());

    debug!("options: {:?}", opts);

    let scenarios = match opts.command {
        Command::List => {
            for s in Scenario::iter() {
                println!("{s}");
            }
            return Ok(());
        }
        Command::Run { scenarios } if scenarios.is_empty() => Scenario::all(),
        Command::Run { scenarios } => scenarios,
    };

    info!(
        "Running {} scenarios via {} driver ({} snapshots)",
        scenarios.len(),
        opts.config.driver,
        opts.config.snapshot_mode()
    );

    let driver = GenericDriver::new(opts.config.driver)?;
    let runner = ScenarioRunner::new(driver, opts.config);

    let report = runner.run(&scenarios).await;

    println!("{report}");

    if !report.is_ok() {
        return Err(anyhow::anyhow!("{} scenarios failed", report.failed()));
    }

    Ok(())
}
