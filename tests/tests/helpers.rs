use std::{path::Path, str::FromStr};

use log::LevelFilter;
use simplelog::SimpleLogger;

use ledger_fil_sim::MockDriver;
use ledger_fil_tests::{
    config::{Config, Timeouts},
    scenario::ScenarioRunner,
};

/// Setup logging from `LOG_LEVEL`
pub fn setup_logging() {
    let log_level = match std::env::var("LOG_LEVEL").map(|v| LevelFilter::from_str(&v)) {
        Ok(Ok(l)) => l,
        _ => LevelFilter::Debug,
    };

    let log_cfg = simplelog::ConfigBuilder::new()
        .add_filter_ignore_str("ledger_fil::transport")
        .build();

    let _ = SimpleLogger::init(log_level, log_cfg);
}

/// Mock harness configuration with snapshots under `dir`
pub fn config(dir: &Path, record: bool) -> Config {
    Config {
        snapshots: dir.join("golden"),
        snapshots_tmp: dir.join("tmp"),
        record,
        timeouts: Timeouts {
            startup_timeout_ms: 5_000,
            screen_timeout_ms: 2_000,
            gesture_timeout_ms: 1_000,
            approval_timeout_ms: 5_000,
            poll_interval_ms: 10,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Scenario runner using the mock driver
#[allow(unused)]
pub fn runner(dir: &Path, record: bool) -> ScenarioRunner<MockDriver> {
    ScenarioRunner::new(MockDriver, config(dir, record))
}
