// Copyright (c) 2022-2023 The MobileCoin Foundation

use clap::{Parser, ValueEnum};
use strum::{EnumIter, EnumString};

/// Device model
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, strum::Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Model {
    /// Nano S
    #[value(name = "nanos")]
    NanoS,
    /// Nano S Plus
    #[value(name = "nanosp")]
    NanoSP,
    /// Nano X
    #[value(name = "nanox")]
    NanoX,
}

impl Model {
    /// Screen dimensions (width, height) in pixels
    pub fn screen_size(&self) -> (u32, u32) {
        match self {
            Model::NanoS => (128, 32),
            Model::NanoSP | Model::NanoX => (128, 64),
        }
    }
}

/// Emulator display mode
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, strum::Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Display {
    /// No display
    Headless,
    /// QT display window
    Qt,
    /// Text display
    Text,
}

/// Emulator driver selection
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, strum::Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DriverMode {
    /// Run speculos from a local install
    Local,
    /// Run speculos via docker
    Docker,
    /// Run the in-process mock Filecoin app
    Mock,
}

/// Emulator options
#[derive(Clone, Debug, PartialEq, Parser)]
pub struct Options {
    /// Model to emulate
    #[clap(long, value_enum, default_value = "nanos", env = "MODEL")]
    pub model: Model,

    /// Display mode
    #[clap(long, value_enum, default_value = "headless")]
    pub display: Display,

    /// BIP-39 seed phrase (or `hex:` prefixed seed) for the device
    #[clap(long, env = "SEED")]
    pub seed: Option<String>,

    /// HTTP API port (speculos REST interface)
    #[clap(long, default_value = "5000")]
    pub http_port: u16,

    /// APDU port (zero or unset for an automatically assigned port where supported)
    #[clap(long)]
    pub apdu_port: Option<u16>,

    /// SDK API level
    #[clap(long)]
    pub api_level: Option<String>,

    /// Enable syscall tracing
    #[clap(long)]
    pub trace: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            model: Model::NanoS,
            display: Display::Headless,
            seed: None,
            http_port: 5000,
            apdu_port: None,
            api_level: None,
            trace: false,
        }
    }
}

impl Options {
    /// Build speculos arguments from options
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--model={}", self.model),
            format!("--display={}", self.display),
            format!("--api-port={}", self.http_port),
        ];

        if let Some(p) = self.apdu_port {
            args.push(format!("--apdu-port={p}"));
        }

        if let Some(s) = &self.seed {
            args.push(format!("--seed={s}"));
        }

        if let Some(a) = &self.api_level {
            args.push(format!("--apiLevel={a}"));
        }

        if self.trace {
            args.push("-t".to_string());
        }

        args
    }
}
