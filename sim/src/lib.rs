// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Ledger emulator drivers
//!
//! Provides a common [Driver] / [Handle] interface over the speculos
//! simulator (run locally or via docker) and an in-process mock of the
//! Filecoin app, exposing APDU sockets, button injection and screenshots.

use std::net::SocketAddr;

use async_trait::async_trait;
use image::RgbaImage;

mod drivers;
pub use drivers::*;

mod handle;
pub use handle::SpeculosHandle;

pub mod mock;

mod options;
pub use options::*;

/// Emulator driver, launches and manages emulator instances
#[async_trait]
pub trait Driver {
    /// Handle for a running emulator instance
    type Handle: Handle + Send + Sync;

    /// Run an app in the emulator, returning a handle once launched
    async fn run(&self, app: &str, opts: Options) -> anyhow::Result<Self::Handle>;

    /// Wait for the emulator to exit
    async fn wait(&self, handle: &mut Self::Handle) -> anyhow::Result<()>;

    /// Terminate the emulator and release resources
    async fn exit(&self, handle: Self::Handle) -> anyhow::Result<()>;
}

/// Handle for interacting with a running emulator
#[async_trait]
pub trait Handle {
    /// Address of the emulator APDU socket
    fn apdu_addr(&self) -> SocketAddr;

    /// Send a button action
    async fn button(&self, button: Button, action: Action) -> anyhow::Result<()>;

    /// Capture the current screen
    async fn screenshot(&self) -> anyhow::Result<RgbaImage>;
}

/// Device buttons
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Button {
    Left,
    Right,
    Both,
}

/// Button actions
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Action {
    Press,
    Release,
    PressAndRelease,
}
