// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::net::{Ipv4Addr, SocketAddr};

use async_trait::async_trait;
use image::RgbaImage;
use log::debug;

use crate::{
    mock::{keys::DEFAULT_SEED, MockHandle},
    Action, Button, Driver, DriverMode, Handle, Options,
};

mod docker;
pub use docker::{DockerDriver, DockerHandle};

mod local;
pub use local::{LocalDriver, LocalHandle};

/// Driver running the in-process mock app
#[derive(Clone, Debug, Default)]
pub struct MockDriver;

#[async_trait]
impl Driver for MockDriver {
    type Handle = MockHandle;

    async fn run(&self, app: &str, opts: Options) -> anyhow::Result<Self::Handle> {
        debug!("Starting mock app (ignoring '{app}')");

        let seed = opts.seed.as_deref().unwrap_or(DEFAULT_SEED);
        let addr = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), opts.apdu_port.unwrap_or(0));

        MockHandle::with_seed(opts.model, seed, addr).await
    }

    async fn wait(&self, handle: &mut Self::Handle) -> anyhow::Result<()> {
        handle.wait().await
    }

    async fn exit(&self, mut handle: Self::Handle) -> anyhow::Result<()> {
        handle.stop();
        Ok(())
    }
}

/// Runtime-selected driver
#[derive(Clone, Debug)]
pub enum GenericDriver {
    Local(LocalDriver),
    Docker(DockerDriver),
    Mock(MockDriver),
}

/// Handle for a [GenericDriver] instance
pub enum GenericHandle {
    Local(LocalHandle),
    Docker(DockerHandle),
    Mock(MockHandle),
}

impl GenericDriver {
    /// Create a driver for the provided mode
    pub fn new(mode: DriverMode) -> anyhow::Result<Self> {
        let d = match mode {
            DriverMode::Local => Self::Local(LocalDriver::new()),
            DriverMode::Docker => Self::Docker(DockerDriver::new()?),
            DriverMode::Mock => Self::Mock(MockDriver),
        };
        Ok(d)
    }

    /// Fetch the driver mode
    pub fn mode(&self) -> DriverMode {
        match self {
            Self::Local(_) => DriverMode::Local,
            Self::Docker(_) => DriverMode::Docker,
            Self::Mock(_) => DriverMode::Mock,
        }
    }
}

#[async_trait]
impl Driver for GenericDriver {
    type Handle = GenericHandle;

    async fn run(&self, app: &str, opts: Options) -> anyhow::Result<Self::Handle> {
        let h = match self {
            Self::Local(d) => GenericHandle::Local(d.run(app, opts).await?),
            Self::Docker(d) => GenericHandle::Docker(d.run(app, opts).await?),
            Self::Mock(d) => GenericHandle::Mock(d.run(app, opts).await?),
        };
        Ok(h)
    }

    async fn wait(&self, handle: &mut Self::Handle) -> anyhow::Result<()> {
        match (self, handle) {
            (Self::Local(d), GenericHandle::Local(h)) => d.wait(h).await,
            (Self::Docker(d), GenericHandle::Docker(h)) => d.wait(h).await,
            (Self::Mock(d), GenericHandle::Mock(h)) => d.wait(h).await,
            _ => Err(anyhow::anyhow!("driver / handle mismatch")),
        }
    }

    async fn exit(&self, handle: Self::Handle) -> anyhow::Result<()> {
        match (self, handle) {
            (Self::Local(d), GenericHandle::Local(h)) => d.exit(h).await,
            (Self::Docker(d), GenericHandle::Docker(h)) => d.exit(h).await,
            (Self::Mock(d), GenericHandle::Mock(h)) => d.exit(h).await,
            _ => Err(anyhow::anyhow!("driver / handle mismatch")),
        }
    }
}

#[async_trait]
impl Handle for GenericHandle {
    fn apdu_addr(&self) -> SocketAddr {
        match self {
            Self::Local(h) => h.apdu_addr(),
            Self::Docker(h) => h.apdu_addr(),
            Self::Mock(h) => h.apdu_addr(),
        }
    }

    async fn button(&self, button: Button, action: Action) -> anyhow::Result<()> {
        match self {
            Self::Local(h) => h.button(button, action).await,
            Self::Docker(h) => h.button(button, action).await,
            Self::Mock(h) => h.button(button, action).await,
        }
    }

    async fn screenshot(&self) -> anyhow::Result<RgbaImage> {
        match self {
            Self::Local(h) => h.screenshot().await,
            Self::Docker(h) => h.screenshot().await,
            Self::Mock(h) => h.screenshot().await,
        }
    }
}
