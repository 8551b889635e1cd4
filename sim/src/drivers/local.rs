// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Driver for a local speculos install

use async_trait::async_trait;
use log::debug;
use tokio::process::{Child, Command};

use crate::{Driver, Handle, Options, SpeculosHandle};

/// Driver running `speculos.py` from the local environment
#[derive(Clone, Debug)]
pub struct LocalDriver {
    speculos: String,
}

/// Handle for a locally running speculos process
#[derive(Debug)]
pub struct LocalHandle {
    child: Child,
    api: SpeculosHandle,
}

impl LocalDriver {
    /// Create a new local driver, using `SPECULOS` from the environment where set
    pub fn new() -> Self {
        let speculos = std::env::var("SPECULOS").unwrap_or_else(|_| "speculos.py".to_string());
        Self { speculos }
    }
}

impl Default for LocalDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Driver for LocalDriver {
    type Handle = LocalHandle;

    async fn run(&self, app: &str, opts: Options) -> anyhow::Result<Self::Handle> {
        // speculos defaults to 9999 for APDUs
        let apdu_port = opts.apdu_port.unwrap_or(9999);
        let opts = Options {
            apdu_port: Some(apdu_port),
            ..opts
        };

        let mut args = opts.args();
        args.push(app.to_string());

        debug!("Launching '{} {}'", self.speculos, args.join(" "));

        let child = Command::new(&self.speculos)
            .args(&args)
            .kill_on_drop(true)
            .spawn()?;

        Ok(LocalHandle {
            child,
            api: SpeculosHandle::new(opts.http_port, apdu_port)?,
        })
    }

    async fn wait(&self, handle: &mut Self::Handle) -> anyhow::Result<()> {
        let status = handle.child.wait().await?;

        debug!("speculos exited: {status}");

        Ok(())
    }

    async fn exit(&self, mut handle: Self::Handle) -> anyhow::Result<()> {
        debug!("Stopping speculos");

        handle.child.kill().await?;

        Ok(())
    }
}

#[async_trait]
impl Handle for LocalHandle {
    fn apdu_addr(&self) -> std::net::SocketAddr {
        self.api.apdu_addr()
    }

    async fn button(&self, button: crate::Button, action: crate::Action) -> anyhow::Result<()> {
        self.api.button(button, action).await
    }

    async fn screenshot(&self) -> anyhow::Result<image::RgbaImage> {
        self.api.screenshot().await
    }
}
