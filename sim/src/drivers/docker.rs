// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Driver for speculos via docker

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use bollard::{
    container::{
        Config, CreateContainerOptions, RemoveContainerOptions, WaitContainerOptions,
    },
    image::CreateImageOptions,
    models::{HostConfig, PortBinding},
    Docker,
};
use futures::StreamExt;
use log::{debug, info, warn};

use crate::{Action, Button, Driver, Handle, Options, SpeculosHandle};

/// Default speculos image
pub const SPECULOS_IMAGE: &str = "ghcr.io/ledgerhq/speculos:latest";

/// Driver running speculos in a docker container
#[derive(Clone, Debug)]
pub struct DockerDriver {
    d: Docker,
    image: String,
}

/// Handle for a speculos container, removed on drop if not exited
#[derive(Debug)]
pub struct DockerHandle {
    d: Docker,
    name: String,
    api: SpeculosHandle,
    removed: bool,
}

impl DockerDriver {
    /// Create a new docker driver, using `SPECULOS_IMAGE` from the environment where set
    pub fn new() -> anyhow::Result<Self> {
        let d = Docker::connect_with_local_defaults()?;
        let image = std::env::var("SPECULOS_IMAGE").unwrap_or_else(|_| SPECULOS_IMAGE.to_string());

        Ok(Self { d, image })
    }

    /// Pull the speculos image if not already available
    async fn pull(&self) -> anyhow::Result<()> {
        if self.d.inspect_image(&self.image).await.is_ok() {
            return Ok(());
        }

        info!("Pulling image: {}", self.image);

        let mut s = Box::pin(self.d.create_image(
            Some(CreateImageOptions {
                from_image: self.image.clone(),
                ..Default::default()
            }),
            None,
            None,
        ));

        while let Some(r) = s.next().await {
            let i = r?;
            debug!("{:?}", i.status);
        }

        Ok(())
    }
}

#[async_trait]
impl Driver for DockerDriver {
    type Handle = DockerHandle;

    async fn run(&self, app: &str, opts: Options) -> anyhow::Result<Self::Handle> {
        self.pull().await?;

        // Split app into mount directory and file name
        let app_path = Path::new(app).canonicalize()?;
        let (app_dir, app_file) = match (app_path.parent(), app_path.file_name()) {
            (Some(d), Some(f)) => (d.to_path_buf(), f.to_string_lossy().to_string()),
            _ => return Err(anyhow::anyhow!("Invalid app path: {app}")),
        };

        let apdu_port = opts.apdu_port.unwrap_or(9999);

        // Speculos listens on fixed ports within the container
        let inner = Options {
            http_port: 5000,
            apdu_port: Some(9999),
            display: crate::Display::Headless,
            ..opts.clone()
        };
        let mut cmd = inner.args();
        cmd.push(format!("/app/{app_file}"));

        let mut port_bindings = HashMap::new();
        for (inner_port, outer_port) in [(5000, opts.http_port), (9999, apdu_port)] {
            port_bindings.insert(
                format!("{inner_port}/tcp"),
                Some(vec![PortBinding {
                    host_ip: Some("127.0.0.1".to_string()),
                    host_port: Some(outer_port.to_string()),
                }]),
            );
        }

        let exposed_ports = port_bindings
            .keys()
            .map(|k| (k.clone(), HashMap::new()))
            .collect();

        let config = Config {
            image: Some(self.image.clone()),
            cmd: Some(cmd),
            exposed_ports: Some(exposed_ports),
            host_config: Some(HostConfig {
                binds: Some(vec![format!("{}:/app", app_dir.display())]),
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        };

        let name = format!("speculos-{}-{}", opts.http_port, apdu_port);

        debug!("Creating container {name}: {:?}", config.cmd);

        let c = self
            .d
            .create_container(
                Some(CreateContainerOptions {
                    name: name.clone(),
                    platform: None,
                }),
                config,
            )
            .await?;

        for w in c.warnings {
            warn!("{w}");
        }

        self.d.start_container::<String>(&c.id, None).await?;

        Ok(DockerHandle {
            d: self.d.clone(),
            name,
            api: SpeculosHandle::new(opts.http_port, apdu_port)?,
            removed: false,
        })
    }

    async fn wait(&self, handle: &mut Self::Handle) -> anyhow::Result<()> {
        let mut s = Box::pin(self.d.wait_container(
            &handle.name,
            Some(WaitContainerOptions {
                condition: "not-running",
            }),
        ));

        while let Some(r) = s.next().await {
            let r = r?;
            debug!("container {} exited: {}", handle.name, r.status_code);
        }

        Ok(())
    }

    async fn exit(&self, mut handle: Self::Handle) -> anyhow::Result<()> {
        debug!("Removing container {}", handle.name);

        handle.removed = true;
        remove(&self.d, &handle.name).await
    }
}

async fn remove(d: &Docker, name: &str) -> anyhow::Result<()> {
    d.remove_container(
        name,
        Some(RemoveContainerOptions {
            force: true,
            ..Default::default()
        }),
    )
    .await?;

    Ok(())
}

impl Drop for DockerHandle {
    fn drop(&mut self) {
        if self.removed {
            return;
        }

        // Best-effort removal, requires a runtime to spawn on
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                warn!("Container {} dropped without exit, removing", self.name);

                let (d, name) = (self.d.clone(), self.name.clone());
                rt.spawn(async move {
                    if let Err(e) = remove(&d, &name).await {
                        warn!("Failed to remove container {name}: {e:#}");
                    }
                });
            }
            Err(_) => warn!("Container {} leaked (no runtime)", self.name),
        }
    }
}

#[async_trait]
impl Handle for DockerHandle {
    fn apdu_addr(&self) -> std::net::SocketAddr {
        self.api.apdu_addr()
    }

    async fn button(&self, button: Button, action: Action) -> anyhow::Result<()> {
        self.api.button(button, action).await
    }

    async fn screenshot(&self) -> anyhow::Result<image::RgbaImage> {
        self.api.screenshot().await
    }
}
