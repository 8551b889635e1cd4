// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Speculos REST API client

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use async_trait::async_trait;
use image::RgbaImage;
use log::debug;
use serde::Serialize;

use crate::{Action, Button, Handle};

/// Bound on each REST request, a stalled endpoint fails rather than hangs
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle for the speculos REST API (button / screenshot endpoints)
#[derive(Clone, Debug)]
pub struct SpeculosHandle {
    client: reqwest::Client,
    http_addr: SocketAddr,
    apdu_addr: SocketAddr,
}

#[derive(Clone, Debug, Serialize)]
struct ButtonReq {
    action: String,
}

impl SpeculosHandle {
    /// Create a handle for a speculos instance listening on localhost
    pub fn new(http_port: u16, apdu_port: u16) -> anyhow::Result<Self> {
        let local = IpAddr::V4(Ipv4Addr::LOCALHOST);

        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            http_addr: SocketAddr::new(local, http_port),
            apdu_addr: SocketAddr::new(local, apdu_port),
        })
    }

    /// HTTP API address
    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }
}

#[async_trait]
impl Handle for SpeculosHandle {
    fn apdu_addr(&self) -> SocketAddr {
        self.apdu_addr
    }

    async fn button(&self, button: Button, action: Action) -> anyhow::Result<()> {
        debug!("Sending button: {button} ({action})");

        self.client
            .post(format!("http://{}/button/{button}", self.http_addr))
            .json(&ButtonReq {
                action: action.to_string(),
            })
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn screenshot(&self) -> anyhow::Result<RgbaImage> {
        let b = self
            .client
            .get(format!("http://{}/screenshot", self.http_addr))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let i = image::load_from_memory(&b)?;

        Ok(i.to_rgba8())
    }
}
