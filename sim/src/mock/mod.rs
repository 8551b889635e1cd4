// Copyright (c) 2022-2023 The MobileCoin Foundation

//! In-process mock of the Filecoin ledger app
//!
//! Serves APDUs over TCP using speculos framing, and exposes button
//! and screenshot operations via [Handle] for driving approval flows
//! without an emulator.
//!
//! ```text
//! request:  LEN (u32, BE) | CLA | INS | P1 | P2 | LC | DATA
//! response: LEN (u32, BE) | DATA (LEN) | SW (u16, BE)
//! ```

use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use image::RgbaImage;
use log::{debug, error, info, trace};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::Mutex,
    task::{JoinHandle, JoinSet},
};

use ledger_fil_apdu::StatusCode;

use crate::{Action, Button, Handle, Model};

pub mod address;
pub mod display;
pub mod keys;
pub mod tx;

mod app;
pub use app::{Answer, App, Response};

/// Maximum accepted APDU length
const MAX_APDU_LEN: usize = 260;

/// Mock app errors, mapped to APDU status words
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum MockError {
    #[error("Unexpected data type")]
    UnexpectedType,

    #[error("Unexpected number of items")]
    UnexpectedItems,

    #[error("Unexpected codec version")]
    UnexpectedVersion,

    #[error("Unexpected value")]
    UnexpectedValue,

    #[error("Invalid address")]
    InvalidAddress,

    #[error("Key derivation failed")]
    Derivation,

    #[error("Signing failed")]
    Signing,

    #[error("Review in progress")]
    Busy,

    #[error("Instruction not supported")]
    InsNotSupported,

    #[error("Class not supported")]
    ClaNotSupported,

    #[error("Invalid P1 / P2")]
    InvalidP1P2,

    #[error("Wrong length")]
    WrongLength,

    #[error("Signing not initialised")]
    NotInitialised,
}

impl MockError {
    /// Status word returned for this error
    pub fn status(&self) -> StatusCode {
        use MockError::*;

        match self {
            UnexpectedType | UnexpectedItems | UnexpectedVersion | UnexpectedValue
            | InvalidAddress => StatusCode::DATA_INVALID,
            Derivation | Signing => StatusCode(0x6400),
            Busy => StatusCode::COMMAND_NOT_ALLOWED,
            InsNotSupported => StatusCode::INS_NOT_SUPPORTED,
            ClaNotSupported => StatusCode::APP_NOT_OPEN,
            InvalidP1P2 => StatusCode::INVALID_P1P2,
            WrongLength => StatusCode::WRONG_LENGTH,
            NotInitialised => StatusCode(0x6985),
        }
    }

    /// Detail message returned as response data (parser errors only)
    pub fn detail(&self) -> String {
        match self.status() {
            StatusCode::DATA_INVALID => self.to_string(),
            _ => String::new(),
        }
    }
}

/// Mock device instance, serving APDUs until dropped
pub struct MockHandle {
    app: Arc<Mutex<App>>,
    addr: SocketAddr,
    task: Option<JoinHandle<()>>,
}

impl MockHandle {
    /// Bind an APDU listener and start serving the provided app
    pub async fn start(app: App, addr: SocketAddr) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;

        info!("Mock APDU server listening on {addr}");

        let app = Arc::new(Mutex::new(app));
        let task = tokio::spawn(serve(listener, app.clone()));

        Ok(Self {
            app,
            addr,
            task: Some(task),
        })
    }

    /// Create and start a mock device for the provided model and seed
    pub async fn with_seed(model: Model, seed: &str, addr: SocketAddr) -> anyhow::Result<Self> {
        let wallet = keys::Wallet::new(seed)?;
        Self::start(App::new(model, wallet), addr).await
    }

    /// Await server exit (only occurs on listener failure or [MockHandle::stop])
    pub async fn wait(&mut self) -> anyhow::Result<()> {
        if let Some(t) = self.task.as_mut() {
            match t.await {
                Ok(()) => (),
                Err(e) if e.is_cancelled() => (),
                Err(e) => return Err(e.into()),
            }
            self.task = None;
        }
        Ok(())
    }

    /// Stop the APDU server, closing open connections
    pub fn stop(&mut self) {
        if let Some(t) = self.task.take() {
            debug!("Stopping mock APDU server");
            t.abort();
        }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[async_trait]
impl Handle for MockHandle {
    fn apdu_addr(&self) -> SocketAddr {
        self.addr
    }

    async fn button(&self, button: Button, action: Action) -> anyhow::Result<()> {
        // Buttons trigger on release, matching device behaviour
        match action {
            Action::Press => (),
            Action::Release | Action::PressAndRelease => self.app.lock().await.button(button),
        }
        Ok(())
    }

    async fn screenshot(&self) -> anyhow::Result<RgbaImage> {
        Ok(self.app.lock().await.render())
    }
}

/// Accept connections, serving each in its own task
async fn serve(listener: TcpListener, app: Arc<Mutex<App>>) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            r = listener.accept() => match r {
                Ok((s, peer)) => {
                    debug!("Accepted connection from {peer}");
                    connections.spawn(connection(s, app.clone()));
                }
                Err(e) => {
                    error!("Accept failed: {e:?}");
                    break;
                }
            },
            Some(r) = connections.join_next() => {
                if let Ok(Err(e)) = r {
                    debug!("Connection closed: {e}");
                }
            }
        }
    }
}

/// Serve APDUs on a single connection
async fn connection(mut s: TcpStream, app: Arc<Mutex<App>>) -> anyhow::Result<()> {
    loop {
        let mut len = [0u8; 4];
        s.read_exact(&mut len).await?;

        let n = u32::from_be_bytes(len) as usize;
        if n > MAX_APDU_LEN {
            return Err(anyhow::anyhow!("APDU length {n} exceeds maximum"));
        }

        let mut apdu = vec![0u8; n];
        s.read_exact(&mut apdu).await?;

        trace!("RX: {:02x?}", apdu);

        let (data, sw) = match apdu.as_slice() {
            [cla, ins, p1, _p2, lc, data @ ..] if data.len() == *lc as usize => {
                // Release the app lock before awaiting user interaction
                let r = app.lock().await.apdu(*cla, *ins, *p1, data);

                match r {
                    Response::Ready(a) => a,
                    Response::Deferred(rx) => match rx.await {
                        Ok(a) => a,
                        Err(_) => (vec![], StatusCode::COMMAND_NOT_ALLOWED.0),
                    },
                }
            }
            _ => (vec![], StatusCode::WRONG_LENGTH.0),
        };

        let mut resp = Vec::with_capacity(data.len() + 6);
        resp.extend_from_slice(&(data.len() as u32).to_be_bytes());
        resp.extend_from_slice(&data);
        resp.extend_from_slice(&sw.to_be_bytes());

        trace!("TX: {:02x?}", resp);

        s.write_all(&resp).await?;
    }
}
