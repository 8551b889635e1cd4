//! TCP APDU transport for the speculos simulator (and compatible emulators)
//!
// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    ops::Deref,
};

use async_trait::async_trait;
use ledger_apdu::{APDUAnswer, APDUCommand};
use ledger_transport::Exchange;
use log::{debug, trace};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::Mutex,
};

use crate::Error;

/// Default speculos APDU port
pub const DEFAULT_APDU_PORT: u16 = 9999;

/// Maximum response length accepted from the device
const MAX_RESPONSE_LEN: usize = 64 * 1024;

/// TCP transport options
#[derive(Clone, Debug, PartialEq, clap::Parser)]
pub struct TcpOptions {
    /// Simulator APDU socket address
    #[clap(long, default_value = "127.0.0.1", env = "APDU_ADDR")]
    pub addr: IpAddr,

    /// Simulator APDU socket port
    #[clap(long, default_value_t = DEFAULT_APDU_PORT, env = "APDU_PORT")]
    pub port: u16,
}

impl Default for TcpOptions {
    fn default() -> Self {
        Self {
            addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_APDU_PORT,
        }
    }
}

impl From<SocketAddr> for TcpOptions {
    fn from(a: SocketAddr) -> Self {
        Self {
            addr: a.ip(),
            port: a.port(),
        }
    }
}

/// TCP APDU transport
///
/// Frames requests as `LEN (u32, BE) | APDU` and responses as
/// `LEN (u32, BE) | DATA (LEN) | SW (u16, BE)`.
pub struct TransportTcp {
    s: Mutex<TcpStream>,
    addr: SocketAddr,
}

impl TransportTcp {
    /// Connect to a TCP APDU socket
    pub async fn new(opts: TcpOptions) -> Result<Self, Error> {
        let addr = SocketAddr::new(opts.addr, opts.port);

        debug!("Connecting to {addr}");

        let s = TcpStream::connect(addr).await?;
        s.set_nodelay(true)?;

        Ok(Self {
            s: Mutex::new(s),
            addr,
        })
    }

    /// Fetch the connected socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

#[async_trait]
impl Exchange for TransportTcp {
    type Error = Error;
    type AnswerType = Vec<u8>;

    async fn exchange<I>(
        &self,
        command: &APDUCommand<I>,
    ) -> Result<APDUAnswer<Self::AnswerType>, Self::Error>
    where
        I: Deref<Target = [u8]> + Send + Sync,
    {
        let apdu = command.serialize();

        let mut req = Vec::with_capacity(apdu.len() + 4);
        req.extend_from_slice(&(apdu.len() as u32).to_be_bytes());
        req.extend_from_slice(&apdu);

        trace!("TX: {:02x?}", apdu);

        let mut s = self.s.lock().await;
        s.write_all(&req).await?;

        // Read response length (excluding status word)
        let mut len = [0u8; 4];
        s.read_exact(&mut len).await?;

        let n = u32::from_be_bytes(len) as usize;
        if n > MAX_RESPONSE_LEN {
            return Err(Error::InvalidLength {
                expected: MAX_RESPONSE_LEN,
                actual: n,
            });
        }

        // Read response data and status word
        let mut resp = vec![0u8; n + 2];
        s.read_exact(&mut resp).await?;

        trace!("RX: {:02x?}", resp);

        APDUAnswer::from_answer(resp).map_err(|_| Error::UnexpectedResponse)
    }
}
