// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Ledger Filecoin API Library (and CLI)
//!
//! Provides a [DeviceHandle] for issuing Filecoin app commands over any
//! [Exchange] transport, with interactive commands (address display and
//! transaction signing) returning a [PendingCommand] to be joined once
//! the on-device approval completes.

pub use ledger_transport::Exchange;

/// Re-export transports for consumer use
pub mod transport;
use transport::TransportTcp;

/// Re-export `ledger-fil-apdu` for consumers
pub use ledger_fil_apdu::{self as apdu};

mod handle;
pub use handle::DeviceHandle;

mod error;
pub use error::Error;

mod pending;
pub use pending::PendingCommand;

mod result;
pub use result::CommandResult;

/// Device handle using the TCP transport
pub type TcpHandle = DeviceHandle<TransportTcp>;

impl TcpHandle {
    /// Connect to a TCP APDU socket
    pub async fn connect(opts: transport::TcpOptions) -> Result<Self, Error> {
        let t = TransportTcp::new(opts).await?;
        Ok(Self::from(t))
    }
}
