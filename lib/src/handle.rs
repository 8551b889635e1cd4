// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Handle for connected ledger devices
//!
//! This provides methods for interacting with the Filecoin app
//! and is generic over [Exchange] transports

use std::{sync::Arc, time::Duration};

use ledger_transport::Exchange;
use log::{debug, warn};
use tokio::sync::Mutex;

use ledger_fil_apdu::{
    address::{address_req, AddressInfo},
    app_info::{device_info_req, version_req, DeviceInfo, VersionInfo},
    sign::{sign_req, SignatureInfo},
    ApduError, Command, Confirm, DerivationPath, StatusCode,
};

use crate::{CommandResult, Error, PendingCommand};

/// Decoder for successful response payloads
type Decoder<P> = fn(&[u8]) -> Result<P, ApduError>;

/// Filecoin handle for a connected ledger device.
///
/// This is generic over [Exchange] types to support different
/// underlying transports. At most one command may be in flight
/// per handle, overlapping requests fail with [Error::Busy].
pub struct DeviceHandle<T> {
    /// Device handle for communication
    t: Arc<Mutex<T>>,
    /// Timeout for user acknowledgements
    user_timeout: Duration,
    /// Timeout for APDU requests
    request_timeout: Duration,
}

impl<T> Clone for DeviceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            t: self.t.clone(),
            user_timeout: self.user_timeout,
            request_timeout: self.request_timeout,
        }
    }
}

/// Create a [DeviceHandle] wrapper from a type implementing [Exchange]
impl<T: Exchange> From<T> for DeviceHandle<T> {
    fn from(t: T) -> Self {
        Self {
            t: Arc::new(Mutex::new(t)),
            user_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(2),
        }
    }
}

impl<T> DeviceHandle<T>
where
    T: Exchange<Error = Error> + Send + Sync + 'static,
{
    /// Set the timeout for non-interactive requests
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the timeout for responses requiring user interaction
    pub fn with_user_timeout(mut self, timeout: Duration) -> Self {
        self.user_timeout = timeout;
        self
    }

    /// Helper to fetch user interaction timeout
    pub fn user_timeout(&self) -> Duration {
        self.user_timeout
    }

    /// Helper to fetch APDU request timeout
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Fetch application version
    pub async fn version(&self) -> Result<CommandResult<VersionInfo>, Error> {
        debug!("Requesting app version");

        self.request(vec![version_req()], VersionInfo::decode).await
    }

    /// Fetch device (secure element / MCU) information
    pub async fn device_info(&self) -> Result<CommandResult<DeviceInfo>, Error> {
        debug!("Requesting device info");

        self.request(vec![device_info_req()], DeviceInfo::decode)
            .await
    }

    /// Fetch the public key and address for the provided path
    pub async fn address(&self, path: &DerivationPath) -> Result<CommandResult<AddressInfo>, Error> {
        debug!("Requesting address for path: {path}");

        self.request(vec![address_req(path, Confirm::Silent)], AddressInfo::decode)
            .await
    }

    /// Display the address for the provided path on the device.
    ///
    /// Returns immediately with a [PendingCommand] that resolves
    /// once the address has been approved (or rejected) on-device.
    pub fn show_address(&self, path: &DerivationPath) -> Result<PendingCommand<AddressInfo>, Error> {
        debug!("Requesting address display for path: {path}");

        self.dispatch(
            "show_address",
            vec![address_req(path, Confirm::Display)],
            AddressInfo::decode,
        )
    }

    /// Sign a CBOR encoded transaction with the key for the provided path.
    ///
    /// Returns immediately with a [PendingCommand] that resolves
    /// once the transaction has been approved (or rejected) on-device.
    pub fn sign(
        &self,
        path: &DerivationPath,
        payload: &[u8],
    ) -> Result<PendingCommand<SignatureInfo>, Error> {
        debug!("Requesting signature for path: {path} ({} bytes)", payload.len());

        let chunks = sign_req(path, payload)?;

        self.dispatch("sign", chunks, SignatureInfo::decode)
    }

    /// Issue a non-interactive request
    async fn request<P>(
        &self,
        chunks: Vec<Command>,
        decode: Decoder<P>,
    ) -> Result<CommandResult<P>, Error> {
        let t = self.t.try_lock().map_err(|_| Error::Busy)?;

        exchange_chunks(
            &*t,
            &chunks,
            self.request_timeout,
            self.request_timeout,
            decode,
        )
        .await
    }

    /// Dispatch an interactive request without waiting for the response
    fn dispatch<P: Send + 'static>(
        &self,
        name: &'static str,
        chunks: Vec<Command>,
        decode: Decoder<P>,
    ) -> Result<PendingCommand<P>, Error> {
        // Transport is held by the task until the command resolves
        let t = self.t.clone().try_lock_owned().map_err(|_| Error::Busy)?;

        let (request_timeout, user_timeout) = (self.request_timeout, self.user_timeout);

        let h = tokio::spawn(async move {
            let r = exchange_chunks(&*t, &chunks, request_timeout, user_timeout, decode).await;
            if let Err(e) = &r {
                warn!("Command '{name}' failed: {e}");
            }
            r
        });

        Ok(PendingCommand::new(name, h))
    }
}

/// Send a (possibly chunked) request, returning the response to the final chunk
/// or the first non-success status
async fn exchange_chunks<T, P>(
    t: &T,
    chunks: &[Command],
    request_timeout: Duration,
    final_timeout: Duration,
    decode: Decoder<P>,
) -> Result<CommandResult<P>, Error>
where
    T: Exchange<Error = Error> + Send + Sync,
{
    for (i, c) in chunks.iter().enumerate() {
        let last = i + 1 == chunks.len();
        let timeout = match last {
            true => final_timeout,
            false => request_timeout,
        };

        let resp = match tokio::time::timeout(timeout, t.exchange(c)).await {
            Ok(r) => r?,
            Err(_) if last && final_timeout != request_timeout => return Err(Error::UserTimeout),
            Err(e) => return Err(e.into()),
        };

        let status = StatusCode(resp.retcode());
        if !status.is_ok() {
            debug!("Chunk {i} returned {status}");
            return CommandResult::failed(status, status.message_with(resp.data()));
        }

        if last {
            return Ok(CommandResult::ok(decode(resp.data())?));
        }
    }

    Err(Error::UnexpectedResponse)
}
