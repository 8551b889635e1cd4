// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Handles for in-flight interactive commands

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::{CommandResult, Error};

type Output<P> = Result<CommandResult<P>, Error>;

/// Interactive command dispatched to the device and awaiting approval.
///
/// The command progresses in the background once dispatched, use
/// [PendingCommand::join] (or await the handle directly) to fetch the result.
/// Dropping an un-joined handle aborts the command.
pub struct PendingCommand<P> {
    name: &'static str,
    handle: Option<JoinHandle<Output<P>>>,
}

impl<P> PendingCommand<P> {
    pub(crate) fn new(name: &'static str, handle: JoinHandle<Output<P>>) -> Self {
        Self {
            name,
            handle: Some(handle),
        }
    }

    /// Command name (for logging)
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check whether the command has resolved
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }

    /// Await command completion with a timeout, aborting the command on expiry
    pub async fn join(mut self, timeout: Duration) -> Output<P> {
        let mut h = match self.handle.take() {
            Some(h) => h,
            None => return Err(Error::Aborted(format!("{} already joined", self.name))),
        };

        match tokio::time::timeout(timeout, &mut h).await {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                warn!("Timeout awaiting '{}' response, aborting", self.name);
                h.abort();
                Err(Error::UserTimeout)
            }
        }
    }
}

impl<P> Future for PendingCommand<P> {
    type Output = Output<P>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let name = self.name;
        let h = match self.handle.as_mut() {
            Some(h) => h,
            None => return Poll::Ready(Err(Error::Aborted(format!("{name} already joined")))),
        };

        let r = match Pin::new(h).poll(cx) {
            Poll::Ready(r) => r,
            Poll::Pending => return Poll::Pending,
        };

        self.handle = None;

        Poll::Ready(match r {
            Ok(v) => v,
            Err(e) => Err(e.into()),
        })
    }
}

impl<P> Drop for PendingCommand<P> {
    fn drop(&mut self) {
        if let Some(h) = self.handle.take() {
            if !h.is_finished() {
                debug!("Aborting abandoned '{}' command", self.name);
            }
            h.abort();
        }
    }
}
