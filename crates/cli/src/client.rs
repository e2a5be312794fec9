// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Thin client for talking to `odcd` over the length-prefixed JSON protocol.

use std::path::PathBuf;
use std::time::Duration;

use odc_core::{RequestResult, StatusRequestResult};
use odc_daemon::protocol_wire::{self, ProtocolError, DEFAULT_IPC_TIMEOUT};
use odc_daemon::{Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("odcd is not running (no socket at {0})")]
    NotRunning(PathBuf),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unexpected response from odcd")]
    UnexpectedResponse,
}

pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    pub fn connect(socket_path: PathBuf) -> Result<Self, ClientError> {
        if !socket_path.exists() {
            return Err(ClientError::NotRunning(socket_path));
        }
        Ok(Self { socket_path, timeout: DEFAULT_IPC_TIMEOUT })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        let data = protocol_wire::encode(request)?;
        tokio::time::timeout(self.timeout, protocol_wire::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        let bytes = tokio::time::timeout(self.timeout, protocol_wire::read_message(&mut reader))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        Ok(protocol_wire::decode(&bytes)?)
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Sends any per-partition request and unwraps its `RequestResult`.
    pub async fn request(&self, request: Request) -> Result<RequestResult, ClientError> {
        match self.send(&request).await? {
            Response::Result(result) => Ok(*result),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn status(&self, running_only: bool) -> Result<StatusRequestResult, ClientError> {
        match self.send(&Request::Status { running_only }).await? {
            Response::StatusResult(result) => Ok(*result),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
