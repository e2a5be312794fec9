// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Unix-socket listener: accepts connections and dispatches each one's
//! request/response traffic to a [`Controller`], without blocking other
//! connections or the process's signal-handling loop.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, warn};

use crate::controller::Controller;
use crate::protocol_wire::{self, ProtocolError, DEFAULT_IPC_TIMEOUT};
use odc_adapters::{AgentFabricAdapter, DeviceChannel};

/// Accepts connections on `socket_path` until `shutdown` fires, spawning one
/// task per connection so a slow or stuck client can't stall the others.
pub async fn run<F, D>(socket_path: PathBuf, controller: Arc<Controller<F, D>>, shutdown: Arc<tokio::sync::Notify>)
where
    F: AgentFabricAdapter,
    D: DeviceChannel,
{
    if socket_path.exists() {
        if let Err(e) = std::fs::remove_file(&socket_path) {
            warn!(path = %socket_path.display(), error = %e, "failed to remove stale socket file");
        }
    }

    let listener = match UnixListener::bind(&socket_path) {
        Ok(listener) => listener,
        Err(e) => {
            error!(path = %socket_path.display(), error = %e, "failed to bind control socket");
            return;
        }
    };
    tracing::info!(path = %socket_path.display(), "listening for requests");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _)) => {
                        let controller = Arc::clone(&controller);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, &controller).await {
                                match e {
                                    ProtocolError::ConnectionClosed => debug!("client disconnected"),
                                    ProtocolError::Timeout => warn!("connection timed out"),
                                    other => error!(error = %other, "connection error"),
                                }
                            }
                        });
                    }
                    Err(e) => error!(error = %e, "accept error"),
                }
            }
            _ = shutdown.notified() => {
                tracing::info!("listener shutting down");
                break;
            }
        }
    }

    let _ = std::fs::remove_file(&socket_path);
}

/// Reads and answers every request a client sends in sequence, until it
/// disconnects or a protocol error occurs.
async fn handle_connection<F, D>(stream: UnixStream, controller: &Controller<F, D>) -> Result<(), ProtocolError>
where
    F: AgentFabricAdapter,
    D: DeviceChannel,
{
    let (mut reader, mut writer) = stream.into_split();

    loop {
        let request = match protocol_wire::read_request(&mut reader, DEFAULT_IPC_TIMEOUT).await {
            Ok(request) => request,
            Err(ProtocolError::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e),
        };
        debug!(request = ?request, "received request");

        let response = controller.handle(request).await;
        debug!(response = ?response, "sending response");

        protocol_wire::write_response(&mut writer, &response, DEFAULT_IPC_TIMEOUT).await?;
    }
}
