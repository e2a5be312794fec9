// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Error taxonomy (§7): stable numeric codes grouped by range, grounded on
//! the original implementation's `odc::core::ErrorCode`.

use thiserror::Error;

/// Stable numeric error code, grouped by range as in the original
/// `odc::core::ErrorCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[repr(u32)]
pub enum ErrorCode {
    // Request (100-range)
    RequestNotSupported = 100,
    RequestTimeout = 101,
    ResourcePluginFailed = 102,

    // AsyncOp
    OperationInProgress = 110,
    OperationTimeout = 111,
    OperationCanceled = 112,

    // Device
    DeviceChangeStateFailed = 120,
    DeviceChangeStateInvalidTransition = 121,
    DeviceGetPropertiesFailed = 122,
    DeviceSetPropertiesFailed = 123,
    DeviceWaitForStateFailed = 124,
    TopologyFailed = 125,

    // AgentFabric (200-range)
    DdsCreateSessionFailed = 200,
    DdsShutdownSessionFailed = 201,
    DdsAttachToSessionFailed = 202,
    DdsCreateTopologyFailed = 203,
    DdsCommanderInfoFailed = 204,
    DdsSubmitAgentsFailed = 205,
    DdsActivateTopologyFailed = 206,
    DdsSubscribeFailed = 207,

    // DeviceChannel (300-range)
    CreateTopologyFailed = 300,
    ChangeStateFailed = 301,
    GetStateFailed = 302,
    SetPropertiesFailed = 303,
    WaitForStateFailed = 304,

    // Internal (400-range)
    RuntimeError = 400,
}

impl ErrorCode {
    /// One-line human summary, as `ErrorCategory::message` does in the original.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::RequestNotSupported => "Request not supported",
            ErrorCode::RequestTimeout => "Request timeout",
            ErrorCode::ResourcePluginFailed => "Resource plugin failed",
            ErrorCode::OperationInProgress => "async operation already in progress",
            ErrorCode::OperationTimeout => "async operation timed out",
            ErrorCode::OperationCanceled => "async operation canceled",
            ErrorCode::DeviceChangeStateFailed => "Failed to change state of a device",
            ErrorCode::DeviceChangeStateInvalidTransition => {
                "Requested transition is not valid from the current state"
            }
            ErrorCode::DeviceGetPropertiesFailed => "Failed to get device properties",
            ErrorCode::DeviceSetPropertiesFailed => "Failed to set device properties",
            ErrorCode::DeviceWaitForStateFailed => "Failed waiting for device state",
            ErrorCode::TopologyFailed => "Failed topology",
            ErrorCode::DdsCreateSessionFailed => "Failed to create an agent-fabric session",
            ErrorCode::DdsShutdownSessionFailed => "Failed to shutdown an agent-fabric session",
            ErrorCode::DdsAttachToSessionFailed => "Failed to attach to an agent-fabric session",
            ErrorCode::DdsCreateTopologyFailed => "Failed to create topology",
            ErrorCode::DdsCommanderInfoFailed => "Failed to receive agent-fabric commander info",
            ErrorCode::DdsSubmitAgentsFailed => "Failed to submit agents",
            ErrorCode::DdsActivateTopologyFailed => "Failed to activate topology",
            ErrorCode::DdsSubscribeFailed => "Failed to subscribe to task-done events",
            ErrorCode::CreateTopologyFailed => "Failed to create device-channel topology",
            ErrorCode::ChangeStateFailed => "Failed to change device state",
            ErrorCode::GetStateFailed => "Failed to get device state",
            ErrorCode::SetPropertiesFailed => "Failed to set device properties",
            ErrorCode::WaitForStateFailed => "Failed waiting for device state",
            ErrorCode::RuntimeError => "Runtime error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", *self as u32, self.message())
    }
}

/// An error as carried in a reply: `{code, details}` (§6, §7).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Error {
    pub code: ErrorCode,
    pub details: String,
}

impl Error {
    pub fn new(code: ErrorCode, details: impl Into<String>) -> Self {
        Self {
            code,
            details: details.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.code, self.details)
    }
}

impl std::error::Error for Error {}

/// Rust-side error type returned by fallible core/engine operations.
///
/// Converts losslessly to the wire [`Error`] via [`OdcError::to_protocol_error`].
#[derive(Debug, Error)]
#[error("{code}: {details}")]
pub struct OdcError {
    pub code: ErrorCode,
    pub details: String,
}

impl OdcError {
    pub fn new(code: ErrorCode, details: impl Into<String>) -> Self {
        Self {
            code,
            details: details.into(),
        }
    }

    pub fn to_protocol_error(&self) -> Error {
        Error::new(self.code, self.details.clone())
    }
}

impl From<OdcError> for Error {
    fn from(e: OdcError) -> Self {
        e.to_protocol_error()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
