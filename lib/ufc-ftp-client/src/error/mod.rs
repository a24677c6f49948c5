/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

mod command;
mod connect;
mod response;
mod session;
mod transfer;

pub use command::FtpCommandError;
pub use connect::FtpConnectError;
pub use response::FtpRawResponseError;
pub(crate) use session::FtpAuthStatus;
pub use session::FtpSessionOpenError;
pub use transfer::{
    FtpLineDataReadError, FtpTransferError, FtpTransferServerError, FtpTransferSetupError,
};

/// Coarse classification of [`FtpError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FtpErrorKind {
    /// The server could not be reached, or the tls handshake failed at connect.
    Connect,
    /// Credentials rejected. The control channel is still usable.
    Auth,
    /// Malformed or unexpected reply, or a reply timeout. Reconnect before retrying.
    Protocol,
    /// The data channel failed. It has been closed already.
    Transfer,
    NotFound,
    PermissionDenied,
    /// Local filesystem error, the remote side is not involved.
    LocalIo,
    /// The operation is not valid in the current session state.
    State,
}

#[derive(Debug, Error)]
pub enum FtpError {
    #[error("connect failed: {0}")]
    Connect(#[from] FtpConnectError),
    #[error("login failed: {0}")]
    Auth(#[from] FtpSessionOpenError),
    #[error("protocol error: {0}")]
    Protocol(FtpCommandError),
    #[error("transfer failed: {0}")]
    Transfer(FtpTransferError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("local io error: {0:?}")]
    LocalIo(io::Error),
    #[error("not connected")]
    NotConnected,
    #[error("not logged in")]
    NotLoggedIn,
}

impl FtpError {
    pub fn kind(&self) -> FtpErrorKind {
        match self {
            FtpError::Connect(_) => FtpErrorKind::Connect,
            FtpError::Auth(_) => FtpErrorKind::Auth,
            FtpError::Protocol(_) => FtpErrorKind::Protocol,
            FtpError::Transfer(_) => FtpErrorKind::Transfer,
            FtpError::NotFound(_) => FtpErrorKind::NotFound,
            FtpError::PermissionDenied(_) => FtpErrorKind::PermissionDenied,
            FtpError::LocalIo(_) => FtpErrorKind::LocalIo,
            FtpError::NotConnected | FtpError::NotLoggedIn => FtpErrorKind::State,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == FtpErrorKind::NotFound
    }
}

impl From<FtpCommandError> for FtpError {
    fn from(e: FtpCommandError) -> Self {
        match e {
            FtpCommandError::FileUnavailable(cmd, code, msg) => {
                FtpError::NotFound(format!("{cmd} -> {code} {msg}"))
            }
            FtpCommandError::PermissionDenied(cmd, code, msg) => {
                FtpError::PermissionDenied(format!("{cmd} -> {code} {msg}"))
            }
            FtpCommandError::NotLoggedIn => FtpError::NotLoggedIn,
            _ => FtpError::Protocol(e),
        }
    }
}

impl From<FtpTransferError> for FtpError {
    fn from(e: FtpTransferError) -> Self {
        match e {
            FtpTransferError::StartFailed(e)
            | FtpTransferError::SetupFailed(FtpTransferSetupError::NegotiationFailed(e)) => {
                FtpError::from(e)
            }
            FtpTransferError::LocalIoFailed(e) => FtpError::LocalIo(e),
            _ => FtpError::Transfer(e),
        }
    }
}
