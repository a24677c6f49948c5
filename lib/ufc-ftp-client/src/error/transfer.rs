/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use super::{FtpCommandError, FtpRawResponseError};
use crate::control::FtpCommand;

#[derive(Debug, Error)]
pub enum FtpTransferSetupError {
    #[error("service not available")]
    ServiceNotAvailable,
    #[error("passive mode negotiation failed: {0}")]
    NegotiationFailed(FtpCommandError),
    #[error("active mode data connection is not supported")]
    ActiveModeUnsupported,
    #[error("data connect failed: {0:?}")]
    ConnectFailed(io::Error),
    #[error("timed out to connect data channel")]
    ConnectTimedOut,
    #[error("data channel tls handshake failed: {0:?}")]
    TlsHandshakeFailed(io::Error),
    #[error("timed out to do data channel tls handshake")]
    TlsHandshakeTimedOut,
}

impl From<FtpCommandError> for FtpTransferSetupError {
    fn from(e: FtpCommandError) -> Self {
        match e {
            FtpCommandError::ServiceNotAvailable => FtpTransferSetupError::ServiceNotAvailable,
            _ => FtpTransferSetupError::NegotiationFailed(e),
        }
    }
}

#[derive(Debug, Error)]
pub enum FtpTransferServerError {
    #[error("unable to recv reply: {0}")]
    RecvFailed(#[from] FtpRawResponseError),
    #[error("restart needed")]
    RestartNeeded,
    #[error("data transfer not established")]
    DataTransferNotEstablished,
    #[error("data transfer lost")]
    DataTransferLost,
    #[error("server failed")]
    ServerFailed,
    #[error("page type unknown")]
    PageTypeUnknown,
    #[error("exceeded storage allocation")]
    ExceededStorageAllocation,
    #[error("unexpected end reply code ({0} -> {1})")]
    UnexpectedEndReplyCode(FtpCommand, u16),
}

#[derive(Debug, Error)]
pub enum FtpLineDataReadError {
    #[error("read failed: {0:?}")]
    ReadFailed(#[from] io::Error),
    #[error("line {0} is too long")]
    LineTooLong(usize),
    #[error("unsupported encoding")]
    UnsupportedEncoding,
    #[error("too many lines")]
    TooManyLines,
    #[error("aborted by callback")]
    AbortedByCallback,
}

#[derive(Debug, Error)]
pub enum FtpTransferError {
    #[error("data transfer setup error: {0}")]
    SetupFailed(#[from] FtpTransferSetupError),
    #[error("start command failed: {0}")]
    StartFailed(FtpCommandError),
    #[error("server reported error: {0}")]
    ServerReportedError(FtpTransferServerError),
    #[error("control read error: {0}")]
    ControlReadError(FtpRawResponseError),
    #[error("data read failed: {0:?}")]
    DataReadFailed(io::Error),
    #[error("data write failed: {0:?}")]
    DataWriteFailed(io::Error),
    #[error("data channel idle timed out")]
    DataIdleTimedOut,
    #[error("line data read failed: {0}")]
    LineReadFailed(#[from] FtpLineDataReadError),
    #[error("timeout to wait end reply")]
    TimeoutToWaitEndReply,
    #[error("timeout to wait all data")]
    TimeoutToWaitAllData,
    #[error("local io failed: {0:?}")]
    LocalIoFailed(io::Error),
}

impl From<FtpTransferServerError> for FtpTransferError {
    fn from(e: FtpTransferServerError) -> Self {
        if let FtpTransferServerError::RecvFailed(e) = e {
            FtpTransferError::ControlReadError(e)
        } else {
            FtpTransferError::ServerReportedError(e)
        }
    }
}

impl From<FtpCommandError> for FtpTransferError {
    fn from(e: FtpCommandError) -> Self {
        FtpTransferError::StartFailed(e)
    }
}
