/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use crate::error::FtpCommandError;

#[derive(Debug, Error)]
pub enum FtpConnectError {
    #[error("connect failed: {0:?}")]
    ConnectIoError(io::Error),
    #[error("timed out to connect")]
    ConnectTimedOut,
    #[error("timed out to wait greeting")]
    GreetingTimedOut,
    #[error("greeting failed: {0}")]
    GreetingFailed(FtpCommandError),
    #[error("negotiation failed: {0}")]
    NegotiationFailed(FtpCommandError),
    #[error("service not available")]
    ServiceNotAvailable,
    #[error("tls is not supported by server: {0}")]
    TlsNotSupported(FtpCommandError),
    #[error("invalid tls config: {0}")]
    InvalidTlsConfig(String),
    #[error("tls handshake failed: {0:?}")]
    TlsHandshakeFailed(io::Error),
    #[error("timed out to do tls handshake")]
    TlsHandshakeTimedOut,
}
