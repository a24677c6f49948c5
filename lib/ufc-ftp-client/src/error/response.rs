/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FtpRawResponseError {
    #[error("read failed: {0:?}")]
    ReadFailed(io::Error),
    #[error("connection closed")]
    ConnectionClosed,
    #[error("line too long")]
    LineTooLong,
    #[error("invalid line format")]
    InvalidLineFormat,
    #[error("invalid reply code {0}")]
    InvalidReplyCode(u16),
    #[error("line is not utf8")]
    LineIsNotUtf8,
    #[error("too many lines")]
    TooManyLines,
    #[error("empty reply")]
    EmptyReply,
    #[error("read response for stage '{0}' timed out")]
    ReadResponseTimedOut(&'static str),
}

impl FtpRawResponseError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FtpRawResponseError::ReadResponseTimedOut(_))
    }

    pub fn is_connection_reset(&self) -> bool {
        match self {
            FtpRawResponseError::ConnectionClosed => true,
            FtpRawResponseError::ReadFailed(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}
