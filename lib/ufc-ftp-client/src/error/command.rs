/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use super::FtpRawResponseError;
use crate::control::FtpCommand;

#[derive(Debug, Error)]
pub enum FtpCommandError {
    #[error("unable to send command: {0:?}")]
    SendFailed(io::Error),
    #[error("unable to recv reply: {0}")]
    RecvFailed(#[from] FtpRawResponseError),
    #[error("service not available")]
    ServiceNotAvailable,
    #[error("not logged in")]
    NotLoggedIn,
    #[error("{0} syntax rejected by server")]
    RejectedCommandSyntax(FtpCommand),
    #[error("command {0} is not implemented by server")]
    CommandNotImplemented(FtpCommand),
    #[error("parameter is not implemented for command {0}")]
    ParameterNotImplemented(FtpCommand),
    #[error("unexpected reply code ({0} -> {1})")]
    UnexpectedReplyCode(FtpCommand, u16),
    #[error("invalid reply {1} syntax to command {0}")]
    InvalidReplySyntax(FtpCommand, u16),
    #[error("bad sequence of command {0}")]
    BadCommandSequence(FtpCommand),
    #[error("file unavailable ({0} -> {1} {2})")]
    FileUnavailable(FtpCommand, u16, String),
    #[error("permission denied ({0} -> {1} {2})")]
    PermissionDenied(FtpCommand, u16, String),
    #[error("data protection required by server for command {0}")]
    ProtectionRequired(FtpCommand),
    #[error("invalid parameter for command {0}")]
    InvalidParameter(FtpCommand),
}

impl FtpCommandError {
    pub fn reply_code(&self) -> Option<u16> {
        match self {
            FtpCommandError::UnexpectedReplyCode(_, code)
            | FtpCommandError::InvalidReplySyntax(_, code)
            | FtpCommandError::FileUnavailable(_, code, _)
            | FtpCommandError::PermissionDenied(_, code, _) => Some(*code),
            FtpCommandError::ServiceNotAvailable => Some(421),
            FtpCommandError::NotLoggedIn => Some(530),
            _ => None,
        }
    }
}
