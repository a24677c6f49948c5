/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use super::FtpControlChannel;
use crate::error::FtpCommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FtpCommand(&'static str);

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FtpCommand {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

macro_rules! ftp_commands {
    (
        $(
            $(#[$docs:meta])*
            ($konst:ident, $phrase:expr);
        )+
    ) => {
        impl FtpCommand {
        $(
            $(#[$docs])*
            pub const $konst: FtpCommand = FtpCommand($phrase);
        )+
        }
    };
}

ftp_commands! {
    /// a fake command for greeting
    (GREETING, "-");
    (FEAT, "FEAT");
    (AUTH_TLS, "AUTH TLS");
    (AUTH_SSL, "AUTH SSL");
    (PBSZ, "PBSZ");
    (PROT, "PROT");
    (USER, "USER");
    (PASS, "PASS");
    (QUIT, "QUIT");
    (SYST, "SYST");
    (PWD, "PWD");
    (CWD, "CWD");
    (CDUP, "CDUP");
    (MKD, "MKD");
    (RMD, "RMD");
    (DELE, "DELE");
    (RNFR, "RNFR");
    (RNTO, "RNTO");
    (SITE_CHMOD, "SITE CHMOD");
    (TYPE_I, "TYPE I");
    (PASV, "PASV");
    (EPSV, "EPSV");
    (MLST, "MLST");
    (SIZE, "SIZE");
    (MDTM, "MDTM");
    (LIST, "LIST");
    (MLSD, "MLSD");
    (NLST, "NLST");
    (RETR, "RETR");
    (STOR, "STOR");
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    async fn send_all(&mut self, buf: &[u8]) -> Result<(), FtpCommandError> {
        self.stream
            .write_all(buf)
            .await
            .map_err(FtpCommandError::SendFailed)?;
        self.stream
            .flush()
            .await
            .map_err(FtpCommandError::SendFailed)
    }

    pub(super) async fn send_cmd(&mut self, cmd: FtpCommand) -> Result<(), FtpCommandError> {
        #[cfg(feature = "log-raw-io")]
        crate::debug::log_cmd(cmd, None);

        let len = cmd.0.len() + 2;
        let mut buf: Vec<u8> = Vec::with_capacity(len);
        buf.extend_from_slice(cmd.0.as_bytes());
        buf.extend_from_slice(b"\r\n");

        self.send_all(buf.as_ref()).await
    }

    pub(super) async fn send_cmd1(
        &mut self,
        cmd: FtpCommand,
        param1: &str,
    ) -> Result<(), FtpCommandError> {
        // a line break inside the parameter would smuggle in a second command
        if memchr::memchr2(b'\r', b'\n', param1.as_bytes()).is_some() {
            return Err(FtpCommandError::InvalidParameter(cmd));
        }

        #[cfg(feature = "log-raw-io")]
        crate::debug::log_cmd(cmd, Some(param1));

        let len = cmd.0.len() + 1 + param1.len() + 2;
        let mut buf: Vec<u8> = Vec::with_capacity(len);
        buf.extend_from_slice(cmd.0.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(param1.as_bytes());
        buf.extend_from_slice(b"\r\n");

        self.send_all(buf.as_ref()).await
    }

    /// Send the command with the parameter only if it is not empty.
    pub(super) async fn send_cmd_opt(
        &mut self,
        cmd: FtpCommand,
        param1: &str,
    ) -> Result<(), FtpCommandError> {
        if param1.is_empty() {
            self.send_cmd(cmd).await
        } else {
            self.send_cmd1(cmd, param1).await
        }
    }
}
