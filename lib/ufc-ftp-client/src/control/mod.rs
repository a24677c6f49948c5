/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncWrite, BufStream};

use crate::auth::{FtpPassword, FtpUsername};
use crate::config::FtpControlConfig;
use crate::error::{FtpAuthStatus, FtpCommandError, FtpRawResponseError, FtpTransferServerError};
use crate::feature::FtpServerFeature;
use crate::io::LimitedBufReadExt;
use crate::listing::time_val;

mod command;
pub use command::FtpCommand;

mod response;
pub use response::FtpReply;

/// Map a negative file reply to a file or a permission error.
fn file_error(cmd: FtpCommand, reply: &FtpReply) -> FtpCommandError {
    let code = reply.code();
    let text = reply.text().to_string();
    match code {
        532 | 553 => FtpCommandError::PermissionDenied(cmd, code, text),
        _ if reply.text_contains_ignore_case("permission")
            || reply.text_contains_ignore_case("denied") =>
        {
            FtpCommandError::PermissionDenied(cmd, code, text)
        }
        _ => FtpCommandError::FileUnavailable(cmd, code, text),
    }
}

pub(crate) struct FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite,
{
    config: FtpControlConfig,
    stream: BufStream<T>,
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: T, config: FtpControlConfig) -> Self {
        FtpControlChannel {
            config,
            stream: BufStream::new(stream),
        }
    }

    pub(crate) fn into_inner(self) -> T {
        self.stream.into_inner()
    }

    #[inline]
    pub(crate) fn get_ref(&self) -> &T {
        self.stream.get_ref()
    }

    pub(crate) async fn wait_read_ready(&mut self) -> Result<(), FtpRawResponseError> {
        match self.stream.fill_wait_data().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(FtpRawResponseError::ConnectionClosed),
            Err(e) => Err(FtpRawResponseError::ReadFailed(e)),
        }
    }

    pub(crate) async fn wait_greetings(&mut self) -> Result<(), FtpCommandError> {
        loop {
            let reply = self.read_raw_response().await?;
            return match reply.code() {
                120 => continue,
                220 => Ok(()),
                421 => Err(FtpCommandError::ServiceNotAvailable),
                n => Err(FtpCommandError::UnexpectedReplyCode(
                    FtpCommand::GREETING,
                    n,
                )),
            };
        }
    }

    pub(crate) async fn check_server_feature(
        &mut self,
    ) -> Result<FtpServerFeature, FtpCommandError> {
        let cmd = FtpCommand::FEAT;
        self.send_cmd(cmd).await?;

        let reply = self.timed_read_raw_response("check server feature").await?;
        match reply.code() {
            500 | 501 | 502 => Ok(FtpServerFeature::default()),
            211 => Ok(FtpServerFeature::parse_lines(reply.lines())),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    /// Send `AUTH TLS` or `AUTH SSL`. The stream should be upgraded on success.
    pub(crate) async fn request_auth(&mut self, cmd: FtpCommand) -> Result<(), FtpCommandError> {
        self.send_cmd(cmd).await?;

        let reply = self.timed_read_raw_response("request auth").await?;
        match reply.code() {
            234 => Ok(()),
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            504 => Err(FtpCommandError::ParameterNotImplemented(cmd)),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn send_pbsz(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::PBSZ;
        self.send_cmd1(cmd, "0").await?;

        let reply = self.timed_read_raw_response("send pbsz").await?;
        match reply.code() {
            200 => Ok(()),
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            503 => Err(FtpCommandError::BadCommandSequence(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn send_prot_private(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::PROT;
        self.send_cmd1(cmd, "P").await?;

        let reply = self.timed_read_raw_response("send prot").await?;
        match reply.code() {
            200 => Ok(()),
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            503 => Err(FtpCommandError::BadCommandSequence(cmd)),
            504 | 536 => Err(FtpCommandError::ParameterNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn send_username(
        &mut self,
        name: &FtpUsername,
    ) -> Result<FtpAuthStatus, FtpCommandError> {
        let cmd = FtpCommand::USER;
        self.send_cmd1(cmd, name.as_original()).await?;

        let reply = self.timed_read_raw_response("send username").await?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            // some servers answer 220 and still want the password
            530 | 220 | 331 => Ok(FtpAuthStatus::NeedPassword),
            230 => Ok(FtpAuthStatus::LoggedIn),
            332 => Ok(FtpAuthStatus::NeedAccount),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn send_password(
        &mut self,
        pass: &FtpPassword,
    ) -> Result<FtpAuthStatus, FtpCommandError> {
        let cmd = FtpCommand::PASS;
        self.send_cmd1(cmd, pass.as_original()).await?;

        let reply = self.timed_read_raw_response("send password").await?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            503 => Err(FtpCommandError::BadCommandSequence(cmd)),
            530 => Ok(FtpAuthStatus::NotLoggedIn),
            202 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            230 => Ok(FtpAuthStatus::LoggedIn),
            332 => Ok(FtpAuthStatus::NeedAccount),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn send_quit(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::QUIT;
        self.send_cmd(cmd).await?;

        let reply = self.timed_read_raw_response("send quit").await?;
        match reply.code() {
            500 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            221 => Ok(()),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn request_system(&mut self) -> Result<String, FtpCommandError> {
        let cmd = FtpCommand::SYST;
        self.send_cmd(cmd).await?;

        let reply = self.timed_read_raw_response("request system").await?;
        match reply.code() {
            215 => Ok(reply.text().to_string()),
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn request_pwd(&mut self) -> Result<String, FtpCommandError> {
        let cmd = FtpCommand::PWD;
        self.send_cmd(cmd).await?;

        let reply = self.timed_read_raw_response("request pwd").await?;
        match reply.code() {
            257 => reply
                .parse_quoted_path()
                .ok_or(FtpCommandError::InvalidReplySyntax(cmd, 257)),
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            550 => Err(file_error(cmd, &reply)),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    /// Round trip for the simple file commands that only report success or failure.
    async fn file_command(
        &mut self,
        cmd: FtpCommand,
        param: &str,
        expected: &[u16],
        stage: &'static str,
    ) -> Result<FtpReply, FtpCommandError> {
        self.send_cmd_opt(cmd, param).await?;

        let reply = self.timed_read_raw_response(stage).await?;
        match reply.code() {
            n if expected.contains(&n) => Ok(reply),
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            504 => Err(FtpCommandError::ParameterNotImplemented(cmd)),
            503 => Err(FtpCommandError::BadCommandSequence(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            450 | 550 | 553 | 532 => Err(file_error(cmd, &reply)),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn change_dir(&mut self, path: &str) -> Result<(), FtpCommandError> {
        self.file_command(FtpCommand::CWD, path, &[200, 250], "change dir")
            .await?;
        Ok(())
    }

    pub(crate) async fn change_to_parent(&mut self) -> Result<(), FtpCommandError> {
        self.file_command(FtpCommand::CDUP, "", &[200, 250], "change to parent")
            .await?;
        Ok(())
    }

    pub(crate) async fn make_dir(&mut self, path: &str) -> Result<(), FtpCommandError> {
        self.file_command(FtpCommand::MKD, path, &[257], "make dir")
            .await?;
        Ok(())
    }

    pub(crate) async fn remove_dir(&mut self, path: &str) -> Result<(), FtpCommandError> {
        self.file_command(FtpCommand::RMD, path, &[250], "remove dir")
            .await?;
        Ok(())
    }

    pub(crate) async fn delete_file(&mut self, path: &str) -> Result<(), FtpCommandError> {
        self.file_command(FtpCommand::DELE, path, &[250], "delete file")
            .await?;
        Ok(())
    }

    pub(crate) async fn rename_from(&mut self, path: &str) -> Result<(), FtpCommandError> {
        self.file_command(FtpCommand::RNFR, path, &[350], "rename from")
            .await?;
        Ok(())
    }

    pub(crate) async fn rename_to(&mut self, path: &str) -> Result<(), FtpCommandError> {
        self.file_command(FtpCommand::RNTO, path, &[250], "rename to")
            .await?;
        Ok(())
    }

    pub(crate) async fn site_chmod(&mut self, mode: u32, path: &str) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::SITE_CHMOD;
        if mode > 0o7777 {
            return Err(FtpCommandError::InvalidParameter(cmd));
        }
        let param = format!("{mode:o} {path}");
        self.file_command(cmd, &param, &[200, 250], "site chmod")
            .await?;
        Ok(())
    }

    /// Returns the fact line of a `250` reply to `MLST`.
    pub(crate) async fn request_mlst(&mut self, path: &str) -> Result<String, FtpCommandError> {
        let cmd = FtpCommand::MLST;
        let reply = self
            .file_command(cmd, path, &[250], "request mlst")
            .await?;
        let lines = reply.lines();
        if lines.len() == 3 {
            Ok(lines[1].clone())
        } else {
            Err(FtpCommandError::InvalidReplySyntax(cmd, 250))
        }
    }

    pub(crate) async fn request_size(
        &mut self,
        path: &str,
    ) -> Result<Option<u64>, FtpCommandError> {
        if path.is_empty() {
            return Ok(None);
        }

        let cmd = FtpCommand::SIZE;
        self.send_cmd1(cmd, path).await?;

        let reply = self.timed_read_raw_response("request size").await?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            550 => Ok(None),
            213 => {
                if let Some(s) = reply.line_trimmed() {
                    let size = u64::from_str(s)
                        .map_err(|_| FtpCommandError::InvalidReplySyntax(cmd, 213))?;
                    Ok(Some(size))
                } else {
                    Err(FtpCommandError::InvalidReplySyntax(cmd, 213))
                }
            }
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn request_mtime(
        &mut self,
        path: &str,
    ) -> Result<Option<DateTime<Utc>>, FtpCommandError> {
        let cmd = FtpCommand::MDTM;
        self.send_cmd1(cmd, path).await?;

        let reply = self.timed_read_raw_response("request mtime").await?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            550 => Ok(None),
            213 => {
                if let Some(s) = reply.line_trimmed() {
                    let mtime = time_val::parse_to_seconds(s)
                        .ok_or(FtpCommandError::InvalidReplySyntax(cmd, 213))?;
                    Ok(Some(mtime))
                } else {
                    Err(FtpCommandError::InvalidReplySyntax(cmd, 213))
                }
            }
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn request_pasv_port(&mut self) -> Result<SocketAddr, FtpCommandError> {
        let cmd = FtpCommand::PASV;
        self.send_cmd(cmd).await?;

        let reply = self.timed_read_raw_response("request pasv port").await?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            227 => match reply.parse_pasv_227_reply() {
                Some(addr) => Ok(addr),
                None => Err(FtpCommandError::InvalidReplySyntax(cmd, 227)),
            },
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn request_epsv_port(&mut self) -> Result<u16, FtpCommandError> {
        let cmd = FtpCommand::EPSV;
        self.send_cmd(cmd).await?;

        let reply = self.timed_read_raw_response("request epsv port").await?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 | 522 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            229 => match reply.parse_epsv_229_reply() {
                Some(port) => Ok(port),
                None => Err(FtpCommandError::InvalidReplySyntax(cmd, 229)),
            },
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn request_binary_type(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::TYPE_I;
        self.send_cmd(cmd).await?;

        let reply = self
            .timed_read_raw_response("request transfer type")
            .await?;
        match reply.code() {
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            504 => Err(FtpCommandError::ParameterNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            200 => Ok(()),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    /// Send a transfer command, the data connection should already be established.
    pub(crate) async fn start_transfer(
        &mut self,
        cmd: FtpCommand,
        path: &str,
    ) -> Result<(), FtpCommandError> {
        self.send_cmd_opt(cmd, path).await?;

        let reply = self.timed_read_raw_response("start transfer").await?;
        match reply.code() {
            125 | 150 => Ok(()),
            500 | 501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            521 | 522 => Err(FtpCommandError::ProtectionRequired(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            450 | 550 | 553 | 532 => Err(file_error(cmd, &reply)),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn wait_transfer_end(
        &mut self,
        cmd: FtpCommand,
    ) -> Result<(), FtpTransferServerError> {
        let reply = self.timed_read_raw_response("wait transfer end").await?;
        match reply.code() {
            226 | 250 => Ok(()),
            110 => Err(FtpTransferServerError::RestartNeeded),
            425 => Err(FtpTransferServerError::DataTransferNotEstablished),
            426 => Err(FtpTransferServerError::DataTransferLost),
            451 => Err(FtpTransferServerError::ServerFailed),
            551 => Err(FtpTransferServerError::PageTypeUnknown),
            552 => Err(FtpTransferServerError::ExceededStorageAllocation),
            n => Err(FtpTransferServerError::UnexpectedEndReplyCode(cmd, n)),
        }
    }

    /// Read and discard one reply within `timeout`.
    pub(crate) async fn discard_reply(&mut self, timeout: std::time::Duration) -> bool {
        matches!(
            tokio::time::timeout(timeout, self.read_raw_response()).await,
            Ok(Ok(_))
        )
    }
}
