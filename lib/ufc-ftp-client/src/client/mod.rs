/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::auth::{FtpPassword, FtpUsername, login_pair};
use crate::config::FtpClientConfig;
use crate::connection::FtpConnectionProvider;
use crate::control::{FtpCommand, FtpControlChannel};
use crate::error::{
    FtpAuthStatus, FtpCommandError, FtpConnectError, FtpError, FtpSessionOpenError,
    FtpTransferError, FtpTransferSetupError,
};
use crate::feature::FtpServerFeature;
use crate::io::{FtpStream, FtpTlsContext};
use crate::listing::{
    FtpDirEntry, FtpEntryFilter, FtpEntryType, FtpListFormat, FtpListOptions, FtpListOutput,
    FtpListParser, select_entries,
};
use crate::transfer::{self, FtpLineCollector, FtpLineDataReceiver};
use crate::{FtpDataAddr, FtpServerAddr, log_msg, path};

#[cfg(test)]
mod tests;

type ControlChannel<S> = FtpControlChannel<FtpStream<S>>;

fn command_breaks_session(e: &FtpCommandError) -> bool {
    matches!(
        e,
        FtpCommandError::SendFailed(_)
            | FtpCommandError::RecvFailed(_)
            | FtpCommandError::ServiceNotAvailable
    )
}

/// Whether the control connection is unusable after this error.
fn breaks_session(e: &FtpError) -> bool {
    match e {
        FtpError::Protocol(e) => command_breaks_session(e),
        FtpError::Auth(e) => match e {
            FtpSessionOpenError::RawCommandError(e)
            | FtpSessionOpenError::ProtectionSetupFailed(e) => command_breaks_session(e),
            FtpSessionOpenError::ServiceNotAvailable => true,
            _ => false,
        },
        FtpError::Transfer(e) => match e {
            FtpTransferError::SetupFailed(FtpTransferSetupError::ServiceNotAvailable) => true,
            FtpTransferError::ControlReadError(_) | FtpTransferError::TimeoutToWaitEndReply => {
                true
            }
            _ => false,
        },
        _ => false,
    }
}

/// Send `AUTH TLS`, or `AUTH SSL` if the former is refused.
async fn request_tls<T>(control: &mut FtpControlChannel<T>) -> Result<(), FtpConnectError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    match control.request_auth(FtpCommand::AUTH_TLS).await {
        Ok(()) => Ok(()),
        Err(
            FtpCommandError::RejectedCommandSyntax(_)
            | FtpCommandError::CommandNotImplemented(_)
            | FtpCommandError::ParameterNotImplemented(_),
        ) => control
            .request_auth(FtpCommand::AUTH_SSL)
            .await
            .map_err(FtpConnectError::TlsNotSupported),
        Err(FtpCommandError::ServiceNotAvailable) => Err(FtpConnectError::ServiceNotAvailable),
        Err(e) => Err(FtpConnectError::TlsNotSupported(e)),
    }
}

async fn protect_data_channel<T>(control: &mut FtpControlChannel<T>) -> Result<(), FtpCommandError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    control.send_pbsz().await?;
    control.send_prot_private().await
}

/// One FTP or FTPS session.
///
/// Commands are sent one at a time, and every data connection lives only as
/// long as the operation that opened it. Concurrent transfers need separate
/// clients.
pub struct FtpClient<CP: FtpConnectionProvider> {
    config: FtpClientConfig,
    server: FtpServerAddr,
    provider: CP,
    control: Option<ControlChannel<CP::Stream>>,
    tls: Option<FtpTlsContext>,
    feature: FtpServerFeature,
    logged_in: bool,
    data_protected: bool,
    binary_mode: bool,
    epsv_refused: bool,
    cwd: Option<String>,
}

impl<CP> FtpClient<CP>
where
    CP: FtpConnectionProvider,
{
    /// Open the control connection, read the greeting and the feature list,
    /// and upgrade to tls if `config.tls` is set.
    pub async fn connect(
        server: FtpServerAddr,
        mut provider: CP,
        config: FtpClientConfig,
    ) -> Result<Self, FtpError> {
        let tls = match &config.tls {
            Some(tls_config) => Some(FtpTlsContext::build(tls_config, &server.host_str())?),
            None => None,
        };

        let stream = match tokio::time::timeout(
            config.connect_timeout,
            provider.new_control_connection(&server),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(FtpConnectError::ConnectIoError(e).into()),
            Err(_) => return Err(FtpConnectError::ConnectTimedOut.into()),
        };

        let mut control = FtpControlChannel::new(stream, config.control.clone());
        match tokio::time::timeout(config.greeting_timeout, control.wait_greetings()).await {
            Ok(Ok(())) => {}
            Ok(Err(FtpCommandError::ServiceNotAvailable)) => {
                return Err(FtpConnectError::ServiceNotAvailable.into());
            }
            Ok(Err(e)) => return Err(FtpConnectError::GreetingFailed(e).into()),
            Err(_) => return Err(FtpConnectError::GreetingTimedOut.into()),
        }

        let feature = control
            .check_server_feature()
            .await
            .map_err(FtpConnectError::NegotiationFailed)?;

        let stream = match &tls {
            Some(ctx) => {
                request_tls(&mut control).await?;
                let stream = control.into_inner();
                match tokio::time::timeout(ctx.handshake_timeout(), ctx.connect(stream)).await {
                    Ok(Ok(s)) => FtpStream::Tls(Box::new(s)),
                    Ok(Err(e)) => return Err(FtpConnectError::TlsHandshakeFailed(e).into()),
                    Err(_) => return Err(FtpConnectError::TlsHandshakeTimedOut.into()),
                }
            }
            None => FtpStream::Plain(control.into_inner()),
        };
        log_msg!("connected to {server}, tls: {}", stream.is_tls());

        let control = FtpControlChannel::new(stream, config.control.clone());
        Ok(FtpClient {
            config,
            server,
            provider,
            control: Some(control),
            tls,
            feature,
            logged_in: false,
            data_protected: false,
            binary_mode: false,
            epsv_refused: false,
            cwd: None,
        })
    }

    #[inline]
    pub fn server(&self) -> &FtpServerAddr {
        &self.server
    }

    #[inline]
    pub fn server_feature(&self) -> &FtpServerFeature {
        &self.feature
    }

    #[inline]
    pub fn connection_provider(&self) -> &CP {
        &self.provider
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.control.is_some()
    }

    #[inline]
    pub fn is_logged_in(&self) -> bool {
        self.control.is_some() && self.logged_in
    }

    /// Whether the control channel runs over tls.
    pub fn is_secure(&self) -> bool {
        self.control.as_ref().is_some_and(|c| c.get_ref().is_tls())
    }

    /// Whether data channels are protected with `PROT P`.
    #[inline]
    pub fn is_data_protected(&self) -> bool {
        self.data_protected
    }

    /// The working directory as last reported or changed. `None` if unknown.
    #[inline]
    pub fn current_dir(&self) -> Option<&str> {
        self.cwd.as_deref()
    }

    /// `MLSD` if the server advertised it, `LIST` otherwise.
    pub fn list_format(&self) -> FtpListFormat {
        if self.feature.support_mlsd() {
            FtpListFormat::Machine
        } else {
            FtpListFormat::Unix
        }
    }

    fn reset_session(&mut self) {
        self.control = None;
        self.logged_in = false;
        self.data_protected = false;
        self.binary_mode = false;
        self.cwd = None;
    }

    fn take_control(&mut self) -> Result<ControlChannel<CP::Stream>, FtpError> {
        self.control.take().ok_or(FtpError::NotConnected)
    }

    fn take_session(&mut self) -> Result<ControlChannel<CP::Stream>, FtpError> {
        let control = self.take_control()?;
        if self.logged_in {
            Ok(control)
        } else {
            self.control = Some(control);
            Err(FtpError::NotLoggedIn)
        }
    }

    /// Put the control channel back, unless `r` says it is broken.
    fn restore<R>(
        &mut self,
        control: ControlChannel<CP::Stream>,
        r: Result<R, FtpError>,
    ) -> Result<R, FtpError> {
        match &r {
            Err(e) if breaks_session(e) => {
                log_msg!("drop control connection to {}: {e}", self.server);
                self.reset_session();
            }
            _ => self.control = Some(control),
        }
        r
    }

    /// `USER` and `PASS`. Without a password the anonymous account is used.
    pub async fn login(
        &mut self,
        user: Option<&FtpUsername>,
        pass: Option<&FtpPassword>,
    ) -> Result<(), FtpError> {
        let (user, pass) = login_pair(user, pass);
        let mut control = self.take_control()?;
        let r = self.do_login(&mut control, &user, &pass).await;
        self.restore(control, r)
    }

    async fn do_login(
        &mut self,
        control: &mut ControlChannel<CP::Stream>,
        user: &FtpUsername,
        pass: &FtpPassword,
    ) -> Result<(), FtpError> {
        let status = control
            .send_username(user)
            .await
            .map_err(FtpSessionOpenError::from)?;
        if !matches!(status, FtpAuthStatus::LoggedIn) {
            match control
                .send_password(pass)
                .await
                .map_err(FtpSessionOpenError::from)?
            {
                FtpAuthStatus::LoggedIn => {}
                FtpAuthStatus::NeedAccount => {
                    return Err(FtpSessionOpenError::AccountIsNeeded.into());
                }
                FtpAuthStatus::NotLoggedIn | FtpAuthStatus::NeedPassword => {
                    return Err(FtpSessionOpenError::NotLoggedIn.into());
                }
            }
        }

        // data channels of a tls session are always protected
        if control.get_ref().is_tls() {
            protect_data_channel(control)
                .await
                .map_err(FtpSessionOpenError::ProtectionSetupFailed)?;
            self.data_protected = true;
        }

        self.logged_in = true;
        log_msg!("logged in to {} as {user}", self.server);
        Ok(())
    }

    /// Send `QUIT` and close the session.
    ///
    /// Returns `false` if there was no session to close.
    pub async fn disconnect(&mut self) -> Result<bool, FtpError> {
        let Some(mut control) = self.control.take() else {
            return Ok(false);
        };
        self.reset_session();
        control.send_quit().await?;
        log_msg!("disconnected from {}", self.server);
        Ok(true)
    }

    pub async fn system(&mut self) -> Result<String, FtpError> {
        let mut control = self.take_control()?;
        let r = control.request_system().await.map_err(FtpError::from);
        self.restore(control, r)
    }

    pub async fn pwd(&mut self) -> Result<String, FtpError> {
        let mut control = self.take_session()?;
        let r = control.request_pwd().await.map_err(FtpError::from);
        if let Ok(dir) = &r {
            self.cwd = Some(dir.clone());
        }
        self.restore(control, r)
    }

    pub async fn cd(&mut self, dir: &str) -> Result<(), FtpError> {
        let mut control = self.take_session()?;
        let r = control.change_dir(dir).await.map_err(FtpError::from);
        if r.is_ok() {
            self.cwd = if dir.starts_with('/') {
                Some(path::normalize(dir))
            } else {
                self.cwd
                    .as_deref()
                    .map(|cwd| path::normalize(&path::join(cwd, dir)))
            };
        }
        self.restore(control, r)
    }

    pub async fn cdup(&mut self) -> Result<(), FtpError> {
        let mut control = self.take_session()?;
        let r = control.change_to_parent().await.map_err(FtpError::from);
        if r.is_ok() {
            self.cwd = self
                .cwd
                .as_deref()
                .map(|cwd| path::parent(cwd).unwrap_or("/").to_string());
        }
        self.restore(control, r)
    }

    pub async fn mkdir(&mut self, dir: &str) -> Result<(), FtpError> {
        let mut control = self.take_session()?;
        let r = control.make_dir(dir).await.map_err(FtpError::from);
        self.restore(control, r)
    }

    pub async fn rmdir(&mut self, dir: &str) -> Result<(), FtpError> {
        let mut control = self.take_session()?;
        let r = control.remove_dir(dir).await.map_err(FtpError::from);
        self.restore(control, r)
    }

    pub async fn delete(&mut self, path: &str) -> Result<(), FtpError> {
        let mut control = self.take_session()?;
        let r = control.delete_file(path).await.map_err(FtpError::from);
        self.restore(control, r)
    }

    /// `RNFR` then `RNTO`. `RNTO` is only sent after a `350` reply.
    pub async fn rename(&mut self, from: &str, to: &str) -> Result<(), FtpError> {
        let mut control = self.take_session()?;
        let r = match control.rename_from(from).await {
            Ok(()) => control.rename_to(to).await.map_err(FtpError::from),
            Err(e) => Err(e.into()),
        };
        self.restore(control, r)
    }

    /// `SITE CHMOD`, `mode` is at most `0o7777`.
    pub async fn chmod(&mut self, path: &str, mode: u32) -> Result<(), FtpError> {
        let mut control = self.take_session()?;
        let r = control.site_chmod(mode, path).await.map_err(FtpError::from);
        self.restore(control, r)
    }

    async fn ensure_binary_mode(
        &mut self,
        control: &mut ControlChannel<CP::Stream>,
    ) -> Result<(), FtpCommandError> {
        if !self.binary_mode {
            control.request_binary_type().await?;
            self.binary_mode = true;
        }
        Ok(())
    }

    async fn negotiate_passive(
        &mut self,
        control: &mut ControlChannel<CP::Stream>,
    ) -> Result<FtpDataAddr, FtpTransferSetupError> {
        if !self.epsv_refused && (self.config.always_try_epsv || self.server.prefer_epsv()) {
            match control.request_epsv_port().await {
                Ok(port) => return Ok(FtpDataAddr::ExtendedPassive(port)),
                Err(
                    FtpCommandError::RejectedCommandSyntax(_)
                    | FtpCommandError::CommandNotImplemented(_),
                ) => {
                    log_msg!("EPSV refused by {}, fall back to PASV", self.server);
                    self.epsv_refused = true;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let addr = control.request_pasv_port().await?;
        Ok(FtpDataAddr::Passive(addr))
    }

    async fn open_data_stream(
        &mut self,
        control: &mut ControlChannel<CP::Stream>,
    ) -> Result<CP::Stream, FtpTransferSetupError> {
        if !self.config.passive {
            return Err(FtpTransferSetupError::ActiveModeUnsupported);
        }

        let data_addr = self.negotiate_passive(control).await?;
        match tokio::time::timeout(
            self.config.transfer.data_connect_timeout,
            self.provider.new_data_connection(&data_addr),
        )
        .await
        {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(FtpTransferSetupError::ConnectFailed(e)),
            Err(_) => Err(FtpTransferSetupError::ConnectTimedOut),
        }
    }

    async fn secure_data_stream(
        &mut self,
        stream: CP::Stream,
    ) -> Result<FtpStream<CP::Stream>, FtpTransferSetupError> {
        match &self.tls {
            Some(ctx) if self.data_protected => {
                match tokio::time::timeout(ctx.handshake_timeout(), ctx.connect(stream)).await {
                    Ok(Ok(s)) => Ok(FtpStream::Tls(Box::new(s))),
                    Ok(Err(e)) => Err(FtpTransferSetupError::TlsHandshakeFailed(e)),
                    Err(_) => Err(FtpTransferSetupError::TlsHandshakeTimedOut),
                }
            }
            _ => Ok(FtpStream::Plain(stream)),
        }
    }

    /// Open a passive data connection and send the transfer command on it.
    ///
    /// The tls handshake on a protected data channel starts after the
    /// preliminary reply.
    async fn start_transfer(
        &mut self,
        control: &mut ControlChannel<CP::Stream>,
        cmd: FtpCommand,
        path: &str,
    ) -> Result<FtpStream<CP::Stream>, FtpTransferError> {
        let stream = self.open_data_stream(control).await?;
        control.start_transfer(cmd, path).await?;
        match self.secure_data_stream(stream).await {
            Ok(s) => Ok(s),
            Err(e) => Err(transfer::abandon(
                control,
                cmd,
                e.into(),
                self.config.transfer.end_wait_timeout,
            )
            .await),
        }
    }

    /// Stream the content of a remote file into `writer`.
    pub async fn retrieve_to<W>(&mut self, path: &str, writer: &mut W) -> Result<u64, FtpError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut control = self.take_session()?;
        let r = self.do_retrieve(&mut control, path, writer).await;
        self.restore(control, r)
    }

    async fn do_retrieve<W>(
        &mut self,
        control: &mut ControlChannel<CP::Stream>,
        path: &str,
        writer: &mut W,
    ) -> Result<u64, FtpError>
    where
        W: AsyncWrite + Unpin,
    {
        let cmd = FtpCommand::RETR;
        self.ensure_binary_mode(control).await?;
        let data = self.start_transfer(control, cmd, path).await?;
        let size =
            transfer::receive_data(control, cmd, data, writer, &self.config.transfer).await?;
        log_msg!("{cmd} {path}: {size} bytes");
        Ok(size)
    }

    /// Stream `reader` into a remote file.
    pub async fn store_from<R>(&mut self, path: &str, reader: &mut R) -> Result<u64, FtpError>
    where
        R: AsyncRead + Unpin,
    {
        let mut control = self.take_session()?;
        let r = self.do_store(&mut control, path, reader).await;
        self.restore(control, r)
    }

    async fn do_store<R>(
        &mut self,
        control: &mut ControlChannel<CP::Stream>,
        path: &str,
        reader: &mut R,
    ) -> Result<u64, FtpError>
    where
        R: AsyncRead + Unpin,
    {
        let cmd = FtpCommand::STOR;
        self.ensure_binary_mode(control).await?;
        let data = self.start_transfer(control, cmd, path).await?;
        let size = transfer::send_data(control, cmd, data, reader, &self.config.transfer).await?;
        log_msg!("{cmd} {path}: {size} bytes");
        Ok(size)
    }

    pub async fn read(&mut self, path: &str) -> Result<Vec<u8>, FtpError> {
        let mut buf = Vec::new();
        self.retrieve_to(path, &mut buf).await?;
        Ok(buf)
    }

    pub async fn write(&mut self, path: &str, content: &[u8]) -> Result<(), FtpError> {
        let mut reader = content;
        self.store_from(path, &mut reader).await?;
        Ok(())
    }

    /// Save a remote file to `local`. The local file is removed if the transfer fails.
    pub async fn download(&mut self, remote: &str, local: &Path) -> Result<u64, FtpError> {
        let mut file = tokio::fs::File::create(local)
            .await
            .map_err(FtpError::LocalIo)?;
        match self.retrieve_to(remote, &mut file).await {
            Ok(size) => Ok(size),
            Err(e) => {
                drop(file);
                if let Err(re) = tokio::fs::remove_file(local).await {
                    log_msg!("failed to remove {}: {re}", local.display());
                }
                Err(e)
            }
        }
    }

    pub async fn upload(&mut self, local: &Path, remote: &str) -> Result<u64, FtpError> {
        let mut file = tokio::fs::File::open(local)
            .await
            .map_err(FtpError::LocalIo)?;
        self.store_from(remote, &mut file).await
    }

    async fn do_list_with<R>(
        &mut self,
        control: &mut ControlChannel<CP::Stream>,
        cmd: FtpCommand,
        dir: &str,
        receiver: &mut R,
    ) -> Result<(), FtpError>
    where
        R: FtpLineDataReceiver + ?Sized,
    {
        let data = self.start_transfer(control, cmd, dir).await?;
        transfer::receive_lines(control, cmd, data, receiver, &self.config.transfer).await?;
        Ok(())
    }

    async fn list_lines_with<R>(
        &mut self,
        cmd: FtpCommand,
        dir: &str,
        receiver: &mut R,
    ) -> Result<(), FtpError>
    where
        R: FtpLineDataReceiver + ?Sized,
    {
        let mut control = self.take_session()?;
        let r = self.do_list_with(&mut control, cmd, dir, receiver).await;
        self.restore(control, r)
    }

    /// Feed the raw lines of the detailed listing of `dir` to `receiver`.
    ///
    /// Returns the format of the lines.
    pub async fn list_raw_with<R>(
        &mut self,
        dir: &str,
        receiver: &mut R,
    ) -> Result<FtpListFormat, FtpError>
    where
        R: FtpLineDataReceiver + ?Sized,
    {
        let format = self.list_format();
        let cmd = match format {
            FtpListFormat::Machine => FtpCommand::MLSD,
            FtpListFormat::Unix => FtpCommand::LIST,
        };
        self.list_lines_with(cmd, dir, receiver).await?;
        Ok(format)
    }

    async fn list_raw(&mut self, dir: &str) -> Result<(FtpListFormat, Vec<String>), FtpError> {
        let mut collector = FtpLineCollector::default();
        let format = self.list_raw_with(dir, &mut collector).await?;
        Ok((format, collector.into_lines()))
    }

    /// The normalized records of `dir`, `.` and `..` included if the server sends them.
    pub async fn list_entries(&mut self, dir: &str) -> Result<Vec<FtpDirEntry>, FtpError> {
        let (format, lines) = self.list_raw(dir).await?;
        Ok(FtpListParser::new(format).parse_listing(&lines))
    }

    /// Names in `dir`, from `NLST` or from the detailed listing if that fails.
    pub async fn list_names(&mut self, dir: &str, with_dots: bool) -> Result<Vec<String>, FtpError> {
        let mut collector = FtpLineCollector::default();
        let names: Vec<String> = match self
            .list_lines_with(FtpCommand::NLST, dir, &mut collector)
            .await
        {
            Ok(()) => collector
                .into_lines()
                .iter()
                .map(|line| path::basename(line).to_string())
                .collect(),
            Err(
                FtpError::NotFound(_)
                | FtpError::Protocol(
                    FtpCommandError::CommandNotImplemented(_)
                    | FtpCommandError::RejectedCommandSyntax(_)
                    | FtpCommandError::ParameterNotImplemented(_),
                ),
            ) if self.is_logged_in() => {
                log_msg!("NLST failed on {}, use the detailed listing", self.server);
                self.list_entries(dir)
                    .await?
                    .iter()
                    .map(|e| e.basename().to_string())
                    .collect()
            }
            Err(e) => return Err(e),
        };

        Ok(names
            .into_iter()
            .filter(|name| with_dots || (name != "." && name != ".."))
            .collect())
    }

    pub async fn list_files(
        &mut self,
        dir: &str,
        options: &FtpListOptions,
    ) -> Result<FtpListOutput, FtpError> {
        let entries = self.list_entries(dir).await?;
        Ok(select_entries(entries, FtpEntryFilter::FilesOnly, options))
    }

    pub async fn list_dirs(
        &mut self,
        dir: &str,
        options: &FtpListOptions,
    ) -> Result<FtpListOutput, FtpError> {
        let entries = self.list_entries(dir).await?;
        Ok(select_entries(entries, FtpEntryFilter::DirsOnly, options))
    }

    async fn mlst(&mut self, path: &str) -> Result<FtpDirEntry, FtpError> {
        let mut control = self.take_session()?;
        let r = control.request_mlst(path).await.map_err(FtpError::from);
        let r = self.restore(control, r)?;
        FtpListParser::new(FtpListFormat::Machine)
            .parse_line(&r)
            .ok_or(FtpError::Protocol(FtpCommandError::InvalidReplySyntax(
                FtpCommand::MLST,
                250,
            )))
    }

    /// The record of a single path.
    ///
    /// `MLST` is used if advertised, otherwise the parent directory is listed.
    pub async fn stat(&mut self, path: &str) -> Result<FtpDirEntry, FtpError> {
        if self.feature.support_mlst() {
            match self.mlst(path).await {
                Err(FtpError::Protocol(
                    FtpCommandError::CommandNotImplemented(_)
                    | FtpCommandError::RejectedCommandSyntax(_),
                )) if self.is_logged_in() => {}
                r => return r,
            }
        }

        let name = path::basename(path);
        if name == "/" {
            // only the `.` record of the root itself can describe it
            return self
                .list_entries("/")
                .await?
                .into_iter()
                .find(|e| e.entry_type() == FtpEntryType::CurrentDir)
                .ok_or_else(|| FtpError::NotFound(path.to_string()));
        }

        let parent = path::parent(path).unwrap_or("");
        let (format, lines) = self.list_raw(parent).await?;
        FtpListParser::new(format)
            .find_entry(&lines, name)
            .ok_or_else(|| FtpError::NotFound(path.to_string()))
    }

    pub async fn is_dir(&mut self, path: &str) -> Result<bool, FtpError> {
        match self.stat(path).await {
            Ok(entry) => Ok(entry.is_dir()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Size from the stat record, or from `SIZE`.
    pub async fn filesize(&mut self, path: &str) -> Result<Option<u64>, FtpError> {
        match self.stat(path).await {
            Ok(entry) if entry.size().is_some() => return Ok(entry.size()),
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let mut control = self.take_session()?;
        let r = match self.ensure_binary_mode(&mut control).await {
            Ok(()) => control.request_size(path).await.map_err(FtpError::from),
            Err(e) => Err(e.into()),
        };
        self.restore(control, r)
    }

    /// Modification time from the stat record, or from `MDTM`.
    pub async fn last_modified(&mut self, path: &str) -> Result<Option<DateTime<Utc>>, FtpError> {
        match self.stat(path).await {
            Ok(entry) if entry.mtime().is_some() => return Ok(entry.mtime().copied()),
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let mut control = self.take_session()?;
        let r = control.request_mtime(path).await.map_err(FtpError::from);
        self.restore(control, r)
    }

    /// Permission bits from the stat record.
    pub async fn mode(&mut self, path: &str) -> Result<Option<u32>, FtpError> {
        let entry = self.stat(path).await?;
        Ok(entry.mode())
    }
}
