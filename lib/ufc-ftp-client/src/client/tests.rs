/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rustls::ServerConfig;
use rustls_pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio_rustls::TlsAcceptor;
use tokio_test::io::{Builder, Mock};

use super::*;
use crate::config::{FtpControlConfig, FtpTlsConfig};
use crate::error::FtpErrorKind;

struct MockProvider {
    control: Option<Mock>,
    data: VecDeque<Mock>,
    data_addrs: Vec<FtpDataAddr>,
}

impl MockProvider {
    fn new(control: Mock, data: Vec<Mock>) -> Self {
        MockProvider {
            control: Some(control),
            data: data.into(),
            data_addrs: Vec::new(),
        }
    }
}

#[async_trait]
impl FtpConnectionProvider for MockProvider {
    type Stream = Mock;

    async fn new_control_connection(&mut self, _server: &FtpServerAddr) -> io::Result<Mock> {
        self.control
            .take()
            .ok_or_else(|| io::Error::other("control connection already opened"))
    }

    async fn new_data_connection(&mut self, data_addr: &FtpDataAddr) -> io::Result<Mock> {
        self.data_addrs.push(*data_addr);
        self.data
            .pop_front()
            .ok_or_else(|| io::Error::other("no more data connection"))
    }
}

const PASV_REPLY: &[u8] = b"227 Entering Passive Mode (192,0,2,1,4,1)\r\n";

fn server() -> FtpServerAddr {
    FtpServerAddr::from_str("ftp.example.com").unwrap()
}

/// Greeting, a feature list with `MLSD` and `MLST`, and a password login.
fn login_script() -> Builder {
    let mut b = Builder::new();
    b.read(b"220 Welcome\r\n")
        .write(b"FEAT\r\n")
        .read(b"211-Features:\r\n MLSD\r\n MLST type*;size*;modify*;\r\n SIZE\r\n211 End\r\n")
        .write(b"USER alice\r\n")
        .read(b"331 Password required\r\n")
        .write(b"PASS secret\r\n")
        .read(b"230 Logged in\r\n");
    b
}

/// Greeting, no feature list, and an anonymous login.
fn anonymous_script() -> Builder {
    let mut b = Builder::new();
    b.read(b"220 Welcome\r\n")
        .write(b"FEAT\r\n")
        .read(b"502 Command not implemented\r\n")
        .write(b"USER anonymous\r\n")
        .read(b"331 Guest login ok\r\n")
        .write(b"PASS anonymous@\r\n")
        .read(b"230 Guest logged in\r\n");
    b
}

async fn connect(
    control: Mock,
    data: Vec<Mock>,
    config: FtpClientConfig,
) -> FtpClient<MockProvider> {
    FtpClient::connect(server(), MockProvider::new(control, data), config)
        .await
        .unwrap()
}

async fn login(client: &mut FtpClient<MockProvider>) {
    let user = FtpUsername::from_original("alice").unwrap();
    let pass = FtpPassword::from_original("secret").unwrap();
    client.login(Some(&user), Some(&pass)).await.unwrap();
}

#[tokio::test]
async fn login_then_quit() {
    let control = login_script()
        .write(b"PWD\r\n")
        .read(b"257 \"/home/alice\" is current directory\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let mut client = connect(control, vec![], FtpClientConfig::default()).await;
    assert!(client.is_connected());
    assert!(!client.is_logged_in());
    assert!(client.server_feature().support_mlsd());
    assert_eq!(client.list_format(), FtpListFormat::Machine);

    login(&mut client).await;
    assert!(client.is_logged_in());
    assert!(!client.is_secure());
    assert!(!client.is_data_protected());

    assert_eq!(client.pwd().await.unwrap(), "/home/alice");
    assert_eq!(client.current_dir(), Some("/home/alice"));

    assert!(client.disconnect().await.unwrap());
    assert!(!client.is_connected());
    assert!(!client.disconnect().await.unwrap());
    assert!(matches!(client.pwd().await, Err(FtpError::NotConnected)));
}

#[tokio::test]
async fn anonymous_login() {
    let control = anonymous_script()
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let mut client = connect(control, vec![], FtpClientConfig::default()).await;
    assert_eq!(client.list_format(), FtpListFormat::Unix);
    client.login(None, None).await.unwrap();
    assert!(client.is_logged_in());
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn wrong_password() {
    let control = Builder::new()
        .read(b"220 Welcome\r\n")
        .write(b"FEAT\r\n")
        .read(b"502 Command not implemented\r\n")
        .write(b"USER alice\r\n")
        .read(b"331 Password required\r\n")
        .write(b"PASS secret\r\n")
        .read(b"530 Login incorrect\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let mut client = connect(control, vec![], FtpClientConfig::default()).await;
    let user = FtpUsername::from_original("alice").unwrap();
    let pass = FtpPassword::from_original("secret").unwrap();
    let e = client.login(Some(&user), Some(&pass)).await.unwrap_err();
    assert_eq!(e.kind(), FtpErrorKind::Auth);
    assert!(client.is_connected());
    assert!(!client.is_logged_in());

    assert!(matches!(client.pwd().await, Err(FtpError::NotLoggedIn)));
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn not_logged_in() {
    let control = Builder::new()
        .read(b"220 Welcome\r\n")
        .write(b"FEAT\r\n")
        .read(b"500 Unknown command\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let mut client = connect(control, vec![], FtpClientConfig::default()).await;
    let e = client.delete("/a.txt").await.unwrap_err();
    assert_eq!(e.kind(), FtpErrorKind::State);
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn service_not_available() {
    let control = Builder::new().read(b"421 Too many users\r\n").build();
    let r = FtpClient::connect(
        server(),
        MockProvider::new(control, vec![]),
        FtpClientConfig::default(),
    )
    .await;
    match r {
        Err(e) => assert_eq!(e.kind(), FtpErrorKind::Connect),
        Ok(_) => panic!("connect should fail"),
    }
}

#[tokio::test]
async fn rename() {
    let control = login_script()
        .write(b"RNFR /a.txt\r\n")
        .read(b"350 Ready for RNTO\r\n")
        .write(b"RNTO /b.txt\r\n")
        .read(b"250 Rename successful\r\n")
        .write(b"RNFR /missing\r\n")
        .read(b"550 No such file or directory\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let mut client = connect(control, vec![], FtpClientConfig::default()).await;
    login(&mut client).await;

    client.rename("/a.txt", "/b.txt").await.unwrap();
    let e = client.rename("/missing", "/c.txt").await.unwrap_err();
    assert!(e.is_not_found());
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn directory_commands() {
    let control = login_script()
        .write(b"CWD /pub\r\n")
        .read(b"250 Directory changed\r\n")
        .write(b"CWD docs\r\n")
        .read(b"250 Directory changed\r\n")
        .write(b"CDUP\r\n")
        .read(b"250 Directory changed\r\n")
        .write(b"MKD /pub/new\r\n")
        .read(b"257 \"/pub/new\" created\r\n")
        .write(b"RMD /pub/old\r\n")
        .read(b"250 Removed\r\n")
        .write(b"DELE /etc/passwd\r\n")
        .read(b"550 Permission denied\r\n")
        .write(b"SITE CHMOD 644 /pub/a.txt\r\n")
        .read(b"200 SITE CHMOD command ok\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let mut client = connect(control, vec![], FtpClientConfig::default()).await;
    login(&mut client).await;

    client.cd("/pub").await.unwrap();
    assert_eq!(client.current_dir(), Some("/pub"));
    client.cd("docs").await.unwrap();
    assert_eq!(client.current_dir(), Some("/pub/docs"));
    client.cdup().await.unwrap();
    assert_eq!(client.current_dir(), Some("/pub"));

    client.mkdir("/pub/new").await.unwrap();
    client.rmdir("/pub/old").await.unwrap();
    let e = client.delete("/etc/passwd").await.unwrap_err();
    assert_eq!(e.kind(), FtpErrorKind::PermissionDenied);
    client.chmod("/pub/a.txt", 0o644).await.unwrap();
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn closed_control_drops_session() {
    let control = login_script().write(b"PWD\r\n").build();
    let mut client = connect(control, vec![], FtpClientConfig::default()).await;
    login(&mut client).await;

    let e = client.pwd().await.unwrap_err();
    assert_eq!(e.kind(), FtpErrorKind::Protocol);
    assert!(!client.is_connected());
    assert!(!client.is_logged_in());
}

#[tokio::test]
async fn list_with_mlsd() {
    let control = login_script()
        .write(b"PASV\r\n")
        .read(PASV_REPLY)
        .write(b"MLSD /pub\r\n")
        .read(b"150 Here comes the listing\r\n")
        .read(b"226 Transfer complete\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let data = Builder::new()
        .read(b"type=cdir;modify=20240101000000; .\r\n")
        .read(b"type=file;size=12;modify=20240115103000;unix.mode=0644; a.txt\r\n")
        .read(b"type=dir;modify=20240101000000; sub\r\n")
        .build();
    let mut client = connect(control, vec![data], FtpClientConfig::default()).await;
    login(&mut client).await;

    let entries = client.list_entries("/pub").await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].entry_type(), FtpEntryType::CurrentDir);
    assert_eq!(entries[1].name(), "a.txt");
    assert_eq!(entries[1].size(), Some(12));
    assert_eq!(entries[1].mode(), Some(0o644));
    assert!(entries[2].is_dir());

    assert_eq!(
        client.connection_provider().data_addrs,
        vec![FtpDataAddr::Passive(
            SocketAddr::from_str("192.0.2.1:1025").unwrap()
        )]
    );
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn list_dirs_with_unix_listing() {
    let control = anonymous_script()
        .write(b"PASV\r\n")
        .read(PASV_REPLY)
        .write(b"LIST /pub\r\n")
        .read(b"150 Here comes the listing\r\n")
        .read(b"226 Transfer complete\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let data = Builder::new()
        .read(b"drwxr-xr-x 2 ftp ftp 4096 Jan 15 2024 sub\r\n")
        .read(b"-rw-r--r-- 1 ftp ftp 12 Jan 15 2024 a.txt\r\n")
        .read(b"drwxr-xr-x 2 ftp ftp 4096 Jan 15 2024 docs\r\n")
        .build();
    let mut client = connect(control, vec![data], FtpClientConfig::default()).await;
    client.login(None, None).await.unwrap();

    let options = FtpListOptions {
        info: false,
        sort: Some(crate::listing::FtpSortKey::Name),
    };
    let dirs = client.list_dirs("/pub", &options).await.unwrap();
    assert_eq!(dirs.names(), vec!["docs", "sub"]);
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn epsv_fallback_and_nlst_fallback() {
    let control = login_script()
        .write(b"EPSV\r\n")
        .read(b"502 Command not implemented\r\n")
        .write(b"PASV\r\n")
        .read(PASV_REPLY)
        .write(b"NLST /\r\n")
        .read(b"150 Here comes the listing\r\n")
        .read(b"226 Transfer complete\r\n")
        .write(b"PASV\r\n")
        .read(PASV_REPLY)
        .write(b"NLST /empty\r\n")
        .read(b"550 No files found\r\n")
        .write(b"PASV\r\n")
        .read(PASV_REPLY)
        .write(b"MLSD /empty\r\n")
        .read(b"150 Here comes the listing\r\n")
        .read(b"226 Transfer complete\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let nlst = Builder::new().read(b"a.txt\r\n/pub/b.txt\r\n.\r\n").build();
    let refused = Builder::new().build();
    let mlsd = Builder::new()
        .read(b"type=cdir; .\r\ntype=pdir; ..\r\ntype=file;size=1; c.txt\r\n")
        .build();

    let config = FtpClientConfig {
        always_try_epsv: true,
        ..Default::default()
    };
    let mut client = connect(control, vec![nlst, refused, mlsd], config).await;
    login(&mut client).await;

    let names = client.list_names("/", false).await.unwrap();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    let names = client.list_names("/empty", false).await.unwrap();
    assert_eq!(names, vec!["c.txt"]);
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn write_then_read() {
    let control = login_script()
        .write(b"TYPE I\r\n")
        .read(b"200 Switching to Binary mode\r\n")
        .write(b"PASV\r\n")
        .read(PASV_REPLY)
        .write(b"STOR /f.bin\r\n")
        .read(b"150 Ok to send data\r\n")
        .read(b"226 Transfer complete\r\n")
        .write(b"PASV\r\n")
        .read(PASV_REPLY)
        .write(b"RETR /f.bin\r\n")
        .read(b"150 Opening BINARY mode data connection\r\n")
        .read(b"226 Transfer complete\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let upload = Builder::new().write(b"\x00\x01binary\xff").build();
    let download = Builder::new().read(b"\x00\x01binary\xff").build();
    let mut client = connect(control, vec![upload, download], FtpClientConfig::default()).await;
    login(&mut client).await;

    let content = b"\x00\x01binary\xff";
    client.write("/f.bin", content).await.unwrap();
    assert_eq!(client.read("/f.bin").await.unwrap(), content);
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn active_mode_unsupported() {
    let control = login_script()
        .write(b"TYPE I\r\n")
        .read(b"200 Switching to Binary mode\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let config = FtpClientConfig {
        passive: false,
        ..Default::default()
    };
    let mut client = connect(control, vec![], config).await;
    login(&mut client).await;

    let e = client.read("/f.bin").await.unwrap_err();
    assert!(matches!(
        e,
        FtpError::Transfer(FtpTransferError::SetupFailed(
            FtpTransferSetupError::ActiveModeUnsupported
        ))
    ));
    assert!(client.is_logged_in());
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn stat_with_mlst() {
    let control = login_script()
        .write(b"MLST /pub/a.txt\r\n")
        .read(b"250-Listing /pub/a.txt\r\n type=file;size=12;modify=20240115103000; /pub/a.txt\r\n250 End\r\n")
        .write(b"MLST /pub/a.txt\r\n")
        .read(b"250-Listing /pub/a.txt\r\n type=file;size=12;modify=20240115103000; /pub/a.txt\r\n250 End\r\n")
        .write(b"MLST /pub/none\r\n")
        .read(b"550 No such file or directory\r\n")
        .write(b"MLST /pub/b.txt\r\n")
        .read(b"502 Command not implemented\r\n")
        .write(b"PASV\r\n")
        .read(PASV_REPLY)
        .write(b"MLSD /pub\r\n")
        .read(b"150 Here comes the listing\r\n")
        .read(b"226 Transfer complete\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let listing = Builder::new()
        .read(b"type=file;size=12; a.txt\r\n")
        .build();
    let mut client = connect(control, vec![listing], FtpClientConfig::default()).await;
    login(&mut client).await;

    let entry = client.stat("/pub/a.txt").await.unwrap();
    assert_eq!(entry.entry_type(), FtpEntryType::File);
    assert_eq!(entry.basename(), "a.txt");
    assert_eq!(client.filesize("/pub/a.txt").await.unwrap(), Some(12));

    let e = client.stat("/pub/none").await.unwrap_err();
    assert!(e.is_not_found());
    let e = client.stat("/pub/b.txt").await.unwrap_err();
    assert!(e.is_not_found());
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn stat_by_parent_listing() {
    let control = anonymous_script()
        .write(b"PASV\r\n")
        .read(PASV_REPLY)
        .write(b"LIST /pub\r\n")
        .read(b"150 Here comes the listing\r\n")
        .read(b"226 Transfer complete\r\n")
        .write(b"PASV\r\n")
        .read(PASV_REPLY)
        .write(b"LIST /pub\r\n")
        .read(b"150 Here comes the listing\r\n")
        .read(b"226 Transfer complete\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let listing: &[u8] = b"drwxr-xr-x 2 ftp ftp 4096 Jan 15 2024 sub\r\n\
        -rwxr-x--- 1 ftp ftp 12 Jan 15 2024 run.sh\r\n";
    let first = Builder::new().read(listing).build();
    let second = Builder::new().read(listing).build();
    let mut client = connect(control, vec![first, second], FtpClientConfig::default()).await;
    client.login(None, None).await.unwrap();

    let entry = client.stat("/pub/run.sh").await.unwrap();
    assert_eq!(entry.size(), Some(12));
    assert_eq!(entry.mode(), Some(0o750));
    assert!(!client.is_dir("/pub/missing").await.unwrap());
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn failed_download_removes_local_file() {
    let control = login_script()
        .write(b"TYPE I\r\n")
        .read(b"200 Switching to Binary mode\r\n")
        .write(b"PASV\r\n")
        .read(PASV_REPLY)
        .write(b"RETR /missing\r\n")
        .read(b"550 Failed to open file\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let refused = Builder::new().build();
    let mut client = connect(control, vec![refused], FtpClientConfig::default()).await;
    login(&mut client).await;

    let local = std::env::temp_dir().join(format!("ufc-ftp-download-{}", std::process::id()));
    let e = client.download("/missing", &local).await.unwrap_err();
    assert!(e.is_not_found());
    assert!(!local.exists());
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn malformed_pasv_reply() {
    let control = login_script()
        .write(b"TYPE I\r\n")
        .read(b"200 Switching to Binary mode\r\n")
        .write(b"PASV\r\n")
        .read(b"227 Entering Passive Mode (192,0,2,1,4)\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 Goodbye\r\n")
        .build();
    let mut client = connect(control, vec![], FtpClientConfig::default()).await;
    login(&mut client).await;

    let e = client.read("/f.bin").await.unwrap_err();
    assert_eq!(e.kind(), FtpErrorKind::Protocol);
    assert!(matches!(
        e,
        FtpError::Protocol(FtpCommandError::InvalidReplySyntax(FtpCommand::PASV, 227))
    ));
    assert!(client.provider.data_addrs.is_empty());
    assert!(client.is_logged_in());
    client.disconnect().await.unwrap();
}

fn control_channel(stream: Mock) -> FtpControlChannel<Mock> {
    FtpControlChannel::new(stream, FtpControlConfig::default())
}

#[tokio::test]
async fn auth_tls_fallback() {
    let stream = Builder::new()
        .write(b"AUTH TLS\r\n")
        .read(b"234 Proceed with negotiation\r\n")
        .build();
    request_tls(&mut control_channel(stream)).await.unwrap();

    let stream = Builder::new()
        .write(b"AUTH TLS\r\n")
        .read(b"502 Command not implemented\r\n")
        .write(b"AUTH SSL\r\n")
        .read(b"234 Proceed with negotiation\r\n")
        .build();
    request_tls(&mut control_channel(stream)).await.unwrap();

    let stream = Builder::new()
        .write(b"AUTH TLS\r\n")
        .read(b"504 Unknown security mechanism\r\n")
        .write(b"AUTH SSL\r\n")
        .read(b"504 Unknown security mechanism\r\n")
        .build();
    let e = request_tls(&mut control_channel(stream)).await.unwrap_err();
    assert!(matches!(
        e,
        FtpConnectError::TlsNotSupported(FtpCommandError::ParameterNotImplemented(
            FtpCommand::AUTH_SSL
        ))
    ));

    let stream = Builder::new()
        .write(b"AUTH TLS\r\n")
        .read(b"421 Service not available\r\n")
        .build();
    let e = request_tls(&mut control_channel(stream)).await.unwrap_err();
    assert!(matches!(e, FtpConnectError::ServiceNotAvailable));
}

#[tokio::test]
async fn tls_refused_at_connect() {
    let control = Builder::new()
        .read(b"220 Welcome\r\n")
        .write(b"FEAT\r\n")
        .read(b"502 Command not implemented\r\n")
        .write(b"AUTH TLS\r\n")
        .read(b"502 Command not implemented\r\n")
        .write(b"AUTH SSL\r\n")
        .read(b"502 Command not implemented\r\n")
        .build();
    let r = FtpClient::connect(server(), MockProvider::new(control, vec![]), ftps_config()).await;
    match r {
        Err(e) => {
            assert_eq!(e.kind(), FtpErrorKind::Connect);
            assert!(matches!(e, FtpError::Connect(FtpConnectError::TlsNotSupported(_))));
        }
        Ok(_) => panic!("connect should fail"),
    }
}

fn ftps_config() -> FtpClientConfig {
    FtpClientConfig {
        tls: Some(FtpTlsConfig {
            accept_invalid_certs: true,
            no_default_ca_certs: true,
            ..Default::default()
        }),
        ..Default::default()
    }
}

struct DuplexProvider {
    control: Option<DuplexStream>,
    data: VecDeque<DuplexStream>,
}

#[async_trait]
impl FtpConnectionProvider for DuplexProvider {
    type Stream = DuplexStream;

    async fn new_control_connection(
        &mut self,
        _server: &FtpServerAddr,
    ) -> io::Result<DuplexStream> {
        self.control
            .take()
            .ok_or_else(|| io::Error::other("control connection already opened"))
    }

    async fn new_data_connection(
        &mut self,
        _data_addr: &FtpDataAddr,
    ) -> io::Result<DuplexStream> {
        self.data
            .pop_front()
            .ok_or_else(|| io::Error::other("no more data connection"))
    }
}

fn tls_acceptor() -> TlsAcceptor {
    let certified =
        rcgen::generate_simple_self_signed(vec!["ftp.example.com".to_string()]).unwrap();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(certified.key_pair.serialize_der()));
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![certified.cert.der().clone()], key)
        .unwrap();
    TlsAcceptor::from(Arc::new(config))
}

/// Server side of a control connection, driven line by line.
struct ServerControl<S> {
    stream: BufReader<S>,
}

impl<S> ServerControl<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn new(stream: S) -> Self {
        ServerControl {
            stream: BufReader::new(stream),
        }
    }

    fn into_inner(self) -> S {
        self.stream.into_inner()
    }

    async fn reply(&mut self, reply: &str) {
        let stream = self.stream.get_mut();
        stream.write_all(reply.as_bytes()).await.unwrap();
        stream.write_all(b"\r\n").await.unwrap();
        stream.flush().await.unwrap();
    }

    async fn exchange(&mut self, cmd: &str, reply: &str) {
        let mut line = String::new();
        self.stream.read_line(&mut line).await.unwrap();
        assert_eq!(line.trim_end(), cmd);
        self.reply(reply).await;
    }
}

/// Greeting, `AUTH TLS`, a login on the tls control channel and the passive
/// setup of the first transfer.
async fn accept_ftps_login(
    control: DuplexStream,
    acceptor: &TlsAcceptor,
) -> ServerControl<tokio_rustls::server::TlsStream<DuplexStream>> {
    let mut plain = ServerControl::new(control);
    plain.reply("220 Welcome").await;
    plain
        .exchange("FEAT", "211-Features:\r\n AUTH TLS\r\n PBSZ\r\n PROT\r\n211 End")
        .await;
    plain.exchange("AUTH TLS", "234 Proceed with negotiation").await;
    let stream = acceptor.accept(plain.into_inner()).await.unwrap();

    let mut control = ServerControl::new(stream);
    control.exchange("USER alice", "331 Password required").await;
    control.exchange("PASS secret", "230 Logged in").await;
    control.exchange("PBSZ 0", "200 PBSZ=0").await;
    control.exchange("PROT P", "200 Protection level set to P").await;
    control.exchange("TYPE I", "200 Switching to Binary mode").await;
    control
        .exchange("PASV", "227 Entering Passive Mode (192,0,2,1,4,1)")
        .await;
    control
}

async fn connect_ftps(control: DuplexStream, data: DuplexStream) -> FtpClient<DuplexProvider> {
    let provider = DuplexProvider {
        control: Some(control),
        data: VecDeque::from([data]),
    };
    let mut client = FtpClient::connect(server(), provider, ftps_config())
        .await
        .unwrap();
    assert!(client.is_secure());

    let user = FtpUsername::from_original("alice").unwrap();
    let pass = FtpPassword::from_original("secret").unwrap();
    client.login(Some(&user), Some(&pass)).await.unwrap();
    assert!(client.is_data_protected());
    client
}

#[tokio::test]
async fn ftps_protected_download() {
    let (control, server_control) = tokio::io::duplex(16 * 1024);
    let (data, server_data) = tokio::io::duplex(16 * 1024);

    let server = tokio::spawn(async move {
        let acceptor = tls_acceptor();
        let mut control = accept_ftps_login(server_control, &acceptor).await;
        control
            .exchange("RETR /secret.txt", "150 Opening BINARY mode data connection")
            .await;
        let mut data = acceptor.accept(server_data).await.unwrap();
        data.write_all(b"protected content").await.unwrap();
        data.shutdown().await.unwrap();
        control.reply("226 Transfer complete").await;
        control.exchange("QUIT", "221 Goodbye").await;
    });

    let mut client = connect_ftps(control, data).await;
    assert_eq!(client.read("/secret.txt").await.unwrap(), b"protected content");
    client.disconnect().await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn ftps_data_handshake_failure() {
    let (control, server_control) = tokio::io::duplex(16 * 1024);
    let (data, server_data) = tokio::io::duplex(16 * 1024);

    let server = tokio::spawn(async move {
        let acceptor = tls_acceptor();
        let mut control = accept_ftps_login(server_control, &acceptor).await;
        control
            .exchange("RETR /secret.txt", "150 Opening BINARY mode data connection")
            .await;
        drop(server_data);
        control.reply("426 Connection closed; transfer aborted").await;
        control.exchange("QUIT", "221 Goodbye").await;
    });

    let mut client = connect_ftps(control, data).await;
    let e = client.read("/secret.txt").await.unwrap_err();
    assert!(matches!(
        e,
        FtpError::Transfer(FtpTransferError::SetupFailed(
            FtpTransferSetupError::TlsHandshakeFailed(_)
        ))
    ));
    // the pending reply has been drained
    assert!(client.is_logged_in());
    client.disconnect().await.unwrap();
    server.await.unwrap();
}
