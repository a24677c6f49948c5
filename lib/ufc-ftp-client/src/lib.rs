/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod addr;
pub use addr::{FTP_DEFAULT_PORT, FtpAddrParseError, FtpDataAddr, FtpHost, FtpServerAddr};

mod auth;
pub use auth::{FtpCredentialError, FtpPassword, FtpUsername};

mod config;
pub use config::{FtpClientConfig, FtpControlConfig, FtpTlsConfig, FtpTransferConfig};

mod connection;
pub use connection::{FtpConnectionProvider, TcpConnectionProvider};

mod control;
pub use control::{FtpCommand, FtpReply};

mod debug;
pub use debug::{FTP_DEBUG_LOG_LEVEL, FTP_DEBUG_LOG_TARGET};

mod error;
pub use error::{
    FtpCommandError, FtpConnectError, FtpError, FtpErrorKind, FtpLineDataReadError,
    FtpRawResponseError, FtpSessionOpenError, FtpTransferError, FtpTransferServerError,
    FtpTransferSetupError,
};

mod feature;
pub use feature::FtpServerFeature;

mod io;
pub use io::{FtpStream, FtpTlsContext};

mod listing;
pub use listing::{
    FtpDirEntry, FtpEntryFilter, FtpEntryType, FtpListFormat, FtpListOptions, FtpListOutput,
    FtpListParser, FtpSortKey, FtpSortKeyParseError, select_entries, sort_entries,
};

pub mod path;

mod transfer;
pub use transfer::FtpLineDataReceiver;

mod client;
pub use client::FtpClient;

mod capability;
pub use capability::RemoteFileClient;
