/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "yaml")]
mod yaml;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FtpControlConfig {
    pub max_line_len: usize,
    pub max_multi_lines: usize,
    pub command_timeout: Duration,
}

impl Default for FtpControlConfig {
    fn default() -> Self {
        FtpControlConfig {
            max_line_len: 2048,
            max_multi_lines: 128,
            command_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FtpTransferConfig {
    pub list_max_line_len: usize,
    pub list_max_entries: usize,
    pub(crate) list_all_timeout: Duration,
    pub end_wait_timeout: Duration,
    pub data_connect_timeout: Duration,
    pub data_idle_timeout: Duration,
    pub read_buffer_size: usize,
}

impl Default for FtpTransferConfig {
    fn default() -> Self {
        FtpTransferConfig {
            list_max_line_len: 2048,
            list_max_entries: 1024,
            list_all_timeout: Duration::from_secs(120),
            end_wait_timeout: Duration::from_secs(2),
            data_connect_timeout: Duration::from_secs(30),
            data_idle_timeout: Duration::from_secs(60),
            read_buffer_size: 16 * 1024,
        }
    }
}

impl FtpTransferConfig {
    #[inline]
    pub fn list_all_timeout(&self) -> Duration {
        self.list_all_timeout
    }

    /// A listing must be allowed to last at least as long as the end reply wait.
    pub fn set_list_all_timeout(&mut self, timeout: Duration) {
        self.list_all_timeout = timeout.max(self.end_wait_timeout);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FtpTlsConfig {
    /// Skip server certificate verification. Handshake signatures are still checked.
    pub accept_invalid_certs: bool,
    pub no_default_ca_certs: bool,
    pub ca_cert_file: Option<PathBuf>,
    /// Name used for SNI and certificate verification, the server host by default.
    pub server_name: Option<String>,
    pub handshake_timeout: Duration,
}

impl Default for FtpTlsConfig {
    fn default() -> Self {
        FtpTlsConfig {
            accept_invalid_certs: false,
            no_default_ca_certs: false,
            ca_cert_file: None,
            server_name: None,
            handshake_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FtpClientConfig {
    pub control: FtpControlConfig,
    pub transfer: FtpTransferConfig,
    pub connect_timeout: Duration,
    pub greeting_timeout: Duration,
    pub always_try_epsv: bool,
    pub passive: bool,
    /// Upgrade the control channel with `AUTH TLS` right after the greeting.
    pub tls: Option<FtpTlsConfig>,
}

impl Default for FtpClientConfig {
    fn default() -> Self {
        FtpClientConfig {
            control: FtpControlConfig::default(),
            transfer: FtpTransferConfig::default(),
            connect_timeout: Duration::from_secs(30),
            greeting_timeout: Duration::from_secs(10),
            always_try_epsv: false,
            passive: true,
            tls: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_all_timeout_floor() {
        let mut config = FtpTransferConfig::default();
        config.set_list_all_timeout(Duration::from_millis(100));
        assert_eq!(config.list_all_timeout(), config.end_wait_timeout);

        config.set_list_all_timeout(Duration::from_secs(300));
        assert_eq!(config.list_all_timeout(), Duration::from_secs(300));
    }
}
