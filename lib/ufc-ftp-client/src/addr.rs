/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

pub const FTP_DEFAULT_PORT: u16 = 21;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FtpAddrParseError {
    #[error("empty string")]
    Empty,
    #[error("invalid ipv6 ip in squared brackets")]
    InvalidIpv6,
    #[error("invalid port")]
    InvalidPort,
    #[error("invalid host")]
    InvalidHost,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum FtpHost {
    Ip(IpAddr),
    Domain(String),
}

impl fmt::Display for FtpHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtpHost::Ip(ip) => write!(f, "{ip}"),
            FtpHost::Domain(domain) => write!(f, "{domain}"),
        }
    }
}

impl FromStr for FtpHost {
    type Err = FtpAddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(FtpAddrParseError::Empty);
        }
        if let Some(v) = s.strip_prefix('[') {
            let v = v.strip_suffix(']').ok_or(FtpAddrParseError::InvalidIpv6)?;
            let ip6 = Ipv6Addr::from_str(v).map_err(|_| FtpAddrParseError::InvalidIpv6)?;
            return Ok(FtpHost::Ip(IpAddr::V6(ip6)));
        }
        if let Ok(ip) = IpAddr::from_str(s) {
            return Ok(FtpHost::Ip(ip));
        }
        if s.bytes()
            .any(|c| c.is_ascii_whitespace() || c.is_ascii_control() || c == b'/' || c == b'@')
        {
            return Err(FtpAddrParseError::InvalidHost);
        }
        Ok(FtpHost::Domain(s.to_ascii_lowercase()))
    }
}

/// Address of the control connection.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct FtpServerAddr {
    host: FtpHost,
    port: u16,
}

impl FtpServerAddr {
    pub fn new(host: FtpHost, port: u16) -> Self {
        FtpServerAddr { host, port }
    }

    #[inline]
    pub fn host(&self) -> &FtpHost {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// The host string used for tls server name.
    pub fn host_str(&self) -> String {
        self.host.to_string()
    }

    /// `EPSV` is used for ipv6 and localhost servers, `PASV` for the others.
    pub fn prefer_epsv(&self) -> bool {
        match &self.host {
            FtpHost::Ip(IpAddr::V6(_)) => true,
            FtpHost::Ip(IpAddr::V4(_)) => false,
            FtpHost::Domain(domain) => domain == "localhost",
        }
    }
}

impl fmt::Display for FtpServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            FtpHost::Ip(IpAddr::V6(ip6)) => write!(f, "[{ip6}]:{}", self.port),
            host => write!(f, "{host}:{}", self.port),
        }
    }
}

impl FromStr for FtpServerAddr {
    type Err = FtpAddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("ftp://").unwrap_or(s);
        let s = s.strip_prefix("ftps://").unwrap_or(s);
        let s = s.trim_end_matches('/');
        if s.is_empty() {
            return Err(FtpAddrParseError::Empty);
        }

        // bare ipv6 address, no port
        if let Ok(ip6) = Ipv6Addr::from_str(s) {
            return Ok(FtpServerAddr::new(
                FtpHost::Ip(IpAddr::V6(ip6)),
                FTP_DEFAULT_PORT,
            ));
        }

        let (host, port) = match s.rfind(':') {
            Some(p) if !s[p..].contains(']') => {
                let port = u16::from_str(&s[p + 1..]).map_err(|_| FtpAddrParseError::InvalidPort)?;
                (&s[..p], port)
            }
            _ => (s, FTP_DEFAULT_PORT),
        };
        if port == 0 {
            return Err(FtpAddrParseError::InvalidPort);
        }
        let host = FtpHost::from_str(host)?;
        Ok(FtpServerAddr::new(host, port))
    }
}

/// Where the data connection should go, as told by the server.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FtpDataAddr {
    /// Full address from a `227` reply to `PASV`.
    Passive(SocketAddr),
    /// Port only from a `229` reply to `EPSV`, the host is the control peer.
    ExtendedPassive(u16),
}

impl FtpDataAddr {
    #[inline]
    pub fn port(&self) -> u16 {
        match self {
            FtpDataAddr::Passive(addr) => addr.port(),
            FtpDataAddr::ExtendedPassive(port) => *port,
        }
    }

    /// Resolve against the control connection peer address.
    pub fn resolve(&self, control_peer: IpAddr, use_pasv_address: bool) -> SocketAddr {
        match self {
            FtpDataAddr::Passive(addr) => {
                if use_pasv_address && !addr.ip().is_unspecified() {
                    *addr
                } else {
                    SocketAddr::new(control_peer, addr.port())
                }
            }
            FtpDataAddr::ExtendedPassive(port) => SocketAddr::new(control_peer, *port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_server() {
        let addr = FtpServerAddr::from_str("ftp.example.net").unwrap();
        assert_eq!(addr.host(), &FtpHost::Domain("ftp.example.net".to_string()));
        assert_eq!(addr.port(), 21);
        assert!(!addr.prefer_epsv());

        let addr = FtpServerAddr::from_str("ftp://192.0.2.1:2121/").unwrap();
        assert_eq!(addr.host(), &FtpHost::Ip(IpAddr::from_str("192.0.2.1").unwrap()));
        assert_eq!(addr.port(), 2121);
        assert_eq!(addr.to_string(), "192.0.2.1:2121");

        let addr = FtpServerAddr::from_str("[2001:db8::1]:990").unwrap();
        assert_eq!(addr.port(), 990);
        assert!(addr.prefer_epsv());
        assert_eq!(addr.to_string(), "[2001:db8::1]:990");

        let addr = FtpServerAddr::from_str("2001:db8::1").unwrap();
        assert_eq!(addr.port(), 21);
        assert!(addr.prefer_epsv());

        let addr = FtpServerAddr::from_str("LOCALHOST").unwrap();
        assert!(addr.prefer_epsv());
    }

    #[test]
    fn parse_server_err() {
        assert_eq!(FtpServerAddr::from_str("").unwrap_err(), FtpAddrParseError::Empty);
        assert_eq!(
            FtpServerAddr::from_str("host:abc").unwrap_err(),
            FtpAddrParseError::InvalidPort
        );
        assert_eq!(
            FtpServerAddr::from_str("host:0").unwrap_err(),
            FtpAddrParseError::InvalidPort
        );
        assert_eq!(
            FtpServerAddr::from_str("[::1:21").unwrap_err(),
            FtpAddrParseError::InvalidIpv6
        );
        assert_eq!(
            FtpServerAddr::from_str("user@host").unwrap_err(),
            FtpAddrParseError::InvalidHost
        );
    }

    #[test]
    fn resolve_data_addr() {
        let peer = IpAddr::from_str("203.0.113.5").unwrap();

        let pasv = FtpDataAddr::Passive(SocketAddr::from_str("10.0.0.1:30016").unwrap());
        assert_eq!(pasv.resolve(peer, true).to_string(), "10.0.0.1:30016");
        assert_eq!(pasv.resolve(peer, false).to_string(), "203.0.113.5:30016");

        let pasv = FtpDataAddr::Passive(SocketAddr::from_str("0.0.0.0:30016").unwrap());
        assert_eq!(pasv.resolve(peer, true).to_string(), "203.0.113.5:30016");

        let epsv = FtpDataAddr::ExtendedPassive(20020);
        assert_eq!(epsv.resolve(peer, true).to_string(), "203.0.113.5:20020");
    }
}
