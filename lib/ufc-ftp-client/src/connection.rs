/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpSocket, TcpStream};

use crate::{FtpDataAddr, FtpServerAddr};

/// Opens the sockets a session needs.
///
/// Timeouts are applied by the caller.
#[async_trait]
pub trait FtpConnectionProvider {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    async fn new_control_connection(&mut self, server: &FtpServerAddr)
    -> io::Result<Self::Stream>;
    async fn new_data_connection(&mut self, data_addr: &FtpDataAddr) -> io::Result<Self::Stream>;
}

/// Plain tcp connections, optionally bound to a local ip.
pub struct TcpConnectionProvider {
    bind_ip: Option<IpAddr>,
    use_pasv_address: bool,
    remote_addr: Option<SocketAddr>,
}

impl Default for TcpConnectionProvider {
    fn default() -> Self {
        TcpConnectionProvider {
            bind_ip: None,
            use_pasv_address: true,
            remote_addr: None,
        }
    }
}

impl TcpConnectionProvider {
    pub fn set_bind_ip(&mut self, ip: IpAddr) {
        self.bind_ip = Some(ip);
    }

    /// Connect data channels to the control peer ip instead of the one in `227` replies.
    pub fn skip_pasv_address(&mut self) {
        self.use_pasv_address = false;
    }

    #[inline]
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    async fn connect_to(&self, addr: SocketAddr) -> io::Result<TcpStream> {
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        if let Some(ip) = self.bind_ip {
            socket.bind(SocketAddr::new(ip, 0))?;
        }
        let stream = socket.connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

#[async_trait]
impl FtpConnectionProvider for TcpConnectionProvider {
    type Stream = TcpStream;

    async fn new_control_connection(&mut self, server: &FtpServerAddr) -> io::Result<TcpStream> {
        let mut err = io::Error::new(io::ErrorKind::AddrNotAvailable, "no addr resolved");
        let target = (server.host_str(), server.port());
        for addr in tokio::net::lookup_host(target).await? {
            if let Some(ip) = self.bind_ip {
                if ip.is_ipv4() != addr.is_ipv4() {
                    continue;
                }
            }
            match self.connect_to(addr).await {
                Ok(stream) => {
                    self.remote_addr = Some(addr);
                    return Ok(stream);
                }
                Err(e) => err = e,
            }
        }

        Err(err)
    }

    async fn new_data_connection(&mut self, data_addr: &FtpDataAddr) -> io::Result<TcpStream> {
        match self.remote_addr {
            Some(addr) => {
                let data_addr = data_addr.resolve(addr.ip(), self.use_pasv_address);
                self.connect_to(data_addr).await
            }
            None => Err(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no resolved upstream addr found",
            )),
        }
    }
}
