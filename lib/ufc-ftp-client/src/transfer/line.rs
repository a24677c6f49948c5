/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use async_trait::async_trait;
use tokio::io::{AsyncRead, BufReader};

use crate::config::FtpTransferConfig;
use crate::error::FtpLineDataReadError;
use crate::io::LimitedBufReadExt;

/// Consumer of the lines of a listing, called as they arrive.
#[async_trait]
pub trait FtpLineDataReceiver {
    async fn recv_line(&mut self, line: &str);
    fn should_return_early(&self) -> bool;
}

/// Collects the listing lines in memory.
#[derive(Default)]
pub(crate) struct FtpLineCollector {
    lines: Vec<String>,
}

impl FtpLineCollector {
    pub(crate) fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

#[async_trait]
impl FtpLineDataReceiver for FtpLineCollector {
    async fn recv_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn should_return_early(&self) -> bool {
        false
    }
}

pub(crate) struct FtpLineDataTransfer<T: AsyncRead> {
    io: BufReader<T>,
    max_lines: usize,
    max_line_len: usize,
    line_buf: Vec<u8>,
}

impl<T> FtpLineDataTransfer<T>
where
    T: AsyncRead + Unpin,
{
    pub(crate) fn new(io: T, config: &FtpTransferConfig) -> Self {
        FtpLineDataTransfer {
            io: BufReader::new(io),
            max_lines: config.list_max_entries,
            max_line_len: config.list_max_line_len,
            line_buf: Vec::with_capacity(config.list_max_line_len),
        }
    }

    async fn send_buf_to_receiver<R>(&mut self, receiver: &mut R) -> Result<(), FtpLineDataReadError>
    where
        R: FtpLineDataReceiver + ?Sized,
    {
        let s = std::str::from_utf8(&self.line_buf)
            .map_err(|_| FtpLineDataReadError::UnsupportedEncoding)?;
        let s = s.trim_end_matches(['\r', '\n']);
        if !s.is_empty() {
            receiver.recv_line(s).await;
        }
        self.line_buf.clear();
        if receiver.should_return_early() {
            return Err(FtpLineDataReadError::AbortedByCallback);
        }
        Ok(())
    }

    pub(crate) async fn read_to_end<R>(&mut self, receiver: &mut R) -> Result<(), FtpLineDataReadError>
    where
        R: FtpLineDataReceiver + ?Sized,
    {
        for i in 0..self.max_lines {
            let (found, nr) = self
                .io
                .limited_read_until(b'\n', self.max_line_len, &mut self.line_buf)
                .await?;
            if nr == 0 {
                return Ok(());
            }

            if !found {
                if nr >= self.max_line_len {
                    return Err(FtpLineDataReadError::LineTooLong(i + 1));
                }
                // the last line may have no line break
                self.send_buf_to_receiver(receiver).await?;
                return Ok(());
            }

            self.send_buf_to_receiver(receiver).await?;
        }

        Err(FtpLineDataReadError::TooManyLines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn collect_lines() {
        let stream = Builder::new()
            .read(b"a.txt\r\nb.t")
            .read(b"xt\r\n\r\nc.txt")
            .build();
        let mut transfer = FtpLineDataTransfer::new(stream, &FtpTransferConfig::default());
        let mut collector = FtpLineCollector::default();
        transfer.read_to_end(&mut collector).await.unwrap();
        assert_eq!(collector.into_lines(), vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[tokio::test]
    async fn too_many_lines() {
        let stream = Builder::new().read(b"a\r\nb\r\nc\r\n").build();
        let config = FtpTransferConfig {
            list_max_entries: 2,
            ..Default::default()
        };
        let mut transfer = FtpLineDataTransfer::new(stream, &config);
        let mut collector = FtpLineCollector::default();
        let r = transfer.read_to_end(&mut collector).await.unwrap_err();
        assert!(matches!(r, FtpLineDataReadError::TooManyLines));
    }

    #[tokio::test]
    async fn line_too_long() {
        let stream = Builder::new().read(b"0123456789abcdef\r\n").build();
        let config = FtpTransferConfig {
            list_max_line_len: 8,
            ..Default::default()
        };
        let mut transfer = FtpLineDataTransfer::new(stream, &config);
        let mut collector = FtpLineCollector::default();
        let r = transfer.read_to_end(&mut collector).await.unwrap_err();
        assert!(matches!(r, FtpLineDataReadError::LineTooLong(1)));
    }

    struct FirstOnly(Option<String>);

    #[async_trait]
    impl FtpLineDataReceiver for FirstOnly {
        async fn recv_line(&mut self, line: &str) {
            self.0 = Some(line.to_string());
        }

        fn should_return_early(&self) -> bool {
            self.0.is_some()
        }
    }

    #[tokio::test]
    async fn abort_by_receiver() {
        let stream = Builder::new().read(b"a\r\nb\r\n").build();
        let mut transfer = FtpLineDataTransfer::new(stream, &FtpTransferConfig::default());
        let mut receiver = FirstOnly(None);
        let r = transfer.read_to_end(&mut receiver).await.unwrap_err();
        assert!(matches!(r, FtpLineDataReadError::AbortedByCallback));
        assert_eq!(receiver.0.as_deref(), Some("a"));
    }
}
