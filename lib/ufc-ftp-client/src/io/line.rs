/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::AsyncBufRead;

pub(crate) trait LimitedBufReadExt: AsyncBufRead {
    /// Read until `delimiter` (included) or until `max_len` bytes have been read.
    ///
    /// Returns whether the delimiter was found, and the number of bytes read.
    /// `(false, 0)` means eof.
    fn limited_read_until<'a>(
        &'a mut self,
        delimiter: u8,
        max_len: usize,
        buf: &'a mut Vec<u8>,
    ) -> LimitedReadUntil<'a, Self>
    where
        Self: Unpin,
    {
        LimitedReadUntil {
            reader: self,
            delimiter,
            max_len,
            buf,
            read: 0,
        }
    }

    /// Wait until there is data in the read buffer, without consuming it.
    ///
    /// Returns false on eof. This is cancel safe.
    fn fill_wait_data(&mut self) -> FillWaitData<'_, Self>
    where
        Self: Unpin,
    {
        FillWaitData { reader: self }
    }
}

impl<R: AsyncBufRead + ?Sized> LimitedBufReadExt for R {}

pub(crate) struct LimitedReadUntil<'a, R: ?Sized> {
    reader: &'a mut R,
    delimiter: u8,
    max_len: usize,
    buf: &'a mut Vec<u8>,
    read: usize,
}

impl<R: AsyncBufRead + ?Sized + Unpin> Future for LimitedReadUntil<'_, R> {
    type Output = io::Result<(bool, usize)>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let me = &mut *self;
        loop {
            if me.read >= me.max_len {
                return Poll::Ready(Ok((false, me.read)));
            }

            let (found, used) = {
                let available = ready!(Pin::new(&mut *me.reader).poll_fill_buf(cx))?;
                if available.is_empty() {
                    return Poll::Ready(Ok((false, me.read)));
                }
                let left = me.max_len - me.read;
                let check = &available[..available.len().min(left)];
                match memchr::memchr(me.delimiter, check) {
                    Some(i) => {
                        me.buf.extend_from_slice(&check[..=i]);
                        (true, i + 1)
                    }
                    None => {
                        me.buf.extend_from_slice(check);
                        (false, check.len())
                    }
                }
            };
            Pin::new(&mut *me.reader).consume(used);
            me.read += used;
            if found {
                return Poll::Ready(Ok((true, me.read)));
            }
        }
    }
}

pub(crate) struct FillWaitData<'a, R: ?Sized> {
    reader: &'a mut R,
}

impl<R: AsyncBufRead + ?Sized + Unpin> Future for FillWaitData<'_, R> {
    type Output = io::Result<bool>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let buf = ready!(Pin::new(&mut *self.reader).poll_fill_buf(cx))?;
        Poll::Ready(Ok(!buf.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn read_lines() {
        let stream = Builder::new().read(b"line 1\r\nline").read(b" 2\n").build();
        let mut reader = BufReader::new(stream);

        let mut buf = Vec::new();
        let (found, len) = reader.limited_read_until(b'\n', 64, &mut buf).await.unwrap();
        assert!(found);
        assert_eq!(len, 8);
        assert_eq!(buf, b"line 1\r\n");

        buf.clear();
        let (found, len) = reader.limited_read_until(b'\n', 64, &mut buf).await.unwrap();
        assert!(found);
        assert_eq!(len, 7);
        assert_eq!(buf, b"line 2\n");

        buf.clear();
        let (found, len) = reader.limited_read_until(b'\n', 64, &mut buf).await.unwrap();
        assert!(!found);
        assert_eq!(len, 0);
    }

    #[tokio::test]
    async fn read_limited() {
        let stream = Builder::new().read(b"0123456789\n").build();
        let mut reader = BufReader::new(stream);

        let mut buf = Vec::new();
        let (found, len) = reader.limited_read_until(b'\n', 4, &mut buf).await.unwrap();
        assert!(!found);
        assert_eq!(len, 4);
        assert_eq!(buf, b"0123");

        buf.clear();
        let (found, len) = reader.limited_read_until(b'\n', 64, &mut buf).await.unwrap();
        assert!(found);
        assert_eq!(len, 7);
    }

    #[tokio::test]
    async fn wait_data() {
        let stream = Builder::new().read(b"226 OK\r\n").build();
        let mut reader = BufReader::new(stream);
        assert!(reader.fill_wait_data().await.unwrap());
        // data is still there
        let mut buf = Vec::new();
        let (found, _) = reader.limited_read_until(b'\n', 64, &mut buf).await.unwrap();
        assert!(found);
        assert!(!reader.fill_wait_data().await.unwrap());
    }
}
