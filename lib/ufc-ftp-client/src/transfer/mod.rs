/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::FtpTransferConfig;
use crate::control::{FtpCommand, FtpControlChannel};
use crate::error::FtpTransferError;

mod line;
pub use line::FtpLineDataReceiver;
pub(crate) use line::{FtpLineCollector, FtpLineDataTransfer};

/// Copy the data channel to `writer` until eof.
async fn copy_from_data<R, W>(
    data: &mut R,
    writer: &mut W,
    buf_size: usize,
    idle_timeout: Duration,
) -> Result<u64, FtpTransferError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; buf_size.max(512)];
    let mut total = 0u64;
    loop {
        let nr = match tokio::time::timeout(idle_timeout, data.read(&mut buf)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(FtpTransferError::DataReadFailed(e)),
            Err(_) => return Err(FtpTransferError::DataIdleTimedOut),
        };
        if nr == 0 {
            writer
                .flush()
                .await
                .map_err(FtpTransferError::LocalIoFailed)?;
            return Ok(total);
        }
        writer
            .write_all(&buf[..nr])
            .await
            .map_err(FtpTransferError::LocalIoFailed)?;
        total += nr as u64;
    }
}

/// Copy `reader` to the data channel, then shut the data channel down.
async fn copy_to_data<R, W>(
    reader: &mut R,
    data: &mut W,
    buf_size: usize,
    idle_timeout: Duration,
) -> Result<u64, FtpTransferError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; buf_size.max(512)];
    let mut total = 0u64;
    loop {
        let nr = reader
            .read(&mut buf)
            .await
            .map_err(FtpTransferError::LocalIoFailed)?;
        if nr == 0 {
            break;
        }
        match tokio::time::timeout(idle_timeout, data.write_all(&buf[..nr])).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(FtpTransferError::DataWriteFailed(e)),
            Err(_) => return Err(FtpTransferError::DataIdleTimedOut),
        }
        total += nr as u64;
    }
    match tokio::time::timeout(idle_timeout, data.shutdown()).await {
        Ok(Ok(_)) => Ok(total),
        Ok(Err(e)) => Err(FtpTransferError::DataWriteFailed(e)),
        Err(_) => Err(FtpTransferError::DataIdleTimedOut),
    }
}

/// Drain the end reply left behind by a failed transfer.
pub(crate) async fn abandon<C>(
    control: &mut FtpControlChannel<C>,
    cmd: FtpCommand,
    e: FtpTransferError,
    end_wait_timeout: Duration,
) -> FtpTransferError
where
    C: AsyncRead + AsyncWrite + Unpin,
{
    if control.discard_reply(end_wait_timeout).await {
        e
    } else {
        crate::log_msg!("no end reply to {cmd} after transfer error: {e}");
        FtpTransferError::TimeoutToWaitEndReply
    }
}

/// Receive everything on the data channel, then the end reply of `cmd`.
///
/// The control channel is watched while reading. If the end reply arrives
/// first, the data left must arrive within `end_wait_timeout`.
pub(crate) async fn receive_data<C, D, W>(
    control: &mut FtpControlChannel<C>,
    cmd: FtpCommand,
    mut data: D,
    writer: &mut W,
    config: &FtpTransferConfig,
) -> Result<u64, FtpTransferError>
where
    C: AsyncRead + AsyncWrite + Unpin,
    D: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (r, end_pending) = {
        let data_copy = copy_from_data(
            &mut data,
            writer,
            config.read_buffer_size,
            config.data_idle_timeout,
        );
        tokio::pin!(data_copy);

        tokio::select! {
            biased;

            r = &mut data_copy => match r {
                Ok(size) => {
                    let r = control.wait_transfer_end(cmd).await;
                    (r.map(|_| size).map_err(FtpTransferError::from), false)
                }
                Err(e) => (Err(e), true),
            },
            r = control.wait_read_ready() => {
                if let Err(e) = r {
                    (Err(FtpTransferError::ControlReadError(e)), false)
                } else if let Err(e) = control.wait_transfer_end(cmd).await {
                    (Err(e.into()), false)
                } else {
                    match tokio::time::timeout(config.end_wait_timeout, &mut data_copy).await {
                        Ok(r) => (r, false),
                        Err(_) => (Err(FtpTransferError::TimeoutToWaitAllData), false),
                    }
                }
            }
        }
    };
    drop(data);

    match r {
        Err(e) if end_pending => Err(abandon(control, cmd, e, config.end_wait_timeout).await),
        r => r,
    }
}

async fn read_all_lines<C, D, R>(
    control: &mut FtpControlChannel<C>,
    cmd: FtpCommand,
    transfer: &mut FtpLineDataTransfer<D>,
    receiver: &mut R,
    end_wait_timeout: Duration,
) -> (Result<(), FtpTransferError>, bool)
where
    C: AsyncRead + AsyncWrite + Unpin,
    D: AsyncRead + Unpin,
    R: FtpLineDataReceiver + ?Sized,
{
    let list = transfer.read_to_end(receiver);
    tokio::pin!(list);

    tokio::select! {
        biased;

        r = &mut list => match r {
            Ok(_) => {
                let r = control.wait_transfer_end(cmd).await;
                (r.map_err(FtpTransferError::from), false)
            }
            Err(e) => (Err(e.into()), true),
        },
        r = control.wait_read_ready() => {
            if let Err(e) = r {
                (Err(FtpTransferError::ControlReadError(e)), false)
            } else if let Err(e) = control.wait_transfer_end(cmd).await {
                (Err(e.into()), false)
            } else {
                match tokio::time::timeout(end_wait_timeout, &mut list).await {
                    Ok(r) => (r.map_err(FtpTransferError::from), false),
                    Err(_) => (Err(FtpTransferError::TimeoutToWaitAllData), false),
                }
            }
        }
    }
}

/// Receive listing lines, bounded by `list_all_timeout` as a whole.
pub(crate) async fn receive_lines<C, D, R>(
    control: &mut FtpControlChannel<C>,
    cmd: FtpCommand,
    data: D,
    receiver: &mut R,
    config: &FtpTransferConfig,
) -> Result<(), FtpTransferError>
where
    C: AsyncRead + AsyncWrite + Unpin,
    D: AsyncRead + Unpin,
    R: FtpLineDataReceiver + ?Sized,
{
    let mut transfer = FtpLineDataTransfer::new(data, config);
    let (r, end_pending) = match tokio::time::timeout(
        config.list_all_timeout(),
        read_all_lines(control, cmd, &mut transfer, receiver, config.end_wait_timeout),
    )
    .await
    {
        Ok(r) => r,
        Err(_) => (Err(FtpTransferError::TimeoutToWaitAllData), true),
    };
    drop(transfer);

    match r {
        Err(e) if end_pending => Err(abandon(control, cmd, e, config.end_wait_timeout).await),
        r => r,
    }
}

/// Send everything from `reader`, close the data channel, then wait the end reply.
pub(crate) async fn send_data<C, D, R>(
    control: &mut FtpControlChannel<C>,
    cmd: FtpCommand,
    mut data: D,
    reader: &mut R,
    config: &FtpTransferConfig,
) -> Result<u64, FtpTransferError>
where
    C: AsyncRead + AsyncWrite + Unpin,
    D: AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    let r = copy_to_data(
        reader,
        &mut data,
        config.read_buffer_size,
        config.data_idle_timeout,
    )
    .await;
    drop(data);

    match r {
        Ok(size) => {
            control.wait_transfer_end(cmd).await?;
            Ok(size)
        }
        Err(e) => Err(abandon(control, cmd, e, config.end_wait_timeout).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FtpControlConfig;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn receive_then_end_reply() {
        let control = Builder::new().read(b"226 Transfer complete\r\n").build();
        let mut control = FtpControlChannel::new(control, FtpControlConfig::default());
        let data = Builder::new().read(b"hello ").read(b"world").build();

        let mut buf = Vec::new();
        let size = receive_data(
            &mut control,
            FtpCommand::RETR,
            data,
            &mut buf,
            &FtpTransferConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(size, 11);
        assert_eq!(buf, b"hello world");
    }

    #[tokio::test]
    async fn end_reply_before_eof() {
        let control = Builder::new().read(b"226 Transfer complete\r\n").build();
        let mut control = FtpControlChannel::new(control, FtpControlConfig::default());
        let data = Builder::new()
            .read(b"part1")
            .wait(Duration::from_millis(50))
            .read(b"part2")
            .build();

        let mut buf = Vec::new();
        let size = receive_data(
            &mut control,
            FtpCommand::RETR,
            data,
            &mut buf,
            &FtpTransferConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(size, 10);
        assert_eq!(buf, b"part1part2");
    }

    #[tokio::test]
    async fn server_abort() {
        let control = Builder::new().read(b"426 Transfer aborted\r\n").build();
        let mut control = FtpControlChannel::new(control, FtpControlConfig::default());
        let data = Builder::new().read(b"partial").build();

        let mut buf = Vec::new();
        let r = receive_data(
            &mut control,
            FtpCommand::RETR,
            data,
            &mut buf,
            &FtpTransferConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(r, FtpTransferError::ServerReportedError(_)));
    }

    #[tokio::test]
    async fn receive_listing() {
        let control = Builder::new().read(b"226 Directory send OK\r\n").build();
        let mut control = FtpControlChannel::new(control, FtpControlConfig::default());
        let data = Builder::new().read(b"a.txt\r\nb.txt\r\n").build();

        let mut collector = FtpLineCollector::default();
        receive_lines(
            &mut control,
            FtpCommand::NLST,
            data,
            &mut collector,
            &FtpTransferConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(collector.into_lines(), vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn send_then_end_reply() {
        let control = Builder::new().read(b"226 Transfer complete\r\n").build();
        let mut control = FtpControlChannel::new(control, FtpControlConfig::default());
        let data = Builder::new().write(b"payload").build();

        let mut reader: &[u8] = b"payload";
        let size = send_data(
            &mut control,
            FtpCommand::STOR,
            data,
            &mut reader,
            &FtpTransferConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(size, 7);
    }

    #[tokio::test]
    async fn drain_after_data_error() {
        let control = Builder::new().read(b"426 Connection closed\r\n").build();
        let mut control = FtpControlChannel::new(control, FtpControlConfig::default());
        let data = Builder::new()
            .read(b"abc")
            .read_error(std::io::Error::other("reset"))
            .build();

        let mut buf = Vec::new();
        let r = receive_data(
            &mut control,
            FtpCommand::RETR,
            data,
            &mut buf,
            &FtpTransferConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(r, FtpTransferError::DataReadFailed(_)));
    }
}
