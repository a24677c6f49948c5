/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use log::Level;

pub const FTP_DEBUG_LOG_LEVEL: Level = Level::Debug;
pub const FTP_DEBUG_LOG_TARGET: &str = "ufc_ftp_client";

#[macro_export]
macro_rules! log_msg {
    ($($arg:tt)+) => (
        log::log!(target: $crate::FTP_DEBUG_LOG_TARGET, $crate::FTP_DEBUG_LOG_LEVEL, $($arg)+)
    )
}

#[cfg(feature = "log-raw-io")]
pub(crate) fn log_cmd(cmd: crate::control::FtpCommand, param: Option<&str>) {
    match param {
        Some(_) if cmd == crate::control::FtpCommand::PASS => {
            log::log!(target: FTP_DEBUG_LOG_TARGET, FTP_DEBUG_LOG_LEVEL, "> {cmd} ******")
        }
        Some(p) => log::log!(target: FTP_DEBUG_LOG_TARGET, FTP_DEBUG_LOG_LEVEL, "> {cmd} {p}"),
        None => log::log!(target: FTP_DEBUG_LOG_TARGET, FTP_DEBUG_LOG_LEVEL, "> {cmd}"),
    }
}

#[cfg(feature = "log-raw-io")]
#[inline]
pub(crate) fn log_rsp(rsp: &str) {
    log::log!(
        target: FTP_DEBUG_LOG_TARGET,
        FTP_DEBUG_LOG_LEVEL,
        "< {}",
        rsp.trim_end()
    );
}
