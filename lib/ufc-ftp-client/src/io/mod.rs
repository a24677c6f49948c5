/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod line;
pub(crate) use line::LimitedBufReadExt;

mod stream;
pub use stream::FtpStream;

mod tls;
pub use tls::FtpTlsContext;
