/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use clap::{Arg, ArgMatches, Command, value_parser};
use tokio::io::AsyncWriteExt;

use ufc_ftp_client::{RemoteFileClient, path};

pub(super) const COMMAND: &str = "get";

const COMMAND_ARG_REMOTE: &str = "remote";
const COMMAND_ARG_LOCAL: &str = "local";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Download file")
        .arg(
            Arg::new(COMMAND_ARG_REMOTE)
                .value_name("REMOTE PATH")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_LOCAL)
                .help("Local file path, '-' for stdout")
                .value_name("LOCAL PATH")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
}

pub(super) async fn run<C>(client: &mut C, args: &ArgMatches) -> anyhow::Result<()>
where
    C: RemoteFileClient,
{
    let remote = args
        .get_one::<String>(COMMAND_ARG_REMOTE)
        .map(|s| s.as_str())
        .unwrap_or_default();

    let local = match args.get_one::<PathBuf>(COMMAND_ARG_LOCAL) {
        Some(p) => p.clone(),
        None => PathBuf::from(path::basename(remote)),
    };

    if local.as_os_str() == "-" {
        let content = client.read(remote).await?;
        let mut stdout = tokio::io::stdout();
        stdout.write_all(&content).await?;
        stdout.flush().await?;
    } else {
        let size = client.download(remote, &local).await?;
        log::info!("saved {size} bytes to {}", local.display());
    }

    Ok(())
}
