/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command, value_parser};
use tokio::io::AsyncReadExt;

use ufc_ftp_client::RemoteFileClient;

pub(super) const COMMAND: &str = "put";

const COMMAND_ARG_LOCAL: &str = "local";
const COMMAND_ARG_REMOTE: &str = "remote";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Upload file")
        .arg(
            Arg::new(COMMAND_ARG_LOCAL)
                .help("Local file path, '-' for stdin")
                .value_name("LOCAL PATH")
                .value_parser(value_parser!(PathBuf))
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_REMOTE)
                .value_name("REMOTE PATH")
                .num_args(1),
        )
}

pub(super) async fn run<C>(client: &mut C, args: &ArgMatches) -> anyhow::Result<()>
where
    C: RemoteFileClient,
{
    let Some(local) = args.get_one::<PathBuf>(COMMAND_ARG_LOCAL) else {
        return Err(anyhow!("no local path set"));
    };

    let from_stdin = local.as_os_str() == "-";
    let remote = match args.get_one::<String>(COMMAND_ARG_REMOTE) {
        Some(s) => s.clone(),
        None if from_stdin => return Err(anyhow!("remote path is needed when reading stdin")),
        None => local
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| anyhow!("remote path is needed for {}", local.display()))?,
    };

    if from_stdin {
        let mut content = Vec::new();
        tokio::io::stdin().read_to_end(&mut content).await?;
        client.write(&remote, &content).await?;
        log::info!("uploaded {} bytes to {remote}", content.len());
    } else {
        let size = client.upload(local, &remote).await?;
        log::info!("uploaded {size} bytes to {remote}");
    }

    Ok(())
}
