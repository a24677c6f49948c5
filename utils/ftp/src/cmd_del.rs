/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use clap::{Arg, ArgMatches, Command};

use ufc_ftp_client::RemoteFileClient;

pub(super) const COMMAND: &str = "del";

const COMMAND_ARG_PATH: &str = "path";

pub(super) fn command() -> Command {
    Command::new(COMMAND).about("Delete file").arg(
        Arg::new(COMMAND_ARG_PATH)
            .value_name("FILE PATH")
            .num_args(1)
            .required(true),
    )
}

pub(super) async fn run<C>(client: &mut C, args: &ArgMatches) -> anyhow::Result<()>
where
    C: RemoteFileClient,
{
    let path = args
        .get_one::<String>(COMMAND_ARG_PATH)
        .map(|s| s.as_str())
        .unwrap_or_default();

    client.delete(path).await?;
    Ok(())
}
