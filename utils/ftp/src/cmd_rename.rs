/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use clap::{Arg, ArgMatches, Command};

use ufc_ftp_client::RemoteFileClient;

pub(super) const COMMAND: &str = "rename";

const COMMAND_ARG_FROM: &str = "from";
const COMMAND_ARG_TO: &str = "to";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Rename file or directory")
        .arg(
            Arg::new(COMMAND_ARG_FROM)
                .value_name("FROM PATH")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_TO)
                .value_name("TO PATH")
                .num_args(1)
                .required(true),
        )
}

pub(super) async fn run<C>(client: &mut C, args: &ArgMatches) -> anyhow::Result<()>
where
    C: RemoteFileClient,
{
    let from = args
        .get_one::<String>(COMMAND_ARG_FROM)
        .map(|s| s.as_str())
        .unwrap_or_default();
    let to = args
        .get_one::<String>(COMMAND_ARG_TO)
        .map(|s| s.as_str())
        .unwrap_or_default();

    client.rename(from, to).await?;
    Ok(())
}
