/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use clap::{Arg, ArgAction, ArgMatches, Command};

use ufc_ftp_client::RemoteFileClient;

pub(super) const COMMAND: &str = "mkdir";

const COMMAND_ARG_PATH: &str = "path";
const COMMAND_ARG_PARENTS: &str = "parents";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Create directory")
        .arg(
            Arg::new(COMMAND_ARG_PATH)
                .value_name("DIR PATH")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_PARENTS)
                .help("Create missing parent directories, no error if existing")
                .action(ArgAction::SetTrue)
                .short('p')
                .long(COMMAND_ARG_PARENTS),
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

    if !args.get_flag(COMMAND_ARG_PARENTS) {
        client.mkdir(path).await?;
        return Ok(());
    }

    let mut prefix = if path.starts_with('/') {
        String::from("/")
    } else {
        String::new()
    };
    for part in path.split('/').filter(|s| !s.is_empty()) {
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        prefix.push_str(part);
        if !client.is_dir(&prefix).await? {
            log::debug!("create directory {prefix}");
            client.mkdir(&prefix).await?;
        }
    }
    Ok(())
}
