/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use clap::{ArgMatches, Command};

use ufc_ftp_client::RemoteFileClient;

pub(super) const COMMAND: &str = "pwd";

pub(super) fn command() -> Command {
    Command::new(COMMAND).about("Print working directory")
}

pub(super) async fn run<C>(client: &mut C, _args: &ArgMatches) -> anyhow::Result<()>
where
    C: RemoteFileClient,
{
    let dir = client.pwd().await?;
    println!("{dir}");
    Ok(())
}
