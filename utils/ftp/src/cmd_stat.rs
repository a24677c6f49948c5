/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use clap::{Arg, ArgMatches, Command};

use ufc_ftp_client::RemoteFileClient;

pub(super) const COMMAND: &str = "stat";

const COMMAND_ARG_PATH: &str = "path";

pub(super) fn command() -> Command {
    Command::new(COMMAND).about("Fetch file stats").arg(
        Arg::new(COMMAND_ARG_PATH)
            .value_name("PATH")
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

    let entry = client.stat(path).await?;

    println!("Path: {}", entry.name());
    println!("Type: {}", entry.entry_type());
    if let Some(size) = entry.size() {
        println!("Size: {size}");
    }
    if let Some(mode) = entry.mode_string() {
        println!("Mode: {mode}");
    }
    if let Some(perm) = entry.permissions() {
        println!("Permissions: {perm}");
    }
    if let Some(owner) = entry.owner() {
        println!("Owner: {owner}");
    }
    if let Some(group) = entry.group() {
        println!("Group: {group}");
    }
    if let Some(dt) = entry.mtime() {
        println!("Modify Time: {dt}");
    }
    if let Some(target) = entry.link_target() {
        println!("Link Target: {target}");
    }

    Ok(())
}
