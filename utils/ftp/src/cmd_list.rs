/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command};

use ufc_ftp_client::{
    FtpDirEntry, FtpEntryFilter, FtpListOptions, FtpListOutput, FtpSortKey, RemoteFileClient,
    select_entries,
};

pub(super) const COMMAND: &str = "list";

const COMMAND_ARG_PATH: &str = "path";
const COMMAND_ARG_INFO: &str = "info";
const COMMAND_ARG_SORT: &str = "sort";
const COMMAND_ARG_FILES: &str = "files";
const COMMAND_ARG_DIRS: &str = "dirs";
const COMMAND_ARG_ALL: &str = "all";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("List directory")
        .arg(
            Arg::new(COMMAND_ARG_PATH)
                .value_name("DIR PATH")
                .num_args(1),
        )
        .arg(
            Arg::new(COMMAND_ARG_INFO)
                .help("Show type, mode, size and modify time")
                .action(ArgAction::SetTrue)
                .short('l')
                .long(COMMAND_ARG_INFO),
        )
        .arg(
            Arg::new(COMMAND_ARG_SORT)
                .help("Sort entries")
                .num_args(1)
                .value_name("KEY")
                .value_parser(["name", "mtime", "size", "mode"])
                .long(COMMAND_ARG_SORT),
        )
        .arg(
            Arg::new(COMMAND_ARG_FILES)
                .help("Only show non directory entries")
                .action(ArgAction::SetTrue)
                .long(COMMAND_ARG_FILES),
        )
        .arg(
            Arg::new(COMMAND_ARG_DIRS)
                .help("Only show directories")
                .action(ArgAction::SetTrue)
                .long(COMMAND_ARG_DIRS),
        )
        .arg(
            Arg::new(COMMAND_ARG_ALL)
                .help("Keep the . and .. entries")
                .action(ArgAction::SetTrue)
                .short('a')
                .long(COMMAND_ARG_ALL),
        )
        .group(ArgGroup::new("filter").args([COMMAND_ARG_FILES, COMMAND_ARG_DIRS]))
}

pub(super) fn print_entry(entry: &FtpDirEntry) {
    let mode = entry.mode_string().unwrap_or_else(|| "-".to_string());
    let size = entry
        .size()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mtime = entry
        .mtime()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    match entry.link_target() {
        Some(target) => println!(
            "{:<7} {mode:>4} {size:>12} {mtime:>19} {} -> {target}",
            entry.entry_type().as_str(),
            entry.name()
        ),
        None => println!(
            "{:<7} {mode:>4} {size:>12} {mtime:>19} {}",
            entry.entry_type().as_str(),
            entry.name()
        ),
    }
}

fn print_output(output: &FtpListOutput) {
    match output {
        FtpListOutput::Detailed(entries) => entries.iter().for_each(print_entry),
        FtpListOutput::Names(names) => names.iter().for_each(|name| println!("{name}")),
    }
}

pub(super) async fn run<C>(client: &mut C, args: &ArgMatches) -> anyhow::Result<()>
where
    C: RemoteFileClient,
{
    let path = args
        .get_one::<String>(COMMAND_ARG_PATH)
        .map(|s| s.as_str())
        .unwrap_or_default();

    let sort = args
        .get_one::<String>(COMMAND_ARG_SORT)
        .map(|s| s.parse::<FtpSortKey>())
        .transpose()?;
    let options = FtpListOptions {
        info: args.get_flag(COMMAND_ARG_INFO),
        sort,
    };

    let output = if args.get_flag(COMMAND_ARG_FILES) {
        client.list_files(path, &options).await?
    } else if args.get_flag(COMMAND_ARG_DIRS) {
        client.list_dirs(path, &options).await?
    } else if options.info || options.sort.is_some() {
        let mut entries = client.list_entries(path).await?;
        if !args.get_flag(COMMAND_ARG_ALL) {
            entries.retain(|e| !e.entry_type().is_marker());
        }
        select_entries(entries, FtpEntryFilter::All, &options)
    } else {
        let names = client
            .list_names(path, args.get_flag(COMMAND_ARG_ALL))
            .await?;
        FtpListOutput::Names(names)
    };

    print_output(&output);
    Ok(())
}
