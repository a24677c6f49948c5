/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command};

use ufc_ftp_client::RemoteFileClient;

pub(super) const COMMAND: &str = "chmod";

const COMMAND_ARG_MODE: &str = "mode";
const COMMAND_ARG_PATH: &str = "path";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Change permission bits")
        .arg(
            Arg::new(COMMAND_ARG_MODE)
                .help("Octal mode, like 644")
                .value_name("MODE")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_PATH)
                .value_name("PATH")
                .num_args(1)
                .required(true),
        )
}

fn parse_mode(s: &str) -> anyhow::Result<u32> {
    let mode = u32::from_str_radix(s, 8).map_err(|e| anyhow!("invalid octal mode {s}: {e}"))?;
    if mode > 0o7777 {
        return Err(anyhow!("mode {s} is out of range"));
    }
    Ok(mode)
}

pub(super) async fn run<C>(client: &mut C, args: &ArgMatches) -> anyhow::Result<()>
where
    C: RemoteFileClient,
{
    let mode = args
        .get_one::<String>(COMMAND_ARG_MODE)
        .map(|s| parse_mode(s))
        .transpose()?
        .unwrap_or_default();
    let path = args
        .get_one::<String>(COMMAND_ARG_PATH)
        .map(|s| s.as_str())
        .unwrap_or_default();

    client.chmod(path, mode).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn octal_mode() {
        assert_eq!(parse_mode("644").unwrap(), 0o644);
        assert_eq!(parse_mode("0755").unwrap(), 0o755);
        assert!(parse_mode("9").is_err());
        assert!(parse_mode("17777").is_err());
    }
}
