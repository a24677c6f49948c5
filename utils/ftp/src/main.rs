/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, Command, value_parser};
use clap_complete::Shell;
use yaml_rust::YamlLoader;

use ufc_ftp_client::{
    FtpClient, FtpClientConfig, FtpPassword, FtpServerAddr, FtpTlsConfig, FtpUsername,
    RemoteFileClient, TcpConnectionProvider,
};

mod logger;

mod cmd_chmod;
mod cmd_del;
mod cmd_get;
mod cmd_list;
mod cmd_mkdir;
mod cmd_put;
mod cmd_pwd;
mod cmd_rename;
mod cmd_rmd;
mod cmd_stat;

const GLOBAL_ARG_COMPLETION: &str = "completion";
const GLOBAL_ARG_SERVER: &str = "server";
const GLOBAL_ARG_USERNAME: &str = "username";
const GLOBAL_ARG_PASSWORD: &str = "password";
const GLOBAL_ARG_CONFIG: &str = "config";
const GLOBAL_ARG_TLS: &str = "tls";
const GLOBAL_ARG_INSECURE: &str = "insecure";
const GLOBAL_ARG_CA_CERT: &str = "ca-cert";
const GLOBAL_ARG_EPSV: &str = "epsv";
const GLOBAL_ARG_SKIP_PASV_IP: &str = "skip-pasv-ip";
const GLOBAL_ARG_SOURCE_IP: &str = "source-ip";
const GLOBAL_ARG_VERBOSE: &str = "verbose";

fn build_cli_args() -> Command {
    Command::new("ufc-ftp")
        .arg(
            Arg::new(GLOBAL_ARG_COMPLETION)
                .num_args(1)
                .value_name("SHELL")
                .long("completion")
                .value_parser(value_parser!(Shell))
                .exclusive(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_SERVER)
                .help("FTP server address")
                .num_args(1)
                .value_name("SERVER ADDRESS")
                .required_unless_present(GLOBAL_ARG_COMPLETION),
        )
        .arg(
            Arg::new(GLOBAL_ARG_USERNAME)
                .help("FTP username")
                .num_args(1)
                .value_name("USERNAME")
                .short('u')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_PASSWORD)
                .help("FTP password, anonymous login if not set")
                .num_args(1)
                .value_name("PASSWORD")
                .short('p')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_CONFIG)
                .help("Client config file in yaml format")
                .num_args(1)
                .value_name("CONFIG FILE")
                .value_parser(value_parser!(PathBuf))
                .short('c')
                .long("config")
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_TLS)
                .help("Upgrade to tls with AUTH TLS")
                .action(ArgAction::SetTrue)
                .long(GLOBAL_ARG_TLS)
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_INSECURE)
                .help("Skip server certificate verification")
                .action(ArgAction::SetTrue)
                .long(GLOBAL_ARG_INSECURE)
                .requires(GLOBAL_ARG_TLS)
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_CA_CERT)
                .help("Extra CA certificate file in PEM format")
                .num_args(1)
                .value_name("CA CERT FILE")
                .value_parser(value_parser!(PathBuf))
                .long(GLOBAL_ARG_CA_CERT)
                .requires(GLOBAL_ARG_TLS)
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_EPSV)
                .help("Always try EPSV before PASV")
                .action(ArgAction::SetTrue)
                .long(GLOBAL_ARG_EPSV)
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_SKIP_PASV_IP)
                .help("Ignore the ip in PASV replies, connect to the control peer instead")
                .action(ArgAction::SetTrue)
                .long(GLOBAL_ARG_SKIP_PASV_IP)
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_SOURCE_IP)
                .help("source ip address")
                .num_args(1)
                .value_name("IP ADDRESS")
                .value_parser(value_parser!(IpAddr))
                .long("source")
                .short('s')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_VERBOSE)
                .help("show verbose message")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v')
                .global(true),
        )
        .subcommand(cmd_list::command())
        .subcommand(cmd_stat::command())
        .subcommand(cmd_get::command())
        .subcommand(cmd_put::command())
        .subcommand(cmd_del::command())
        .subcommand(cmd_mkdir::command())
        .subcommand(cmd_rmd::command())
        .subcommand(cmd_rename::command())
        .subcommand(cmd_chmod::command())
        .subcommand(cmd_pwd::command())
}

fn load_config(path: &Path) -> anyhow::Result<FtpClientConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {e}", path.display()))?;
    let docs = YamlLoader::load_from_str(&content)
        .map_err(|e| anyhow!("invalid yaml file {}: {e}", path.display()))?;
    match docs.first() {
        Some(doc) => FtpClientConfig::parse_yaml(doc)
            .context(format!("invalid ftp client config in {}", path.display())),
        None => Ok(FtpClientConfig::default()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    if let Some(target) = args.get_one::<Shell>(GLOBAL_ARG_COMPLETION) {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*target, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    let verbose_level = args
        .get_one::<u8>(GLOBAL_ARG_VERBOSE)
        .copied()
        .unwrap_or_default();
    let logger = logger::SyncLogger::new(verbose_level);
    logger
        .into_global_logger()
        .map_err(|e| anyhow!("failed to setup logger: {e}"))?;

    let Some(server) = args.get_one::<String>(GLOBAL_ARG_SERVER) else {
        return Err(anyhow!("no server address set"));
    };
    let server = FtpServerAddr::from_str(server)?;

    let username = args
        .get_one::<String>(GLOBAL_ARG_USERNAME)
        .map(|s| FtpUsername::from_original(s))
        .transpose()
        .context("invalid username")?;
    let password = args
        .get_one::<String>(GLOBAL_ARG_PASSWORD)
        .map(|s| FtpPassword::from_original(s))
        .transpose()
        .context("invalid password")?;

    let mut config = match args.get_one::<PathBuf>(GLOBAL_ARG_CONFIG) {
        Some(path) => load_config(path)?,
        None => FtpClientConfig::default(),
    };
    if args.get_flag(GLOBAL_ARG_TLS) {
        let tls = config.tls.get_or_insert_with(FtpTlsConfig::default);
        if args.get_flag(GLOBAL_ARG_INSECURE) {
            tls.accept_invalid_certs = true;
        }
        if let Some(file) = args.get_one::<PathBuf>(GLOBAL_ARG_CA_CERT) {
            tls.ca_cert_file = Some(file.clone());
        }
    }
    if args.get_flag(GLOBAL_ARG_EPSV) {
        config.always_try_epsv = true;
    }

    let mut conn_provider = TcpConnectionProvider::default();
    if let Some(ip) = args.get_one::<IpAddr>(GLOBAL_ARG_SOURCE_IP) {
        conn_provider.set_bind_ip(*ip);
    }
    if args.get_flag(GLOBAL_ARG_SKIP_PASV_IP) {
        conn_provider.skip_pasv_address();
    }

    let Some((subcommand, args)) = args.subcommand() else {
        return Err(anyhow!("no subcommand found"));
    };

    let mut client = FtpClient::connect(server, conn_provider, config).await?;
    client.login(username.as_ref(), password.as_ref()).await?;

    let ret = match subcommand {
        cmd_list::COMMAND => cmd_list::run(&mut client, args).await,
        cmd_stat::COMMAND => cmd_stat::run(&mut client, args).await,
        cmd_get::COMMAND => cmd_get::run(&mut client, args).await,
        cmd_put::COMMAND => cmd_put::run(&mut client, args).await,
        cmd_del::COMMAND => cmd_del::run(&mut client, args).await,
        cmd_mkdir::COMMAND => cmd_mkdir::run(&mut client, args).await,
        cmd_rmd::COMMAND => cmd_rmd::run(&mut client, args).await,
        cmd_rename::COMMAND => cmd_rename::run(&mut client, args).await,
        cmd_chmod::COMMAND => cmd_chmod::run(&mut client, args).await,
        cmd_pwd::COMMAND => cmd_pwd::run(&mut client, args).await,
        cmd => Err(anyhow!("invalid subcommand {cmd}")),
    };

    RemoteFileClient::disconnect(&mut client).await?;

    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_args() {
        let args = build_cli_args()
            .try_get_matches_from(["ufc-ftp", "--tls", "-u", "alice", "ftp.example.net", "pwd"])
            .unwrap();
        assert!(args.get_flag(GLOBAL_ARG_TLS));
        assert_eq!(args.subcommand_name(), Some(cmd_pwd::COMMAND));

        // only passive data connections are available
        assert!(
            build_cli_args()
                .try_get_matches_from(["ufc-ftp", "--no-passive", "ftp.example.net", "pwd"])
                .is_err()
        );
    }
}
