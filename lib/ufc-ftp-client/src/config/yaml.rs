/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use humanize_rs::bytes::Bytes;
use yaml_rust::{Yaml, yaml};

use super::{FtpClientConfig, FtpControlConfig, FtpTlsConfig, FtpTransferConfig};

fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

fn as_humanize_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(value) => {
            let v = value.parse::<Bytes>()?;
            Ok(v.size())
        }
        Yaml::Integer(value) => Ok(usize::try_from(*value)?),
        _ => Err(anyhow!(
            "yaml value type for humanize usize should be 'string' or 'integer'"
        )),
    }
}

fn as_humanize_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                if let Ok(u) = u64::from_str(value) {
                    Ok(Duration::from_secs(u))
                } else {
                    Err(anyhow!("invalid duration string"))
                }
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => {
            if let Ok(u) = u64::try_from(*value) {
                Ok(Duration::from_secs(u))
            } else {
                Err(anyhow!("unsupported duration value"))
            }
        }
        _ => Err(anyhow!(
            "yaml value type for humanize duration should be 'string' or 'integer'"
        )),
    }
}

fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => Ok(usize::from_str(s)?),
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

fn as_bool(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(anyhow!("invalid yaml string value for 'bool': {s}")),
        },
        Yaml::Boolean(value) => Ok(*value),
        Yaml::Integer(i) => Ok(*i != 0),
        _ => Err(anyhow!(
            "yaml value type for 'bool' should be 'boolean' / 'string' / 'integer'"
        )),
    }
}

fn as_string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.to_string()),
        Yaml::Integer(i) => Ok(i.to_string()),
        _ => Err(anyhow!(
            "yaml value type for 'string' should be 'string' or 'integer'"
        )),
    }
}

impl FtpControlConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = FtpControlConfig::default();
            foreach_kv(map, |k, v| match normalize_key(k).as_str() {
                "max_line_len" | "max_line_length" => {
                    config.max_line_len = as_humanize_usize(v)
                        .context(format!("invalid humanize usize value for key {k}"))?;
                    Ok(())
                }
                "max_multi_lines" => {
                    config.max_multi_lines =
                        as_usize(v).context(format!("invalid usize value for key {k}"))?;
                    Ok(())
                }
                "command_timeout" => {
                    config.command_timeout = as_humanize_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}

impl FtpTransferConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = FtpTransferConfig::default();
            let mut list_all_timeout = None;
            foreach_kv(map, |k, v| match normalize_key(k).as_str() {
                "list_max_line_len" | "list_max_line_length" => {
                    config.list_max_line_len = as_humanize_usize(v)
                        .context(format!("invalid humanize usize value for key {k}"))?;
                    Ok(())
                }
                "list_max_entries" => {
                    config.list_max_entries =
                        as_usize(v).context(format!("invalid usize value for key {k}"))?;
                    Ok(())
                }
                "list_all_timeout" => {
                    let timeout = as_humanize_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    list_all_timeout = Some(timeout);
                    Ok(())
                }
                "end_wait_timeout" => {
                    config.end_wait_timeout = as_humanize_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "data_connect_timeout" => {
                    config.data_connect_timeout = as_humanize_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "data_idle_timeout" => {
                    config.data_idle_timeout = as_humanize_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "read_buffer_size" => {
                    config.read_buffer_size = as_humanize_usize(v)
                        .context(format!("invalid humanize usize value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            // applied last as it depends on end_wait_timeout
            if let Some(timeout) = list_all_timeout {
                config.set_list_all_timeout(timeout);
            }
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}

impl FtpTlsConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        match value {
            Yaml::Hash(map) => {
                let mut config = FtpTlsConfig::default();
                foreach_kv(map, |k, v| match normalize_key(k).as_str() {
                    "accept_invalid_certs" | "insecure" => {
                        config.accept_invalid_certs =
                            as_bool(v).context(format!("invalid bool value for key {k}"))?;
                        Ok(())
                    }
                    "no_default_ca_certs" => {
                        config.no_default_ca_certs =
                            as_bool(v).context(format!("invalid bool value for key {k}"))?;
                        Ok(())
                    }
                    "ca_cert_file" | "ca_certificate" => {
                        let path =
                            as_string(v).context(format!("invalid string value for key {k}"))?;
                        config.ca_cert_file = Some(path.into());
                        Ok(())
                    }
                    "server_name" | "tls_name" => {
                        let name =
                            as_string(v).context(format!("invalid string value for key {k}"))?;
                        config.server_name = Some(name);
                        Ok(())
                    }
                    "handshake_timeout" => {
                        config.handshake_timeout = as_humanize_duration(v)
                            .context(format!("invalid humanize duration value for key {k}"))?;
                        Ok(())
                    }
                    _ => Err(anyhow!("invalid key {k}")),
                })?;
                Ok(config)
            }
            Yaml::Boolean(true) => Ok(FtpTlsConfig::default()),
            _ => Err(anyhow!("invalid yaml type")),
        }
    }
}

impl FtpClientConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = FtpClientConfig::default();
            foreach_kv(map, |k, v| match normalize_key(k).as_str() {
                "control" => {
                    config.control = FtpControlConfig::parse_yaml(v).context(format!(
                        "invalid ftp control connection config value for key {k}"
                    ))?;
                    Ok(())
                }
                "transfer" => {
                    config.transfer = FtpTransferConfig::parse_yaml(v).context(format!(
                        "invalid ftp transfer connection config value for key {k}"
                    ))?;
                    Ok(())
                }
                "connect_timeout" => {
                    config.connect_timeout = as_humanize_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "greeting_timeout" => {
                    config.greeting_timeout = as_humanize_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "always_try_epsv" => {
                    config.always_try_epsv =
                        as_bool(v).context(format!("invalid bool value for key {k}"))?;
                    Ok(())
                }
                "passive" => {
                    config.passive =
                        as_bool(v).context(format!("invalid bool value for key {k}"))?;
                    Ok(())
                }
                "tls" => {
                    if matches!(v, Yaml::Boolean(false) | Yaml::Null) {
                        config.tls = None;
                    } else {
                        let tls = FtpTlsConfig::parse_yaml(v)
                            .context(format!("invalid ftp tls config value for key {k}"))?;
                        config.tls = Some(tls);
                    }
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}
