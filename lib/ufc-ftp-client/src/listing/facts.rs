/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use super::entry::{FtpDirEntry, FtpEntryType, mode_to_permission};
use super::time_val;

fn parse_type(value: &str) -> FtpEntryType {
    let lower = value.to_lowercase();
    match lower.as_str() {
        "file" => FtpEntryType::File,
        "dir" => FtpEntryType::Directory,
        "cdir" => FtpEntryType::CurrentDir,
        "pdir" => FtpEntryType::ParentDir,
        s if s.starts_with("os.unix=slink") || s.starts_with("os.unix=symlink") => {
            FtpEntryType::Link
        }
        _ => FtpEntryType::Other,
    }
}

#[derive(Default)]
struct FactSet<'a> {
    entry_type: Option<&'a str>,
    size: Option<u64>,
    mtime: Option<&'a str>,
    mode: Option<u32>,
    owner: Option<&'a str>,
    uid: Option<&'a str>,
    group: Option<&'a str>,
    gid: Option<&'a str>,
    perm: Option<&'a str>,
}

impl<'a> FactSet<'a> {
    fn set(&mut self, key: &str, value: &'a str) {
        match key.to_lowercase().as_str() {
            "type" => self.entry_type = Some(value),
            "size" | "sizd" => self.size = u64::from_str(value).ok(),
            "modify" => self.mtime = Some(value),
            "unix.mode" => self.mode = u32::from_str_radix(value, 8).ok().map(|m| m & 0o777),
            "unix.owner" => self.owner = Some(value),
            "unix.uid" => self.uid = Some(value),
            "unix.group" => self.group = Some(value),
            "unix.gid" => self.gid = Some(value),
            "perm" => self.perm = Some(value),
            _ => {}
        }
    }
}

/// Parse one `fact=value;...; name` line.
///
/// The name follows the first space. Servers that omit the space put the
/// name in a trailing segment without `=`.
pub(super) fn parse_line(line: &str) -> Option<FtpDirEntry> {
    let line = line.trim_end_matches(['\r', '\n']).trim_start();
    if line.is_empty() {
        return None;
    }

    let (facts, mut name) = match line.split_once(' ') {
        Some((facts, name)) => (facts, Some(name)),
        None => (line, None),
    };

    let mut set = FactSet::default();
    for fact in facts.split(';') {
        if fact.is_empty() {
            continue;
        }
        match fact.split_once('=') {
            Some((key, value)) => set.set(key, value),
            None => {
                if name.is_none() {
                    name = Some(fact);
                }
            }
        }
    }

    let name = name.filter(|s| !s.is_empty())?;
    let entry_type = match name {
        "." => FtpEntryType::CurrentDir,
        ".." => FtpEntryType::ParentDir,
        _ => set.entry_type.map(parse_type).unwrap_or(FtpEntryType::Other),
    };

    let mut entry = FtpDirEntry::new(name, entry_type);
    entry.size = set.size;
    entry.mtime = set.mtime.and_then(time_val::parse_to_seconds);
    entry.mode = set.mode;
    entry.permissions = set.mode.map(mode_to_permission);
    entry.owner = set.owner.or(set.uid).map(str::to_string);
    entry.group = set.group.or(set.gid).map(str::to_string);
    entry.perm_fact = set.perm.map(str::to_string);
    Some(entry)
}
