/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;

use super::entry::{FtpDirEntry, FtpEntryType, permission_to_mode};

// type, permissions, links, owner, group, size, month, day, time or year, name
static UNIX_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([-bcdlps])([-rwxsStTlL]{9})[+@.]?\s+(\d+)\s+(\S+)\s+(\S+)\s+(\d+)\s+([A-Za-z]{3})\s+(\d{1,2})\s+(\d{1,2}:\d{2}|\d{4}) (.+)$",
    )
    .unwrap()
});

fn parse_month(s: &str) -> Option<u32> {
    let m = match s.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(m)
}

/// Resolve the 12 character date field.
///
/// `Mon DD HH:MM` has no year. It is in the last year, so the current year is
/// used unless that puts it more than one day ahead of `now`.
fn parse_date(month: &str, day: &str, time_or_year: &str, now: &DateTime<Utc>) -> Option<DateTime<Utc>> {
    let month = parse_month(month)?;
    let day = u32::from_str(day).ok()?;

    if let Some((h, m)) = time_or_year.split_once(':') {
        let time = NaiveTime::from_hms_opt(u32::from_str(h).ok()?, u32::from_str(m).ok()?, 0)?;
        let limit = *now + Duration::days(1);
        let this_year = NaiveDate::from_ymd_opt(now.year(), month, day)
            .map(|d| Utc.from_utc_datetime(&d.and_time(time)))
            .filter(|dt| *dt <= limit);
        this_year.or_else(|| {
            NaiveDate::from_ymd_opt(now.year() - 1, month, day)
                .map(|d| Utc.from_utc_datetime(&d.and_time(time)))
        })
    } else {
        let year = i32::from_str(time_or_year).ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
    }
}

/// Parse one `ls -l` style line. Lines not matching the grammar give `None`.
pub(super) fn parse_line(line: &str, now: &DateTime<Utc>) -> Option<FtpDirEntry> {
    let line = line.trim_end_matches(['\r', '\n']);
    let caps = UNIX_LINE_REGEX.captures(line)?;

    let type_char = caps.get(1)?.as_str();
    let perm = caps.get(2)?.as_str();
    let mut name = caps.get(10)?.as_str();
    let mut link_target = None;

    let entry_type = match name {
        "." => FtpEntryType::CurrentDir,
        ".." => FtpEntryType::ParentDir,
        _ => match type_char {
            "d" => FtpEntryType::Directory,
            "l" => {
                if let Some((n, target)) = name.split_once(" -> ") {
                    name = n;
                    link_target = Some(target.to_string());
                }
                FtpEntryType::Link
            }
            _ => FtpEntryType::File,
        },
    };

    let mut entry = FtpDirEntry::new(name, entry_type);
    entry.mode = permission_to_mode(perm);
    entry.permissions = Some(perm.to_string());
    entry.owner = Some(caps.get(4)?.as_str().to_string());
    entry.group = Some(caps.get(5)?.as_str().to_string());
    entry.size = u64::from_str(caps.get(6)?.as_str()).ok();
    entry.mtime = parse_date(
        caps.get(7)?.as_str(),
        caps.get(8)?.as_str(),
        caps.get(9)?.as_str(),
        now,
    );
    entry.link_target = link_target;
    Some(entry)
}
