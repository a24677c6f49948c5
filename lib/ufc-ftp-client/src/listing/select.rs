/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::{FtpDirEntry, FtpEntryType};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FtpSortKey {
    #[default]
    Name,
    Mtime,
    Size,
    Mode,
}

#[derive(Debug, PartialEq, Eq)]
pub struct FtpSortKeyParseError(String);

impl fmt::Display for FtpSortKeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported sort key {}", self.0)
    }
}

impl std::error::Error for FtpSortKeyParseError {}

impl FromStr for FtpSortKey {
    type Err = FtpSortKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(FtpSortKey::Name),
            "mtime" | "time" => Ok(FtpSortKey::Mtime),
            "size" => Ok(FtpSortKey::Size),
            "mode" => Ok(FtpSortKey::Mode),
            _ => Err(FtpSortKeyParseError(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FtpEntryFilter {
    All,
    /// everything that is not a directory or a `.`/`..` marker
    FilesOnly,
    DirsOnly,
}

impl FtpEntryFilter {
    fn accept(&self, entry: &FtpDirEntry) -> bool {
        match self {
            FtpEntryFilter::All => true,
            FtpEntryFilter::FilesOnly => !entry.is_dir(),
            FtpEntryFilter::DirsOnly => entry.entry_type() == FtpEntryType::Directory,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FtpListOptions {
    /// keep the full records instead of projecting to names
    pub info: bool,
    pub sort: Option<FtpSortKey>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FtpListOutput {
    Detailed(Vec<FtpDirEntry>),
    Names(Vec<String>),
}

impl FtpListOutput {
    pub fn len(&self) -> usize {
        match self {
            FtpListOutput::Detailed(v) => v.len(),
            FtpListOutput::Names(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> Vec<&str> {
        match self {
            FtpListOutput::Detailed(v) => v.iter().map(|e| e.name()).collect(),
            FtpListOutput::Names(v) => v.iter().map(|s| s.as_str()).collect(),
        }
    }
}

fn compare(a: &FtpDirEntry, b: &FtpDirEntry, key: FtpSortKey) -> Ordering {
    // Option orders None first
    match key {
        FtpSortKey::Name => a.name().cmp(b.name()),
        FtpSortKey::Mtime => a.mtime().cmp(&b.mtime()),
        FtpSortKey::Size => a.size().cmp(&b.size()),
        FtpSortKey::Mode => a.mode().cmp(&b.mode()),
    }
}

/// Stable ascending sort.
pub fn sort_entries(entries: &mut [FtpDirEntry], key: FtpSortKey) {
    entries.sort_by(|a, b| compare(a, b, key));
}

/// Filter, sort, then project to names unless `info` is set.
pub fn select_entries(
    entries: Vec<FtpDirEntry>,
    filter: FtpEntryFilter,
    options: &FtpListOptions,
) -> FtpListOutput {
    let mut entries: Vec<FtpDirEntry> = entries.into_iter().filter(|e| filter.accept(e)).collect();
    if let Some(key) = options.sort {
        sort_entries(&mut entries, key);
    }
    if options.info {
        FtpListOutput::Detailed(entries)
    } else {
        FtpListOutput::Names(entries.into_iter().map(|e| e.name).collect())
    }
}
