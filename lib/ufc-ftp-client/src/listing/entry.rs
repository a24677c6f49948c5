/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FtpEntryType {
    File,
    Directory,
    Link,
    /// `.` in a listing, or the `cdir` fact
    CurrentDir,
    /// `..` in a listing, or the `pdir` fact
    ParentDir,
    Other,
}

impl fmt::Display for FtpEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FtpEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FtpEntryType::File => "file",
            FtpEntryType::Directory => "dir",
            FtpEntryType::Link => "link",
            FtpEntryType::CurrentDir => "cdir",
            FtpEntryType::ParentDir => "pdir",
            FtpEntryType::Other => "other",
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        matches!(
            self,
            FtpEntryType::Directory | FtpEntryType::CurrentDir | FtpEntryType::ParentDir
        )
    }

    #[inline]
    pub fn is_marker(&self) -> bool {
        matches!(self, FtpEntryType::CurrentDir | FtpEntryType::ParentDir)
    }
}

/// One normalized listing record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FtpDirEntry {
    pub(super) name: String,
    pub(super) entry_type: FtpEntryType,
    pub(super) size: Option<u64>,
    pub(super) permissions: Option<String>,
    pub(super) mode: Option<u32>,
    pub(super) owner: Option<String>,
    pub(super) group: Option<String>,
    pub(super) mtime: Option<DateTime<Utc>>,
    pub(super) link_target: Option<String>,
    pub(super) perm_fact: Option<String>,
}

impl FtpDirEntry {
    pub(super) fn new(name: &str, entry_type: FtpEntryType) -> Self {
        FtpDirEntry {
            name: name.to_string(),
            entry_type,
            size: None,
            permissions: None,
            mode: None,
            owner: None,
            group: None,
            mtime: None,
            link_target: None,
            perm_fact: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The last path component of the name.
    pub fn basename(&self) -> &str {
        crate::path::basename(&self.name)
    }

    #[inline]
    pub fn entry_type(&self) -> FtpEntryType {
        self.entry_type
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.entry_type.is_dir()
    }

    #[inline]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// The `rwxr-xr-x` style string, without the type character.
    #[inline]
    pub fn permissions(&self) -> Option<&str> {
        self.permissions.as_deref()
    }

    /// Permission bits, in the range `0..=0o777`.
    #[inline]
    pub fn mode(&self) -> Option<u32> {
        self.mode
    }

    /// The mode as three octal digits, like `755`.
    pub fn mode_string(&self) -> Option<String> {
        self.mode.map(|m| format!("{m:03o}"))
    }

    #[inline]
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    #[inline]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    #[inline]
    pub fn mtime(&self) -> Option<&DateTime<Utc>> {
        self.mtime.as_ref()
    }

    #[inline]
    pub fn link_target(&self) -> Option<&str> {
        self.link_target.as_deref()
    }

    /// Value of the `perm` fact, only set by machine listings.
    #[inline]
    pub fn perm_fact(&self) -> Option<&str> {
        self.perm_fact.as_deref()
    }
}

/// Map one `rwx` triad to an octal digit.
fn triad_to_digit(triad: &[u8]) -> u32 {
    let mut v = 0;
    if triad[0] == b'r' {
        v += 4;
    }
    if triad[1] == b'w' {
        v += 2;
    }
    // s and t imply x, their upper case forms do not
    if matches!(triad[2], b'x' | b's' | b't') {
        v += 1;
    }
    v
}

/// Convert the nine permission characters to octal mode bits.
pub(super) fn permission_to_mode(perm: &str) -> Option<u32> {
    let perm = perm.as_bytes();
    if perm.len() != 9 {
        return None;
    }
    let mode =
        triad_to_digit(&perm[0..3]) * 64 + triad_to_digit(&perm[3..6]) * 8 + triad_to_digit(&perm[6..9]);
    Some(mode)
}

/// Build the nine permission characters from mode bits.
pub(super) fn mode_to_permission(mode: u32) -> String {
    let mut s = String::with_capacity(9);
    for shift in [6, 3, 0] {
        let v = (mode >> shift) & 0o7;
        s.push(if v & 4 != 0 { 'r' } else { '-' });
        s.push(if v & 2 != 0 { 'w' } else { '-' });
        s.push(if v & 1 != 0 { 'x' } else { '-' });
    }
    s
}
