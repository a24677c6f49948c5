/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use chrono::{DateTime, Utc};

mod entry;
mod facts;
mod select;
pub(crate) mod time_val;
mod unix;

pub use entry::{FtpDirEntry, FtpEntryType};
pub use select::{
    FtpEntryFilter, FtpListOptions, FtpListOutput, FtpSortKey, FtpSortKeyParseError,
    select_entries, sort_entries,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FtpListFormat {
    /// `LIST` output in `ls -l` style
    Unix,
    /// `MLSD` / `MLST` fact lines
    Machine,
}

/// Converts raw listing lines into [`FtpDirEntry`] records.
#[derive(Clone, Debug)]
pub struct FtpListParser {
    format: FtpListFormat,
    now: DateTime<Utc>,
}

impl FtpListParser {
    pub fn new(format: FtpListFormat) -> Self {
        FtpListParser::with_clock(format, Utc::now())
    }

    /// Use `now` to resolve Unix dates that carry no year.
    pub fn with_clock(format: FtpListFormat, now: DateTime<Utc>) -> Self {
        FtpListParser { format, now }
    }

    #[inline]
    pub fn format(&self) -> FtpListFormat {
        self.format
    }

    pub fn parse_line(&self, line: &str) -> Option<FtpDirEntry> {
        match self.format {
            FtpListFormat::Unix => unix::parse_line(line, &self.now),
            FtpListFormat::Machine => facts::parse_line(line),
        }
    }

    /// Lines that can not be parsed are dropped.
    pub fn parse_listing<S: AsRef<str>>(&self, lines: &[S]) -> Vec<FtpDirEntry> {
        lines
            .iter()
            .filter_map(|line| self.parse_line(line.as_ref()))
            .collect()
    }

    /// Return the first record whose basename matches the basename of `target`.
    pub fn find_entry<S: AsRef<str>>(&self, lines: &[S], target: &str) -> Option<FtpDirEntry> {
        let target = crate::path::basename(target);
        lines
            .iter()
            .filter_map(|line| self.parse_line(line.as_ref()))
            .find(|entry| entry.basename() == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unix_listing() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let parser = FtpListParser::with_clock(FtpListFormat::Unix, now);
        let lines = [
            "total 8",
            "-rw-r--r--    1 ftp      ftp           900 Jan  2  2020 b.txt",
            "garbage",
            "drwxr-x---    2 ftp      ftp          4096 Feb  3 11:00 docs",
        ];
        let entries = parser.parse_listing(&lines);
        assert_eq!(entries.len(), 2);

        let entry = parser.find_entry(&lines, "/pub/docs").unwrap();
        assert_eq!(entry.entry_type(), FtpEntryType::Directory);
        assert!(parser.find_entry(&lines, "missing").is_none());
    }

    #[test]
    fn machine_listing() {
        let parser = FtpListParser::new(FtpListFormat::Machine);
        let lines = [
            "type=cdir;modify=20240101000000; .",
            "type=file;size=10;modify=20240101000000; /pub/a.txt",
            "type=file;size=20;modify=20240101000000; /pub/b.txt",
        ];
        let entry = parser.find_entry(&lines, "b.txt").unwrap();
        assert_eq!(entry.size(), Some(20));
        assert_eq!(entry.name(), "/pub/b.txt");
        assert_eq!(entry.basename(), "b.txt");
    }
}
