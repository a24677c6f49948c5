/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use tokio::io::{AsyncRead, AsyncWrite};

use super::FtpControlChannel;
use crate::error::FtpRawResponseError;
use crate::io::LimitedBufReadExt;

/// A complete server reply, single line or dash-continued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FtpReply {
    code: u16,
    multi_line: bool,
    lines: Vec<String>,
}

macro_rules! char_to_u16 {
    ($c:expr) => {
        ($c - b'0') as u16
    };
}

fn parse_reply_code(line: &[u8]) -> Result<u16, FtpRawResponseError> {
    if line.len() < 4 || !line[..3].iter().all(|c| c.is_ascii_digit()) {
        return Err(FtpRawResponseError::InvalidLineFormat);
    }
    let code = char_to_u16!(line[0]) * 100 + char_to_u16!(line[1]) * 10 + char_to_u16!(line[2]);
    if !(100..600).contains(&code) {
        return Err(FtpRawResponseError::InvalidReplyCode(code));
    }
    Ok(code)
}

fn line_text(line: &[u8]) -> Result<&str, FtpRawResponseError> {
    let s = std::str::from_utf8(line).map_err(|_| FtpRawResponseError::LineIsNotUtf8)?;
    Ok(s.trim_end_matches(['\r', '\n']))
}

impl FtpReply {
    pub(super) fn parse_single_line(line: &[u8]) -> Result<Self, FtpRawResponseError> {
        let code = parse_reply_code(line)?;
        let msg = line_text(&line[4..])?;
        Ok(FtpReply {
            code,
            multi_line: false,
            lines: vec![msg.trim_end().to_string()],
        })
    }

    pub(super) fn get_multi_line_parser(
        line: &[u8],
        max_lines: usize,
    ) -> Result<FtpMultiLineReplyParser, FtpRawResponseError> {
        let code = parse_reply_code(line)?;
        let end_prefix = [line[0], line[1], line[2], b' '];
        let mut lines = Vec::<String>::with_capacity(max_lines.min(16));
        let msg = line_text(&line[4..])?;
        lines.push(msg.trim_end().to_string());
        Ok(FtpMultiLineReplyParser {
            code,
            end_prefix,
            lines,
        })
    }

    /// Parse a reply from already split lines.
    ///
    /// The first line decides the reply type. For a multi-line reply all lines up to
    /// the one starting with the same code followed by a space are consumed, and any
    /// line after it is ignored.
    pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, FtpRawResponseError> {
        let Some(first) = lines.first() else {
            return Err(FtpRawResponseError::EmptyReply);
        };
        let first = first.as_ref().as_bytes();
        parse_reply_code(first)?;
        match first[3] {
            b' ' => FtpReply::parse_single_line(first),
            b'-' => {
                let mut ml_parser = FtpReply::get_multi_line_parser(first, lines.len())?;
                for line in &lines[1..] {
                    if ml_parser.feed_line(line.as_ref().as_bytes())? {
                        return Ok(ml_parser.finish());
                    }
                }
                Err(FtpRawResponseError::InvalidLineFormat)
            }
            _ => Err(FtpRawResponseError::InvalidLineFormat),
        }
    }

    #[inline]
    pub fn code(&self) -> u16 {
        self.code
    }

    #[inline]
    pub fn is_multi_line(&self) -> bool {
        self.multi_line
    }

    #[inline]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The text of the first line, without the reply code.
    pub fn text(&self) -> &str {
        self.lines.first().map(|s| s.as_str()).unwrap_or_default()
    }

    pub(super) fn line_trimmed(&self) -> Option<&str> {
        if self.multi_line {
            None
        } else {
            Some(self.text().trim())
        }
    }

    pub(super) fn text_contains_ignore_case(&self, needle: &str) -> bool {
        self.lines
            .iter()
            .any(|line| line.to_ascii_lowercase().contains(needle))
    }

    /// Extract the address from a 227 reply.
    ///
    /// Most servers wrap the six numbers in parentheses, some only put them after
    /// the last space.
    pub fn parse_pasv_227_reply(&self) -> Option<SocketAddr> {
        let line = self.text();

        let numbers = match memchr::memchr(b'(', line.as_bytes()) {
            Some(p_start) => {
                let p_end = memchr::memchr(b')', &line.as_bytes()[p_start..])? + p_start;
                &line[p_start + 1..p_end]
            }
            None => line
                .rsplit(' ')
                .next()?
                .trim_end_matches(|c: char| !c.is_ascii_digit()),
        };

        let a: Vec<&str> = numbers.split(',').map(|s| s.trim()).collect();
        if a.len() != 6 {
            return None;
        }

        let h1 = u8::from_str(a[0]).ok()?;
        let h2 = u8::from_str(a[1]).ok()?;
        let h3 = u8::from_str(a[2]).ok()?;
        let h4 = u8::from_str(a[3]).ok()?;
        let p1 = u8::from_str(a[4]).ok()?;
        let p2 = u8::from_str(a[5]).ok()?;

        let ip = IpAddr::V4(Ipv4Addr::new(h1, h2, h3, h4));
        let port = ((p1 as u16) << 8) + (p2 as u16);
        Some(SocketAddr::new(ip, port))
    }

    /// Extract the port from a 229 reply, in the form `(|||port|)`.
    pub fn parse_epsv_229_reply(&self) -> Option<u16> {
        let line = self.text();

        let p_start = memchr::memchr(b'(', line.as_bytes())?;
        let p_end = memchr::memchr(b')', &line.as_bytes()[p_start..])? + p_start;

        if !line[p_start + 1..p_end].starts_with("|||") {
            return None;
        }
        if p_end - 1 <= p_start + 4 {
            return None;
        }
        if line.as_bytes()[p_end - 1] != b'|' {
            return None;
        }
        let port = u16::from_str(&line[p_start + 4..p_end - 1]).ok()?;
        if port == 0 {
            return None;
        }
        Some(port)
    }

    /// Extract the quoted path from a 257 reply, with `""` unescaped to `"`.
    pub fn parse_quoted_path(&self) -> Option<String> {
        let line = self.text();
        let start = memchr::memchr(b'"', line.as_bytes())?;

        let mut path = String::with_capacity(line.len() - start);
        let mut chars = line[start + 1..].chars().peekable();
        while let Some(c) = chars.next() {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    path.push('"');
                } else {
                    return Some(path);
                }
            } else {
                path.push(c);
            }
        }
        None
    }
}

pub(super) struct FtpMultiLineReplyParser {
    code: u16,
    end_prefix: [u8; 4],
    lines: Vec<String>,
}

impl FtpMultiLineReplyParser {
    pub(super) fn feed_line(&mut self, line: &[u8]) -> Result<bool, FtpRawResponseError> {
        if line.starts_with(&self.end_prefix) {
            let msg = line_text(&line[4..])?;
            self.lines.push(msg.trim_end().to_string());
            Ok(true)
        } else {
            let msg = line_text(line)?;
            // do not trim whitespace at beginning
            self.lines.push(msg.trim_end().to_string());
            Ok(false)
        }
    }

    pub(super) fn finish(self) -> FtpReply {
        FtpReply {
            code: self.code,
            multi_line: true,
            lines: self.lines,
        }
    }
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    async fn read_line(
        &mut self,
        buf: &mut Vec<u8>,
        min_len: usize,
    ) -> Result<(), FtpRawResponseError> {
        buf.clear();

        let (found, len) = self
            .stream
            .limited_read_until(b'\n', self.config.max_line_len, buf)
            .await
            .map_err(FtpRawResponseError::ReadFailed)?;

        #[cfg(feature = "log-raw-io")]
        if len > 0 {
            crate::debug::log_rsp(&String::from_utf8_lossy(buf));
        }

        if len == 0 {
            Err(FtpRawResponseError::ConnectionClosed)
        } else if !found {
            if len >= self.config.max_line_len {
                Err(FtpRawResponseError::LineTooLong)
            } else {
                Err(FtpRawResponseError::ConnectionClosed)
            }
        } else if len < min_len {
            Err(FtpRawResponseError::InvalidLineFormat)
        } else {
            Ok(())
        }
    }

    pub(super) async fn read_raw_response(&mut self) -> Result<FtpReply, FtpRawResponseError> {
        let mut buf = Vec::<u8>::with_capacity(self.config.max_line_len);
        // at least <code><sp>\n
        self.read_line(&mut buf, 5).await?;

        parse_reply_code(&buf)?;
        match buf[3] {
            b' ' => FtpReply::parse_single_line(&buf),
            b'-' => {
                let mut ml_parser =
                    FtpReply::get_multi_line_parser(&buf, self.config.max_multi_lines)?;
                for _i in 0..self.config.max_multi_lines {
                    self.read_line(&mut buf, 1).await?;
                    let end = ml_parser.feed_line(&buf)?;
                    if end {
                        return Ok(ml_parser.finish());
                    }
                }
                Err(FtpRawResponseError::TooManyLines)
            }
            _ => Err(FtpRawResponseError::InvalidLineFormat),
        }
    }

    pub(super) async fn timed_read_raw_response(
        &mut self,
        stage: &'static str,
    ) -> Result<FtpReply, FtpRawResponseError> {
        match tokio::time::timeout(self.config.command_timeout, self.read_raw_response()).await {
            Ok(r) => r,
            Err(_) => Err(FtpRawResponseError::ReadResponseTimedOut(stage)),
        }
    }
}
