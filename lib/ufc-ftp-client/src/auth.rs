/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use thiserror::Error;

const USERNAME_MAX_LENGTH: usize = 255;
const PASSWORD_MAX_LENGTH: usize = 255;

const ANONYMOUS_USERNAME: &str = "anonymous";
const ANONYMOUS_PASSWORD: &str = "anonymous@";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FtpCredentialError {
    #[error("too long string")]
    TooLong,
    #[error("line break character is not allowed")]
    LineBreak,
}

fn check_value(s: &str, max_len: usize) -> Result<(), FtpCredentialError> {
    if s.len() > max_len {
        return Err(FtpCredentialError::TooLong);
    }
    if memchr::memchr2(b'\r', b'\n', s.as_bytes()).is_some() {
        return Err(FtpCredentialError::LineBreak);
    }
    Ok(())
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FtpUsername {
    inner: String,
}

impl FtpUsername {
    pub fn anonymous() -> Self {
        FtpUsername {
            inner: ANONYMOUS_USERNAME.to_string(),
        }
    }

    pub fn from_original(s: &str) -> Result<Self, FtpCredentialError> {
        check_value(s, USERNAME_MAX_LENGTH)?;
        Ok(FtpUsername {
            inner: s.to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn as_original(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for FtpUsername {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

#[derive(Clone, Eq, PartialEq)]
pub struct FtpPassword {
    inner: String,
}

impl fmt::Debug for FtpPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FtpPassword(******)")
    }
}

impl FtpPassword {
    pub fn anonymous() -> Self {
        FtpPassword {
            inner: ANONYMOUS_PASSWORD.to_string(),
        }
    }

    pub fn from_original(s: &str) -> Result<Self, FtpCredentialError> {
        check_value(s, PASSWORD_MAX_LENGTH)?;
        Ok(FtpPassword {
            inner: s.to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn as_original(&self) -> &str {
        &self.inner
    }
}

/// Resolve the pair actually sent to the server.
///
/// Without a password the session falls back to anonymous login, whatever the
/// user name.
pub(crate) fn login_pair(
    user: Option<&FtpUsername>,
    pass: Option<&FtpPassword>,
) -> (FtpUsername, FtpPassword) {
    match pass {
        Some(p) if !p.is_empty() => {
            let user = match user {
                Some(u) if !u.is_empty() => u.clone(),
                _ => FtpUsername::anonymous(),
            };
            (user, p.clone())
        }
        _ => (FtpUsername::anonymous(), FtpPassword::anonymous()),
    }
}
