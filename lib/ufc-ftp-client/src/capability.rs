/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::client::FtpClient;
use crate::connection::FtpConnectionProvider;
use crate::error::FtpError;
use crate::listing::{FtpDirEntry, FtpEntryFilter, FtpListOptions, FtpListOutput, select_entries};

/// The file operations shared by remote file engines.
///
/// Session setup is engine specific and stays out of this trait, callers get a
/// logged in client first.
#[async_trait]
pub trait RemoteFileClient: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    fn is_connected(&self) -> bool;
    fn current_dir(&self) -> Option<&str>;

    /// Close the session. Returns `false` if it was closed already.
    async fn disconnect(&mut self) -> Result<bool, Self::Error>;

    async fn pwd(&mut self) -> Result<String, Self::Error>;
    async fn cd(&mut self, dir: &str) -> Result<(), Self::Error>;
    async fn cdup(&mut self) -> Result<(), Self::Error>;
    async fn mkdir(&mut self, dir: &str) -> Result<(), Self::Error>;
    async fn rmdir(&mut self, dir: &str) -> Result<(), Self::Error>;
    async fn delete(&mut self, path: &str) -> Result<(), Self::Error>;
    async fn rename(&mut self, from: &str, to: &str) -> Result<(), Self::Error>;
    async fn chmod(&mut self, path: &str, mode: u32) -> Result<(), Self::Error>;

    async fn read(&mut self, path: &str) -> Result<Vec<u8>, Self::Error>;
    async fn write(&mut self, path: &str, content: &[u8]) -> Result<(), Self::Error>;
    async fn download(&mut self, remote: &str, local: &Path) -> Result<u64, Self::Error>;
    async fn upload(&mut self, local: &Path, remote: &str) -> Result<u64, Self::Error>;

    async fn list_names(&mut self, dir: &str, with_dots: bool) -> Result<Vec<String>, Self::Error>;
    async fn list_entries(&mut self, dir: &str) -> Result<Vec<FtpDirEntry>, Self::Error>;

    async fn list_files(
        &mut self,
        dir: &str,
        options: &FtpListOptions,
    ) -> Result<FtpListOutput, Self::Error> {
        let entries = self.list_entries(dir).await?;
        Ok(select_entries(entries, FtpEntryFilter::FilesOnly, options))
    }

    async fn list_dirs(
        &mut self,
        dir: &str,
        options: &FtpListOptions,
    ) -> Result<FtpListOutput, Self::Error> {
        let entries = self.list_entries(dir).await?;
        Ok(select_entries(entries, FtpEntryFilter::DirsOnly, options))
    }

    async fn stat(&mut self, path: &str) -> Result<FtpDirEntry, Self::Error>;
    async fn is_dir(&mut self, path: &str) -> Result<bool, Self::Error>;
    async fn filesize(&mut self, path: &str) -> Result<Option<u64>, Self::Error>;
    async fn last_modified(&mut self, path: &str) -> Result<Option<DateTime<Utc>>, Self::Error>;

    async fn mode(&mut self, path: &str) -> Result<Option<u32>, Self::Error> {
        let entry = self.stat(path).await?;
        Ok(entry.mode())
    }
}

#[async_trait]
impl<CP> RemoteFileClient for FtpClient<CP>
where
    CP: FtpConnectionProvider + Send,
{
    type Error = FtpError;

    fn is_connected(&self) -> bool {
        FtpClient::is_connected(self)
    }

    fn current_dir(&self) -> Option<&str> {
        FtpClient::current_dir(self)
    }

    async fn disconnect(&mut self) -> Result<bool, FtpError> {
        FtpClient::disconnect(self).await
    }

    async fn pwd(&mut self) -> Result<String, FtpError> {
        FtpClient::pwd(self).await
    }

    async fn cd(&mut self, dir: &str) -> Result<(), FtpError> {
        FtpClient::cd(self, dir).await
    }

    async fn cdup(&mut self) -> Result<(), FtpError> {
        FtpClient::cdup(self).await
    }

    async fn mkdir(&mut self, dir: &str) -> Result<(), FtpError> {
        FtpClient::mkdir(self, dir).await
    }

    async fn rmdir(&mut self, dir: &str) -> Result<(), FtpError> {
        FtpClient::rmdir(self, dir).await
    }

    async fn delete(&mut self, path: &str) -> Result<(), FtpError> {
        FtpClient::delete(self, path).await
    }

    async fn rename(&mut self, from: &str, to: &str) -> Result<(), FtpError> {
        FtpClient::rename(self, from, to).await
    }

    async fn chmod(&mut self, path: &str, mode: u32) -> Result<(), FtpError> {
        FtpClient::chmod(self, path, mode).await
    }

    async fn read(&mut self, path: &str) -> Result<Vec<u8>, FtpError> {
        FtpClient::read(self, path).await
    }

    async fn write(&mut self, path: &str, content: &[u8]) -> Result<(), FtpError> {
        FtpClient::write(self, path, content).await
    }

    async fn download(&mut self, remote: &str, local: &Path) -> Result<u64, FtpError> {
        FtpClient::download(self, remote, local).await
    }

    async fn upload(&mut self, local: &Path, remote: &str) -> Result<u64, FtpError> {
        FtpClient::upload(self, local, remote).await
    }

    async fn list_names(&mut self, dir: &str, with_dots: bool) -> Result<Vec<String>, FtpError> {
        FtpClient::list_names(self, dir, with_dots).await
    }

    async fn list_entries(&mut self, dir: &str) -> Result<Vec<FtpDirEntry>, FtpError> {
        FtpClient::list_entries(self, dir).await
    }

    async fn stat(&mut self, path: &str) -> Result<FtpDirEntry, FtpError> {
        FtpClient::stat(self, path).await
    }

    async fn is_dir(&mut self, path: &str) -> Result<bool, FtpError> {
        FtpClient::is_dir(self, path).await
    }

    async fn filesize(&mut self, path: &str) -> Result<Option<u64>, FtpError> {
        FtpClient::filesize(self, path).await
    }

    async fn last_modified(&mut self, path: &str) -> Result<Option<DateTime<Utc>>, FtpError> {
        FtpClient::last_modified(self, path).await
    }
}
