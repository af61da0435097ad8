// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! SFTP file channels.
//!
//! Some sshd_config does not enable sftp by default. A line like
//! `Subsystem sftp internal-sftp` or `Subsystem sftp /usr/lib/openssh/sftp-server`
//! is needed in the remote sshd_config.

use async_trait::async_trait;
use russh_sftp::client::{fs::File, SftpSession};

use super::connection::Client;
use crate::ssh::transport::FileChannel;

/// An SFTP session running over its own channel.
pub struct SftpChannel {
    sftp: SftpSession,
}

impl SftpChannel {
    /// Open a channel on `client` and start the sftp subsystem on it.
    pub(super) async fn open(client: &Client) -> Result<Self, super::Error> {
        let channel = client.get_channel().await?;
        channel.request_subsystem(true, "sftp").await?;
        let sftp = SftpSession::new(channel.into_stream()).await?;
        Ok(Self { sftp })
    }
}

#[async_trait]
impl FileChannel for SftpChannel {
    type Reader = File;
    type Writer = File;

    async fn open(&self, path: &str) -> Result<File, super::Error> {
        Ok(self.sftp.open(path).await?)
    }

    async fn create(&self, path: &str) -> Result<File, super::Error> {
        Ok(self.sftp.create(path).await?)
    }

    async fn close(self) -> Result<(), super::Error> {
        Ok(self.sftp.close().await?)
    }
}
