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

//! Abstract transport capability used by the executor.
//!
//! The executor only ever talks to these traits. [`SshTransport`] is the
//! production implementation backed by russh; tests supply an in-memory one.
//!
//! [`SshTransport`]: super::tokio_client::SshTransport

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use super::tokio_client::{AuthMethod, Error};

/// Output of a remote command with stdout and stderr interleaved in arrival
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CombinedOutput {
    pub output: Vec<u8>,
    /// The unix exit status (`$?` in bash).
    pub exit_status: u32,
}

impl CombinedOutput {
    /// Output decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

/// Something that can open authenticated connections to remote hosts.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;

    /// Dial `address` (`host:port`) and authenticate as `user`.
    async fn dial(
        &self,
        address: &str,
        user: &str,
        auth: AuthMethod,
    ) -> Result<Self::Connection, Error>;
}

/// An established, authenticated connection.
#[async_trait]
pub trait Connection: Send + Sync + 'static {
    type Session: Session;
    type FileChannel: FileChannel;

    /// Open a command session.
    async fn new_session(&self) -> Result<Self::Session, Error>;

    /// Open a file transfer (SFTP) channel.
    async fn new_file_channel(&self) -> Result<Self::FileChannel, Error>;

    async fn close(self) -> Result<(), Error>;
}

/// A command session. One command per session.
#[async_trait]
pub trait Session: Send + 'static {
    /// Run `command` and capture stdout and stderr into one stream.
    async fn run_combined(&mut self, command: &str) -> Result<CombinedOutput, Error>;

    async fn close(self) -> Result<(), Error>;
}

/// A file transfer channel able to open and create remote files.
#[async_trait]
pub trait FileChannel: Send + Sync + 'static {
    /// Remote read handle. Shutting it down closes the remote file.
    type Reader: AsyncRead + AsyncWrite + Unpin + Send + 'static;
    type Writer: AsyncWrite + Unpin + Send + 'static;

    /// Open an existing remote file for reading.
    async fn open(&self, path: &str) -> Result<Self::Reader, Error>;

    /// Create or truncate a remote file for writing.
    async fn create(&self, path: &str) -> Result<Self::Writer, Error>;

    async fn close(self) -> Result<(), Error>;
}
