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

//! Per-host error taxonomy.
//!
//! A [`HostError`] never leaves the host it happened on: it is stored in that
//! host's entry of the result aggregate.

use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::ssh::Error as SshError;

/// Coarse classification of a [`HostError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Local private key could not be read or parsed
    Key,
    /// Dial, handshake, authentication or timeout
    Dial,
    /// SFTP upload or download
    Transfer,
    /// Session failure or non-zero exit status
    Command,
    /// The host task itself failed
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Upload,
    Download,
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Upload => "upload",
            Self::Download => "download",
        })
    }
}

/// Step of a file transfer that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    OpenChannel,
    OpenLocal,
    CreateRemote,
    OpenRemote,
    CreateLocal,
    Copy,
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenChannel => "open-channel",
            Self::OpenLocal => "open-local",
            Self::CreateRemote => "create-remote",
            Self::OpenRemote => "open-remote",
            Self::CreateLocal => "create-local",
            Self::Copy => "copy",
        })
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to read private key '{path}': {source}")]
    KeyRead { path: String, source: io::Error },

    #[error("failed to parse private key '{path}': {source}")]
    KeyParse {
        path: String,
        source: russh::keys::Error,
    },

    #[error("failed to connect to {address}: {source}")]
    Dial { address: String, source: SshError },

    #[error("connection to {address} timed out after {}s", timeout.as_secs())]
    DialTimeout { address: String, timeout: Duration },

    #[error("{direction} failed at {stage} ({path}): {source}")]
    Transfer {
        direction: TransferDirection,
        stage: TransferStage,
        path: String,
        source: SshError,
    },

    #[error("session failed: {source}")]
    Session { source: SshError },

    #[error("command exited with status {status}: {}", output.trim_end())]
    Command { status: u32, output: String },

    #[error("host task failed: {reason}")]
    TaskFailed { reason: String },
}

impl HostError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyRead { .. } | Self::KeyParse { .. } => ErrorKind::Key,
            Self::Dial { .. } | Self::DialTimeout { .. } => ErrorKind::Dial,
            Self::Transfer { .. } => ErrorKind::Transfer,
            Self::Session { .. } | Self::Command { .. } => ErrorKind::Command,
            Self::TaskFailed { .. } => ErrorKind::Internal,
        }
    }

    pub(crate) fn transfer(
        direction: TransferDirection,
        stage: TransferStage,
        path: impl fmt::Display,
        source: impl Into<SshError>,
    ) -> Self {
        Self::Transfer {
            direction,
            stage,
            path: path.to_string(),
            source: source.into(),
        }
    }
}
