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

//! Transport-level error type.

use std::io;

/// Errors raised by an SSH transport while dialing, authenticating, or
/// driving channels on an established connection.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Key authentication failed")]
    KeyAuthFailed,
    #[error("Password authentication failed")]
    PasswordWrong,
    #[error("Server host key verification failed for {0}")]
    ServerCheckFailed(String),
    #[error("Unable to resolve address: {0}")]
    AddressInvalid(io::Error),
    #[error("Command exited without reporting an exit status")]
    CommandDidntExit,
    #[error("SSH error: {0}")]
    SshError(#[from] russh::Error),
    #[error("SFTP error: {0}")]
    SftpError(#[from] russh_sftp::client::error::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}
