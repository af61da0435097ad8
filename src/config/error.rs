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

//! Error types for building host targets from flags or a hosts file.

use thiserror::Error;

/// Errors detected before any host is dialed. All of them are fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither `--address` nor `--file` was given
    #[error("no hosts specified: pass at least one --address or a --file")]
    NoHosts,

    /// Address that cannot be turned into `host:port`
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("host '{address}': user must not be empty")]
    MissingUser { address: String },

    #[error("host '{address}': either a password or a key is required")]
    MissingCredential { address: String },

    #[error("host '{address}': password and key are mutually exclusive")]
    ConflictingCredentials { address: String },

    /// A per-host flag was repeated a different number of times than `--address`
    #[error("--{flag} was given {actual} time(s) but there are {expected} address(es)")]
    CountMismatch {
        flag: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("--password and --key cannot be used together")]
    MixedCredentialFlags,

    #[error("either --password or --key is required")]
    NoCredentialFlags,

    /// No command and no transfer requested on the command line
    #[error("--cmd is required unless --upload or --download is given")]
    MissingCommand,

    /// A transfer was requested with an empty path
    #[error("{flag} must not be empty")]
    EmptyTransferPath { flag: &'static str },

    /// `--file` mixed with host flags
    #[error("--file cannot be combined with {flags}")]
    FileWithFlags { flags: String },

    #[error("unsupported hosts file '{path}': expected a .json, .yaml or .yml extension")]
    UnsupportedExtension { path: String },

    #[error("failed to read hosts file '{path}': {reason}")]
    FileReadError { path: String, reason: String },

    #[error("failed to parse hosts file '{path}': {reason}")]
    ParseError { path: String, reason: String },

    #[error("hosts file '{path}' does not list any hosts")]
    EmptyHostsFile { path: String },

    /// An entry of the hosts file violated a target rule
    #[error("hosts file '{path}', entry {index}: {source}")]
    InvalidEntry {
        path: String,
        index: usize,
        source: Box<ConfigError>,
    },
}
