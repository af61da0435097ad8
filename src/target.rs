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

//! Host targets: one remote host plus the actions to perform on it.

use std::fmt;
use std::path::PathBuf;
use zeroize::Zeroizing;

use crate::config::ConfigError;

pub const DEFAULT_SSH_PORT: u16 = 22;

/// How to authenticate to a host.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Password(Zeroizing<String>),
    KeyFile(PathBuf),
}

impl Credential {
    /// Pick exactly one credential. Empty strings count as unset.
    pub fn from_parts(
        address: &str,
        password: Option<&str>,
        key: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let password = password.filter(|p| !p.is_empty());
        let key = key.filter(|k| !k.is_empty());

        match (password, key) {
            (Some(password), None) => Ok(Self::Password(Zeroizing::new(password.to_string()))),
            (None, Some(key)) => Ok(Self::KeyFile(crate::config::expand_tilde(key))),
            (Some(_), Some(_)) => Err(ConfigError::ConflictingCredentials {
                address: address.to_string(),
            }),
            (None, None) => Err(ConfigError::MissingCredential {
                address: address.to_string(),
            }),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password(_) => f.write_str("Password(<redacted>)"),
            Self::KeyFile(path) => f.debug_tuple("KeyFile").field(path).finish(),
        }
    }
}

/// A single file copy between the local machine and a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTransfer {
    pub local: PathBuf,
    pub remote: String,
}

impl FileTransfer {
    /// Upload `local`; the remote name is `filename` or else the same path.
    pub fn upload(local: &str, filename: Option<&str>) -> Self {
        let remote = filename.filter(|f| !f.is_empty()).unwrap_or(local);
        Self {
            local: PathBuf::from(local),
            remote: remote.to_string(),
        }
    }

    /// Download `remote`; the local name is `filename` or else the same path.
    pub fn download(remote: &str, filename: Option<&str>) -> Self {
        let local = filename.filter(|f| !f.is_empty()).unwrap_or(remote);
        Self {
            local: PathBuf::from(local),
            remote: remote.to_string(),
        }
    }
}

/// One remote host and what to do there.
///
/// Actions run in the fixed order upload, download, command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    pub address: String,
    pub user: String,
    pub credential: Credential,
    pub command: Option<String>,
    pub upload: Option<FileTransfer>,
    pub download: Option<FileTransfer>,
}

impl HostTarget {
    /// Validate the address and user and build a target with no actions.
    pub fn new(address: &str, user: &str, credential: Credential) -> Result<Self, ConfigError> {
        let address = normalize_address(address)?;
        if user.trim().is_empty() {
            return Err(ConfigError::MissingUser { address });
        }

        Ok(Self {
            address,
            user: user.to_string(),
            credential,
            command: None,
            upload: None,
            download: None,
        })
    }

    pub fn with_command(mut self, command: Option<&str>) -> Self {
        self.command = command.filter(|c| !c.is_empty()).map(str::to_string);
        self
    }

    pub fn with_upload(mut self, upload: Option<FileTransfer>) -> Self {
        self.upload = upload;
        self
    }

    pub fn with_download(mut self, download: Option<FileTransfer>) -> Self {
        self.download = download;
        self
    }

    pub fn has_actions(&self) -> bool {
        self.command.is_some() || self.upload.is_some() || self.download.is_some()
    }
}

impl fmt::Display for HostTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.address)
    }
}

/// Turn a user supplied address into `host:port`.
///
/// Accepted forms:
/// - host
/// - host:port
/// - [ipv6]
/// - [ipv6]:port
/// - bare ipv6 literal (no port)
pub fn normalize_address(raw: &str) -> Result<String, ConfigError> {
    let raw = raw.trim();
    let invalid = |reason: &str| ConfigError::InvalidAddress {
        address: raw.to_string(),
        reason: reason.to_string(),
    };

    if raw.is_empty() {
        return Err(invalid("address is empty"));
    }

    if let Some(rest) = raw.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| invalid("unclosed '['"))?;
        if host.is_empty() {
            return Err(invalid("empty host"));
        }
        let port = match tail {
            "" => DEFAULT_SSH_PORT,
            _ => {
                let port_str = tail
                    .strip_prefix(':')
                    .ok_or_else(|| invalid("unexpected text after ']'"))?;
                parse_port(port_str).ok_or_else(|| invalid("invalid port number"))?
            }
        };
        return Ok(format!("[{host}]:{port}"));
    }

    match raw.matches(':').count() {
        0 => Ok(format!("{raw}:{DEFAULT_SSH_PORT}")),
        1 => {
            let (host, port_str) = raw.split_once(':').ok_or_else(|| invalid("missing port"))?;
            if host.is_empty() {
                return Err(invalid("empty host"));
            }
            let port = parse_port(port_str).ok_or_else(|| invalid("invalid port number"))?;
            Ok(format!("{host}:{port}"))
        }
        // Bare IPv6 literal; a port needs the bracketed form.
        _ => Ok(format!("[{raw}]:{DEFAULT_SSH_PORT}")),
    }
}

fn parse_port(port: &str) -> Option<u16> {
    port.parse::<u16>().ok().filter(|p| *p != 0)
}
