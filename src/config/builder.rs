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

//! Building host targets from positionally aligned flags.

use std::path::Path;

use super::error::ConfigError;
use super::types::HostsFile;
use crate::target::{normalize_address, Credential, FileTransfer, HostTarget};

/// Host related command line values. The i-th user, password, key and
/// command belong to the i-th address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostFlags {
    pub addresses: Vec<String>,
    pub users: Vec<String>,
    pub passwords: Vec<String>,
    pub keys: Vec<String>,
    pub commands: Vec<String>,
    pub upload: Option<String>,
    pub download: Option<String>,
    pub filename: Option<String>,
}

impl HostFlags {
    /// Names of the host flags that were given, for error reporting.
    fn given(&self) -> Vec<&'static str> {
        let mut given = Vec::new();
        let lists: [(&'static str, bool); 5] = [
            ("--address", !self.addresses.is_empty()),
            ("--user", !self.users.is_empty()),
            ("--password", !self.passwords.is_empty()),
            ("--key", !self.keys.is_empty()),
            ("--cmd", !self.commands.is_empty()),
        ];
        let singles: [(&'static str, bool); 3] = [
            ("--upload", self.upload.is_some()),
            ("--download", self.download.is_some()),
            ("--filename", self.filename.is_some()),
        ];
        for (name, present) in lists.into_iter().chain(singles) {
            if present {
                given.push(name);
            }
        }
        given
    }

    pub fn is_empty(&self) -> bool {
        self.given().is_empty()
    }

    /// Validate flag counts and build one target per address.
    pub fn build(&self) -> Result<Vec<HostTarget>, ConfigError> {
        let expected = self.addresses.len();
        if expected == 0 {
            return Err(ConfigError::NoHosts);
        }

        check_count("user", expected, self.users.len())?;

        match (self.passwords.is_empty(), self.keys.is_empty()) {
            (true, true) => return Err(ConfigError::NoCredentialFlags),
            (false, false) => return Err(ConfigError::MixedCredentialFlags),
            (false, true) => check_count("password", expected, self.passwords.len())?,
            (true, false) => check_count("key", expected, self.keys.len())?,
        }

        let upload = transfer_path("--upload", self.upload.as_deref())?;
        let download = transfer_path("--download", self.download.as_deref())?;

        if self.commands.is_empty() {
            if upload.is_none() && download.is_none() {
                return Err(ConfigError::MissingCommand);
            }
        } else {
            check_count("cmd", expected, self.commands.len())?;
        }

        let filename = self.filename.as_deref();
        let upload = upload.map(|p| FileTransfer::upload(p, filename));
        let download = download.map(|p| FileTransfer::download(p, filename));

        self.addresses
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let address = normalize_address(raw)?;
                let credential = Credential::from_parts(
                    &address,
                    self.passwords.get(i).map(String::as_str),
                    self.keys.get(i).map(String::as_str),
                )?;

                Ok(HostTarget::new(&address, &self.users[i], credential)?
                    .with_command(self.commands.get(i).map(String::as_str))
                    .with_upload(upload.clone())
                    .with_download(download.clone()))
            })
            .collect()
    }
}

/// A requested transfer must name a file.
pub(super) fn transfer_path<'a>(
    flag: &'static str,
    path: Option<&'a str>,
) -> Result<Option<&'a str>, ConfigError> {
    match path {
        Some(p) if p.trim().is_empty() => Err(ConfigError::EmptyTransferPath { flag }),
        other => Ok(other),
    }
}

fn check_count(flag: &'static str, expected: usize, actual: usize) -> Result<(), ConfigError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ConfigError::CountMismatch {
            flag,
            expected,
            actual,
        })
    }
}

/// Resolve the full target list from either a hosts file or host flags.
///
/// The two sources are mutually exclusive.
pub async fn resolve_targets(
    file: Option<&Path>,
    flags: &HostFlags,
) -> Result<Vec<HostTarget>, ConfigError> {
    match file {
        Some(path) => {
            let given = flags.given();
            if !given.is_empty() {
                return Err(ConfigError::FileWithFlags {
                    flags: given.join(", "),
                });
            }
            let targets = HostsFile::load(path).await?.into_targets(path)?;
            tracing::info!("Loaded {} host(s) from {}", targets.len(), path.display());
            Ok(targets)
        }
        None => flags.build(),
    }
}
