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

//! Hosts file loading and conversion into targets.

use std::path::Path;
use tokio::fs;

use super::builder::transfer_path;
use super::error::ConfigError;
use super::types::{HostEntry, HostsFile};
use crate::target::{normalize_address, Credential, FileTransfer, HostTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Some(Self::Json),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl HostsFile {
    /// Load a hosts file, choosing JSON or YAML by extension.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path.display().to_string();
        let format = Format::from_path(path).ok_or_else(|| ConfigError::UnsupportedExtension {
            path: path_str.clone(),
        })?;

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::FileReadError {
                path: path_str.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!("Parsing hosts file {} as {:?}", path_str, format);
        Self::parse(&content, format == Format::Json).map_err(|reason| ConfigError::ParseError {
            path: path_str,
            reason,
        })
    }

    fn parse(content: &str, json: bool) -> Result<Self, String> {
        if json {
            serde_json::from_str(content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(content).map_err(|e| e.to_string())
        }
    }

    /// Validate every entry and build targets in file order.
    pub fn into_targets(self, path: &Path) -> Result<Vec<HostTarget>, ConfigError> {
        let path_str = path.display().to_string();
        if self.hosts.is_empty() {
            return Err(ConfigError::EmptyHostsFile { path: path_str });
        }

        self.hosts
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                entry.to_target().map_err(|e| ConfigError::InvalidEntry {
                    path: path_str.clone(),
                    index: i + 1,
                    source: Box::new(e),
                })
            })
            .collect()
    }
}

impl HostEntry {
    pub fn to_target(&self) -> Result<HostTarget, ConfigError> {
        let address = normalize_address(&self.address)?;
        let credential =
            Credential::from_parts(&address, self.password.as_deref(), self.key.as_deref())?;
        let filename = self.file_name.as_deref();
        let upload = transfer_path("uploadfilepath", self.upload_file_path.as_deref())?;
        let download = transfer_path("downloadfilepath", self.download_file_path.as_deref())?;

        Ok(HostTarget::new(&address, &self.user, credential)?
            .with_command(self.command.as_deref())
            .with_upload(upload.map(|p| FileTransfer::upload(p, filename)))
            .with_download(download.map(|p| FileTransfer::download(p, filename))))
    }
}
