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

//! Hosts file document types.

use serde::{Deserialize, Serialize};

/// Top level of a JSON or YAML hosts file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostsFile {
    #[serde(default)]
    pub hosts: Vec<HostEntry>,
}

/// One host as written in a hosts file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostEntry {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub user: String,
    pub password: Option<String>,
    pub key: Option<String>,
    pub command: Option<String>,
    #[serde(rename = "uploadfilepath")]
    pub upload_file_path: Option<String>,
    #[serde(rename = "downloadfilepath")]
    pub download_file_path: Option<String>,
    /// Remote name for the upload, local name for the download
    #[serde(rename = "filename")]
    pub file_name: Option<String>,
}
