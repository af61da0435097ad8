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

//! Host target configuration from command line flags or a hosts file.

mod builder;
mod error;
mod loader;
mod types;
mod utils;

// Re-export public types
pub use builder::{resolve_targets, HostFlags};
pub use error::ConfigError;
pub use types::{HostEntry, HostsFile};
pub use utils::expand_tilde;
