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

//! Result types for parallel execution operations.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::error::HostError;
use crate::ui::OutputFormatter;

/// Result of all actions on a single host.
#[derive(Debug)]
pub struct HostOutcome {
    pub address: String,
    pub result: Result<String, HostError>,
}

impl HostOutcome {
    pub fn new(address: impl Into<String>, result: Result<String, HostError>) -> Self {
        Self {
            address: address.into(),
            result,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Output on success, `error: <description>` on failure.
    pub fn text(&self) -> String {
        match &self.result {
            Ok(output) => output.clone(),
            Err(e) => format!("error: {e}"),
        }
    }

    pub fn print_output(&self) {
        print!("{}", OutputFormatter::format_host_output(self));
    }
}

/// Final mapping from host address to outcome, available once every host
/// task has finished.
#[derive(Debug, Default)]
pub struct ResultAggregate {
    entries: BTreeMap<String, HostOutcome>,
}

impl ResultAggregate {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, address: &str) -> Option<&HostOutcome> {
        self.entries.get(address)
    }

    /// Text of one host's outcome.
    pub fn text(&self, address: &str) -> Option<String> {
        self.get(address).map(HostOutcome::text)
    }

    /// Outcomes ordered by address.
    pub fn iter(&self) -> impl Iterator<Item = &HostOutcome> {
        self.entries.values()
    }

    pub fn success_count(&self) -> usize {
        self.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.iter().all(HostOutcome::is_success)
    }

    /// Address to text view of the whole aggregate.
    pub fn to_text_map(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(address, outcome)| (address.clone(), outcome.text()))
            .collect()
    }
}

impl IntoIterator for ResultAggregate {
    type Item = HostOutcome;
    type IntoIter = std::collections::btree_map::IntoValues<String, HostOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

/// Shared write side of the aggregate used by host tasks.
///
/// Each insert takes the lock only for the insert itself. A later record for
/// the same address replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct AggregateWriter {
    entries: Arc<Mutex<BTreeMap<String, HostOutcome>>>,
}

impl AggregateWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, HostOutcome>> {
        // A panic while holding the lock cannot leave a half-written map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record(&self, outcome: HostOutcome) {
        self.lock().insert(outcome.address.clone(), outcome);
    }

    pub fn contains(&self, address: &str) -> bool {
        self.lock().contains_key(address)
    }

    /// Take the collected entries. Call only after every task has joined.
    pub fn finish(self) -> ResultAggregate {
        let entries = std::mem::take(&mut *self.lock());
        ResultAggregate { entries }
    }
}
