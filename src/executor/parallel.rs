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

//! Core parallel executor implementation.

use anyhow::Result;
use futures::future::join_all;
use indicatif::{MultiProgress, ProgressDrawTarget};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use super::connection_manager::DEFAULT_CONNECT_TIMEOUT;
use super::error::HostError;
use super::execution_strategy::{create_progress_style, setup_progress_bar, HostTask};
use super::result_types::{AggregateWriter, HostOutcome, ResultAggregate};
use crate::ssh::Transport;
use crate::target::HostTarget;

/// Fans a set of host targets out to one task per host and collects the
/// outcomes once every task has finished.
pub struct ParallelExecutor<T: Transport> {
    pub(crate) transport: Arc<T>,
    pub(crate) max_parallel: Option<usize>,
    pub(crate) connect_timeout: Duration,
    pub(crate) show_progress: bool,
}

impl<T: Transport> ParallelExecutor<T> {
    /// Create an executor with no concurrency bound and the default dial
    /// timeout. Progress display is off until enabled.
    pub fn new(transport: T) -> Self {
        Self::with_shared_transport(Arc::new(transport))
    }

    pub fn with_shared_transport(transport: Arc<T>) -> Self {
        Self {
            transport,
            max_parallel: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            show_progress: false,
        }
    }

    /// Bound the number of hosts in flight. `None` or `Some(0)` means
    /// unbounded.
    pub fn with_max_parallel(mut self, max_parallel: Option<usize>) -> Self {
        self.max_parallel = max_parallel.filter(|n| *n > 0);
        self
    }

    /// Set the dial timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Show per-host spinners.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run every target concurrently and return the completed aggregate.
    ///
    /// The aggregate holds exactly one entry per distinct address. A host
    /// whose task panicked is recorded as a task failure.
    pub async fn execute_all(&self, targets: Vec<HostTarget>) -> Result<ResultAggregate> {
        let semaphore = self.max_parallel.map(|n| Arc::new(Semaphore::new(n)));
        let multi_progress = if self.show_progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };
        let style = create_progress_style()?;
        let writer = AggregateWriter::new();

        tracing::info!(
            "Running on {} host(s), max parallel: {}",
            targets.len(),
            self.max_parallel
                .map_or_else(|| "unbounded".to_string(), |n| n.to_string())
        );

        let (addresses, tasks): (Vec<_>, Vec<_>) = targets
            .into_iter()
            .map(|target| {
                let pb = setup_progress_bar(
                    &multi_progress,
                    &target.address,
                    style.clone(),
                    "Connecting...",
                );
                let task = HostTask {
                    transport: Arc::clone(&self.transport),
                    connect_timeout: self.connect_timeout,
                    semaphore: semaphore.clone(),
                    writer: writer.clone(),
                    pb,
                };
                (target.address.clone(), tokio::spawn(task.run(target)))
            })
            .unzip();

        let results = join_all(tasks).await;
        for (address, result) in addresses.into_iter().zip(results) {
            if let Err(e) = result {
                tracing::error!("Task for {} failed: {}", address, e);
                writer.record(HostOutcome::new(
                    address,
                    Err(HostError::TaskFailed {
                        reason: e.to_string(),
                    }),
                ));
            }
        }

        Ok(writer.finish())
    }
}
