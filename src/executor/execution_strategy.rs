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

//! Per-host task body and progress reporting.

use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use super::actions::run_actions;
use super::connection_manager::connect;
use super::error::HostError;
use super::result_types::{AggregateWriter, HostOutcome};
use crate::ssh::{Connection, Transport};
use crate::target::HostTarget;

/// Progress bar tick rate configuration.
const PROGRESS_BAR_TICK_RATE_MS: u64 = 80;

/// Create a progress bar style for operations.
pub(crate) fn create_progress_style() -> Result<ProgressStyle> {
    ProgressStyle::default_bar()
        .template("{prefix:.bold} {spinner:.cyan} {msg}")
        .map_err(|e| anyhow::anyhow!("Failed to create progress bar template: {e}"))
        .map(|style| style.tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷ "))
}

/// Format host display name for progress bars.
pub(crate) fn format_host_display(address: &str) -> String {
    if address.chars().count() > 20 {
        let head: String = address.chars().take(17).collect();
        format!("{head}...")
    } else {
        address.to_string()
    }
}

/// Setup a progress bar for a host.
pub(crate) fn setup_progress_bar(
    multi_progress: &MultiProgress,
    address: &str,
    style: ProgressStyle,
    initial_message: &str,
) -> ProgressBar {
    let pb = multi_progress.add(ProgressBar::new_spinner());
    pb.set_style(style);
    pb.set_prefix(format!("[{}]", format_host_display(address)));
    pb.set_message(format!("{}", initial_message.cyan()));
    pb.enable_steady_tick(Duration::from_millis(PROGRESS_BAR_TICK_RATE_MS));
    pb
}

/// First line of an error, cut to fit next to a spinner.
fn short_error(e: &HostError) -> String {
    let error_msg = e.to_string();
    let first_line = error_msg.lines().next().unwrap_or("Unknown error");
    if first_line.chars().count() > 50 {
        let head: String = first_line.chars().take(47).collect();
        format!("{head}...")
    } else {
        first_line.to_string()
    }
}

/// Everything a host task needs besides its target.
pub(crate) struct HostTask<T: Transport> {
    pub transport: Arc<T>,
    pub connect_timeout: Duration,
    pub semaphore: Option<Arc<Semaphore>>,
    pub writer: AggregateWriter,
    pub pb: ProgressBar,
}

impl<T: Transport> HostTask<T> {
    /// Connect, run all actions, close the connection and record the
    /// outcome exactly once.
    pub(crate) async fn run(self, target: HostTarget) {
        let _permit = match &self.semaphore {
            Some(semaphore) => match semaphore.clone().acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(e) => {
                    self.pb
                        .finish_with_message(format!("{} {}", "●".red(), "Semaphore closed".red()));
                    self.writer.record(HostOutcome::new(
                        target.address.clone(),
                        Err(HostError::TaskFailed {
                            reason: format!("semaphore acquisition failed: {e}"),
                        }),
                    ));
                    return;
                }
            },
            None => None,
        };

        let result = self.connect_and_run(&target).await;

        match &result {
            Ok(_) => {
                self.pb
                    .finish_with_message(format!("{} {}", "●".green(), "Success".green()));
            }
            Err(e) => {
                tracing::warn!("Host {} failed: {}", target.address, e);
                self.pb
                    .finish_with_message(format!("{} {}", "●".red(), short_error(e).red()));
            }
        }

        self.writer.record(HostOutcome::new(target.address, result));
    }

    async fn connect_and_run(&self, target: &HostTarget) -> Result<String, HostError> {
        let connection = connect(self.transport.as_ref(), target, self.connect_timeout).await?;

        self.pb.set_message(format!("{}", running_message(target).blue()));
        let result = run_actions(&connection, target).await;

        if let Err(e) = connection.close().await {
            tracing::debug!("Closing connection to {} failed: {}", target.address, e);
        }
        result
    }
}

fn running_message(target: &HostTarget) -> &'static str {
    match (
        target.upload.is_some() || target.download.is_some(),
        target.command.is_some(),
    ) {
        (true, true) => "Transferring and executing...",
        (true, false) => "Transferring (SFTP)...",
        (false, true) => "Executing...",
        (false, false) => "Connected",
    }
}
