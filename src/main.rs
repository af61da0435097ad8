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

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use std::time::{Duration, Instant};

use multissh::{
    cli::Cli,
    config::resolve_targets,
    executor::ParallelExecutor,
    ssh::{known_hosts::get_check_method, SshTransport},
    ui::OutputFormatter,
    utils::init_logging,
};

/// Format a Duration into a human-readable string
fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs_f64();

    if total_seconds < 1.0 {
        format!("{:.1} ms", total_seconds * 1000.0)
    } else if total_seconds < 60.0 {
        format!("{total_seconds:.2} s")
    } else {
        let minutes = duration.as_secs() / 60;
        let seconds = duration.as_secs() % 60;
        if seconds == 0 {
            format!("{minutes}m")
        } else {
            format!("{minutes}m {seconds}s")
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let targets = resolve_targets(cli.file.as_deref(), &cli.host_flags())
        .await
        .context("Invalid host configuration")?;

    let server_check = get_check_method(cli.strict_host_key_checking);
    tracing::debug!(
        "Host key checking: {} ({:?})",
        cli.strict_host_key_checking,
        server_check
    );

    let executor = ParallelExecutor::new(SshTransport::new(server_check))
        .with_max_parallel(cli.parallel)
        .with_connect_timeout(cli.connect_timeout())
        .with_progress(cli.show_progress());

    if !cli.json {
        print!("{}", OutputFormatter::format_run_header(targets.len()));
    }

    let start = Instant::now();
    let aggregate = executor
        .execute_all(targets)
        .await
        .context("Failed to run hosts")?;
    let elapsed = start.elapsed();

    if cli.json {
        let json = OutputFormatter::format_json(&aggregate).context("Failed to encode results")?;
        println!("{json}");
    } else {
        OutputFormatter::print_report(&aggregate);
        println!(
            "{}",
            format!("Completed in {}", format_duration(elapsed)).dimmed()
        );
    }

    if !aggregate.all_succeeded() {
        std::process::exit(1);
    }

    Ok(())
}
