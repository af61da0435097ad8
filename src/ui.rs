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

use crate::executor::{HostOutcome, ResultAggregate};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::BTreeMap;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// One host in `--json` output.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct JsonOutcome {
    pub success: bool,
    pub output: String,
}

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn format_host_output(outcome: &HostOutcome) -> String {
        let mut output = String::new();

        let status_symbol = if outcome.is_success() {
            "✓".green().to_string()
        } else {
            "✗".red().to_string()
        };

        output.push_str(&format!(
            "\n{} {}\n",
            status_symbol,
            outcome.address.bold()
        ));

        match &outcome.result {
            Ok(text) => {
                if !text.is_empty() {
                    output.push_str(&Self::format_output_box(text, false));
                }
            }
            Err(e) => {
                output.push_str(&format!(
                    "{} Error: {}\n",
                    "✗".red(),
                    e.to_string().lines().next().unwrap_or_default().red()
                ));
                // Command failures carry their output; show all of it
                if let crate::executor::HostError::Command { output: text, .. } = e {
                    if !text.is_empty() {
                        output.push_str(&Self::format_output_box(text, true));
                    }
                }
            }
        }

        output
    }

    fn format_output_box(content: &str, is_error: bool) -> String {
        let mut output = String::new();
        let indent = "  ";
        let max_width = terminal_width().saturating_sub(4).max(1);

        let mut push_line = |line: &str| {
            if is_error {
                output.push_str(&format!("{}{}\n", indent, line.dimmed()));
            } else {
                output.push_str(&format!("{indent}{line}\n"));
            }
        };

        for line in content.lines() {
            let mut remaining = line;
            while remaining.width() > max_width {
                let (chunk, rest) = Self::split_at_width(remaining, max_width);
                if chunk.is_empty() {
                    break;
                }
                push_line(chunk);
                remaining = rest;
            }
            push_line(remaining);
        }

        output
    }

    fn split_at_width(s: &str, max_width: usize) -> (&str, &str) {
        let mut width = 0;
        let mut split_pos = 0;

        for (i, ch) in s.char_indices() {
            let ch_width = ch.width().unwrap_or(0);
            if width + ch_width > max_width {
                break;
            }
            width += ch_width;
            split_pos = i + ch.len_utf8();
        }

        s.split_at(split_pos)
    }

    pub fn format_summary(total: usize, success: usize, failed: usize) -> String {
        let mut parts = Vec::new();

        parts.push(format!(
            "{} {}",
            total.to_string().bold(),
            if total == 1 { "host" } else { "hosts" }
        ));

        if success > 0 {
            parts.push(format!(
                "{} {}",
                success.to_string().green().bold(),
                "successful".green()
            ));
        }

        if failed > 0 {
            parts.push(format!(
                "{} {}",
                failed.to_string().red().bold(),
                "failed".red()
            ));
        }

        let summary = parts.join(" • ");
        let border = "═".repeat(terminal_width());

        format!(
            "\n{}\n{}\n{}\n",
            border.dimmed(),
            format!(" Summary: {summary} ").bold(),
            border.dimmed()
        )
    }

    pub fn format_run_header(host_count: usize) -> String {
        format!(
            "\n{} {} on {} {}\n",
            "►".cyan().bold(),
            "Running".cyan(),
            host_count.to_string().bold(),
            if host_count == 1 { "host" } else { "hosts" },
        )
    }

    /// `{"<address>": {"success": bool, "output": "<text>"}}`
    pub fn format_json(aggregate: &ResultAggregate) -> serde_json::Result<String> {
        let map: BTreeMap<&str, JsonOutcome> = aggregate
            .iter()
            .map(|outcome| {
                (
                    outcome.address.as_str(),
                    JsonOutcome {
                        success: outcome.is_success(),
                        output: outcome.text(),
                    },
                )
            })
            .collect();
        serde_json::to_string_pretty(&map)
    }

    /// Print the colored per-host report followed by the summary.
    pub fn print_report(aggregate: &ResultAggregate) {
        for outcome in aggregate.iter() {
            outcome.print_output();
        }
        print!(
            "{}",
            Self::format_summary(
                aggregate.len(),
                aggregate.success_count(),
                aggregate.failure_count()
            )
        );
    }
}
