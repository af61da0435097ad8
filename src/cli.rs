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

use clap::builder::RangedU64ValueParser;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::HostFlags;
use crate::ssh::known_hosts::StrictHostKeyChecking;

#[derive(Parser, Debug)]
#[command(
    name = "multissh",
    version,
    about = "Run commands and transfer files on many SSH hosts in parallel",
    long_about = "multissh connects to every given host concurrently, optionally uploads and/or downloads a file\nover SFTP, optionally runs a command, and reports the result of each host.\nHosts come either from repeatable per-host flags or from a JSON/YAML hosts file.\n\nExit codes: 0 (all hosts succeed), 1 (any failure)",
    after_help = "EXAMPLES:\n  Run on two hosts:        multissh -a 10.0.0.1 -u root -p pw1 -c uptime -a 10.0.0.2 -u root -p pw2 -c uptime\n  Key authentication:      multissh -a web1 -u deploy -k ~/.ssh/id_ed25519 -c 'df -h'\n  Upload then run:         multissh -a web1 -u deploy -k ~/.ssh/id_ed25519 --upload ./app.sh --filename /tmp/app.sh -c 'sh /tmp/app.sh'\n  From a hosts file:       multissh -f hosts.yaml --json"
)]
pub struct Cli {
    #[arg(
        short = 'a',
        long = "address",
        help = "Host address as host[:port] (repeatable, port defaults to 22)"
    )]
    pub addresses: Vec<String>,

    #[arg(
        short = 'u',
        long = "user",
        help = "Login user for the address at the same position (repeatable)"
    )]
    pub users: Vec<String>,

    #[arg(
        short = 'p',
        long = "password",
        help = "Password for the address at the same position (repeatable)\nCannot be combined with --key"
    )]
    pub passwords: Vec<String>,

    #[arg(
        short = 'k',
        long = "key",
        help = "Private key file for the address at the same position (repeatable)\nCannot be combined with --password"
    )]
    pub keys: Vec<String>,

    #[arg(
        short = 'c',
        long = "cmd",
        help = "Command for the address at the same position (repeatable)\nOptional when --upload or --download is given"
    )]
    pub commands: Vec<String>,

    #[arg(
        short = 'f',
        long,
        help = "Hosts file (.json, .yaml or .yml)\nCannot be combined with any per-host flag"
    )]
    pub file: Option<PathBuf>,

    #[arg(long, help = "Local file to upload to every host")]
    pub upload: Option<String>,

    #[arg(long, help = "Remote file to download from every host")]
    pub download: Option<String>,

    #[arg(
        long,
        help = "Remote name for --upload and local name for --download\nDefaults to the same path as the source"
    )]
    pub filename: Option<String>,

    #[arg(
        long,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..),
        help = "Maximum number of hosts in flight [default: unbounded]"
    )]
    pub parallel: Option<usize>,

    #[arg(
        long,
        default_value = "10",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "SSH connection timeout in seconds (minimum: 1)"
    )]
    pub connect_timeout: u64,

    #[arg(
        long,
        default_value = "accept-new",
        help = "Host key checking mode (yes/no/accept-new) [default: accept-new]\n  yes        - Strict checking against known_hosts\n  no         - Accept all host keys\n  accept-new - Accept new hosts, reject changed keys"
    )]
    pub strict_host_key_checking: StrictHostKeyChecking,

    #[arg(long, help = "Print results as JSON keyed by host address")]
    pub json: bool,

    #[arg(long, help = "Disable per-host progress spinners")]
    pub no_progress: bool,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
}

impl Cli {
    /// Host related values in the shape the target builder expects.
    pub fn host_flags(&self) -> HostFlags {
        HostFlags {
            addresses: self.addresses.clone(),
            users: self.users.clone(),
            passwords: self.passwords.clone(),
            keys: self.keys.clone(),
            commands: self.commands.clone(),
            upload: self.upload.clone(),
            download: self.download.clone(),
            filename: self.filename.clone(),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Spinners are drawn on an interactive stderr unless disabled or
    /// printing JSON.
    pub fn show_progress(&self) -> bool {
        !self.no_progress && !self.json && std::io::stderr().is_terminal()
    }
}
