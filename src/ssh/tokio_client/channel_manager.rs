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

//! SSH channel operations for command execution.

use async_trait::async_trait;
use russh::client::Msg;
use russh::Channel;

use super::connection::Client;
use crate::ssh::transport::{CombinedOutput, Session};

/// Buffer size for SSH command output
/// - 8KB matches typical SSH channel window sizes
const SSH_CMD_BUFFER_SIZE: usize = 8192;

impl Client {
    /// Get a new SSH channel for communication.
    pub async fn get_channel(&self) -> Result<Channel<Msg>, super::Error> {
        self.connection_handle
            .channel_open_session()
            .await
            .map_err(super::Error::SshError)
    }
}

/// A command session on top of a single `session` channel.
pub struct SshSession {
    channel: Channel<Msg>,
}

impl SshSession {
    pub(super) fn new(channel: Channel<Msg>) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl Session for SshSession {
    /// Execute a remote command and capture stdout and stderr into one buffer
    /// in the order the server sent them.
    ///
    /// Make sure your commands don't read from stdin and exit after bounded time.
    async fn run_combined(&mut self, command: &str) -> Result<CombinedOutput, super::Error> {
        let mut output = Vec::with_capacity(SSH_CMD_BUFFER_SIZE);
        self.channel.exec(true, command).await?;

        let mut exit_status: Option<u32> = None;

        while let Some(msg) = self.channel.wait().await {
            match msg {
                russh::ChannelMsg::Data { ref data } => output.extend_from_slice(data),
                russh::ChannelMsg::ExtendedData { ref data, .. } => {
                    output.extend_from_slice(data)
                }

                // The exit status may arrive before the last data packet, so
                // keep draining until the channel closes.
                russh::ChannelMsg::ExitStatus {
                    exit_status: status,
                } => exit_status = Some(status),

                // RFC 4254 5.3 permits closing without EOF, and EOF can precede
                // data, so it is not a termination signal here.
                _ => {}
            }
        }

        match exit_status {
            Some(exit_status) => Ok(CombinedOutput {
                output,
                exit_status,
            }),
            None => Err(super::Error::CommandDidntExit),
        }
    }

    async fn close(self) -> Result<(), super::Error> {
        self.channel.close().await.map_err(super::Error::SshError)
    }
}
