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

//! SSH connection management and establishment.
//!
//! This module handles the low-level SSH connection establishment,
//! including address resolution, connection attempts, and initial handshake.

use async_trait::async_trait;
use russh::client::{Config, Handle, Handler};
use std::net::SocketAddr;
use std::sync::Arc;
use std::{fmt::Debug, io};

use super::authentication::{AuthMethod, ServerCheckMethod};
use super::channel_manager::SshSession;
use super::file_transfer::SftpChannel;
use crate::ssh::transport::{Connection, Transport};

/// A ssh connection to a remote server.
pub struct Client {
    pub(super) connection_handle: Handle<ClientHandler>,
    pub(super) username: String,
    pub(super) address: SocketAddr,
}

impl Client {
    /// Open a ssh connection to `address` (`host:port`) and authenticate.
    ///
    /// If `address` resolves to multiple socket addresses, each is tried in
    /// turn until one accepts the handshake. Authentication is attempted on
    /// the first successful connection only.
    pub async fn connect(
        address: &str,
        username: &str,
        auth: AuthMethod,
        server_check: ServerCheckMethod,
        config: Arc<Config>,
    ) -> Result<Self, super::Error> {
        let hostname = hostname_of(address);
        let socket_addrs = tokio::net::lookup_host(address)
            .await
            .map_err(super::Error::AddressInvalid)?;

        let mut connect_res = Err(super::Error::AddressInvalid(io::Error::new(
            io::ErrorKind::InvalidInput,
            "could not resolve to any addresses",
        )));
        for socket_addr in socket_addrs {
            let handler = ClientHandler::new(hostname.clone(), socket_addr, server_check.clone());
            match russh::client::connect(config.clone(), socket_addr, handler).await {
                Ok(h) => {
                    connect_res = Ok((socket_addr, h));
                    break;
                }
                Err(e) => {
                    tracing::debug!("Connection attempt to {} failed: {}", socket_addr, e);
                    connect_res = Err(e);
                }
            }
        }
        let (address, mut handle) = connect_res?;

        tracing::debug!(
            "Authenticating to {} as {} using {}",
            address,
            username,
            auth.kind()
        );
        super::authentication::authenticate(&mut handle, username, auth).await?;

        Ok(Self {
            connection_handle: handle,
            username: username.to_string(),
            address,
        })
    }

    /// Disconnect from the remote host.
    pub async fn disconnect(&self) -> Result<(), super::Error> {
        self.connection_handle
            .disconnect(russh::Disconnect::ByApplication, "", "")
            .await
            .map_err(super::Error::SshError)
    }

    /// Check if the connection is closed.
    pub fn is_closed(&self) -> bool {
        self.connection_handle.is_closed()
    }
}

impl Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("username", &self.username)
            .field("address", &self.address)
            .field("connection_handle", &"Handle<ClientHandler>")
            .finish()
    }
}

#[async_trait]
impl Connection for Client {
    type Session = SshSession;
    type FileChannel = SftpChannel;

    async fn new_session(&self) -> Result<SshSession, super::Error> {
        let channel = self.get_channel().await?;
        Ok(SshSession::new(channel))
    }

    async fn new_file_channel(&self) -> Result<SftpChannel, super::Error> {
        SftpChannel::open(self).await
    }

    async fn close(self) -> Result<(), super::Error> {
        if self.is_closed() {
            return Ok(());
        }
        self.disconnect().await
    }
}

/// Production [`Transport`] backed by russh.
#[derive(Debug, Clone)]
pub struct SshTransport {
    config: Arc<Config>,
    server_check: ServerCheckMethod,
}

impl SshTransport {
    pub fn new(server_check: ServerCheckMethod) -> Self {
        Self::with_config(Config::default(), server_check)
    }

    /// Same as `new`, but with a non default [`russh::client::Config`].
    pub fn with_config(config: Config, server_check: ServerCheckMethod) -> Self {
        Self {
            config: Arc::new(config),
            server_check,
        }
    }
}

#[async_trait]
impl Transport for SshTransport {
    type Connection = Client;

    async fn dial(
        &self,
        address: &str,
        user: &str,
        auth: AuthMethod,
    ) -> Result<Client, super::Error> {
        Client::connect(
            address,
            user,
            auth,
            self.server_check.clone(),
            self.config.clone(),
        )
        .await
    }
}

/// Host part of `host:port`, with IPv6 brackets removed.
fn hostname_of(address: &str) -> String {
    let host = match address.rsplit_once(':') {
        Some((host, port)) if port.parse::<u16>().is_ok() => host,
        _ => address,
    };
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .to_string()
}

/// SSH client handler for managing server key verification.
#[derive(Debug, Clone)]
pub struct ClientHandler {
    hostname: String,
    host: SocketAddr,
    server_check: ServerCheckMethod,
}

impl ClientHandler {
    /// Create a new client handler.
    pub fn new(hostname: String, host: SocketAddr, server_check: ServerCheckMethod) -> Self {
        Self {
            hostname,
            host,
            server_check,
        }
    }

    fn rejected(&self) -> super::Error {
        super::Error::ServerCheckFailed(format!("{}:{}", self.hostname, self.host.port()))
    }
}

impl Handler for ClientHandler {
    type Error = super::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        match &self.server_check {
            ServerCheckMethod::NoCheck => Ok(true),
            ServerCheckMethod::KnownHostsFile(known_hosts_path) => {
                let known = russh::keys::check_known_hosts_path(
                    &self.hostname,
                    self.host.port(),
                    server_public_key,
                    known_hosts_path,
                )
                .map_err(|e| {
                    tracing::error!("Host key check for {} failed: {}", self.hostname, e);
                    self.rejected()
                })?;

                if !known {
                    tracing::error!(
                        "Host {} is not present in {:?}",
                        self.hostname,
                        known_hosts_path
                    );
                }
                Ok(known)
            }
            ServerCheckMethod::AcceptNew(known_hosts_path) => {
                let known = russh::keys::check_known_hosts_path(
                    &self.hostname,
                    self.host.port(),
                    server_public_key,
                    known_hosts_path,
                )
                .map_err(|e| {
                    tracing::error!("Host key check for {} failed: {}", self.hostname, e);
                    self.rejected()
                })?;

                if !known {
                    tracing::info!(
                        "Adding new host key for {} to {:?}",
                        self.hostname,
                        known_hosts_path
                    );
                    russh::keys::known_hosts::learn_known_hosts_path(
                        &self.hostname,
                        self.host.port(),
                        server_public_key,
                        known_hosts_path,
                    )
                    .map_err(|e| {
                        tracing::warn!("Could not record host key for {}: {}", self.hostname, e);
                        self.rejected()
                    })?;
                }
                Ok(true)
            }
        }
    }
}
