//! An asynchronous SSH client for the tokio runtime, powered by the rust
//! ssh implementation russh.
//!
//! The heart of this module is [`SshTransport`], the production
//! implementation of the [`Transport`](crate::ssh::transport::Transport)
//! capability.
//!
//! # Features
//! * Connect to a SSH Host via IP or hostname
//! * Password and private key authentication
//! * Host key verification against known_hosts, including trust on first use
//! * Execute commands and capture their combined output and exit code
//! * SFTP file channels

pub mod authentication;
pub mod channel_manager;
pub mod connection;
pub mod error;
pub mod file_transfer;

pub use authentication::{AuthMethod, ServerCheckMethod};
pub use channel_manager::SshSession;
pub use connection::{Client, ClientHandler, SshTransport};
pub use error::Error;
pub use file_transfer::SftpChannel;
