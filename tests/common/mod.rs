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

//! In-memory transport for executor tests.
//!
//! Every host gets its own file map. Commands understood by the fake shell:
//! - `echo TEXT` prints `TEXT\n`
//! - `cat PATH` prints a file from the host's file map
//! - `warn TEXT` prints `TEXT\n` as stderr
//! - `exit N` exits with status N
//! - `CMD; exit N` runs CMD then exits with status N
//! - `panic` panics the calling task
//!
//! Anything else exits 127.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io::{self, Cursor};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use multissh::ssh::{
    AuthMethod, CombinedOutput, Connection, Error, FileChannel, Session, Transport,
};
use multissh::target::{Credential, HostTarget};

pub const TEST_KEY_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/id_ed25519_test");

type FileMap = HashMap<String, Vec<u8>>;

#[derive(Default)]
pub struct MockState {
    files: Mutex<HashMap<String, FileMap>>,
    failing: Mutex<HashSet<String>>,
    hanging: Mutex<HashSet<String>>,
    no_sftp: Mutex<HashSet<String>>,
    dial_delay: Mutex<Option<Duration>>,
    auth_kinds: Mutex<Vec<(String, &'static str)>>,
    pub dials: AtomicUsize,
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    connected: AtomicUsize,
    pub max_connected: AtomicUsize,
}

impl MockState {
    fn open_resource(&self) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }

    fn close_resource(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
pub struct MockTransport {
    pub state: Arc<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dialing `address` fails with connection refused.
    pub fn failing(self, address: &str) -> Self {
        self.state.failing.lock().unwrap().insert(address.to_string());
        self
    }

    /// Dialing `address` never completes.
    pub fn hanging(self, address: &str) -> Self {
        self.state.hanging.lock().unwrap().insert(address.to_string());
        self
    }

    /// `address` has no sftp subsystem.
    pub fn without_sftp(self, address: &str) -> Self {
        self.state.no_sftp.lock().unwrap().insert(address.to_string());
        self
    }

    /// Every dial takes this long before succeeding.
    pub fn with_dial_delay(self, delay: Duration) -> Self {
        *self.state.dial_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn put_file(&self, address: &str, path: &str, contents: &[u8]) {
        self.state
            .files
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_default()
            .insert(path.to_string(), contents.to_vec());
    }

    pub fn file(&self, address: &str, path: &str) -> Option<Vec<u8>> {
        self.state
            .files
            .lock()
            .unwrap()
            .get(address)
            .and_then(|files| files.get(path).cloned())
    }

    pub fn dials(&self) -> usize {
        self.state.dials.load(Ordering::SeqCst)
    }

    pub fn auth_kinds(&self) -> Vec<(String, &'static str)> {
        self.state.auth_kinds.lock().unwrap().clone()
    }

    /// Every opened connection, session and channel was closed.
    pub fn all_closed(&self) -> bool {
        self.state.opened.load(Ordering::SeqCst) == self.state.closed.load(Ordering::SeqCst)
    }

    /// Connections, sessions, channels and remote handles still open.
    pub fn open_resources(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst) - self.state.closed.load(Ordering::SeqCst)
    }

    pub fn max_connected(&self) -> usize {
        self.state.max_connected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Connection = MockConnection;

    async fn dial(
        &self,
        address: &str,
        _user: &str,
        auth: AuthMethod,
    ) -> Result<MockConnection, Error> {
        self.state.dials.fetch_add(1, Ordering::SeqCst);
        self.state
            .auth_kinds
            .lock()
            .unwrap()
            .push((address.to_string(), auth.kind()));

        let hang = self.state.hanging.lock().unwrap().contains(address);
        let fail = self.state.failing.lock().unwrap().contains(address);
        if hang {
            std::future::pending::<()>().await;
        }
        if fail {
            return Err(Error::IoError(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }

        let now = self.state.connected.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_connected.fetch_max(now, Ordering::SeqCst);

        let delay = *self.state.dial_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.state.open_resource();
        Ok(MockConnection {
            address: address.to_string(),
            state: Arc::clone(&self.state),
        })
    }
}

pub struct MockConnection {
    address: String,
    state: Arc<MockState>,
}

#[async_trait]
impl Connection for MockConnection {
    type Session = MockSession;
    type FileChannel = MockFileChannel;

    async fn new_session(&self) -> Result<MockSession, Error> {
        self.state.open_resource();
        Ok(MockSession {
            address: self.address.clone(),
            state: Arc::clone(&self.state),
        })
    }

    async fn new_file_channel(&self) -> Result<MockFileChannel, Error> {
        let no_sftp = self.state.no_sftp.lock().unwrap().contains(&self.address);
        if no_sftp {
            return Err(Error::IoError(io::Error::new(
                io::ErrorKind::Unsupported,
                "subsystem request failed",
            )));
        }
        self.state.open_resource();
        Ok(MockFileChannel {
            address: self.address.clone(),
            state: Arc::clone(&self.state),
        })
    }

    async fn close(self) -> Result<(), Error> {
        self.state.connected.fetch_sub(1, Ordering::SeqCst);
        self.state.close_resource();
        Ok(())
    }
}

pub struct MockSession {
    address: String,
    state: Arc<MockState>,
}

impl MockSession {
    fn run_one(&self, command: &str, out: &mut Vec<u8>) -> u32 {
        let command = command.trim();
        if let Some(text) = command.strip_prefix("echo ") {
            out.extend_from_slice(text.as_bytes());
            out.push(b'\n');
            0
        } else if let Some(text) = command.strip_prefix("warn ") {
            out.extend_from_slice(text.as_bytes());
            out.push(b'\n');
            0
        } else if let Some(path) = command.strip_prefix("cat ") {
            let files = self.state.files.lock().unwrap();
            match files.get(&self.address).and_then(|f| f.get(path)) {
                Some(contents) => {
                    out.extend_from_slice(contents);
                    0
                }
                None => {
                    out.extend_from_slice(format!("cat: {path}: No such file\n").as_bytes());
                    1
                }
            }
        } else if command == "panic" {
            panic!("mock shell panicked");
        } else if let Some(code) = command.strip_prefix("exit ") {
            code.trim().parse().unwrap_or(255)
        } else {
            out.extend_from_slice(format!("sh: {command}: command not found\n").as_bytes());
            127
        }
    }
}

#[async_trait]
impl Session for MockSession {
    async fn run_combined(&mut self, command: &str) -> Result<CombinedOutput, Error> {
        let mut output = Vec::new();
        let mut exit_status = 0;
        for part in command.split(';') {
            exit_status = self.run_one(part, &mut output);
        }
        Ok(CombinedOutput {
            output,
            exit_status,
        })
    }

    async fn close(self) -> Result<(), Error> {
        self.state.close_resource();
        Ok(())
    }
}

pub struct MockFileChannel {
    address: String,
    state: Arc<MockState>,
}

#[async_trait]
impl FileChannel for MockFileChannel {
    type Reader = MockReader;
    type Writer = MockWriter;

    async fn open(&self, path: &str) -> Result<MockReader, Error> {
        let contents = self
            .state
            .files
            .lock()
            .unwrap()
            .get(&self.address)
            .and_then(|f| f.get(path).cloned());
        let contents = contents.ok_or_else(|| {
            Error::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {path}"),
            ))
        })?;
        self.state.open_resource();
        Ok(MockReader {
            inner: Cursor::new(contents),
            state: Arc::clone(&self.state),
            shut_down: false,
        })
    }

    async fn create(&self, path: &str) -> Result<MockWriter, Error> {
        if path.starts_with("/readonly/") {
            return Err(Error::IoError(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            )));
        }
        Ok(MockWriter {
            address: self.address.clone(),
            path: path.to_string(),
            buf: Vec::new(),
            state: Arc::clone(&self.state),
        })
    }

    async fn close(self) -> Result<(), Error> {
        self.state.close_resource();
        Ok(())
    }
}

/// Remote read handle; counts as an open resource until shut down.
pub struct MockReader {
    inner: Cursor<Vec<u8>>,
    state: Arc<MockState>,
    shut_down: bool,
}

impl AsyncRead for MockReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for MockReader {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "opened read-only",
        )))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        if !self.shut_down {
            self.shut_down = true;
            self.state.close_resource();
        }
        Poll::Ready(Ok(()))
    }
}

/// Buffers writes and stores the file on flush or shutdown.
pub struct MockWriter {
    address: String,
    path: String,
    buf: Vec<u8>,
    state: Arc<MockState>,
}

impl MockWriter {
    fn commit(&self) {
        self.state
            .files
            .lock()
            .unwrap()
            .entry(self.address.clone())
            .or_default()
            .insert(self.path.clone(), self.buf.clone());
    }
}

impl AsyncWrite for MockWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.buf.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.commit();
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.commit();
        Poll::Ready(Ok(()))
    }
}

pub fn password_target(address: &str, command: Option<&str>) -> HostTarget {
    HostTarget::new(
        address,
        "root",
        Credential::from_parts(address, Some("secret"), None).unwrap(),
    )
    .unwrap()
    .with_command(command)
}

pub fn key_target(address: &str, key: impl Into<PathBuf>, command: Option<&str>) -> HostTarget {
    HostTarget::new(address, "root", Credential::KeyFile(key.into()))
        .unwrap()
        .with_command(command)
}
