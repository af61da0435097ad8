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

//! SSH authentication methods and server verification.
//!
//! Private keys are read and decoded before dialing, so an [`AuthMethod`]
//! only ever carries material that is ready to present to the server.

use russh::client::{Handle, Handler};
use russh::keys::PrivateKey;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use zeroize::Zeroizing;

/// An authentication token presented after the handshake.
#[derive(Clone)]
pub enum AuthMethod {
    Password(Zeroizing<String>),
    PrivateKey(Arc<PrivateKey>),
}

impl AuthMethod {
    /// Convenience method to create a [`AuthMethod`] from a string literal.
    pub fn with_password(password: &str) -> Self {
        Self::Password(Zeroizing::new(password.to_string()))
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Password(_) => "password",
            Self::PrivateKey(_) => "publickey",
        }
    }
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password(_) => f.write_str("Password(<redacted>)"),
            Self::PrivateKey(key) => write!(f, "PrivateKey({})", key.algorithm()),
        }
    }
}

/// Server host key verification methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServerCheckMethod {
    /// Accept any host key
    NoCheck,
    /// Require a matching entry in the given known_hosts file
    KnownHostsFile(PathBuf),
    /// Trust unknown hosts on first use and record them in the given
    /// known_hosts file; reject keys that changed
    AcceptNew(PathBuf),
}

/// This takes a handle and performs authentication with the given method.
pub(super) async fn authenticate<H: Handler>(
    handle: &mut Handle<H>,
    username: &str,
    auth: AuthMethod,
) -> Result<(), super::Error> {
    match auth {
        AuthMethod::Password(password) => {
            let auth_result = handle.authenticate_password(username, &**password).await?;
            if !auth_result.success() {
                return Err(super::Error::PasswordWrong);
            }
        }
        AuthMethod::PrivateKey(key) => {
            let auth_result = handle
                .authenticate_publickey(
                    username,
                    russh::keys::PrivateKeyWithHashAlg::new(
                        key,
                        handle.best_supported_rsa_hash().await?.flatten(),
                    ),
                )
                .await?;
            if !auth_result.success() {
                return Err(super::Error::KeyAuthFailed);
            }
        }
    };
    Ok(())
}
