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

//! Authentication resolution and dialing for a single host.

use std::sync::Arc;
use std::time::Duration;
use zeroize::Zeroizing;

use super::error::HostError;
use crate::ssh::{AuthMethod, Transport};
use crate::target::{Credential, HostTarget};

/// Dial timeout used when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Turn a credential into an [`AuthMethod`], reading and decoding key files
/// locally.
pub async fn load_auth_method(credential: &Credential) -> Result<AuthMethod, HostError> {
    match credential {
        Credential::Password(password) => Ok(AuthMethod::Password(password.clone())),
        Credential::KeyFile(path) => {
            let key_path = path.display().to_string();
            let key_data = Zeroizing::new(tokio::fs::read_to_string(path).await.map_err(
                |source| HostError::KeyRead {
                    path: key_path.clone(),
                    source,
                },
            )?);
            let key = russh::keys::decode_secret_key(&key_data, None)
                .map_err(|source| HostError::KeyParse {
                    path: key_path,
                    source,
                })?;
            Ok(AuthMethod::PrivateKey(Arc::new(key)))
        }
    }
}

/// Resolve credentials and dial `target` with a bounded connect timeout.
///
/// Key problems are reported before anything is dialed. There is no retry.
pub async fn connect<T: Transport>(
    transport: &T,
    target: &HostTarget,
    timeout: Duration,
) -> Result<T::Connection, HostError> {
    let auth = load_auth_method(&target.credential).await?;

    tracing::debug!("Connecting to {} as {}", target.address, target.user);
    match tokio::time::timeout(timeout, transport.dial(&target.address, &target.user, auth)).await
    {
        Ok(Ok(connection)) => Ok(connection),
        Ok(Err(source)) => Err(HostError::Dial {
            address: target.address.clone(),
            source,
        }),
        Err(_) => Err(HostError::DialTimeout {
            address: target.address.clone(),
            timeout,
        }),
    }
}
