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

//! Remote actions performed on an established connection.
//!
//! Each action opens its own channel or session and releases it before
//! returning, whether it succeeded or not.

use tokio::io::AsyncWriteExt;

use super::error::{HostError, TransferDirection, TransferStage};
use crate::ssh::{Connection, FileChannel, Session};
use crate::target::{FileTransfer, HostTarget};

/// Run upload, then download, then the command, stopping at the first
/// failure.
///
/// Returns the command output, or an empty string when no command is set.
pub async fn run_actions<C: Connection>(
    connection: &C,
    target: &HostTarget,
) -> Result<String, HostError> {
    if let Some(transfer) = &target.upload {
        tracing::info!(
            "Uploading {:?} to {}:{}",
            transfer.local,
            target.address,
            transfer.remote
        );
        upload(connection, transfer).await?;
    }

    if let Some(transfer) = &target.download {
        tracing::info!(
            "Downloading {}:{} to {:?}",
            target.address,
            transfer.remote,
            transfer.local
        );
        download(connection, transfer).await?;
    }

    match &target.command {
        Some(command) => {
            tracing::info!("Executing on {}: {}", target.address, command);
            execute(connection, command).await
        }
        None => Ok(String::new()),
    }
}

/// Copy a local file to the host over a fresh file channel.
pub async fn upload<C: Connection>(
    connection: &C,
    transfer: &FileTransfer,
) -> Result<(), HostError> {
    let channel = connection.new_file_channel().await.map_err(|e| {
        HostError::transfer(
            TransferDirection::Upload,
            TransferStage::OpenChannel,
            &transfer.remote,
            e,
        )
    })?;

    let result = upload_with(&channel, transfer).await;
    if let Err(e) = channel.close().await {
        tracing::debug!("Closing file channel after upload failed: {}", e);
    }
    result
}

async fn upload_with<F: FileChannel>(channel: &F, transfer: &FileTransfer) -> Result<(), HostError> {
    let fail = |stage, path: &dyn std::fmt::Display, e: crate::ssh::Error| {
        HostError::transfer(TransferDirection::Upload, stage, path, e)
    };

    let mut local = tokio::fs::File::open(&transfer.local)
        .await
        .map_err(|e| fail(TransferStage::OpenLocal, &transfer.local.display(), e.into()))?;
    let mut remote = channel
        .create(&transfer.remote)
        .await
        .map_err(|e| fail(TransferStage::CreateRemote, &transfer.remote, e))?;

    let copied = tokio::io::copy(&mut local, &mut remote).await;
    let closed = remote.shutdown().await;

    let bytes = copied.map_err(|e| fail(TransferStage::Copy, &transfer.remote, e.into()))?;
    closed.map_err(|e| fail(TransferStage::Copy, &transfer.remote, e.into()))?;

    tracing::debug!("Uploaded {} bytes to {}", bytes, transfer.remote);
    Ok(())
}

/// Copy a remote file to the local machine over a fresh file channel.
pub async fn download<C: Connection>(
    connection: &C,
    transfer: &FileTransfer,
) -> Result<(), HostError> {
    let channel = connection.new_file_channel().await.map_err(|e| {
        HostError::transfer(
            TransferDirection::Download,
            TransferStage::OpenChannel,
            &transfer.remote,
            e,
        )
    })?;

    let result = download_with(&channel, transfer).await;
    if let Err(e) = channel.close().await {
        tracing::debug!("Closing file channel after download failed: {}", e);
    }
    result
}

async fn download_with<F: FileChannel>(
    channel: &F,
    transfer: &FileTransfer,
) -> Result<(), HostError> {
    let fail = |stage, path: &dyn std::fmt::Display, e: crate::ssh::Error| {
        HostError::transfer(TransferDirection::Download, stage, path, e)
    };

    let mut remote = channel
        .open(&transfer.remote)
        .await
        .map_err(|e| fail(TransferStage::OpenRemote, &transfer.remote, e))?;

    let copied = copy_to_local(&mut remote, transfer).await;
    let closed = remote.shutdown().await;

    let bytes = copied?;
    closed.map_err(|e| fail(TransferStage::Copy, &transfer.remote, e.into()))?;

    tracing::debug!("Downloaded {} bytes to {:?}", bytes, transfer.local);
    Ok(())
}

async fn copy_to_local<R>(remote: &mut R, transfer: &FileTransfer) -> Result<u64, HostError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let fail = |stage, e: std::io::Error| {
        HostError::transfer(
            TransferDirection::Download,
            stage,
            transfer.local.display(),
            e,
        )
    };

    let mut local = tokio::fs::File::create(&transfer.local)
        .await
        .map_err(|e| fail(TransferStage::CreateLocal, e))?;
    let bytes = tokio::io::copy(remote, &mut local)
        .await
        .map_err(|e| fail(TransferStage::Copy, e))?;
    local
        .flush()
        .await
        .map_err(|e| fail(TransferStage::Copy, e))?;
    Ok(bytes)
}

/// Run `command` in a new session and return its combined output.
///
/// A non-zero exit status is an error that still carries the output.
pub async fn execute<C: Connection>(connection: &C, command: &str) -> Result<String, HostError> {
    let mut session = connection
        .new_session()
        .await
        .map_err(|source| HostError::Session { source })?;

    let result = session.run_combined(command).await;
    if let Err(e) = session.close().await {
        tracing::debug!("Closing session failed: {}", e);
    }

    let output = result.map_err(|source| HostError::Session { source })?;
    if output.success() {
        Ok(output.text())
    } else {
        Err(HostError::Command {
            status: output.exit_status,
            output: output.text(),
        })
    }
}
