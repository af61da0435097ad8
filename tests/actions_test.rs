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

mod common;

use common::{password_target, MockConnection, MockTransport};
use multissh::executor::actions::{download, execute, upload};
use multissh::executor::{run_actions, HostError, TransferDirection, TransferStage};
use multissh::ssh::{AuthMethod, Connection, Transport};
use multissh::target::FileTransfer;

async fn connect(transport: &MockTransport, address: &str) -> MockConnection {
    transport
        .dial(address, "root", AuthMethod::with_password("secret"))
        .await
        .unwrap()
}

fn assert_transfer_error(
    result: Result<(), HostError>,
    expected_direction: TransferDirection,
    expected_stage: TransferStage,
) {
    match result {
        Err(HostError::Transfer {
            direction, stage, ..
        }) => {
            assert_eq!(direction, expected_direction);
            assert_eq!(stage, expected_stage);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_is_byte_exact() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("all_bytes.bin");
    let contents: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
    std::fs::write(&local, &contents).unwrap();

    let transport = MockTransport::new();
    let conn = connect(&transport, "h1:22").await;
    let transfer = FileTransfer::upload(local.to_str().unwrap(), Some("/tmp/all_bytes.bin"));

    upload(&conn, &transfer).await.unwrap();
    conn.close().await.unwrap();

    assert_eq!(transport.file("h1:22", "/tmp/all_bytes.bin"), Some(contents));
    assert!(transport.all_closed());
}

#[tokio::test]
async fn test_upload_then_download_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("original.txt");
    let copy = dir.path().join("copy.txt");
    std::fs::write(&original, "line one\nline two\n").unwrap();

    let transport = MockTransport::new();
    let conn = connect(&transport, "h1:22").await;

    upload(
        &conn,
        &FileTransfer::upload(original.to_str().unwrap(), Some("/srv/file.txt")),
    )
    .await
    .unwrap();
    download(
        &conn,
        &FileTransfer::download("/srv/file.txt", Some(copy.to_str().unwrap())),
    )
    .await
    .unwrap();
    conn.close().await.unwrap();

    assert_eq!(
        std::fs::read(&original).unwrap(),
        std::fs::read(&copy).unwrap()
    );
}

#[tokio::test]
async fn test_download_truncates_existing_local_file() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("out.txt");
    std::fs::write(&local, "a much longer previous content").unwrap();

    let transport = MockTransport::new();
    transport.put_file("h1:22", "/etc/motd", b"short");
    let conn = connect(&transport, "h1:22").await;

    download(
        &conn,
        &FileTransfer::download("/etc/motd", Some(local.to_str().unwrap())),
    )
    .await
    .unwrap();

    assert_eq!(std::fs::read(&local).unwrap(), b"short");
}

#[tokio::test]
async fn test_upload_failure_stages() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("a.txt");
    std::fs::write(&local, "a").unwrap();

    let transport = MockTransport::new().without_sftp("nosftp:22");

    let conn = connect(&transport, "h1:22").await;
    assert_transfer_error(
        upload(&conn, &FileTransfer::upload("/no/such/local.txt", None)).await,
        TransferDirection::Upload,
        TransferStage::OpenLocal,
    );
    assert_transfer_error(
        upload(
            &conn,
            &FileTransfer::upload(local.to_str().unwrap(), Some("/readonly/a.txt")),
        )
        .await,
        TransferDirection::Upload,
        TransferStage::CreateRemote,
    );
    conn.close().await.unwrap();

    let conn = connect(&transport, "nosftp:22").await;
    assert_transfer_error(
        upload(&conn, &FileTransfer::upload(local.to_str().unwrap(), None)).await,
        TransferDirection::Upload,
        TransferStage::OpenChannel,
    );
    conn.close().await.unwrap();

    assert!(transport.all_closed());
}

#[tokio::test]
async fn test_download_failure_stages() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    transport.put_file("h1:22", "/etc/hostname", b"h1\n");
    let conn = connect(&transport, "h1:22").await;

    assert_transfer_error(
        download(&conn, &FileTransfer::download("/missing", Some("unused"))).await,
        TransferDirection::Download,
        TransferStage::OpenRemote,
    );

    let unwritable = dir.path().join("no_dir").join("hostname");
    assert_transfer_error(
        download(
            &conn,
            &FileTransfer::download("/etc/hostname", Some(unwritable.to_str().unwrap())),
        )
        .await,
        TransferDirection::Download,
        TransferStage::CreateLocal,
    );
    conn.close().await.unwrap();

    assert!(transport.all_closed());
}

#[tokio::test]
async fn test_download_releases_remote_handle() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    transport.put_file("h1:22", "/etc/hostname", b"h1\n");
    let conn = connect(&transport, "h1:22").await;

    download(
        &conn,
        &FileTransfer::download(
            "/etc/hostname",
            Some(dir.path().join("hostname").to_str().unwrap()),
        ),
    )
    .await
    .unwrap();
    // Only the connection itself is still open
    assert_eq!(transport.open_resources(), 1);

    let unwritable = dir.path().join("missing_dir").join("hostname");
    let result = download(
        &conn,
        &FileTransfer::download("/etc/hostname", Some(unwritable.to_str().unwrap())),
    )
    .await;
    assert!(result.is_err());
    assert_eq!(transport.open_resources(), 1);

    conn.close().await.unwrap();
    assert_eq!(transport.open_resources(), 0);
}

#[tokio::test]
async fn test_execute_combines_stdout_and_stderr() {
    let transport = MockTransport::new();
    let conn = connect(&transport, "h1:22").await;

    let output = execute(&conn, "echo out; warn err").await.unwrap();
    assert_eq!(output, "out\nerr\n");

    match execute(&conn, "no-such-command").await {
        Err(HostError::Command { status, output }) => {
            assert_eq!(status, 127);
            assert!(output.contains("command not found"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    conn.close().await.unwrap();
    assert!(transport.all_closed());
}

#[tokio::test]
async fn test_actions_run_upload_download_then_command() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("script.sh");
    std::fs::write(&local, "uploaded body\n").unwrap();
    let fetched = dir.path().join("fetched.txt");

    let transport = MockTransport::new();
    transport.put_file("h1:22", "/var/log/syslog", b"remote log\n");
    let conn = connect(&transport, "h1:22").await;

    let target = password_target("h1", Some("cat /tmp/script.sh"))
        .with_upload(Some(FileTransfer::upload(
            local.to_str().unwrap(),
            Some("/tmp/script.sh"),
        )))
        .with_download(Some(FileTransfer::download(
            "/var/log/syslog",
            Some(fetched.to_str().unwrap()),
        )));

    let output = run_actions(&conn, &target).await.unwrap();
    conn.close().await.unwrap();

    // The command sees the file uploaded before it ran
    assert_eq!(output, "uploaded body\n");
    assert_eq!(std::fs::read(&fetched).unwrap(), b"remote log\n");
}

#[tokio::test]
async fn test_actions_stop_at_first_failure() {
    let transport = MockTransport::new();
    let conn = connect(&transport, "h1:22").await;

    let target = password_target("h1", Some("echo should not run"))
        .with_upload(Some(FileTransfer::upload("/no/such/file", None)));

    let result = run_actions(&conn, &target).await;
    assert!(matches!(
        result,
        Err(HostError::Transfer {
            stage: TransferStage::OpenLocal,
            ..
        })
    ));
    conn.close().await.unwrap();
    assert!(transport.all_closed());
}

#[tokio::test]
async fn test_transfer_only_yields_empty_output() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("a.txt");
    std::fs::write(&local, "a").unwrap();

    let transport = MockTransport::new();
    let conn = connect(&transport, "h1:22").await;
    let target =
        password_target("h1", None).with_upload(Some(FileTransfer::upload(local.to_str().unwrap(), None)));

    assert_eq!(run_actions(&conn, &target).await.unwrap(), "");
    assert_eq!(
        transport.file("h1:22", local.to_str().unwrap()),
        Some(b"a".to_vec())
    );
}
