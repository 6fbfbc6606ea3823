//! Transfer engine tests against an in-process range-capable HTTP server:
//! fresh downloads, byte-range resume, and the refusal paths that protect the
//! partial file from corruption.

mod common;

use bdl::downloader::Downloader;
use bdl::error::TransferError;
use tempfile::tempdir;

fn test_body(len: usize) -> Vec<u8> {
    (0u8..=255).cycle().take(len).collect()
}

#[tokio::test]
async fn fresh_download_writes_full_body() {
    let body = test_body(4096);
    let url = common::range_server::start(body.clone());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("file.bin");

    Downloader::new()
        .download_resumable(&url, &dest)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[tokio::test]
async fn resume_from_partial_completes_exactly() {
    let body = test_body(1000);
    let url = common::range_server::start(body.clone());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("file.bin");

    // 500 bytes already on disk; the engine must request bytes 500- and end
    // with exactly 1000 bytes.
    std::fs::write(&dest, &body[..500]).unwrap();

    Downloader::new()
        .download_resumable(&url, &dest)
        .await
        .unwrap();

    let content = std::fs::read(&dest).unwrap();
    assert_eq!(content.len(), 1000);
    assert_eq!(content, body);
}

#[tokio::test]
async fn repeated_calls_are_idempotent() {
    let body = test_body(2048);
    let url = common::range_server::start(body.clone());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("file.bin");

    let downloader = Downloader::new();
    downloader.download_resumable(&url, &dest).await.unwrap();
    downloader.download_resumable(&url, &dest).await.unwrap();

    // Second call skips the complete file; length never decreases and bytes
    // never change.
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[tokio::test]
async fn ignored_range_fails_without_touching_partial_file() {
    let body = test_body(1000);
    let url = common::range_server::start_with_resume(body.clone(), false);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("file.bin");
    std::fs::write(&dest, &body[..500]).unwrap();

    let err = Downloader::new()
        .download_resumable(&url, &dest)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TransferError::RangeNotSatisfied { offset: 500 }
    ));
    // The partial file was not appended to.
    assert_eq!(std::fs::read(&dest).unwrap(), &body[..500]);
}

#[tokio::test]
async fn complete_file_with_blocked_head_is_skipped_on_416() {
    let body = test_body(1000);
    let url = common::range_server::start_with_options(
        body.clone(),
        common::range_server::ServerOptions {
            head_allowed: false,
            ..Default::default()
        },
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("file.bin");
    std::fs::write(&dest, &body).unwrap();

    // HEAD is blocked, so the engine only learns the file is complete from
    // the 416 answer to `bytes=1000-`; that must not fail the item.
    Downloader::new()
        .download_resumable(&url, &dest)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[tokio::test]
async fn oversized_file_with_blocked_head_gets_range_refusal() {
    let body = test_body(100);
    let url = common::range_server::start_with_options(
        body,
        common::range_server::ServerOptions {
            head_allowed: false,
            ..Default::default()
        },
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("file.bin");
    std::fs::write(&dest, test_body(200)).unwrap();

    // 416 with a total that does not match the local length is a genuine
    // refusal, which the batch driver answers with a fresh transfer.
    let err = Downloader::new()
        .download_resumable(&url, &dest)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TransferError::RangeNotSatisfied { offset: 200 }
    ));
}

#[tokio::test]
async fn interrupted_stream_leaves_resumable_partial() {
    let body = test_body(1000);
    let url = common::range_server::start_with_options(
        body.clone(),
        common::range_server::ServerOptions {
            truncate_first_get_after: Some(600),
            ..Default::default()
        },
    );
    let dir = tempdir().unwrap();
    let dest = dir.path().join("file.bin");

    let downloader = Downloader::new();
    let err = downloader
        .download_resumable(&url, &dest)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::Interrupted(_)));
    assert!(err.is_transient());

    // The bytes received before the cut survive on disk...
    assert_eq!(std::fs::read(&dest).unwrap(), &body[..600]);

    // ...and the next call resumes from them and completes the file.
    downloader.download_resumable(&url, &dest).await.unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[tokio::test]
async fn fresh_variant_overwrites_partial_file() {
    let body = test_body(1000);
    let url = common::range_server::start_with_resume(body.clone(), false);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("file.bin");
    std::fs::write(&dest, b"stale partial data").unwrap();

    Downloader::new().download_fresh(&url, &dest).await.unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[tokio::test]
async fn local_file_longer_than_remote_is_refused() {
    let body = test_body(100);
    let url = common::range_server::start(body.clone());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("file.bin");
    std::fs::write(&dest, test_body(200)).unwrap();

    let err = Downloader::new()
        .download_resumable(&url, &dest)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TransferError::RangeNotSatisfied { offset: 200 }
    ));
}

#[tokio::test]
async fn connection_failure_is_transient() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("file.bin");

    let err = Downloader::new()
        .download_resumable("http://127.0.0.1:1/file.bin", &dest)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::Http(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn probe_is_true_only_for_reachable_hosts() {
    let url = common::range_server::start(test_body(1));
    let downloader = Downloader::new();
    assert!(downloader.probe(&url).await);
    assert!(!downloader.probe("http://127.0.0.1:1/").await);
}
