//! Integration tests for the resource client over the local file backend

use std::sync::Arc;
use tempfile::tempdir;
use tentaclio::backends::BackendError;
use tentaclio::client::ResourceClient;
use tentaclio::{CredentialsInjector, TentaclioError};

fn client() -> ResourceClient {
    ResourceClient::with_defaults(Arc::new(CredentialsInjector::new()))
}

#[tokio::test]
async fn test_write_read_scan_remove() {
    let dir = tempdir().unwrap();
    let root = dir.path().display().to_string();
    let client = client();

    let report = format!("file://{}/reports/jan.csv", root);
    client.write(&report, b"month,total\njan,42\n").await.unwrap();
    assert_eq!(client.read(&report).await.unwrap(), b"month,total\njan,42\n");

    let entries = client.scan(&format!("file://{}/reports", root)).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].size, Some(19));
    assert!(entries[0].url.path().ends_with("/reports/jan.csv"));

    client.remove(&report).await.unwrap();
    assert!(matches!(
        client.read(&report).await,
        Err(TentaclioError::Backend(BackendError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_scheme_less_paths_are_local_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plain.txt");
    let client = client();

    client
        .write(&path.display().to_string(), b"plain")
        .await
        .unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"plain");
}

#[tokio::test]
async fn test_streaming_copy() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.bin");
    let destination = dir.path().join("copies/destination.bin");
    std::fs::write(&source, vec![7u8; 4096]).unwrap();

    let copied = client()
        .copy(
            &format!("file://{}", source.display()),
            &format!("file://{}", destination.display()),
        )
        .await
        .unwrap();

    assert_eq!(copied, Some(4096));
    assert_eq!(std::fs::read(&destination).unwrap(), vec![7u8; 4096]);
}

#[tokio::test]
async fn test_copy_to_unregistered_scheme_fails() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.txt");
    std::fs::write(&source, b"data").unwrap();

    let result = client()
        .copy(&format!("file://{}", source.display()), "s3://bucket/key")
        .await;
    assert!(matches!(
        result,
        Err(TentaclioError::Backend(BackendError::UnregisteredScheme { .. }))
    ));
}
