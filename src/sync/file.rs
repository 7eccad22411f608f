use std::path::Path;

use futures_util::StreamExt;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::error::FetchError;
use super::paths;
use crate::camera::{CameraClient, RemoteEntry};

/// Download one photo to `download_path` via a `.part` temp file.
///
/// The body is streamed to `<name>.part` next to the target and renamed into
/// place only once complete, so `download_path` never holds a truncated
/// photo. On failure the temp file is removed. Returns the bytes written.
pub async fn download_photo(
    camera: &CameraClient,
    entry: &RemoteEntry,
    download_path: &Path,
) -> Result<u64, FetchError> {
    let part_path = paths::part_path(download_path);
    let result = attempt_download(camera, entry, download_path, &part_path).await;
    if result.is_err() {
        let _ = fs::remove_file(&part_path).await;
    }
    result
}

async fn attempt_download(
    camera: &CameraClient,
    entry: &RemoteEntry,
    download_path: &Path,
    part_path: &Path,
) -> Result<u64, FetchError> {
    let path_str = download_path.display().to_string();
    let disk_err = |source| FetchError::Disk {
        path: path_str.clone(),
        source,
    };

    let response = camera.get_photo(entry).await?;

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(part_path)
        .await
        .map_err(disk_err)?;

    let mut bytes_written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::Body {
            path: path_str.clone(),
            bytes_written,
            source: e,
        })?;
        file.write_all(&chunk).await.map_err(disk_err)?;
        bytes_written += chunk.len() as u64;
    }
    file.flush().await.map_err(disk_err)?;
    file.sync_all().await.map_err(disk_err)?;
    drop(file);

    fs::rename(part_path, download_path)
        .await
        .map_err(disk_err)?;

    Ok(bytes_written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_download_writes_body_and_removes_part() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/photos/100RICOH/R0000001.JPG"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\xFF\xD8jpegdata".to_vec()))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("100RICOH")).unwrap();
        let target = tmp.path().join("100RICOH/R0000001.JPG");

        let camera = CameraClient::new(&server.uri()).unwrap();
        let entry = RemoteEntry::new("100RICOH", "R0000001.JPG");
        let written = download_photo(&camera, &entry, &target).await.unwrap();

        assert_eq!(written, 10);
        assert_eq!(std::fs::read(&target).unwrap(), b"\xFF\xD8jpegdata");
        assert!(!paths::part_path(&target).exists());
    }

    #[tokio::test]
    async fn test_http_error_leaves_nothing_behind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/photos/100RICOH/R0000002.JPG"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("100RICOH")).unwrap();
        let target = tmp.path().join("100RICOH/R0000002.JPG");

        let camera = CameraClient::new(&server.uri()).unwrap();
        let entry = RemoteEntry::new("100RICOH", "R0000002.JPG");
        let err = download_photo(&camera, &entry, &target).await.unwrap_err();

        assert!(matches!(
            err,
            FetchError::Camera(crate::camera::CameraError::HttpStatus { status: 404, .. })
        ));
        assert!(!target.exists());
        assert!(!paths::part_path(&target).exists());
    }

    #[tokio::test]
    async fn test_missing_parent_is_disk_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/photos/100RICOH/R0000003.JPG"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("100RICOH/R0000003.JPG");

        let camera = CameraClient::new(&server.uri()).unwrap();
        let entry = RemoteEntry::new("100RICOH", "R0000003.JPG");
        let err = download_photo(&camera, &entry, &target).await.unwrap_err();
        assert!(matches!(err, FetchError::Disk { .. }));
    }
}
