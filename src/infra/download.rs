//! HTTP download functionality
//!
//! Streams a single file to disk while hashing it. There is no retry: a
//! failed toolchain download aborts the run, and re-running picks up where
//! the cache left off.

use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::defaults;
use crate::error::DownloadError;

/// Download result containing file path and metadata
#[derive(Debug)]
pub struct DownloadResult {
    /// Path to the downloaded file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// SHA256 checksum of the downloaded content
    pub checksum: String,
}

/// Download manager for fetching release archives
#[derive(Debug, Clone)]
pub struct DownloadManager {
    /// HTTP client
    client: reqwest::Client,
}

impl DownloadManager {
    /// Create a new download manager
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(defaults::DOWNLOAD_TIMEOUT)
                .connect_timeout(defaults::CONNECT_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Download a file, replacing `dest` if it exists
    pub async fn download(&self, url: &str, dest: &Path) -> Result<DownloadResult, DownloadError> {
        tracing::info!("Downloading {url} to {}", dest.display());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DownloadError::NetworkError {
                url: url.to_string(),
                error: format!("HTTP {}", response.status()),
            });
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::IoError {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
        }

        let mut file = File::create(dest)
            .await
            .map_err(|e| DownloadError::IoError {
                path: dest.to_path_buf(),
                error: e.to_string(),
            })?;

        let mut hasher = Sha256::new();
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })?;

            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::IoError {
                    path: dest.to_path_buf(),
                    error: e.to_string(),
                })?;

            hasher.update(&chunk);
            downloaded += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| DownloadError::IoError {
            path: dest.to_path_buf(),
            error: e.to_string(),
        })?;

        let checksum = hex::encode(hasher.finalize());
        tracing::debug!("Downloaded {downloaded} bytes, sha256 {checksum}");

        Ok(DownloadResult {
            path: dest.to_path_buf(),
            size: downloaded,
            checksum,
        })
    }

    /// Download a file and check it against a pinned SHA256, if any
    pub async fn download_verified(
        &self,
        url: &str,
        dest: &Path,
        expected_checksum: Option<&str>,
    ) -> Result<DownloadResult, DownloadError> {
        let result = self.download(url, dest).await?;

        if let Some(expected) = expected_checksum {
            if !result.checksum.eq_ignore_ascii_case(expected) {
                let _ = tokio::fs::remove_file(dest).await;
                return Err(DownloadError::ChecksumFailed {
                    file: dest.display().to_string(),
                    expected: expected.to_lowercase(),
                    actual: result.checksum,
                });
            }
        }

        Ok(result)
    }
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_compute_checksum() {
        assert_eq!(
            compute_checksum(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[tokio::test]
    async fn test_download_success() {
        let mock_server = MockServer::start().await;
        let content = b"toolchain archive bytes";

        Mock::given(method("GET"))
            .and(path("/toolchain.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("nested/toolchain.zip");
        let manager = DownloadManager::new();

        let result = manager
            .download(&format!("{}/toolchain.zip", mock_server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(result.size, content.len() as u64);
        assert_eq!(result.checksum, compute_checksum(content));
        assert_eq!(std::fs::read(&dest).unwrap(), content);
    }

    #[tokio::test]
    async fn test_download_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing.zip"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("missing.zip");

        let err = DownloadManager::new()
            .download(&format!("{}/missing.zip", mock_server.uri()), &dest)
            .await
            .unwrap_err();

        match err {
            DownloadError::NetworkError { error, .. } => assert!(error.contains("404")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_download_verified_mismatch_removes_file() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/file.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("file.zip");

        let err = DownloadManager::new()
            .download_verified(
                &format!("{}/file.zip", mock_server.uri()),
                &dest,
                Some(&"0".repeat(64)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::ChecksumFailed { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_download_verified_accepts_uppercase_pin() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/file.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("file.zip");
        let pin = compute_checksum(b"abc").to_uppercase();

        let result = DownloadManager::new()
            .download_verified(
                &format!("{}/file.zip", mock_server.uri()),
                &dest,
                Some(&pin),
            )
            .await;

        assert!(result.is_ok());
    }
}
