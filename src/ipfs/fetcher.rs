//! Gateway download of IPFS content to a local file.

use crate::config::IpfsConfig;
use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Reject hashes that are empty or not plain ASCII alphanumerics.
///
/// CIDv0 (base58btc) and CIDv1 (base32) are alphanumeric; anything else
/// would be unsafe as a file name.
pub fn validate_hash(ipfs_hash: &str) -> Result<()> {
    if ipfs_hash.is_empty() {
        return Err(AppError::Validation("IPFS hash cannot be empty".to_string()));
    }
    if !ipfs_hash.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::Validation(format!(
            "Invalid IPFS hash: {}",
            ipfs_hash
        )));
    }
    Ok(())
}

/// Downloads documents from an IPFS gateway.
#[derive(Clone)]
pub struct Fetcher {
    http_client: reqwest::Client,
    gateway_url: String,
    download_dir: PathBuf,
}

impl Fetcher {
    /// Create a fetcher from gateway settings.
    pub fn new(config: &IpfsConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Fetch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            gateway_url: config.gateway_url.trim_end_matches('/').to_string(),
            download_dir: config.download_dir.clone(),
        })
    }

    /// Gateway URL for a content hash.
    pub fn gateway_url(&self, ipfs_hash: &str) -> String {
        format!("{}/{}", self.gateway_url, ipfs_hash)
    }

    /// Local path a hash is stored at.
    pub fn local_path(&self, ipfs_hash: &str) -> PathBuf {
        self.download_dir.join(format!("{}.pdf", ipfs_hash))
    }

    /// Download `ipfs_hash` and write it to `{download_dir}/{hash}.pdf`.
    ///
    /// Existing files are overwritten; nothing is cached between calls.
    pub async fn fetch(&self, ipfs_hash: &str) -> Result<PathBuf> {
        validate_hash(ipfs_hash)?;

        let url = self.gateway_url(ipfs_hash);
        info!("Downloading {} from gateway", ipfs_hash);
        debug!("Gateway URL: {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Fetch(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Fetch(e.to_string()))?;

        let path = self.local_path(ipfs_hash);
        write_file(&path, &bytes).await?;

        info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path as AxumPath;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use tempfile::TempDir;

    async fn spawn_gateway() -> String {
        async fn serve(AxumPath(hash): AxumPath<String>) -> (StatusCode, Vec<u8>) {
            match hash.as_str() {
                "QmGood" => (StatusCode::OK, b"%PDF-1.4 fake".to_vec()),
                _ => (StatusCode::NOT_FOUND, b"not found".to_vec()),
            }
        }

        let app = Router::new().route("/ipfs/:hash", get(serve));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/ipfs", addr)
    }

    fn fetcher(gateway_url: String, dir: &TempDir) -> Fetcher {
        Fetcher::new(&IpfsConfig {
            gateway_url,
            timeout_seconds: 5,
            download_dir: dir.path().to_path_buf(),
        })
        .unwrap()
    }

    #[test]
    fn test_validate_hash() {
        assert!(validate_hash("QmYA2fn8cMbVWo4v95RwcwJVyQsNtnEwHerfWR8UNtEwoE").is_ok());
        assert!(validate_hash("bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi").is_ok());
        assert!(matches!(validate_hash(""), Err(AppError::Validation(_))));
        assert!(matches!(
            validate_hash("../etc/passwd"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_gateway_url_formatting() {
        let dir = TempDir::new().unwrap();
        let f = fetcher("https://ipfs.io/ipfs/".to_string(), &dir);
        assert_eq!(f.gateway_url("QmHash"), "https://ipfs.io/ipfs/QmHash");
        assert_eq!(f.local_path("QmHash"), dir.path().join("QmHash.pdf"));
    }

    #[tokio::test]
    async fn test_fetch_writes_file() {
        let dir = TempDir::new().unwrap();
        let f = fetcher(spawn_gateway().await, &dir);

        let path = f.fetch("QmGood").await.unwrap();
        assert_eq!(path, dir.path().join("QmGood.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 fake");

        // A second fetch overwrites the same file.
        std::fs::write(&path, b"stale").unwrap();
        f.fetch("QmGood").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 fake");
    }

    #[tokio::test]
    async fn test_fetch_http_error_status() {
        let dir = TempDir::new().unwrap();
        let f = fetcher(spawn_gateway().await, &dir);

        let err = f.fetch("QmMissing").await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)));
        assert!(err.to_string().starts_with("Failed to download PDF from IPFS:"));
        assert!(!dir.path().join("QmMissing.pdf").exists());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let dir = TempDir::new().unwrap();
        let f = fetcher("http://127.0.0.1:1/ipfs".to_string(), &dir);
        let err = f.fetch("QmGood").await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)));
    }
}
