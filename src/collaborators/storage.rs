//! Result storage backends.

use super::BlobStore;
use crate::config::{Settings, StorageKind};
use crate::error::{LectioError, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use url::Url;

/// Stores blobs under a local directory and returns `file://` URLs.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(LectioError::Storage(format!("invalid key: {:?}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    #[instrument(skip(self, local_path), fields(key = %key))]
    async fn put(&self, local_path: &Path, key: &str) -> Result<String> {
        let target = self.target(key)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(local_path, &target).await?;

        let absolute = std::path::absolute(&target)?;
        let url = Url::from_file_path(&absolute)
            .map_err(|_| LectioError::Storage(format!("cannot build URL for {:?}", absolute)))?;

        debug!("Stored {:?} at {}", local_path, url);
        Ok(url.to_string())
    }
}

/// Uploads blobs with HTTP PUT to `<base_url>/<key>`.
///
/// Works against any endpoint accepting PUT uploads, such as a presigned
/// bucket gateway. An optional bearer token is sent when configured.
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBlobStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    #[instrument(skip(self, local_path), fields(key = %key))]
    async fn put(&self, local_path: &Path, key: &str) -> Result<String> {
        let body = tokio::fs::read(local_path).await?;
        let url = self.object_url(key);

        let mut request = self.client.put(&url).body(body);
        if key.ends_with(".json") {
            request = request.header(reqwest::header::CONTENT_TYPE, "application/json");
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LectioError::Storage(format!(
                "upload to {} failed ({}): {}",
                url, status, text
            )));
        }

        info!("Uploaded {}", url);
        Ok(url)
    }
}

/// Build the blob store selected in the settings.
pub fn create_blob_store(settings: &Settings) -> Result<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match settings.storage.kind {
        StorageKind::Local => Arc::new(LocalBlobStore::new(settings.storage_root())),
        StorageKind::Http => {
            if settings.storage.base_url.is_empty() {
                return Err(LectioError::Config(
                    "storage.base_url is required for the http backend".to_string(),
                ));
            }
            let token = std::env::var(&settings.storage.token_env)
                .ok()
                .filter(|t| !t.is_empty());
            Arc::new(HttpBlobStore::new(&settings.storage.base_url, token))
        }
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_store_copies_and_returns_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("result.json");
        std::fs::write(&source, "{}").unwrap();

        let store = LocalBlobStore::new(dir.path().join("store"));
        let url = store.put(&source, "results/abc.json").await.unwrap();

        assert!(url.starts_with("file://"));
        assert!(url.ends_with("/store/results/abc.json"));
        let stored = std::fs::read_to_string(dir.path().join("store/results/abc.json")).unwrap();
        assert_eq!(stored, "{}");
    }

    #[tokio::test]
    async fn test_local_store_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("x");
        std::fs::write(&source, "x").unwrap();

        let store = LocalBlobStore::new(dir.path());
        for key in ["../outside.json", "/etc/passwd", ""] {
            assert!(matches!(store.put(&source, key).await, Err(LectioError::Storage(_))), "{}", key);
        }
    }

    #[test]
    fn test_http_object_url() {
        let store = HttpBlobStore::new("https://store.example.com/bucket/", None);
        assert_eq!(
            store.object_url("results/abc.json"),
            "https://store.example.com/bucket/results/abc.json"
        );
    }

    #[test]
    fn test_create_blob_store_requires_base_url_for_http() {
        let mut settings = Settings::default();
        settings.storage.kind = StorageKind::Http;
        assert!(create_blob_store(&settings).is_err());

        settings.storage.base_url = "http://localhost:9000/lectures".to_string();
        assert!(create_blob_store(&settings).is_ok());
    }
}
