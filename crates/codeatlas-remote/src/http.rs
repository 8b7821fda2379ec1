//! Content fetching over HTTP

use anyhow::{Context, Result};
use async_trait::async_trait;
use codeatlas_core::FileDescriptor;
use codeatlas_indexer::ContentFetcher;

/// GETs each file's `content_handle` (a raw download URL).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    token: Option<String>,
}

impl HttpFetcher {
    pub fn new(token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.filter(|t| !t.is_empty()),
        }
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, file: &FileDescriptor) -> Result<Vec<u8>> {
        let url = file
            .content_handle
            .as_deref()
            .with_context(|| format!("{} has no download URL", file.path))?;

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to download {}", file.path))?;

        if !response.status().is_success() {
            anyhow::bail!("Download of {} failed with {}", file.path, response.status());
        }
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
