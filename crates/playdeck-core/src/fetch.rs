//! Subtitle fetch collaborator
//!
//! The core never does transport itself; it hands subtitle URLs to a
//! [`SubtitleFetcher`] and degrades to inert scheduling when the fetch
//! fails.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Asynchronous retrieval of a raw subtitle payload
#[async_trait]
pub trait SubtitleFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// HTTP-backed fetcher
pub struct HttpSubtitleFetcher {
    client: reqwest::Client,
}

impl HttpSubtitleFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

impl Default for HttpSubtitleFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubtitleFetcher for HttpSubtitleFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(Error::SubtitleFetch(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::SubtitleFetch(e.to_string()))
    }
}
